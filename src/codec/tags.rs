//! Таблица тегов бинарного формата.
//!
//! Каждый узел потока (кроме ключей объекта и «голой» строки верхнего
//! уровня) начинается с однобайтового тега. Нумерация фиксирована: энкодер и
//! декодер обязаны использовать одну и ту же таблицу, согласования версий нет.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Тип узла в закодированном потоке.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Tag {
    /// `null`
    Null = 0,
    /// `undefined`
    Undefined = 1,
    /// Целое 0..2^32 (u32 LE)
    Uint = 2,
    /// Отрицательное целое -2^31..0 (i32 LE)
    Int = 3,
    /// Отрицательное широкое целое (i64 LE)
    BigInt = 4,
    /// Неотрицательное широкое целое (u64 LE)
    BigUint = 5,
    /// Число с плавающей точкой (f64 LE)
    Double = 6,
    /// Зарезервирован под back-reference, декодер его не знает.
    Record = 7,
    /// Зарезервирован под back-reference, декодер его не знает.
    Ref = 8,
    /// Строка: u32 длина в байтах + UTF-8
    String = 9,
    /// Бинарный блок: u32 длина + байты
    Bin = 10,
    True = 11,
    False = 12,
    /// Зарезервирован.
    Date = 13,
    /// Зарезервирован.
    Date64 = 14,
    /// Пользовательский тип: u32 код + массив аргументов
    ConstructorN = 15,
    ArrayStart = 16,
    ArrayEnd = 17,
    ObjectStart = 18,
    ObjectEnd = 19,
    SetStart = 20,
    SetEnd = 21,
    MapStart = 22,
    MapEnd = 23,
}

impl Tag {
    /// Байт тега в потоке.
    #[inline]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Теги, для которых нет ветки декодирования. Декодер обрабатывает их
    /// как любой неизвестный байт.
    pub const fn is_reserved(self) -> bool {
        matches!(self, Self::Record | Self::Ref | Self::Date | Self::Date64)
    }

    /// Закрывающий маркер для открывающего маркера контейнера.
    pub const fn end_of(self) -> Option<Tag> {
        match self {
            Self::ArrayStart => Some(Self::ArrayEnd),
            Self::ObjectStart => Some(Self::ObjectEnd),
            Self::SetStart => Some(Self::SetEnd),
            Self::MapStart => Some(Self::MapEnd),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест фиксирует нумерацию тегов: любая перестановка ломает совместимость
    /// потока.
    #[test]
    fn test_tag_numbering_is_stable() {
        let expected = [
            (Tag::Null, 0u8),
            (Tag::Undefined, 1),
            (Tag::Uint, 2),
            (Tag::Int, 3),
            (Tag::BigInt, 4),
            (Tag::BigUint, 5),
            (Tag::Double, 6),
            (Tag::Record, 7),
            (Tag::Ref, 8),
            (Tag::String, 9),
            (Tag::Bin, 10),
            (Tag::True, 11),
            (Tag::False, 12),
            (Tag::Date, 13),
            (Tag::Date64, 14),
            (Tag::ConstructorN, 15),
            (Tag::ArrayStart, 16),
            (Tag::ArrayEnd, 17),
            (Tag::ObjectStart, 18),
            (Tag::ObjectEnd, 19),
            (Tag::SetStart, 20),
            (Tag::SetEnd, 21),
            (Tag::MapStart, 22),
            (Tag::MapEnd, 23),
        ];
        for (tag, byte) in expected {
            assert_eq!(tag.byte(), byte);
            assert_eq!(Tag::try_from(byte).unwrap(), tag);
        }
    }

    #[test]
    fn test_unknown_byte_is_rejected() {
        assert!(Tag::try_from(24u8).is_err());
        assert!(Tag::try_from(b'H').is_err());
    }

    #[test]
    fn test_reserved_tags() {
        assert!(Tag::Record.is_reserved());
        assert!(Tag::Date64.is_reserved());
        assert!(!Tag::String.is_reserved());
    }

    #[test]
    fn test_end_of() {
        assert_eq!(Tag::ArrayStart.end_of(), Some(Tag::ArrayEnd));
        assert_eq!(Tag::MapStart.end_of(), Some(Tag::MapEnd));
        assert_eq!(Tag::Bin.end_of(), None);
    }
}
