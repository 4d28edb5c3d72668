//! Модель данных, которую кодирует и восстанавливает кодек.
//!
//! `Value` покрывает все виды узлов формата: скаляры, числа, широкие целые,
//! строки, бинарные блоки, четыре вида контейнеров и пользовательские типы.
//!
//! Сравнение чисел следует SameValueZero: `NaN` равен `NaN`, `+0` равен `-0`
//! (через [`OrderedFloat`]). Контейнеры сравниваются с учётом порядка. Это
//! даёт `Value` свойства `Eq + Hash`, нужные элементам `Set` и ключам `Map`.

use std::{
    any::Any,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use bytes::Bytes;
use indexmap::{IndexMap, IndexSet};
use ordered_float::OrderedFloat;

/// Объект: уникальные строковые ключи в порядке вставки.
pub type Object = IndexMap<String, Value>;
/// Множество уникальных значений в порядке вставки.
pub type ValueSet = IndexSet<Value>;
/// Отображение значение → значение в порядке вставки.
pub type ValueMap = IndexMap<Value, Value>;

/// Значение пользовательского типа.
///
/// Энкодер находит запись реестра по [`CustomValue::type_name`] и пишет код
/// типа вместе с кортежем аргументов. Декодер по коду находит builder и
/// восстанавливает значение из того же кортежа.
pub trait CustomValue: Any + fmt::Debug + Send + Sync {
    /// Имя типа, под которым он зарегистрирован в реестре.
    fn type_name(&self) -> &str;

    /// Упорядоченный кортеж аргументов, из которого builder восстановит
    /// эквивалентное значение.
    fn to_args(&self) -> Vec<Value>;

    fn as_any(&self) -> &dyn Any;
}

/// Узел структурированного значения.
#[derive(Clone, Debug)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    /// Число двойной точности. Целые в диапазоне 32 бит кодируются компактно.
    Number(f64),
    /// Широкое целое. Кодируемый диапазон: `i64::MIN..=u64::MAX`.
    BigInt(i128),
    Str(String),
    /// Непрозрачный бинарный блок.
    Bin(Bytes),
    Array(Vec<Value>),
    Object(Object),
    Set(ValueSet),
    Map(ValueMap),
    Custom(Arc<dyn CustomValue>),
}

impl Value {
    /// Оборачивает значение пользовательского типа.
    pub fn custom<T: CustomValue>(value: T) -> Self {
        Value::Custom(Arc::new(value))
    }

    /// Имя вида значения для сообщений об ошибках. Для пользовательских
    /// типов возвращает имя из реестра.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::Str(_) => "string",
            Value::Bin(_) => "bin",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Custom(c) => c.type_name(),
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bin(&self) -> Option<&Bytes> {
        match self {
            Value::Bin(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Downcast пользовательского значения к конкретному типу.
    pub fn as_custom<T: CustomValue>(&self) -> Option<&T> {
        match self {
            Value::Custom(c) => c.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        use Value::*;
        match (self, other) {
            (Undefined, Undefined) | (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Number(a), Number(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (BigInt(a), BigInt(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Bin(a), Bin(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Object(a), Object(b)) => a.len() == b.len() && a.iter().eq(b.iter()),
            (Set(a), Set(b)) => a.len() == b.len() && a.iter().eq(b.iter()),
            (Map(a), Map(b)) => a.len() == b.len() && a.iter().eq(b.iter()),
            (Custom(a), Custom(b)) => {
                a.type_name() == b.type_name() && a.to_args() == b.to_args()
            }
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Undefined | Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Number(n) => OrderedFloat(*n).hash(state),
            Value::BigInt(n) => n.hash(state),
            Value::Str(s) => s.hash(state),
            Value::Bin(b) => b.hash(state),
            Value::Array(items) => items.hash(state),
            Value::Object(obj) => {
                obj.len().hash(state);
                for (k, v) in obj {
                    k.hash(state);
                    v.hash(state);
                }
            }
            Value::Set(set) => {
                set.len().hash(state);
                for v in set {
                    v.hash(state);
                }
            }
            Value::Map(map) => {
                map.len().hash(state);
                for (k, v) in map {
                    k.hash(state);
                    v.hash(state);
                }
            }
            Value::Custom(c) => {
                c.type_name().hash(state);
                c.to_args().hash(state);
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bin(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bin(Bytes::from(b))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl From<ValueSet> for Value {
    fn from(set: ValueSet) -> Self {
        Value::Set(set)
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::Map(map)
    }
}

/// Импорт JSON-документа: числа становятся `Number`, объекты становятся `Object`.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(feature = "fuzz")]
impl<'a> arbitrary::Arbitrary<'a> for Value {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        arbitrary_value(u, 3)
    }
}

#[cfg(feature = "fuzz")]
fn arbitrary_value(
    u: &mut arbitrary::Unstructured<'_>,
    depth: usize,
) -> arbitrary::Result<Value> {
    let max_choice = if depth == 0 { 6 } else { 10 };
    Ok(match u.int_in_range::<u8>(0..=max_choice)? {
        0 => Value::Undefined,
        1 => Value::Null,
        2 => Value::Bool(u.arbitrary()?),
        3 => Value::Number(u.arbitrary()?),
        4 => {
            let negative: bool = u.arbitrary()?;
            if negative {
                Value::BigInt(i128::from(u.int_in_range::<i64>(i64::MIN..=-1)?))
            } else {
                Value::BigInt(i128::from(u.arbitrary::<u64>()?))
            }
        }
        5 => Value::Str(u.arbitrary()?),
        6 => Value::Bin(Bytes::from(u.arbitrary::<Vec<u8>>()?)),
        7 => {
            let len = u.int_in_range::<u8>(0..=6)?;
            let mut items = Vec::with_capacity(len as usize);
            for _ in 0..len {
                items.push(arbitrary_value(u, depth - 1)?);
            }
            Value::Array(items)
        }
        8 => {
            let len = u.int_in_range::<u8>(0..=6)?;
            let mut obj = Object::new();
            for _ in 0..len {
                obj.insert(u.arbitrary()?, arbitrary_value(u, depth - 1)?);
            }
            Value::Object(obj)
        }
        9 => {
            let len = u.int_in_range::<u8>(0..=6)?;
            let mut set = ValueSet::new();
            for _ in 0..len {
                set.insert(arbitrary_value(u, depth - 1)?);
            }
            Value::Set(set)
        }
        _ => {
            let len = u.int_in_range::<u8>(0..=6)?;
            let mut map = ValueMap::new();
            for _ in 0..len {
                map.insert(arbitrary_value(u, depth - 1)?, arbitrary_value(u, depth - 1)?);
            }
            Value::Map(map)
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;

    fn hash_of(v: &Value) -> u64 {
        let mut h = DefaultHasher::new();
        v.hash(&mut h);
        h.finish()
    }

    /// Тест проверяет семантику SameValueZero для чисел.
    #[test]
    fn test_number_equality_same_value_zero() {
        assert_eq!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_eq!(Value::Number(0.0), Value::Number(-0.0));
        assert_eq!(hash_of(&Value::Number(0.0)), hash_of(&Value::Number(-0.0)));
        assert_ne!(Value::Number(1.0), Value::BigInt(1));
    }

    #[test]
    fn test_object_equality_is_ordered() {
        let mut a = Object::new();
        a.insert("x".into(), Value::from(1));
        a.insert("y".into(), Value::from(2));
        let mut b = Object::new();
        b.insert("y".into(), Value::from(2));
        b.insert("x".into(), Value::from(1));

        assert_ne!(Value::Object(a.clone()), Value::Object(b));
        assert_eq!(Value::Object(a.clone()), Value::Object(a));
    }

    /// Повторная вставка в множество сохраняет первое вхождение.
    #[test]
    fn test_set_dedup_keeps_first() {
        let mut set = ValueSet::new();
        set.insert(Value::from("Nairobi"));
        set.insert(Value::from(2));
        set.insert(Value::from("Nairobi"));

        assert_eq!(set.len(), 2);
        assert_eq!(set.get_index(0), Some(&Value::from("Nairobi")));
    }

    /// Повторный ключ map оставляет позицию первого и значение последнего.
    #[test]
    fn test_map_duplicate_key_last_value_wins() {
        let mut map = ValueMap::new();
        map.insert(Value::from(1), Value::from(2));
        map.insert(Value::from(2), Value::from(3));
        map.insert(Value::from(1), Value::from(9));

        let entries: Vec<_> = map.into_iter().collect();
        assert_eq!(
            entries,
            vec![
                (Value::from(1), Value::from(9)),
                (Value::from(2), Value::from(3))
            ]
        );
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"abc": {"xyz": 100}, "list": [true, null, "s"]});
        let value = Value::from(json);

        let obj = value.as_object().unwrap();
        let inner = obj["abc"].as_object().unwrap();
        assert_eq!(inner["xyz"], Value::Number(100.0));
        assert_eq!(
            obj["list"],
            Value::Array(vec![Value::Bool(true), Value::Null, Value::from("s")])
        );
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Undefined.type_name(), "undefined");
        assert_eq!(Value::BigInt(-1).type_name(), "bigint");
        assert_eq!(Value::from(vec![1u8, 2]).type_name(), "bin");
    }
}
