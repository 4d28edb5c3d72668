//! Декодер: чтение тега и рекурсивное восстановление значения.
//!
//! Контейнеры читаются до закрывающего маркера: следующий байт сначала
//! просматривается без сдвига курсора, и только ветка, которая его
//! действительно обрабатывает, его потребляет.
//!
//! Все чтения проверяют границы входа: обрыв потока даёт
//! [`DecodeError::UnexpectedEof`], а не панику.

use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use tracing::{debug, trace, warn};
use zpack_error::{bail, ensure, DecodeError, ResultExt, ZpackResult};

use super::{
    registry::TypeRegistry,
    tags::Tag,
    value::{Object, Value, ValueMap, ValueSet},
};
use crate::config::DecoderConfig;

/// Курсор чтения по неизменяемому входу одного вызова `decode`.
struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn eof(
        &self,
        context: &str,
        needed: usize,
    ) -> DecodeError {
        DecodeError::UnexpectedEof {
            context: context.to_string(),
            offset: self.offset,
            needed,
        }
    }

    fn take(
        &mut self,
        n: usize,
        context: &str,
    ) -> ZpackResult<&'a [u8]> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| self.eof(context, n))?;
        let bytes = &self.data[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    /// Следующий байт без сдвига курсора.
    fn peek(
        &self,
        context: &str,
    ) -> ZpackResult<u8> {
        match self.data.get(self.offset) {
            Some(&b) => Ok(b),
            None => Err(self.eof(context, 1).into()),
        }
    }

    fn read_u8(
        &mut self,
        context: &str,
    ) -> ZpackResult<u8> {
        Ok(self.take(1, context)?[0])
    }

    fn read_u32(
        &mut self,
        context: &str,
    ) -> ZpackResult<u32> {
        Ok(LittleEndian::read_u32(self.take(4, context)?))
    }

    fn read_i32(
        &mut self,
        context: &str,
    ) -> ZpackResult<i32> {
        Ok(LittleEndian::read_i32(self.take(4, context)?))
    }

    fn read_f64(
        &mut self,
        context: &str,
    ) -> ZpackResult<f64> {
        Ok(LittleEndian::read_f64(self.take(8, context)?))
    }

    fn read_i64(
        &mut self,
        context: &str,
    ) -> ZpackResult<i64> {
        Ok(LittleEndian::read_i64(self.take(8, context)?))
    }

    fn read_u64(
        &mut self,
        context: &str,
    ) -> ZpackResult<u64> {
        Ok(LittleEndian::read_u64(self.take(8, context)?))
    }

    /// u32 длина и столько же байт следом.
    fn read_len_prefixed(
        &mut self,
        context: &str,
    ) -> ZpackResult<&'a [u8]> {
        let len = self.read_u32(context)? as usize;
        self.take(len, context)
    }

    fn read_utf8(
        &mut self,
        context: &str,
    ) -> ZpackResult<String> {
        let bytes = self.read_len_prefixed(context)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Декодер значений.
#[derive(Debug)]
pub struct Decoder {
    registry: Arc<TypeRegistry>,
    max_depth: usize,
    /// Место под таблицу обратных ссылок тегов `record`/`ref` (смещения
    /// значений во входе). Пути декодирования её не читают и не пишут.
    refs: Vec<u32>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        debug!(
            reserved_map_capacity = config.reserved_map_capacity,
            max_depth = config.max_depth,
            "Decoder created"
        );
        Self {
            registry: TypeRegistry::default_shared(),
            max_depth: config.max_depth,
            refs: Vec::with_capacity(config.reserved_map_capacity),
        }
    }

    /// Заменяет реестр пользовательских типов.
    pub fn with_registry(
        mut self,
        registry: Arc<TypeRegistry>,
    ) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Ёмкость зарезервированной таблицы обратных ссылок.
    pub fn reserved_capacity(&self) -> usize {
        self.refs.capacity()
    }

    /// Декодирует одно значение, начиная с первого байта `input`.
    ///
    /// Пустой вход декодируется как пустая строка верхнего уровня.
    pub fn decode(
        &self,
        input: &[u8],
    ) -> ZpackResult<Value> {
        if input.is_empty() {
            return Ok(Value::Str(String::new()));
        }
        let mut reader = Reader::new(input);
        self.read_block(&mut reader, 0)
    }

    fn read_block(
        &self,
        r: &mut Reader<'_>,
        depth: usize,
    ) -> ZpackResult<Value> {
        let byte = r.read_u8("tag")?;
        let Ok(tag) = Tag::try_from(byte) else {
            return Ok(Self::read_trailing_string(r, byte));
        };

        let value = match tag {
            Tag::Null => Value::Null,
            Tag::Undefined => Value::Undefined,
            Tag::True => Value::Bool(true),
            Tag::False => Value::Bool(false),
            Tag::Uint => Value::Number(f64::from(r.read_u32("uint")?)),
            Tag::Int => Value::Number(f64::from(r.read_i32("int")?)),
            Tag::Double => Value::Number(r.read_f64("double")?),
            Tag::BigInt => Value::BigInt(i128::from(r.read_i64("bigint")?)),
            Tag::BigUint => Value::BigInt(i128::from(r.read_u64("biguint")?)),
            Tag::String => Value::Str(r.read_utf8("string")?),
            Tag::Bin => Value::Bin(Bytes::copy_from_slice(r.read_len_prefixed("bin")?)),
            Tag::ArrayStart => Value::Array(self.read_array(r, depth)?),
            Tag::ObjectStart => Value::Object(self.read_object(r, depth)?),
            Tag::SetStart => Value::Set(self.read_set(r, depth)?),
            Tag::MapStart => Value::Map(self.read_map(r, depth)?),
            Tag::ConstructorN => self.read_custom(r, depth)?,
            // Зарезервированные теги и одиночные закрывающие маркеры не имеют
            // своей ветки.
            Tag::Record
            | Tag::Ref
            | Tag::Date
            | Tag::Date64
            | Tag::ArrayEnd
            | Tag::ObjectEnd
            | Tag::SetEnd
            | Tag::MapEnd => Self::read_trailing_string(r, byte),
        };
        Ok(value)
    }

    /// Байт без ветки декодирования считается началом строки без тега:
    /// курсор возвращается на этот байт, и весь остаток входа читается как
    /// UTF-8.
    ///
    /// Так читается строка, закодированная на верхнем уровне. Для
    /// повреждённого потока результатом будет мусорный текст, а не ошибка.
    fn read_trailing_string(
        r: &mut Reader<'_>,
        byte: u8,
    ) -> Value {
        r.offset -= 1;
        let start = r.offset;
        let rest = &r.data[start..];
        r.offset = r.data.len();
        trace!(
            byte,
            offset = start,
            len = rest.len(),
            "Untagged byte, reading the rest of the input as a string"
        );
        Value::Str(String::from_utf8_lossy(rest).into_owned())
    }

    fn descend(
        &self,
        depth: usize,
    ) -> ZpackResult<usize> {
        let next = depth + 1;
        ensure!(
            next <= self.max_depth,
            DecodeError::DepthLimit {
                current: next,
                max: self.max_depth,
            }
        );
        Ok(next)
    }

    /// Возвращает `true` и потребляет байт, если следующим идёт `end`.
    fn at_end(
        r: &mut Reader<'_>,
        end: Tag,
    ) -> ZpackResult<bool> {
        if r.peek(end_context(end))? == end.byte() {
            r.offset += 1;
            return Ok(true);
        }
        Ok(false)
    }

    fn read_array(
        &self,
        r: &mut Reader<'_>,
        depth: usize,
    ) -> ZpackResult<Vec<Value>> {
        let depth = self.descend(depth)?;
        let mut items = Vec::new();
        while !Self::at_end(r, Tag::ArrayEnd)? {
            let item = self
                .read_block(r, depth)
                .with_context(|| format!("array[{}]", items.len()))?;
            items.push(item);
        }
        Ok(items)
    }

    fn read_object(
        &self,
        r: &mut Reader<'_>,
        depth: usize,
    ) -> ZpackResult<Object> {
        let depth = self.descend(depth)?;
        let mut obj = Object::new();
        while !Self::at_end(r, Tag::ObjectEnd)? {
            let key = r.read_utf8("object key")?;
            let value = self
                .read_block(r, depth)
                .with_context(|| format!("object key {key:?}"))?;
            obj.insert(key, value);
        }
        Ok(obj)
    }

    fn read_set(
        &self,
        r: &mut Reader<'_>,
        depth: usize,
    ) -> ZpackResult<ValueSet> {
        let depth = self.descend(depth)?;
        let mut set = ValueSet::new();
        let mut i = 0usize;
        while !Self::at_end(r, Tag::SetEnd)? {
            let item = self
                .read_block(r, depth)
                .with_context(|| format!("set[{i}]"))?;
            set.insert(item);
            i += 1;
        }
        Ok(set)
    }

    fn read_map(
        &self,
        r: &mut Reader<'_>,
        depth: usize,
    ) -> ZpackResult<ValueMap> {
        let depth = self.descend(depth)?;
        let mut map = ValueMap::new();
        let mut i = 0usize;
        while !Self::at_end(r, Tag::MapEnd)? {
            let key = self
                .read_block(r, depth)
                .with_context(|| format!("map key #{i}"))?;
            let value = self
                .read_block(r, depth)
                .with_context(|| format!("map value #{i}"))?;
            map.insert(key, value);
            i += 1;
        }
        Ok(map)
    }

    /// u32 код, затем кортеж аргументов, записанный как массив.
    ///
    /// Узел сам занимает уровень вложенности: цепочка заголовков
    /// `constructorN` упирается в `max_depth`, как и контейнеры.
    fn read_custom(
        &self,
        r: &mut Reader<'_>,
        depth: usize,
    ) -> ZpackResult<Value> {
        let depth = self.descend(depth)?;
        let code = r.read_u32("constructor code")?;
        let args = self
            .read_block(r, depth)
            .with_context(|| format!("arguments of constructor {code}"))?;

        let Some(entry) = self.registry.get_by_code(u64::from(code)) else {
            bail!(DecodeError::UnknownConstructorCode { code });
        };
        let Value::Array(args) = args else {
            bail!(DecodeError::InvalidCustomArgs {
                code,
                found: args.type_name().to_string(),
            });
        };

        entry.build(args).map_err(|err| {
            warn!(code, type_name = entry.name(), error = %err, "Custom type builder failed");
            err.context(format!("building {}", entry.name()))
        })
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

fn end_context(end: Tag) -> &'static str {
    match end {
        Tag::ArrayEnd => "array end",
        Tag::ObjectEnd => "object end",
        Tag::SetEnd => "set end",
        _ => "map end",
    }
}
