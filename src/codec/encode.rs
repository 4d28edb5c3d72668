//! Энкодер: обход значения в глубину с записью тега и полезной нагрузки
//! каждого узла.
//!
//! Контейнеры не несут счётчика элементов: после детей пишется закрывающий
//! маркер. Строка, переданная в [`Encoder::encode`] напрямую, пишется без тега
//! и без длины.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;
use zpack_error::{bail, ensure, EncodeError, ResultExt, StatusCode, ZpackResult};

use super::{
    buffer::GrowableBuffer,
    registry::TypeRegistry,
    tags::Tag,
    value::{CustomValue, Object, Value, ValueMap, ValueSet},
};
use crate::config::EncoderConfig;

/// Верхняя граница (не включая) для тега `uint`.
const UINT_LIMIT: f64 = 4_294_967_296.0;
/// Нижняя граница (включая) для тега `int`.
const INT_MIN: f64 = -2_147_483_648.0;

/// Энкодер значений.
///
/// Экземпляр владеет буфером записи и переиспользует его между вызовами
/// `encode`. Один экземпляр не предназначен для одновременного использования
/// из нескольких потоков.
#[derive(Debug)]
pub struct Encoder {
    buf: GrowableBuffer,
    registry: Arc<TypeRegistry>,
    max_depth: usize,
}

impl Encoder {
    pub fn new() -> Self {
        Self::with_config(EncoderConfig::default())
    }

    pub fn with_config(config: EncoderConfig) -> Self {
        debug!(
            buffer_size = config.buffer_size,
            max_depth = config.max_depth,
            "Encoder created"
        );
        Self {
            buf: GrowableBuffer::with_capacity(config.buffer_size),
            registry: TypeRegistry::default_shared(),
            max_depth: config.max_depth,
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

    /// Текущая ёмкость буфера записи.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Кодирует значение и возвращает ровно записанные байты.
    ///
    /// Срез указывает во внутренний буфер энкодера и живёт до следующего
    /// вызова `encode`; для независимой копии есть [`Encoder::encode_to_bytes`].
    pub fn encode(
        &mut self,
        value: &Value,
    ) -> ZpackResult<&[u8]> {
        self.buf.reset();
        match value {
            Value::Str(s) => self.buf.write_bytes(s.as_bytes())?,
            other => self.write_value(other, 0)?,
        }
        Ok(self.buf.as_slice())
    }

    /// Как [`Encoder::encode`], но возвращает собственную копию байт.
    pub fn encode_to_bytes(
        &mut self,
        value: &Value,
    ) -> ZpackResult<Bytes> {
        self.encode(value).map(Bytes::copy_from_slice)
    }

    fn write_value(
        &mut self,
        value: &Value,
        depth: usize,
    ) -> ZpackResult<()> {
        match value {
            Value::Undefined => self.write_tag(Tag::Undefined),
            Value::Null => self.write_tag(Tag::Null),
            Value::Bool(true) => self.write_tag(Tag::True),
            Value::Bool(false) => self.write_tag(Tag::False),
            Value::Number(n) => self.write_number(*n),
            Value::BigInt(n) => self.write_wide_int(*n),
            Value::Str(s) => {
                self.write_tag(Tag::String)?;
                self.write_utf8(s)
            }
            Value::Bin(b) => {
                self.write_tag(Tag::Bin)?;
                self.write_len(b.len())?;
                self.buf.write_bytes(b)
            }
            Value::Array(items) => self.write_array(items, depth),
            Value::Object(obj) => self.write_object(obj, depth),
            Value::Set(set) => self.write_set(set, depth),
            Value::Map(map) => self.write_map(map, depth),
            Value::Custom(custom) => self.write_custom(custom.as_ref(), depth),
        }
    }

    #[inline]
    fn write_tag(
        &mut self,
        tag: Tag,
    ) -> ZpackResult<()> {
        self.buf.write_u8(tag.byte())
    }

    /// Целые в диапазоне 32 бит пишутся компактно, остальные числа как
    /// `double`. `-0` попадает в ветку `uint`.
    fn write_number(
        &mut self,
        n: f64,
    ) -> ZpackResult<()> {
        if n.is_finite() && n.fract() == 0.0 {
            if (0.0..UINT_LIMIT).contains(&n) {
                self.write_tag(Tag::Uint)?;
                return self.buf.write_u32_le(n as u32);
            }
            if (INT_MIN..0.0).contains(&n) {
                self.write_tag(Tag::Int)?;
                return self.buf.write_i32_le(n as i32);
            }
        }
        self.write_tag(Tag::Double)?;
        self.buf.write_f64_le(n)
    }

    fn write_wide_int(
        &mut self,
        n: i128,
    ) -> ZpackResult<()> {
        if n < 0 {
            let v = i64::try_from(n).map_err(|_| EncodeError::WideIntOutOfRange { value: n })?;
            self.write_tag(Tag::BigInt)?;
            self.buf.write_i64_le(v)
        } else {
            let v = u64::try_from(n).map_err(|_| EncodeError::WideIntOutOfRange { value: n })?;
            self.write_tag(Tag::BigUint)?;
            self.buf.write_u64_le(v)
        }
    }

    fn write_len(
        &mut self,
        len: usize,
    ) -> ZpackResult<()> {
        let Ok(len32) = u32::try_from(len) else {
            bail!(
                StatusCode::SizeLimit,
                "Length {} does not fit the 4-byte length field",
                len
            );
        };
        self.buf.write_u32_le(len32)
    }

    /// Длина в байтах UTF-8 и сами байты, без тега.
    fn write_utf8(
        &mut self,
        s: &str,
    ) -> ZpackResult<()> {
        self.write_len(s.len())?;
        self.buf.write_bytes(s.as_bytes())
    }

    fn descend(
        &self,
        depth: usize,
    ) -> ZpackResult<usize> {
        let next = depth + 1;
        ensure!(
            next <= self.max_depth,
            EncodeError::DepthLimit {
                current: next,
                max: self.max_depth,
            }
        );
        Ok(next)
    }

    fn write_array(
        &mut self,
        items: &[Value],
        depth: usize,
    ) -> ZpackResult<()> {
        let depth = self.descend(depth)?;
        self.write_tag(Tag::ArrayStart)?;
        for (i, item) in items.iter().enumerate() {
            self.write_value(item, depth)
                .with_context(|| format!("array[{i}]"))?;
        }
        self.write_tag(Tag::ArrayEnd)
    }

    fn write_object(
        &mut self,
        obj: &Object,
        depth: usize,
    ) -> ZpackResult<()> {
        let depth = self.descend(depth)?;
        self.write_tag(Tag::ObjectStart)?;
        for (key, value) in obj {
            self.write_utf8(key)?;
            self.write_value(value, depth)
                .with_context(|| format!("object key {key:?}"))?;
        }
        self.write_tag(Tag::ObjectEnd)
    }

    fn write_set(
        &mut self,
        set: &ValueSet,
        depth: usize,
    ) -> ZpackResult<()> {
        let depth = self.descend(depth)?;
        self.write_tag(Tag::SetStart)?;
        for (i, item) in set.iter().enumerate() {
            self.write_value(item, depth)
                .with_context(|| format!("set[{i}]"))?;
        }
        self.write_tag(Tag::SetEnd)
    }

    fn write_map(
        &mut self,
        map: &ValueMap,
        depth: usize,
    ) -> ZpackResult<()> {
        let depth = self.descend(depth)?;
        self.write_tag(Tag::MapStart)?;
        for (i, (key, value)) in map.iter().enumerate() {
            self.write_value(key, depth)
                .with_context(|| format!("map key #{i}"))?;
            self.write_value(value, depth)
                .with_context(|| format!("map value #{i}"))?;
        }
        self.write_tag(Tag::MapEnd)
    }

    /// `constructorN` + u32 код + кортеж аргументов в виде массива.
    ///
    /// Код проверяется до записи первого байта узла.
    fn write_custom(
        &mut self,
        value: &dyn CustomValue,
        depth: usize,
    ) -> ZpackResult<()> {
        let registry = Arc::clone(&self.registry);
        let type_name = value.type_name();
        let Some(entry) = registry.get_by_name(type_name) else {
            bail!(EncodeError::UnsupportedType {
                type_name: type_name.to_string(),
            });
        };
        let Ok(code) = u32::try_from(entry.code()) else {
            bail!(EncodeError::ConstructorCodeTooLarge {
                type_name: type_name.to_string(),
                code: entry.code(),
            });
        };
        let depth = self.descend(depth)?;
        let args = entry
            .args(value)
            .with_context(|| format!("arguments of {type_name}"))?;

        self.write_tag(Tag::ConstructorN)?;
        self.buf.write_u32_le(code)?;
        self.write_array(&args, depth)
            .with_context(|| format!("custom type {type_name}"))
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
