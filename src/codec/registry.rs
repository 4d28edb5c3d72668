//! Реестр пользовательских типов.
//!
//! Запись реестра связывает имя типа с числовым кодом и двумя функциями:
//! извлечение кортежа аргументов (энкодер) и сборка значения из кортежа
//! (декодер). Энкодер ищет запись по имени, декодер по коду, поэтому обе
//! стороны должны пользоваться одним и тем же набором записей.

use std::{fmt, sync::Arc};

use ahash::AHashMap;
use once_cell::sync::Lazy;
use zpack_error::{RegistryError, ZpackResult};

use super::{
    builtin::{
        build_pattern, build_timestamp, PATTERN_CODE, PATTERN_TYPE, TIMESTAMP_CODE,
        TIMESTAMP_TYPE,
    },
    value::{CustomValue, Value},
};

/// Извлекает кортеж аргументов из значения пользовательского типа.
pub type ArgsFn = Arc<dyn Fn(&dyn CustomValue) -> ZpackResult<Vec<Value>> + Send + Sync>;
/// Собирает значение из декодированного кортежа аргументов.
pub type BuildFn = Arc<dyn Fn(Vec<Value>) -> ZpackResult<Value> + Send + Sync>;

/// Реестр по умолчанию: создаётся один раз на процесс и не меняется.
static DEFAULT_REGISTRY: Lazy<Arc<TypeRegistry>> =
    Lazy::new(|| Arc::new(TypeRegistry::with_defaults()));

/// Запись реестра: `{name, code, args, build}`.
#[derive(Clone)]
pub struct CustomType {
    name: String,
    code: u64,
    args: ArgsFn,
    build: BuildFn,
}

impl CustomType {
    pub fn new<A, B>(
        name: impl Into<String>,
        code: u64,
        args: A,
        build: B,
    ) -> Self
    where
        A: Fn(&dyn CustomValue) -> ZpackResult<Vec<Value>> + Send + Sync + 'static,
        B: Fn(Vec<Value>) -> ZpackResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            code,
            args: Arc::new(args),
            build: Arc::new(build),
        }
    }

    /// Запись, аргументы которой берутся из [`CustomValue::to_args`].
    pub fn with_builder<B>(
        name: impl Into<String>,
        code: u64,
        build: B,
    ) -> Self
    where
        B: Fn(Vec<Value>) -> ZpackResult<Value> + Send + Sync + 'static,
    {
        Self::new(name, code, |value| Ok(value.to_args()), build)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> u64 {
        self.code
    }

    pub fn args(
        &self,
        value: &dyn CustomValue,
    ) -> ZpackResult<Vec<Value>> {
        (self.args)(value)
    }

    pub fn build(
        &self,
        args: Vec<Value>,
    ) -> ZpackResult<Value> {
        (self.build)(args)
    }
}

impl fmt::Debug for CustomType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("CustomType")
            .field("name", &self.name)
            .field("code", &self.code)
            .finish_non_exhaustive()
    }
}

/// Набор пользовательских типов с индексами по имени и по коду.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    by_name: AHashMap<String, Arc<CustomType>>,
    by_code: AHashMap<u64, Arc<CustomType>>,
}

impl TypeRegistry {
    /// Пустой реестр.
    pub fn new() -> Self {
        Self::default()
    }

    /// Реестр со встроенными типами `RegExp` (код 0) и `Date` (код 1).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.insert(CustomType::with_builder(PATTERN_TYPE, PATTERN_CODE, build_pattern));
        registry.insert(CustomType::with_builder(
            TIMESTAMP_TYPE,
            TIMESTAMP_CODE,
            build_timestamp,
        ));
        registry
    }

    /// Общий для процесса реестр по умолчанию.
    pub fn default_shared() -> Arc<TypeRegistry> {
        Arc::clone(&DEFAULT_REGISTRY)
    }

    /// Добавляет запись. Имя и код должны быть уникальны в пределах реестра.
    ///
    /// Код не ограничивается 32 битами здесь: лимит поля проверяет энкодер.
    pub fn register(
        &mut self,
        entry: CustomType,
    ) -> ZpackResult<()> {
        if self.by_name.contains_key(entry.name()) {
            return Err(RegistryError::DuplicateName {
                name: entry.name.clone(),
            }
            .into());
        }
        if let Some(existing) = self.by_code.get(&entry.code) {
            return Err(RegistryError::DuplicateCode {
                code: entry.code,
                name: entry.name.clone(),
                existing: existing.name.clone(),
            }
            .into());
        }

        self.insert(entry);
        Ok(())
    }

    fn insert(
        &mut self,
        entry: CustomType,
    ) {
        let entry = Arc::new(entry);
        self.by_code.insert(entry.code, Arc::clone(&entry));
        self.by_name.insert(entry.name.clone(), entry);
    }

    pub fn get_by_name(
        &self,
        name: &str,
    ) -> Option<&CustomType> {
        self.by_name.get(name).map(Arc::as_ref)
    }

    pub fn get_by_code(
        &self,
        code: u64,
    ) -> Option<&CustomType> {
        self.by_code.get(&code).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Имена зарегистрированных типов (порядок не определён).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}
