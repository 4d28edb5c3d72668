use serde::{Deserialize, Serialize};

/// Начальный размер буфера энкодера (32 MiB).
pub const DEFAULT_BUFFER_SIZE: usize = 32 * 1024 * 1024;
/// Лимит вложенности контейнеров.
pub const DEFAULT_MAX_DEPTH: usize = 512;
/// Ёмкость зарезервированной таблицы обратных ссылок декодера.
pub const DEFAULT_RESERVED_MAP_CAPACITY: usize = 256_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Начальная ёмкость буфера записи в байтах
    pub buffer_size: usize,
    pub max_depth: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Число слотов таблицы обратных ссылок, резервируемых при создании
    /// декодера (4 байта на слот). Влияет только на занимаемую память.
    pub reserved_map_capacity: usize,
    pub max_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            reserved_map_capacity: DEFAULT_RESERVED_MAP_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
