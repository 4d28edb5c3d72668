mod codec;
mod settings;

pub use codec::{
    DecoderConfig, EncoderConfig, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_DEPTH,
    DEFAULT_RESERVED_MAP_CAPACITY,
};
pub use settings::Settings;
