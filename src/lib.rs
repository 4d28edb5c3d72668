/// Binary codec: tag table, encoder, decoder, custom type registry.
pub mod codec;
/// Encoder/decoder configuration and settings loading.
pub mod config;
/// `tracing` subscriber setup.
pub mod logging;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Encoder, decoder and the value model.
pub use codec::{
    CustomType, CustomValue, Decoder, Encoder, Object, Pattern, Tag, Timestamp, TypeRegistry,
    Value, ValueMap, ValueSet,
};
/// config
pub use config::{DecoderConfig, EncoderConfig, Settings};
/// Logging setup.
pub use logging::{init_logging, LogFormat, LoggingConfig};
/// Error types and result alias.
pub use zpack_error::{
    DecodeError, EncodeError, ErrorExt, RegistryError, StackError, StatusCode, ZpackResult,
};
