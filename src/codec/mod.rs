pub mod buffer;
pub mod builtin;
pub mod decode;
pub mod encode;
pub mod registry;
pub mod tags;
pub mod value;

pub use buffer::GrowableBuffer;
pub use builtin::{Pattern, Timestamp};
pub use decode::Decoder;
pub use encode::Encoder;
pub use registry::{CustomType, TypeRegistry};
pub use tags::Tag;
pub use value::{CustomValue, Object, Value, ValueMap, ValueSet};
