//! Settings objects: the typed, ordered field sets a template is rendered
//! against, how they are assembled for an artifact and how they are
//! serialized to a text block.

mod assembler;
mod object;
mod serializer;
mod value;

pub use assembler::SettingsAssembler;
pub use object::Settings;
pub use serializer::{inline_value, parse_block, to_block};
pub use value::SettingValue;
