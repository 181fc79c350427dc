pub mod assemble;
pub mod attachment;
pub mod builder;
pub mod codec;
pub mod normalize;

pub use assemble::assemble_response;
pub use attachment::AttachmentResolver;
pub use builder::{build_core_messages, BuiltMessages, LastUserMessage};
pub use normalize::{to_record, to_ui, NormalizeError, RecordContext};
