pub mod annotation;
pub mod part;
pub mod record;
pub mod ui;

pub use annotation::{Annotation, DecodeError};
pub use part::{InvocationState, Part, ReasoningDetail, ToolInvocation};
pub use record::{ConversationRecord, MessageRole, ModelConfig, RecordMetadata, RecordUsage};
pub use ui::UIMessage;
