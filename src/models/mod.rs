pub mod chat;
pub mod document;
pub mod enums;

pub use chat::ChatMessage;
pub use document::Document;
pub use enums::{DocumentStatus, ExportFormat, MessageRole};
