//! 记忆层：LLM 消息结构、Reflection 的执行/反思轨迹

pub mod conversation;
pub mod trajectory;

pub use conversation::{Message, Role};
pub use trajectory::{Memory, MemoryRecord, RecordKind};
