//! LLM 层：客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）

pub mod deepseek;
pub mod factory;
pub mod mock;
pub mod openai;
pub mod traits;

pub use deepseek::{create_deepseek_client, DEEPSEEK_BASE_URL, DEEPSEEK_CHAT, DEEPSEEK_REASONER};
pub use factory::{create_llm_from_config, select_backend, Backend};
pub use mock::{MockLlmClient, ScriptedLlmClient};
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::{ask, LlmClient, LlmError};
