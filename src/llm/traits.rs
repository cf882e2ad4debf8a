//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / DeepSeek / Mock）实现 LlmClient::complete：一次调用、一次完整回复。
//! 回复可能缺失（`Ok(None)`），调用方统一经 [`ask`] 归一为空字符串后再使用。

use async_trait::async_trait;
use thiserror::Error;

use crate::memory::Message;

/// LLM 调用失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// 请求构造失败（消息或参数不合法）
    #[error("Invalid request: {0}")]
    Request(String),

    #[error("API error: {0}")]
    Api(String),

    /// 脚本化 Mock 的预置回复已用完
    #[error("Scripted replies exhausted after {0} calls")]
    ScriptExhausted(usize),
}

/// LLM 客户端 trait：非流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成；没有回复内容时返回 `Ok(None)`
    async fn complete(&self, messages: &[Message]) -> Result<Option<String>, LlmError>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}

/// 以单条 user 消息调用 LLM；缺失的回复归一为空字符串
pub async fn ask(llm: &dyn LlmClient, prompt: impl Into<String>) -> Result<String, LlmError> {
    let messages = [Message::user(prompt)];
    let reply = llm.complete(&messages).await?;
    Ok(reply.unwrap_or_default())
}
