//! Mock LLM 客户端（用于测试，无需 API）
//!
//! - MockLlmClient：取最后一条 User 消息回显，便于无 Key 时本地跑通流程
//! - ScriptedLlmClient：按顺序吐出预置回复，并记录收到的每条提示词，供测试断言调用次数与提示内容

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError};
use crate::memory::{Message, Role};

fn last_user_content(messages: &[Message]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| matches!(m.role, Role::User))
        .map(|m| m.content.as_str())
}

/// Mock 客户端：回显用户最后一条消息
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<Option<String>, LlmError> {
        let last_user = last_user_content(messages).unwrap_or("(no input)");
        Ok(Some(format!("Echo from Mock: {}", last_user)))
    }
}

/// 脚本化客户端：每次 complete 弹出一条预置回复（`None` 模拟缺失回复），用完后返回 ScriptExhausted
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    replies: Mutex<VecDeque<Option<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlmClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_replies(replies.into_iter().map(|r| Some(r.into())))
    }

    pub fn from_replies(replies: impl IntoIterator<Item = Option<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// 按调用顺序记录的提示词（每次调用最后一条 User 消息）
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// 尚未消费的回复数
    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<Option<String>, LlmError> {
        let calls = {
            let mut prompts = self.prompts.lock().unwrap_or_else(|e| e.into_inner());
            prompts.push(last_user_content(messages).unwrap_or_default().to_string());
            prompts.len()
        };

        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or(LlmError::ScriptExhausted(calls - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_echoes_last_user_message() {
        let reply = MockLlmClient
            .complete(&[Message::system("sys"), Message::user("hello")])
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("Echo from Mock: hello"));
    }

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let llm = ScriptedLlmClient::new(["a", "b"]);
        assert_eq!(llm.remaining(), 2);
        let first = llm.complete(&[Message::user("p1")]).await.unwrap();
        let second = llm.complete(&[Message::user("p2")]).await.unwrap();
        assert_eq!(first.as_deref(), Some("a"));
        assert_eq!(second.as_deref(), Some("b"));
        assert_eq!(llm.call_count(), 2);
        assert_eq!(llm.remaining(), 0);
        assert_eq!(
            llm.complete(&[Message::user("p3")]).await.unwrap_err(),
            LlmError::ScriptExhausted(2)
        );
    }
}
