//! Agent 错误类型
//!
//! 计划解析失败不在此列：Planner 会就地记录并返回空计划，不会中断进程。
//! 这里只收录会终止当前一次运行的错误（LLM 调用失败、模板缺失、记忆不一致）。

use thiserror::Error;

use crate::llm::LlmError;

/// 运行过程中会中止本次任务的错误
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM 调用失败（网络、鉴权、服务端错误等）；不做重试，直接中止本次运行
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Unknown prompt template: {0}")]
    Template(String),

    /// 反思前找不到任何执行记录（初始尝试总会先写入一条，正常流程不会出现）
    #[error("No execution record in memory")]
    MissingExecution,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_converts() {
        let err: AgentError = LlmError::Api("quota exceeded".to_string()).into();
        assert!(matches!(err, AgentError::Llm(_)));
        assert_eq!(err.to_string(), "LLM error: API error: quota exceeded");
    }
}
