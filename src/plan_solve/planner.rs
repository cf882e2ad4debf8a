//! Planner：把问题分解为有序的步骤列表
//!
//! 模型被要求以 ```python 代码块返回一个字符串列表；parse_plan 取出第一个代码块并用
//! 受限的字面量解析器求值。解析失败只会让本次运行得到空计划，不会向上抛错。

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::AgentError;
use crate::llm::{ask, LlmClient};
use crate::plan_solve::literal::{parse_literal, Literal, LiteralError};
use crate::prompts::{self, PromptTemplates};

/// 计划代码块的起始标记（精确匹配）
pub const PLAN_FENCE: &str = "```python";
const FENCE_CLOSE: &str = "```";

/// 计划解析失败的原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanParseError {
    #[error("no ```python block in response")]
    MissingFence,

    #[error("invalid literal: {0}")]
    Literal(#[from] LiteralError),

    #[error("plan must be a list, got {0}")]
    NotAList(&'static str),

    #[error("plan step {index} must be a string, got {found}")]
    NonStringStep { index: usize, found: &'static str },
}

/// 从模型回复中解析计划：第一个 ```python 之后到下一个 ``` 之前（没有闭合标记时取到末尾）
pub fn parse_plan(response: &str) -> Result<Vec<String>, PlanParseError> {
    let start = response.find(PLAN_FENCE).ok_or(PlanParseError::MissingFence)?;
    let rest = &response[start + PLAN_FENCE.len()..];
    let body = rest
        .find(FENCE_CLOSE)
        .map(|end| &rest[..end])
        .unwrap_or(rest)
        .trim();

    match parse_literal(body)? {
        Literal::List(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Literal::Str(step) => Ok(step),
                other => Err(PlanParseError::NonStringStep {
                    index,
                    found: other.type_name(),
                }),
            })
            .collect(),
        other => Err(PlanParseError::NotAList(other.type_name())),
    }
}

/// 规划接口：空计划表示「规划失败」，由调用方决定终止
#[async_trait]
pub trait StepPlanner: Send + Sync {
    async fn plan(&self, question: &str) -> Result<Vec<String>, AgentError>;
}

/// 基于 LLM 的 Planner：渲染 planner 模板，单次调用，解析回复
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptTemplates>,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptTemplates>) -> Self {
        Self { llm, prompts }
    }
}

#[async_trait]
impl StepPlanner for Planner {
    async fn plan(&self, question: &str) -> Result<Vec<String>, AgentError> {
        let prompt = self
            .prompts
            .render(prompts::PLANNER, &[("question", question)])?;

        tracing::info!("Generating plan");
        let response = ask(self.llm.as_ref(), prompt).await?;
        tracing::debug!("Planner response:\n{}", response);

        match parse_plan(&response) {
            Ok(plan) => {
                tracing::info!("Plan generated with {} steps: {:?}", plan.len(), plan);
                Ok(plan)
            }
            Err(e) => {
                tracing::warn!("Failed to parse plan: {}\nRaw response: {}", e, response);
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlmClient;

    fn planner_with(llm: Arc<ScriptedLlmClient>) -> Planner {
        Planner::new(llm, Arc::new(PromptTemplates::builtin()))
    }

    #[test]
    fn test_parse_plan_valid() {
        let response = "好的，计划如下：\n```python\n[\"计算周一\", '计算周二', \"求和\"]\n```\n完毕";
        assert_eq!(
            parse_plan(response).unwrap(),
            vec!["计算周一", "计算周二", "求和"]
        );
    }

    #[test]
    fn test_parse_plan_uses_first_block() {
        let response = "```python\n['a']\n```\n```python\n['b', 'c']\n```";
        assert_eq!(parse_plan(response).unwrap(), vec!["a"]);
    }

    #[test]
    fn test_parse_plan_unclosed_fence_takes_rest() {
        assert_eq!(parse_plan("```python\n['x', 'y']  ").unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn test_parse_plan_empty_list() {
        assert_eq!(parse_plan("```python\n[]\n```").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_parse_plan_errors() {
        assert_eq!(
            parse_plan("['a', 'b']").unwrap_err(),
            PlanParseError::MissingFence
        );
        assert_eq!(
            parse_plan("```json\n['a']\n```").unwrap_err(),
            PlanParseError::MissingFence
        );
        assert_eq!(
            parse_plan("```python\n('a', 'b')\n```").unwrap_err(),
            PlanParseError::NotAList("tuple")
        );
        assert_eq!(
            parse_plan("```python\n['a', 2]\n```").unwrap_err(),
            PlanParseError::NonStringStep {
                index: 1,
                found: "int"
            }
        );
        assert!(matches!(
            parse_plan("```python\nprint('hi')\n```").unwrap_err(),
            PlanParseError::Literal(_)
        ));
    }

    #[tokio::test]
    async fn test_plan_returns_parsed_steps() {
        let llm = Arc::new(ScriptedLlmClient::new([
            "```python\n[\"step one\", \"step two\"]\n```",
        ]));
        let plan = planner_with(llm.clone()).plan("怎么做？").await.unwrap();

        assert_eq!(plan, vec!["step one", "step two"]);
        assert_eq!(llm.call_count(), 1);
        assert!(llm.prompts()[0].contains("问题: 怎么做？"));
    }

    #[tokio::test]
    async fn test_malformed_response_yields_empty_plan() {
        for reply in [
            "I cannot plan this.",
            "```python\n[\"unterminated]\n```",
            "```python\n{'a': 1}\n```",
            "```python\n__import__('os').system('id')\n```",
        ] {
            let llm = Arc::new(ScriptedLlmClient::new([reply]));
            let plan = planner_with(llm).plan("q").await.unwrap();
            assert!(plan.is_empty(), "non-empty plan for {:?}", reply);
        }
    }

    #[tokio::test]
    async fn test_deeply_nested_reply_yields_empty_plan() {
        let reply = format!("```python\n{}\n```", "[".repeat(100_000));
        assert!(matches!(
            parse_plan(&reply).unwrap_err(),
            PlanParseError::Literal(_)
        ));

        let llm = Arc::new(ScriptedLlmClient::new([reply]));
        assert!(planner_with(llm).plan("q").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_absent_reply_yields_empty_plan() {
        let llm = Arc::new(ScriptedLlmClient::from_replies([None]));
        assert!(planner_with(llm).plan("q").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_llm_failure_is_error() {
        let llm = Arc::new(ScriptedLlmClient::new(Vec::<String>::new()));
        let err = planner_with(llm).plan("q").await.unwrap_err();
        assert!(matches!(err, AgentError::Llm(_)));
    }
}
