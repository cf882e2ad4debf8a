//! ReflectionAgent：生成、评审、优化的有界循环
//!
//! 1. 初始尝试：initial 模板，一次调用，记为 execution
//! 2. 最多 max_iterations 轮：
//!    - 反思：取最近一次 execution，reflect 模板，一次调用，记为 reflection
//!    - 反馈含停止标记则结束循环，本轮不再优化
//!    - 优化：refine 模板（上一版 + 反馈），一次调用，记为 execution
//! 3. 返回最近一次 execution
//!
//! 缺失的回复按空字符串记录，不重试。Memory 每次运行新建，随结果返回。

use std::sync::Arc;

use crate::core::AgentError;
use crate::llm::{ask, LlmClient};
use crate::memory::{Memory, RecordKind};
use crate::prompts::{self, PromptTemplates};
use crate::reflection::is_stop_signal;

/// 一次运行的结果
#[derive(Debug, Clone)]
pub struct ReflectionOutcome {
    /// 最近一次执行结果（最终代码）
    pub answer: String,
    /// 完整的执行/反思轨迹
    pub memory: Memory,
    /// 实际进行的反思轮数（1..=max_iterations，max_iterations 为 0 时为 0）
    pub rounds: usize,
    /// 是否因评审给出停止信号而提前结束
    pub converged: bool,
}

pub struct ReflectionAgent {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptTemplates>,
    max_iterations: usize,
}

impl ReflectionAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompts: Arc<PromptTemplates>,
        max_iterations: usize,
    ) -> Self {
        Self {
            llm,
            prompts,
            max_iterations,
        }
    }

    pub async fn run(&self, task: &str) -> Result<ReflectionOutcome, AgentError> {
        tracing::info!("Reflection started, task: {}", task);
        let mut memory = Memory::new();

        tracing::info!("Making initial attempt");
        let prompt = self.prompts.render(prompts::INITIAL, &[("task", task)])?;
        let initial = ask(self.llm.as_ref(), prompt).await?;
        memory.add_record(RecordKind::Execution, initial);

        let mut converged = false;
        for i in 0..self.max_iterations {
            tracing::info!("Iteration {}/{}", i + 1, self.max_iterations);

            let last_code = memory
                .last_execution()
                .ok_or(AgentError::MissingExecution)?
                .to_string();

            tracing::info!("Reflecting on the latest attempt");
            let prompt = self
                .prompts
                .render(prompts::REFLECT, &[("task", task), ("code", last_code.as_str())])?;
            let feedback = ask(self.llm.as_ref(), prompt).await?;
            tracing::debug!("Reviewer feedback:\n{}", feedback);
            memory.add_record(RecordKind::Reflection, feedback.clone());

            if is_stop_signal(&feedback) {
                tracing::info!("Reviewer found no need for improvement, stopping");
                converged = true;
                break;
            }

            tracing::info!("Refining the attempt");
            let prompt = self.prompts.render(
                prompts::REFINE,
                &[
                    ("task", task),
                    ("last_code_attempt", last_code.as_str()),
                    ("feedback", feedback.as_str()),
                ],
            )?;
            let refined = ask(self.llm.as_ref(), prompt).await?;
            memory.add_record(RecordKind::Execution, refined);
        }

        let answer = memory
            .last_execution()
            .ok_or(AgentError::MissingExecution)?
            .to_string();
        let rounds = memory.reflection_count();
        tracing::info!(
            "Reflection finished after {} rounds (converged: {})",
            rounds,
            converged
        );
        tracing::debug!("Final result:\n{}", answer);

        Ok(ReflectionOutcome {
            answer,
            memory,
            rounds,
            converged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlmClient;

    fn agent_with(llm: Arc<ScriptedLlmClient>, max_iterations: usize) -> ReflectionAgent {
        ReflectionAgent::new(llm, Arc::new(PromptTemplates::builtin()), max_iterations)
    }

    #[tokio::test]
    async fn test_stops_at_first_marker() {
        let llm = Arc::new(ScriptedLlmClient::new(["v1", "代码已是最优，无需改进"]));
        let outcome = agent_with(llm.clone(), 3).run("找素数").await.unwrap();

        assert_eq!(outcome.answer, "v1");
        assert_eq!(outcome.rounds, 1);
        assert!(outcome.converged);
        assert_eq!(llm.call_count(), 2);
        assert_eq!(outcome.memory.len(), 2);
        assert_eq!(outcome.memory.reflection_count(), outcome.rounds);
    }

    #[tokio::test]
    async fn test_refines_until_marker() {
        let llm = Arc::new(ScriptedLlmClient::new([
            "v1",
            "use a sieve",
            "v2",
            "No need for improvement.",
        ]));
        let outcome = agent_with(llm.clone(), 5).run("primes").await.unwrap();

        assert_eq!(outcome.answer, "v2");
        assert_eq!(outcome.rounds, 2);
        assert!(outcome.converged);
        assert_eq!(llm.call_count(), 4);

        let prompts = llm.prompts();
        assert!(prompts[1].contains("v1"));
        assert!(prompts[2].contains("# 你上一轮尝试的代码:\nv1"));
        assert!(prompts[2].contains("# 评审员的反馈:\nuse a sieve"));
        assert!(prompts[3].contains("v2"));
    }

    #[tokio::test]
    async fn test_exhausts_budget_without_marker() {
        let n = 3;
        let mut replies = vec!["v0".to_string()];
        for i in 1..=n {
            replies.push(format!("feedback {}", i));
            replies.push(format!("v{}", i));
        }
        let llm = Arc::new(ScriptedLlmClient::new(replies));
        let outcome = agent_with(llm.clone(), n).run("task").await.unwrap();

        assert_eq!(outcome.answer, "v3");
        assert_eq!(outcome.rounds, n);
        assert!(!outcome.converged);
        assert_eq!(llm.call_count(), 1 + 2 * n);
        assert_eq!(outcome.memory.reflection_count(), n);
        assert_eq!(llm.remaining(), 0);
    }

    #[tokio::test]
    async fn test_zero_iterations_only_initial() {
        let llm = Arc::new(ScriptedLlmClient::new(["v0"]));
        let outcome = agent_with(llm.clone(), 0).run("task").await.unwrap();
        assert_eq!(outcome.answer, "v0");
        assert_eq!(outcome.rounds, 0);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_absent_replies_recorded_as_empty() {
        let llm = Arc::new(ScriptedLlmClient::from_replies([
            None,
            Some("无需改进".to_string()),
        ]));
        let outcome = agent_with(llm.clone(), 2).run("task").await.unwrap();

        assert_eq!(outcome.answer, "");
        assert!(llm.prompts()[1].contains("```python\n\n```"));
    }

    #[tokio::test]
    async fn test_agent_is_reusable_across_runs() {
        let llm = Arc::new(ScriptedLlmClient::new(["a1", "无需改进", "b1", "无需改进"]));
        let agent = agent_with(llm, 2);

        let first = agent.run("a").await.unwrap();
        let second = agent.run("b").await.unwrap();
        assert_eq!(first.answer, "a1");
        assert_eq!(second.answer, "b1");
        assert_eq!(second.memory.len(), 2);
    }

    #[tokio::test]
    async fn test_llm_failure_aborts_run() {
        let llm = Arc::new(ScriptedLlmClient::new(["v1"]));
        let err = agent_with(llm, 2).run("task").await.unwrap_err();
        assert!(matches!(err, AgentError::Llm(_)));
    }
}
