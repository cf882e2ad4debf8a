//! PlanAndSolveAgent：串联 Planner 与 Executor
//!
//! 规划得到空计划时直接终止，不会调用 Executor；这是整条流水线唯一的提前退出路径。

use std::sync::Arc;

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::plan_solve::{Executor, Planner, StepExecutor, StepPlanner};
use crate::prompts::PromptTemplates;

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanAndSolveOutcome {
    /// 未能生成有效计划，任务终止
    Aborted,
    /// 计划已全部执行，answer 为最后一步的回复
    Solved { plan: Vec<String>, answer: String },
}

impl PlanAndSolveOutcome {
    pub fn answer(&self) -> Option<&str> {
        match self {
            PlanAndSolveOutcome::Aborted => None,
            PlanAndSolveOutcome::Solved { answer, .. } => Some(answer.as_str()),
        }
    }
}

pub struct PlanAndSolveAgent {
    planner: Arc<dyn StepPlanner>,
    executor: Arc<dyn StepExecutor>,
}

impl PlanAndSolveAgent {
    /// Planner 与 Executor 共用同一个 LLM 与模板表
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptTemplates>) -> Self {
        Self {
            planner: Arc::new(Planner::new(llm.clone(), prompts.clone())),
            executor: Arc::new(Executor::new(llm, prompts)),
        }
    }

    /// 自定义 Planner / Executor（如测试替身）
    pub fn with_parts(planner: Arc<dyn StepPlanner>, executor: Arc<dyn StepExecutor>) -> Self {
        Self { planner, executor }
    }

    pub async fn run(&self, question: &str) -> Result<PlanAndSolveOutcome, AgentError> {
        tracing::info!("Plan-and-Solve started, question: {}", question);

        let plan = self.planner.plan(question).await?;
        if plan.is_empty() {
            tracing::warn!("Task aborted: no valid plan could be generated");
            return Ok(PlanAndSolveOutcome::Aborted);
        }

        let answer = self.executor.execute(question, &plan).await?;
        tracing::info!("Plan-and-Solve finished, final answer: {}", answer);
        Ok(PlanAndSolveOutcome::Solved { plan, answer })
    }
}
