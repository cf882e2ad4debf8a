//! Executor：按计划逐步求解
//!
//! 每一步把问题、完整计划、已完成步骤的历史与当前步骤渲染进 executor 模板，单次调用 LLM，
//! 再把结果追加进历史。最后一步的原始回复即最终答案，没有额外的汇总调用。

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::AgentError;
use crate::llm::{ask, LlmClient};
use crate::plan_solve::literal::repr_str_list;
use crate::prompts::{self, PromptTemplates};

/// 历史为空时代入提示词的占位文本（直接给模型阅读，不能是空字符串）
pub const EMPTY_HISTORY: &str = "无";

/// 已完成的一步
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// 从 0 开始
    pub index: usize,
    pub step: String,
    pub result: String,
}

/// 只追加的执行历史
#[derive(Debug, Clone, Default)]
pub struct ExecutionHistory {
    records: Vec<StepRecord>,
}

impl ExecutionHistory {
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 序列化为单段文本，每步 `步骤 N: ...\n结果: ...\n\n`（N 从 1 开始）
    pub fn render(&self) -> String {
        self.records
            .iter()
            .map(|r| format!("步骤 {}: {}\n结果: {}\n\n", r.index + 1, r.step, r.result))
            .collect()
    }

    /// 代入 `{history}` 的值：为空时用 [`EMPTY_HISTORY`]
    pub fn prompt_value(&self) -> String {
        if self.is_empty() {
            EMPTY_HISTORY.to_string()
        } else {
            self.render()
        }
    }
}

/// 一次执行的运行上下文：问题与计划只读，历史随步骤增长；每步消费旧值、返回新值
#[derive(Debug, Clone)]
pub struct ExecutionContext<'a> {
    pub question: &'a str,
    pub plan: &'a [String],
    pub history: ExecutionHistory,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(question: &'a str, plan: &'a [String]) -> Self {
        Self {
            question,
            plan,
            history: ExecutionHistory::default(),
        }
    }

    /// 下一步的描述；全部完成后为 None
    pub fn current_step(&self) -> Option<&'a str> {
        self.plan.get(self.history.len()).map(String::as_str)
    }

    pub fn is_finished(&self) -> bool {
        self.history.len() >= self.plan.len()
    }

    pub fn last_result(&self) -> Option<&str> {
        self.history.records.last().map(|r| r.result.as_str())
    }

    /// 记录当前步骤的结果，返回推进后的上下文
    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        if let Some(step) = self.current_step() {
            let index = self.history.len();
            self.history.records.push(StepRecord {
                index,
                step: step.to_string(),
                result: result.into(),
            });
        }
        self
    }
}

/// 执行接口：返回最终答案
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn execute(&self, question: &str, plan: &[String]) -> Result<String, AgentError>;
}

/// 基于 LLM 的 Executor
pub struct Executor {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptTemplates>,
}

impl Executor {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptTemplates>) -> Self {
        Self { llm, prompts }
    }

    /// 渲染当前步骤的提示词（纯函数）；已无剩余步骤时返回 None
    pub fn step_prompt(&self, ctx: &ExecutionContext<'_>) -> Result<Option<String>, AgentError> {
        let Some(step) = ctx.current_step() else {
            return Ok(None);
        };
        let plan = repr_str_list(ctx.plan);
        let history = ctx.history.prompt_value();
        let prompt = self.prompts.render(
            prompts::EXECUTOR,
            &[
                ("question", ctx.question),
                ("plan", plan.as_str()),
                ("history", history.as_str()),
                ("current_step", step),
            ],
        )?;
        Ok(Some(prompt))
    }

    /// 执行一步：渲染、调用、记录
    pub async fn step<'a>(
        &self,
        ctx: ExecutionContext<'a>,
    ) -> Result<ExecutionContext<'a>, AgentError> {
        let Some(prompt) = self.step_prompt(&ctx)? else {
            return Ok(ctx);
        };
        let number = ctx.history.len() + 1;
        tracing::info!(
            "Executing step {}/{}: {}",
            number,
            ctx.plan.len(),
            ctx.current_step().unwrap_or_default()
        );
        tracing::debug!("Step {} prompt:\n{}", number, prompt);

        let response = ask(self.llm.as_ref(), prompt).await?;
        tracing::info!("Step {} completed, result: {}", number, response);
        Ok(ctx.with_result(response))
    }
}

#[async_trait]
impl StepExecutor for Executor {
    async fn execute(&self, question: &str, plan: &[String]) -> Result<String, AgentError> {
        tracing::info!("Executing plan with {} steps", plan.len());
        let mut ctx = ExecutionContext::new(question, plan);
        while !ctx.is_finished() {
            ctx = self.step(ctx).await?;
        }
        Ok(ctx.last_result().unwrap_or_default().to_string())
    }
}
