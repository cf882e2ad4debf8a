//! Plan-and-Solve 示例：先生成计划，再逐步求解一道应用题

use std::sync::Arc;

use anyhow::Context;
use hello_agents::config::{load_config, AppConfig};
use hello_agents::llm::create_llm_from_config;
use hello_agents::prompts::PromptTemplates;
use hello_agents::{observability, PlanAndSolveAgent, PlanAndSolveOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });
    let llm = create_llm_from_config(&cfg);
    let prompts = Arc::new(PromptTemplates::load(cfg.agent.prompts_dir.as_deref()));
    let agent = PlanAndSolveAgent::new(llm, prompts);

    let question = "一个水果店周一卖出了15个苹果。周二卖出的苹果数量是周一的两倍。周三卖出的数量比周二少了5个。请问这三天总共卖出了多少个苹果？";

    match agent
        .run(question)
        .await
        .context("Plan-and-Solve run failed")?
    {
        PlanAndSolveOutcome::Solved { answer, .. } => println!("最终答案: {}", answer),
        PlanAndSolveOutcome::Aborted => println!("任务终止：无法生成有效的行动计划。"),
    }

    Ok(())
}
