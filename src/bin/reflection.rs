//! Reflection 示例：生成代码，评审并迭代优化

use std::sync::Arc;

use anyhow::Context;
use hello_agents::config::{load_config, AppConfig};
use hello_agents::llm::create_llm_from_config;
use hello_agents::prompts::PromptTemplates;
use hello_agents::{observability, ReflectionAgent};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });
    let llm = create_llm_from_config(&cfg);
    let prompts = Arc::new(PromptTemplates::load(cfg.agent.prompts_dir.as_deref()));
    let agent = ReflectionAgent::new(llm, prompts, cfg.agent.max_iterations);

    let task = "编写一个Python函数，找出1到n之间所有的素数 (prime numbers)。";
    let outcome = agent.run(task).await.context("Reflection run failed")?;

    println!(
        "经过 {} 轮反思（{}），最终生成的代码:\n{}",
        outcome.rounds,
        if outcome.converged {
            "评审认为无需改进"
        } else {
            "已达迭代上限"
        },
        outcome.answer
    );

    Ok(())
}
