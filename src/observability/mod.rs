//! 可观测性

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 日志：默认 info，可通过 RUST_LOG 覆盖（如 `RUST_LOG=hello_agents=debug` 查看完整提示词与回复）
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}
