//! Hello Agents - 经典智能体范式
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **memory**: 消息结构与 Reflection 轨迹记忆
//! - **observability**: 日志初始化
//! - **plan_solve**: Plan-and-Solve（Planner、Executor、PlanAndSolveAgent）
//! - **prompts**: 可注入的提示词模板
//! - **reflection**: Reflection（ReflectionAgent、停止信号）

pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod plan_solve;
pub mod prompts;
pub mod reflection;

pub use plan_solve::{PlanAndSolveAgent, PlanAndSolveOutcome};
pub use reflection::{ReflectionAgent, ReflectionOutcome};
