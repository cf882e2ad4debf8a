//! Reflection：初始尝试 -> (反思 -> 优化)*，直到评审给出停止信号或用完迭代次数

pub mod agent;
pub mod stop;

pub use agent::{ReflectionAgent, ReflectionOutcome};
pub use stop::{is_stop_signal, STOP_MARKER_EN, STOP_MARKER_ZH};
