//! Plan-and-Solve：先规划（Planner），再按计划逐步执行（Executor）

pub mod agent;
pub mod executor;
pub mod literal;
pub mod planner;

pub use agent::{PlanAndSolveAgent, PlanAndSolveOutcome};
pub use executor::{
    ExecutionContext, ExecutionHistory, Executor, StepExecutor, StepRecord, EMPTY_HISTORY,
};
pub use literal::{parse_literal, repr_str_list, Literal, LiteralError};
pub use planner::{parse_plan, PlanParseError, Planner, StepPlanner, PLAN_FENCE};
