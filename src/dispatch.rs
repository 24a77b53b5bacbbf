mod plan;
mod scheduler;

pub use plan::{BatchPlan, plan_batches};
pub use scheduler::{BatchDispatcher, BatchHandle, Dispatch, DispatchSettings};
