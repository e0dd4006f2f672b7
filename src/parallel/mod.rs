pub mod batch;
pub mod pool;

pub use batch::{batch_ranges, run_scenario_batches, run_scenario_batches_with_progress};
pub use pool::WorkerPool;
