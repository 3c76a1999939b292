pub mod loaders;
pub mod partition;
pub mod stats;
pub mod work_item;

pub use loaders::load_items;
pub use partition::Partition;
pub use stats::{AggregateReport, WorkerStats, WorkerSummary};
pub use work_item::WorkItem;
