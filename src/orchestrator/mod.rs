//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `partition` - 静态分区
//! - 校验批次规模（空列表、工作者数量）
//! - 按下标范围切分条目列表，最后一个分区吸收余数
//!
//! ### `dispatcher` - 批量调度器
//! - 为每个分区创建独立引擎
//! - 并发启动工作者（tokio::spawn）
//! - 整批时限 + 屏障
//! - 合并统计
//!
//! ## 层次关系
//!
//! ```text
//! dispatcher (处理 Vec<WorkItem>)
//!     ↓
//! workflow::Worker (处理一个 Partition)
//!     ↓
//! infrastructure::TimeoutExecutor (限时处理单个 WorkItem)
//!     ↓
//! infrastructure::Extractor (外部引擎，黑盒)
//! ```

pub mod dispatcher;
pub mod partition;

pub use dispatcher::Dispatcher;
pub use partition::{partition_items, validate_batch};
