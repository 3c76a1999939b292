//! # Header Batch
//!
//! 一个用于批量调用文档抽取引擎并统计吞吐量的 Rust 程序
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有外部引擎，只暴露能力
//! - `Extractor` / `ExtractorFactory` - 外部抽取引擎（黑盒）
//! - `TimeoutExecutor` - 限时处理单个条目
//!
//! ### ② 流程层（Workflow）
//! - `workflow/` - 定义"一个分区"的处理流程
//! - `ItemCtx` - 上下文封装（工作者编号 + 条目序号）
//! - `Worker` - 顺序处理分区，失败隔离，统计快照
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/partition` - 静态分区
//! - `orchestrator/dispatcher` - 并发启动工作者、整批时限、合并统计
//!
//! ### ④ 输出（Services）
//! - `services/reporter` - 单行摘要 / JSON / 日志
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::{Config, ReportFormat};
pub use error::{ConfigError, EngineError, ItemError};
pub use infrastructure::{
    CommandExtractor, CommandExtractorFactory, Extractor, ExtractorFactory, TimeoutExecutor,
};
pub use models::{AggregateReport, Partition, WorkItem, WorkerStats, WorkerSummary};
pub use orchestrator::{partition_items, Dispatcher};
pub use services::format_summary;
pub use workflow::{ItemCtx, Worker};
