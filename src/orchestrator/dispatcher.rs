//! 批量调度器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责整批条目的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **输入校验**：空列表、非法工作者数量在创建任何资源之前直接拒绝
//! 2. **静态分区**：把条目列表切分为 N 个连续分区
//! 3. **引擎创建**：每个工作者一个独立引擎实例，任何一个创建失败都终止整批
//! 4. **并发执行**：每个分区一个 tokio 任务
//! 5. **整批时限**：超过时限后不再等待，未完成的工作者以当前快照参与统计
//! 6. **统计合并**：所有工作者到达屏障后生成唯一的 `AggregateReport`
//!
//! ## 设计特点
//!
//! - **无共享计数器**：每个工作者独占自己的统计，只通过 watch 通道发布快照
//! - **向下委托**：单个分区的细节交给 `workflow::Worker`

use crate::config::Config;
use crate::error::EngineError;
use crate::infrastructure::{Extractor, ExtractorFactory, TimeoutExecutor};
use crate::models::{AggregateReport, Partition, WorkItem, WorkerStats, WorkerSummary};
use crate::orchestrator::partition::{partition_items, validate_batch};
use crate::workflow::Worker;
use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// 批量调度器
pub struct Dispatcher<F> {
    config: Config,
    factory: F,
}

/// 调度器对单个工作者的记录
struct WorkerSlot {
    partition_start: usize,
    partition_len: usize,
    stats_rx: watch::Receiver<WorkerStats>,
    abort: AbortHandle,
    finished: Option<WorkerStats>,
}

impl<F: ExtractorFactory> Dispatcher<F> {
    pub fn new(config: Config, factory: F) -> Self {
        Self { config, factory }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 处理整批条目并返回合并后的报告
    ///
    /// 只有配置级错误（非法输入、引擎创建失败）会返回 `Err`，
    /// 单个条目的失败只体现在报告的计数里
    pub async fn run(&self, items: Vec<WorkItem>) -> Result<AggregateReport> {
        let total = items.len();
        let worker_count = self.config.worker_count;
        validate_batch(total, worker_count)?;

        let partitions = partition_items(items, worker_count)?;
        let engines = self.create_engines(&partitions)?;

        let batch_timeout = self
            .config
            .batch_deadline(total, self.config.warm_up_first_item);
        log_dispatch_start(total, worker_count, self.config.item_timeout, batch_timeout);

        let deadline = Instant::now() + batch_timeout;
        let mut slots = Vec::with_capacity(worker_count);
        let mut pending = FuturesUnordered::new();

        for (partition, engine) in partitions.into_iter().zip(engines) {
            let id = partition.index;
            let partition_start = partition.start;
            let partition_len = partition.len();

            let executor = TimeoutExecutor::new(engine, self.config.item_timeout);
            let (worker, stats_rx) =
                Worker::new(id, partition, executor, self.config.warm_up_first_item);

            let handle = tokio::spawn(worker.run());
            slots.push(WorkerSlot {
                partition_start,
                partition_len,
                stats_rx,
                abort: handle.abort_handle(),
                finished: None,
            });
            pending.push(async move { (id, handle.await) });
        }

        // 屏障：等待全部工作者结束，或整批时限到达
        let mut batch_timed_out = false;
        loop {
            match tokio::time::timeout_at(deadline, pending.next()).await {
                Ok(Some((id, Ok(stats)))) => {
                    info!("[工作者 {}] 已结束", id);
                    slots[id].finished = Some(stats);
                }
                Ok(Some((id, Err(e)))) => {
                    error!("[工作者 {}] 任务执行失败: {}", id, e);
                }
                Ok(None) => break,
                Err(_) => {
                    batch_timed_out = true;
                    break;
                }
            }
        }
        drop(pending);

        if batch_timed_out {
            let unfinished = slots.iter().filter(|s| s.finished.is_none()).count();
            error!(
                "⏰ 整批时限 {:?} 已到, {} 个工作者未完成, 以当前进度统计",
                batch_timeout, unfinished
            );
        }

        let summaries = slots
            .into_iter()
            .enumerate()
            .map(|(worker_id, slot)| {
                let completed = slot.finished.is_some();
                if !completed {
                    // 正在进行的引擎调用不会被中断
                    slot.abort.abort();
                }
                let stats = slot
                    .finished
                    .unwrap_or_else(|| slot.stats_rx.borrow().clone());
                WorkerSummary {
                    worker_id,
                    partition_start: slot.partition_start,
                    partition_len: slot.partition_len,
                    stats,
                    completed,
                }
            })
            .collect();

        Ok(AggregateReport::merge(summaries, batch_timed_out))
    }

    /// 为每个分区创建独立的引擎实例
    fn create_engines(&self, partitions: &[Partition]) -> Result<Vec<Arc<dyn Extractor>>> {
        let mut engines = Vec::with_capacity(partitions.len());
        for partition in partitions {
            let engine = self
                .factory
                .create_engine()
                .map_err(|source| EngineError::CreateFailed {
                    worker: partition.index,
                    source: source.into(),
                })?;
            engines.push(engine);
        }
        Ok(engines)
    }
}

// ========== 日志辅助函数 ==========

fn log_dispatch_start(total: usize, workers: usize, item_timeout: Duration, batch_timeout: Duration) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始批量处理");
    info!("📄 条目总数: {}", total);
    info!("📊 工作者数量: {}", workers);
    info!("⏱️ 单条目时限: {:?}, 整批时限: {:?}", item_timeout, batch_timeout);
    info!("{}", "=".repeat(60));
    if total % workers != 0 {
        warn!(
            "条目数 {} 不能被工作者数 {} 整除, 最后一个分区多处理 {} 个",
            total,
            workers,
            total % workers
        );
    }
}
