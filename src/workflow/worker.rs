//! 工作者 - 流程层
//!
//! ## 职责
//!
//! 按顺序处理自己分区内的所有条目，是分区级别的执行者。
//!
//! ## 核心功能
//!
//! 1. **预热（可选）**：分区第一个条目额外处理一次，结果不计入统计
//! 2. **遍历条目**：按列表顺序逐个交给 `TimeoutExecutor`
//! 3. **失败隔离**：超时或引擎错误只计数，继续处理下一个条目
//! 4. **统计发布**：每处理完一个条目，通过 watch 通道发布一份统计快照
//!
//! 统计只由本工作者修改；调度器只在屏障之后读取快照。

use crate::infrastructure::TimeoutExecutor;
use crate::models::{Partition, WorkerStats};
use crate::workflow::worker_ctx::ItemCtx;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// 工作者
pub struct Worker {
    id: usize,
    partition: Partition,
    executor: TimeoutExecutor,
    warm_up: bool,
    stats_tx: watch::Sender<WorkerStats>,
}

impl Worker {
    /// 创建工作者，同时返回其统计快照的接收端
    pub fn new(
        id: usize,
        partition: Partition,
        executor: TimeoutExecutor,
        warm_up: bool,
    ) -> (Self, watch::Receiver<WorkerStats>) {
        let (stats_tx, stats_rx) = watch::channel(WorkerStats::default());
        let worker = Self {
            id,
            partition,
            executor,
            warm_up,
            stats_tx,
        };
        (worker, stats_rx)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// 处理整个分区，返回最终统计
    ///
    /// 单个条目的失败不会让工作者提前结束
    pub async fn run(self) -> WorkerStats {
        let total = self.partition.len();
        log_worker_start(self.id, &self.partition);

        if self.warm_up {
            self.warm_up_first_item().await;
        }

        let mut stats = WorkerStats::default();

        for (index, item) in self.partition.items().iter().enumerate() {
            let ctx = ItemCtx::new(self.id, index + 1, total, self.partition.start + index);
            info!("{} 处理: {}", ctx, item.display_name());

            let outcome = self.executor.execute(item).await;

            match &outcome.result {
                Ok(payload) => {
                    debug!(
                        "{} ✓ {} 字节, 耗时 {:?}",
                        ctx,
                        payload.len(),
                        outcome.elapsed
                    );
                    stats.record_success(outcome.elapsed, payload.len());
                }
                Err(e) => {
                    warn!("{} ❌ {}", ctx, e);
                    stats.record_failure(e);
                }
            }

            self.stats_tx.send_replace(stats.clone());
        }

        log_worker_complete(self.id, &stats, total);
        stats
    }

    /// 预热调用：结果只记日志，不计入统计
    async fn warm_up_first_item(&self) {
        let Some(first) = self.partition.items().first() else {
            return;
        };

        info!("[工作者 {}] 🔥 预热: {}", self.id, first.display_name());
        let outcome = self.executor.execute(first).await;
        match outcome.result {
            Ok(_) => info!("[工作者 {}] 预热完成, 耗时 {:?}", self.id, outcome.elapsed),
            Err(e) => warn!("[工作者 {}] ⚠️ 预热失败 (不计入统计): {}", self.id, e),
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_worker_start(id: usize, partition: &Partition) {
    info!(
        "[工作者 {}] 开始处理分区 [{}, {}), 共 {} 个条目",
        id,
        partition.start,
        partition.end(),
        partition.len()
    );
}

fn log_worker_complete(id: usize, stats: &WorkerStats, total: usize) {
    info!(
        "[工作者 {}] ✅ 分区完成: 成功 {}, 失败 {} (超时 {}), 总计 {}, {} 字节",
        id, stats.processed, stats.errors, stats.timeouts, total, stats.bytes
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::Extractor;
    use crate::models::WorkItem;
    use anyhow::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// 记录调用顺序，对指定条目失败或卡住
    #[derive(Default)]
    struct Scripted {
        fail_on: Option<&'static str>,
        stall_on: Option<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl Extractor for Scripted {
        fn process(&self, item: &WorkItem) -> Result<String> {
            let name = item.to_string();
            self.calls.lock().unwrap().push(name.clone());
            if self.fail_on == Some(name.as_str()) {
                anyhow::bail!("bad document");
            }
            if self.stall_on == Some(name.as_str()) {
                std::thread::sleep(Duration::from_millis(400));
            }
            Ok(format!("header of {name}"))
        }
    }

    fn partition(names: &[&str]) -> Partition {
        Partition::new(0, 0, names.iter().map(|n| WorkItem::from(*n)).collect())
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_partition() {
        let engine = Arc::new(Scripted {
            fail_on: Some("b"),
            ..Default::default()
        });
        let executor = TimeoutExecutor::new(engine.clone(), Duration::from_secs(1));
        let (worker, _rx) = Worker::new(0, partition(&["a", "b", "c", "d"]), executor, false);

        let stats = worker.run().await;

        assert_eq!(stats.processed, 3);
        assert_eq!(stats.errors, 1);
        assert_eq!(*engine.calls.lock().unwrap(), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_timeout_does_not_block_later_items() {
        let engine = Arc::new(Scripted {
            stall_on: Some("b"),
            ..Default::default()
        });
        let executor = TimeoutExecutor::new(engine.clone(), Duration::from_millis(50));
        let (worker, _rx) = Worker::new(0, partition(&["a", "b", "c"]), executor, false);

        let stats = worker.run().await;

        assert_eq!(stats.processed, 2);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.timeouts, 1);
        assert!(engine.calls.lock().unwrap().contains(&"c".to_string()));
    }

    #[tokio::test]
    async fn test_warm_up_processes_first_item_twice_but_counts_once() {
        let engine = Arc::new(Scripted::default());
        let executor = TimeoutExecutor::new(engine.clone(), Duration::from_secs(1));
        let (worker, _rx) = Worker::new(0, partition(&["a", "b"]), executor, true);

        let stats = worker.run().await;

        assert_eq!(stats.processed, 2);
        assert_eq!(*engine.calls.lock().unwrap(), vec!["a", "a", "b"]);
    }

    #[tokio::test]
    async fn test_snapshot_published_after_each_item() {
        struct Counting(AtomicUsize);
        impl Extractor for Counting {
            fn process(&self, _item: &WorkItem) -> Result<String> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok("xy".to_string())
            }
        }

        let executor = TimeoutExecutor::new(Arc::new(Counting(AtomicUsize::new(0))), Duration::from_secs(1));
        let (worker, rx) = Worker::new(3, partition(&["a", "b", "c"]), executor, false);
        assert_eq!(worker.id(), 3);

        let stats = worker.run().await;

        assert_eq!(*rx.borrow(), stats);
        assert_eq!(stats.bytes, 6);
    }
}
