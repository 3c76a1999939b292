//! 处理统计
//!
//! `WorkerStats` 由单个 Worker 独占修改；`AggregateReport` 在所有 Worker
//! 结束（或被整批时限放弃）之后一次性合并生成，之后不再修改。

use crate::error::ItemError;
use serde::{Serialize, Serializer};
use std::time::Duration;

fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

/// 单个工作者的计数器
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkerStats {
    /// 成功处理数
    pub processed: u64,
    /// 失败数（含超时）
    pub errors: u64,
    /// 其中超时的数量
    pub timeouts: u64,
    /// 成功条目的累计耗时
    #[serde(rename = "total_millis", serialize_with = "serialize_millis")]
    pub total_duration: Duration,
    /// 成功结果的累计长度
    pub bytes: u64,
}

impl WorkerStats {
    pub fn record_success(&mut self, elapsed: Duration, payload_len: usize) {
        self.processed += 1;
        self.total_duration += elapsed;
        self.bytes += payload_len as u64;
    }

    pub fn record_failure(&mut self, err: &ItemError) {
        self.errors += 1;
        if err.is_timeout() {
            self.timeouts += 1;
        }
    }

    /// 已尝试的条目数
    pub fn attempted(&self) -> u64 {
        self.processed + self.errors
    }

    /// 累加另一份统计
    pub fn absorb(&mut self, other: &WorkerStats) {
        self.processed += other.processed;
        self.errors += other.errors;
        self.timeouts += other.timeouts;
        self.total_duration += other.total_duration;
        self.bytes += other.bytes;
    }
}

/// 单个工作者的最终状态
#[derive(Debug, Clone, Serialize)]
pub struct WorkerSummary {
    pub worker_id: usize,
    /// 分区在原列表中的起始下标
    pub partition_start: usize,
    pub partition_len: usize,
    pub stats: WorkerStats,
    /// 是否在整批时限内跑完了自己的分区
    pub completed: bool,
}

/// 全部工作者合并后的报告
#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub worker_count: usize,
    pub processed: u64,
    pub errors: u64,
    pub timeouts: u64,
    pub bytes: u64,
    #[serde(rename = "total_millis", serialize_with = "serialize_millis")]
    pub total_duration: Duration,
    /// 整批时限是否触发
    pub batch_timed_out: bool,
    /// 未跑完分区的工作者数量（只贡献了部分计数）
    pub incomplete_workers: usize,
    pub workers: Vec<WorkerSummary>,
}

impl AggregateReport {
    /// 合并所有工作者的统计
    pub fn merge(workers: Vec<WorkerSummary>, batch_timed_out: bool) -> Self {
        let mut total = WorkerStats::default();
        for worker in &workers {
            total.absorb(&worker.stats);
        }
        let incomplete_workers = workers.iter().filter(|w| !w.completed).count();

        Self {
            worker_count: workers.len(),
            processed: total.processed,
            errors: total.errors,
            timeouts: total.timeouts,
            bytes: total.bytes,
            total_duration: total.total_duration,
            batch_timed_out,
            incomplete_workers,
            workers,
        }
    }

    /// 平均每个成功条目的耗时（毫秒）
    ///
    /// 没有成功条目时返回 NaN
    pub fn avg_millis(&self) -> f64 {
        if self.processed == 0 {
            return f64::NAN;
        }
        self.total_duration.as_secs_f64() * 1000.0 / self.processed as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(worker_id: usize, processed: u64, errors: u64, millis: u64) -> WorkerSummary {
        WorkerSummary {
            worker_id,
            partition_start: 0,
            partition_len: (processed + errors) as usize,
            stats: WorkerStats {
                processed,
                errors,
                timeouts: 0,
                total_duration: Duration::from_millis(millis),
                bytes: processed * 10,
            },
            completed: true,
        }
    }

    #[test]
    fn test_record_success_and_failure() {
        let mut stats = WorkerStats::default();
        stats.record_success(Duration::from_millis(12), 100);
        stats.record_failure(&ItemError::Timeout {
            item: "b.pdf".to_string(),
            limit: Duration::from_secs(1),
        });
        stats.record_failure(&ItemError::Panicked {
            item: "c.pdf".to_string(),
            message: "boom".to_string(),
        });

        assert_eq!(stats.processed, 1);
        assert_eq!(stats.errors, 2);
        assert_eq!(stats.timeouts, 1);
        assert_eq!(stats.bytes, 100);
        assert_eq!(stats.total_duration, Duration::from_millis(12));
        assert_eq!(stats.attempted(), 3);
    }

    #[test]
    fn test_merge_sums_and_averages() {
        let report = AggregateReport::merge(
            vec![summary(0, 3, 1, 30), summary(1, 2, 0, 50), summary(2, 5, 2, 20)],
            false,
        );

        assert_eq!(report.worker_count, 3);
        assert_eq!(report.processed, 10);
        assert_eq!(report.errors, 3);
        assert_eq!(report.bytes, 100);
        assert_eq!(report.total_duration, Duration::from_millis(100));
        assert!((report.avg_millis() - 10.0).abs() < 1e-9);
        assert_eq!(report.incomplete_workers, 0);
    }

    #[test]
    fn test_average_is_nan_without_successes() {
        let report = AggregateReport::merge(vec![summary(0, 0, 4, 0)], false);
        assert_eq!(report.errors, 4);
        assert!(report.avg_millis().is_nan());
    }

    #[test]
    fn test_incomplete_workers_counted() {
        let mut partial = summary(1, 1, 0, 5);
        partial.completed = false;
        let report = AggregateReport::merge(vec![summary(0, 2, 0, 10), partial], true);

        assert!(report.batch_timed_out);
        assert_eq!(report.incomplete_workers, 1);
        assert_eq!(report.processed, 3);
    }
}
