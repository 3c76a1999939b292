//! 静态分区
//!
//! 工作者 i 分到 `[i * per, (i + 1) * per)`，`per = total / workers`，
//! 最后一个工作者吸收整除余数，保证每个条目恰好出现一次。

use crate::error::ConfigError;
use crate::models::{Partition, WorkItem};

/// 在创建任何资源之前校验批次规模
pub fn validate_batch(total_items: usize, worker_count: usize) -> Result<(), ConfigError> {
    if total_items == 0 {
        return Err(ConfigError::EmptyItemList);
    }
    if worker_count == 0 {
        return Err(ConfigError::InvalidWorkerCount { value: 0 });
    }
    if worker_count > total_items {
        return Err(ConfigError::TooManyWorkers {
            workers: worker_count,
            items: total_items,
        });
    }
    Ok(())
}

/// 把条目列表切分为 `worker_count` 个连续分区
pub fn partition_items(items: Vec<WorkItem>, worker_count: usize) -> Result<Vec<Partition>, ConfigError> {
    let total = items.len();
    validate_batch(total, worker_count)?;

    let per_worker = total / worker_count;
    let mut remaining = items.into_iter();
    let mut partitions = Vec::with_capacity(worker_count);

    for idx in 0..worker_count {
        let start = idx * per_worker;
        let end = if idx + 1 == worker_count {
            total
        } else {
            (idx + 1) * per_worker
        };
        let chunk: Vec<WorkItem> = remaining.by_ref().take(end - start).collect();
        partitions.push(Partition::new(idx, start, chunk));
    }

    Ok(partitions)
}
