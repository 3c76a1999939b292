//! 条目处理上下文
//!
//! 封装"哪个工作者正在处理分区里的第几个条目"这一信息

use std::fmt::Display;

/// 条目处理上下文（仅用于日志）
#[derive(Debug, Clone, Copy)]
pub struct ItemCtx {
    /// 工作者编号（从0开始）
    pub worker_id: usize,

    /// 条目在分区中的序号（从1开始）
    pub item_index: usize,

    /// 分区大小
    pub partition_len: usize,

    /// 条目在原列表中的下标
    pub global_index: usize,
}

impl ItemCtx {
    pub fn new(worker_id: usize, item_index: usize, partition_len: usize, global_index: usize) -> Self {
        Self {
            worker_id,
            item_index,
            partition_len,
            global_index,
        }
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[工作者 {} 条目 {}/{} #{}]",
            self.worker_id, self.item_index, self.partition_len, self.global_index
        )
    }
}
