//! 分区：原列表中一段连续、互不重叠的条目

use crate::models::work_item::WorkItem;

/// 分配给单个工作者的连续条目段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// 分区编号（与工作者编号一致）
    pub index: usize,
    /// 在原列表中的起始下标
    pub start: usize,
    items: Vec<WorkItem>,
}

impl Partition {
    pub fn new(index: usize, start: usize, items: Vec<WorkItem>) -> Self {
        Self {
            index,
            start,
            items,
        }
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 原列表中的结束下标（不含）
    pub fn end(&self) -> usize {
        self.start + self.items.len()
    }
}
