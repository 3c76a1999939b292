//! 单条目计时

use std::time::{Duration, Instant};

/// 测量一次处理的挂钟耗时
#[derive(Debug, Clone, Copy)]
pub struct ItemTimer {
    start: Instant,
}

impl ItemTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
