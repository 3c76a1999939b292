//! 待处理条目

use std::fmt::Display;
use std::path::{Path, PathBuf};

/// 一个待处理条目（通常是文档路径）
///
/// 创建后不可变；分配给某个分区后由对应 Worker 独占
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    path: PathBuf,
}

impl WorkItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 日志里使用的短名称
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }
}

impl Display for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl From<&str> for WorkItem {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for WorkItem {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for WorkItem {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}
