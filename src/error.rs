//! 错误类型
//!
//! 三类错误对应三个处理层级：
//! - `ItemError`：单个条目失败，在 Worker 内部吸收，只体现为计数
//! - `ConfigError`：输入/配置不合法，在任何 Worker 启动前直接终止
//! - `EngineError`：外部引擎无法创建，同样在启动前终止

use std::time::Duration;
use thiserror::Error;

/// 单个条目的处理错误
#[derive(Debug, Error)]
pub enum ItemError {
    /// 超过单条目时限，外部调用可能仍在后台运行
    #[error("处理超时 ({item}): 超过 {limit:?}")]
    Timeout { item: String, limit: Duration },

    /// 外部引擎返回错误
    #[error("引擎处理失败 ({item}): {source}")]
    Collaborator {
        item: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 外部引擎 panic
    #[error("引擎处理时发生 panic ({item}): {message}")]
    Panicked { item: String, message: String },
}

impl ItemError {
    /// 是否为超时（用于区分"太慢"与"失败"）
    pub fn is_timeout(&self) -> bool {
        matches!(self, ItemError::Timeout { .. })
    }
}

/// 配置/输入错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 条目列表为空
    #[error("待处理条目列表为空")]
    EmptyItemList,

    /// 工作者数量必须 >= 1
    #[error("工作者数量无效: {value} (必须 >= 1)")]
    InvalidWorkerCount { value: i64 },

    /// 工作者数量超过条目数量
    #[error("工作者数量 {workers} 超过条目数量 {items}")]
    TooManyWorkers { workers: usize, items: usize },

    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 文件名过滤正则无效
    #[error("条目过滤表达式无效 '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// 未指定输入
    #[error("未指定输入路径 (环境变量 {var_name})")]
    MissingInput { var_name: String },

    /// 重复次数导致条目总数溢出
    #[error("重复次数过大: {items} 个条目 × {repeat} 次超出可表示范围")]
    RepeatTooLarge { items: usize, repeat: usize },
}

/// 外部引擎错误
#[derive(Debug, Error)]
pub enum EngineError {
    /// 为某个工作者创建引擎失败
    #[error("无法为工作者 {worker} 创建引擎: {source}")]
    CreateFailed {
        worker: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 条目处理结果类型
pub type ItemResult<T> = Result<T, ItemError>;
