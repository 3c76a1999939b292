//! 日志工具模块
//!
//! 提供日志初始化、运行日志文件和启动信息输出的辅助函数

use crate::config::Config;
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化运行日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n批量处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

/// 追加一行到运行日志文件
pub fn append_log_line(log_file_path: &str, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法打开日志文件: {}", log_file_path))?;

    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        line
    )?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 多工作者批量抽取模式");
    info!("📊 工作者数量: {}", config.worker_count);
    info!("⏱️ 单条目时限: {:?}", config.item_timeout);
    info!(
        "🔧 抽取命令: {} {}",
        config.extractor_cmd,
        config.extractor_args.join(" ")
    );
    if config.warm_up_first_item {
        info!("🔥 已启用分区首条目预热");
    }
    info!("{}", "=".repeat(60));
}

/// 记录条目加载信息
///
/// # 参数
/// - `total`: 条目总数
/// - `workers`: 工作者数量
pub fn log_items_loaded(total: usize, workers: usize) {
    info!("✓ 找到 {} 个待处理的条目", total);
    info!("📋 将平均分配给 {} 个工作者\n", workers);
}
