//! 外部抽取引擎 - 基础设施层
//!
//! 引擎本身（文档头解析、书目信息抽取）是黑盒：输入一个条目，返回结果文本或错误。
//! 调用是同步阻塞的，可能很慢，也不保证响应取消。

use crate::models::WorkItem;
use anyhow::{Context, Result};
use std::process::Command;
use std::sync::Arc;
use tracing::debug;

/// 外部引擎
pub trait Extractor: Send + Sync {
    /// 处理单个条目，返回结果文本
    fn process(&self, item: &WorkItem) -> Result<String>;
}

/// 引擎工厂
///
/// 每个工作者启动前各取一个独立实例，工厂是工作者之间唯一共享（只读）的资源
pub trait ExtractorFactory: Send + Sync {
    fn create_engine(&self) -> Result<Arc<dyn Extractor>>;
}

/// 通过外部命令处理条目的引擎
///
/// 条目路径作为最后一个参数传入，标准输出即结果
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
}

impl CommandExtractor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Extractor for CommandExtractor {
    fn process(&self, item: &WorkItem) -> Result<String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(item.path())
            .output()
            .with_context(|| format!("无法启动 {}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "{} 退出码 {:?}: {}",
                self.program,
                output.status.code(),
                stderr.trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        debug!("{} -> {} 字节", item.display_name(), stdout.len());
        Ok(stdout)
    }
}

/// `CommandExtractor` 的工厂
#[derive(Debug, Clone)]
pub struct CommandExtractorFactory {
    program: String,
    args: Vec<String>,
}

impl CommandExtractorFactory {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl ExtractorFactory for CommandExtractorFactory {
    fn create_engine(&self) -> Result<Arc<dyn Extractor>> {
        if self.program.trim().is_empty() {
            anyhow::bail!("抽取命令为空");
        }
        Ok(Arc::new(CommandExtractor::new(
            self.program.clone(),
            self.args.clone(),
        )))
    }
}
