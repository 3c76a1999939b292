//! 限时执行器 - 基础设施层
//!
//! 在阻塞线程池上调用外部引擎，最多等待固定时限。
//!
//! 时限到达后只是"不再等待"：引擎调用无法被中断，会在阻塞线程上继续跑完，
//! 结果被丢弃。大量卡死的调用会占满 tokio 的阻塞线程池，之后提交的条目只能排队，
//! 并同样以超时结束。

use crate::error::{ItemError, ItemResult};
use crate::infrastructure::extractor::Extractor;
use crate::models::WorkItem;
use crate::utils::timer::ItemTimer;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;

/// 单个条目的处理结果
#[derive(Debug)]
pub struct ItemOutcome {
    /// 成功时为引擎返回的结果文本
    pub result: ItemResult<String>,
    /// 从提交到拿到结果（或放弃等待）的耗时
    pub elapsed: Duration,
}

/// 限时执行器
///
/// 持有一个工作者独占的引擎实例
pub struct TimeoutExecutor {
    engine: Arc<dyn Extractor>,
    limit: Duration,
}

impl TimeoutExecutor {
    pub fn new(engine: Arc<dyn Extractor>, limit: Duration) -> Self {
        Self { engine, limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// 处理一个条目，最多等待 `limit`
    pub async fn execute(&self, item: &WorkItem) -> ItemOutcome {
        let timer = ItemTimer::start();

        let engine = Arc::clone(&self.engine);
        let owned = item.clone();
        let task = tokio::task::spawn_blocking(move || engine.process(&owned));

        // 超时后 JoinHandle 被丢弃，阻塞任务脱离等待方继续运行
        let result = match tokio::time::timeout(self.limit, task).await {
            Ok(Ok(Ok(payload))) => Ok(payload),
            Ok(Ok(Err(source))) => Err(ItemError::Collaborator {
                item: item.to_string(),
                source: source.into(),
            }),
            Ok(Err(join_err)) => Err(ItemError::Panicked {
                item: item.to_string(),
                message: join_error_message(join_err),
            }),
            Err(_) => Err(ItemError::Timeout {
                item: item.to_string(),
                limit: self.limit,
            }),
        };

        ItemOutcome {
            result,
            elapsed: timer.elapsed(),
        }
    }
}

fn join_error_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    panic_message(err.into_panic())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "未知 panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    struct Fixed(&'static str);

    impl Extractor for Fixed {
        fn process(&self, _item: &WorkItem) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    impl Extractor for Failing {
        fn process(&self, item: &WorkItem) -> Result<String> {
            anyhow::bail!("无法解析文档头: {}", item)
        }
    }

    struct Slow(Duration);

    impl Extractor for Slow {
        fn process(&self, _item: &WorkItem) -> Result<String> {
            std::thread::sleep(self.0);
            Ok("late".to_string())
        }
    }

    struct Panicking;

    impl Extractor for Panicking {
        fn process(&self, _item: &WorkItem) -> Result<String> {
            panic!("engine crashed")
        }
    }

    #[tokio::test]
    async fn test_success_returns_payload() {
        let executor = TimeoutExecutor::new(Arc::new(Fixed("<header/>")), Duration::from_secs(1));
        let outcome = executor.execute(&WorkItem::from("a.pdf")).await;

        assert_eq!(outcome.result.unwrap(), "<header/>");
        assert!(outcome.elapsed < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_collaborator_error_is_not_timeout() {
        let executor = TimeoutExecutor::new(Arc::new(Failing), Duration::from_secs(1));
        let err = executor.execute(&WorkItem::from("a.pdf")).await.result.unwrap_err();

        assert!(matches!(err, ItemError::Collaborator { .. }));
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_slow_engine_times_out_without_waiting() {
        let executor = TimeoutExecutor::new(
            Arc::new(Slow(Duration::from_millis(400))),
            Duration::from_millis(50),
        );
        let outcome = executor.execute(&WorkItem::from("a.pdf")).await;

        assert!(outcome.result.unwrap_err().is_timeout());
        assert!(outcome.elapsed < Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let executor = TimeoutExecutor::new(Arc::new(Panicking), Duration::from_secs(1));
        let err = executor.execute(&WorkItem::from("a.pdf")).await.result.unwrap_err();

        match err {
            ItemError::Panicked { message, .. } => assert_eq!(message, "engine crashed"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
