//! 报告输出
//!
//! 只做格式化，不持有状态

use crate::models::AggregateReport;
use anyhow::Result;
use serde_json::json;
use tracing::info;

/// 单行摘要
///
/// 没有成功条目时平均耗时显示为 `NaN`
pub fn format_summary(report: &AggregateReport) -> String {
    let mut line = format!(
        "处理成功: {}, 失败: {} (超时 {}), 平均耗时: {:.3} ms",
        report.processed,
        report.errors,
        report.timeouts,
        report.avg_millis()
    );
    if report.batch_timed_out {
        line.push_str(&format!(
            " [批次超时, {} 个工作者未完成]",
            report.incomplete_workers
        ));
    }
    line
}

/// JSON 报告
pub fn to_json(report: &AggregateReport) -> Result<String> {
    let avg = report.avg_millis();
    let mut value = serde_json::to_value(report)?;
    value["avg_millis"] = if avg.is_nan() { json!(null) } else { json!(avg) };
    Ok(serde_json::to_string_pretty(&value)?)
}

/// 打印最终统计
pub fn log_summary(report: &AggregateReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    for worker in &report.workers {
        info!(
            "[工作者 {}] 分区 [{}, {}) 成功 {}, 失败 {}{}",
            worker.worker_id,
            worker.partition_start,
            worker.partition_start + worker.partition_len,
            worker.stats.processed,
            worker.stats.errors,
            if worker.completed { "" } else { " (未完成)" }
        );
    }
    info!("{}", "─".repeat(60));
    info!("✅ 成功: {}", report.processed);
    info!("❌ 失败: {} (超时 {})", report.errors, report.timeouts);
    info!("📦 结果总长度: {} 字节", report.bytes);
    info!("⏱️ 平均耗时: {:.3} ms", report.avg_millis());
    info!("{}", "=".repeat(60));
}
