use crate::config::{Config, ReportFormat};
use crate::error::ConfigError;
use crate::infrastructure::{CommandExtractorFactory, ExtractorFactory};
use crate::models::{self, AggregateReport};
use crate::orchestrator::{validate_batch, Dispatcher};
use crate::services::reporter;
use crate::utils::logging;
use anyhow::Result;
use tracing::warn;

/// 应用主结构
pub struct App<F> {
    dispatcher: Dispatcher<F>,
}

impl App<CommandExtractorFactory> {
    /// 使用外部命令引擎初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        let factory =
            CommandExtractorFactory::new(config.extractor_cmd.clone(), config.extractor_args.clone());
        Self::with_factory(config, factory)
    }
}

impl<F: ExtractorFactory> App<F> {
    /// 使用任意引擎工厂初始化应用
    pub fn with_factory(config: Config, factory: F) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        logging::log_startup(&config);

        Ok(Self {
            dispatcher: Dispatcher::new(config, factory),
        })
    }

    /// 运行应用主逻辑：加载条目 → 调度 → 输出报告
    pub async fn run(&self) -> Result<AggregateReport> {
        let config = self.dispatcher.config();

        let input_path = config
            .input_path
            .as_deref()
            .ok_or_else(|| ConfigError::MissingInput {
                var_name: "INPUT_PATH".to_string(),
            })?;

        let items = models::load_items(input_path, &config.item_pattern, config.repeat).await?;
        if items.is_empty() {
            warn!("⚠️ 没有找到待处理的条目: {}", input_path);
        }
        validate_batch(items.len(), config.worker_count)?;
        logging::log_items_loaded(items.len(), config.worker_count);

        let report = self.dispatcher.run(items).await?;

        reporter::log_summary(&report);

        let summary = reporter::format_summary(&report);
        match config.report_format {
            ReportFormat::Text => println!("{}", summary),
            ReportFormat::Json => println!("{}", reporter::to_json(&report)?),
        }
        logging::append_log_line(&config.output_log_file, &summary)?;

        Ok(report)
    }
}
