use crate::error::ConfigError;
use std::str::FromStr;
use std::time::Duration;

/// 报告输出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    /// 单行文本
    Text,
    /// JSON
    Json,
}

impl FromStr for ReportFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(ConfigError::EnvVarParseFailed {
                var_name: "REPORT_FORMAT".to_string(),
                value: s.to_string(),
                expected_type: "text|json".to_string(),
            }),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 工作者数量（并发槽位）
    pub worker_count: usize,
    /// 单条目时限
    pub item_timeout: Duration,
    /// 整批时限，未设置时见 [`Config::batch_deadline`]
    pub batch_timeout: Option<Duration>,
    /// 是否对每个分区的第一个条目做一次不计入统计的预热调用
    pub warm_up_first_item: bool,
    // --- 输入 ---
    /// 输入路径：目录 / .toml 清单 / 文本列表
    pub input_path: Option<String>,
    /// 目录扫描时的文件名过滤正则
    pub item_pattern: String,
    /// 条目列表重复次数
    pub repeat: usize,
    // --- 外部引擎 ---
    pub extractor_cmd: String,
    pub extractor_args: Vec<String>,
    // --- 输出 ---
    pub report_format: ReportFormat,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 运行日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_count: 4,
            item_timeout: Duration::from_secs(5),
            batch_timeout: None,
            warm_up_first_item: false,
            input_path: None,
            item_pattern: r"(?i)\.pdf$".to_string(),
            repeat: 1,
            extractor_cmd: "pdfinfo".to_string(),
            extractor_args: Vec::new(),
            report_format: ReportFormat::Text,
            verbose_logging: false,
            output_log_file: "batch_log.txt".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量读取配置，未设置的项使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源读取配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        let worker_count = match lookup("WORKER_COUNT") {
            Some(v) => validate_worker_count(parse_var("WORKER_COUNT", &v, "i64")?)?,
            None => default.worker_count,
        };
        let item_timeout = match lookup("ITEM_TIMEOUT_SECS") {
            Some(v) => parse_positive_secs("ITEM_TIMEOUT_SECS", &v)?,
            None => default.item_timeout,
        };
        let batch_timeout = lookup("BATCH_TIMEOUT_SECS")
            .map(|v| parse_positive_secs("BATCH_TIMEOUT_SECS", &v))
            .transpose()?;
        let warm_up_first_item = match lookup("WARM_UP_FIRST_ITEM") {
            Some(v) => parse_var("WARM_UP_FIRST_ITEM", &v, "bool")?,
            None => default.warm_up_first_item,
        };
        let repeat = match lookup("REPEAT") {
            Some(v) => parse_var("REPEAT", &v, "usize")?,
            None => default.repeat,
        };
        let verbose_logging = match lookup("VERBOSE_LOGGING") {
            Some(v) => parse_var("VERBOSE_LOGGING", &v, "bool")?,
            None => default.verbose_logging,
        };
        let report_format = match lookup("REPORT_FORMAT") {
            Some(v) => v.parse()?,
            None => default.report_format,
        };
        let extractor_args = lookup("EXTRACTOR_ARGS")
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or(default.extractor_args);

        Ok(Self {
            worker_count,
            item_timeout,
            batch_timeout,
            warm_up_first_item,
            input_path: lookup("INPUT_PATH").or(default.input_path),
            item_pattern: lookup("ITEM_PATTERN").unwrap_or(default.item_pattern),
            repeat,
            extractor_cmd: lookup("EXTRACTOR_CMD").unwrap_or(default.extractor_cmd),
            extractor_args,
            report_format,
            verbose_logging,
            output_log_file: lookup("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        })
    }

    /// 整批时限：显式配置优先，否则按条目数放大单条目时限
    ///
    /// 默认预算 = 单条目时限 × (条目数 + 预热调用 + 1)，
    /// 多出的一份留给调度开销，保证全部超时的分区也能记录到最后一个条目
    pub fn batch_deadline(&self, total_items: usize, warm_up: bool) -> Duration {
        self.batch_timeout.unwrap_or_else(|| {
            let slots = total_items
                .saturating_add(usize::from(warm_up))
                .saturating_add(1);
            let slots = u32::try_from(slots).unwrap_or(u32::MAX);
            self.item_timeout.saturating_mul(slots)
        })
    }
}

/// 校验工作者数量（允许来自有符号的外部输入）
pub fn validate_worker_count(value: i64) -> Result<usize, ConfigError> {
    if value < 1 {
        return Err(ConfigError::InvalidWorkerCount { value });
    }
    usize::try_from(value).map_err(|_| ConfigError::InvalidWorkerCount { value })
}

/// 时限类变量必须 > 0
fn parse_positive_secs(var_name: &str, value: &str) -> Result<Duration, ConfigError> {
    match parse_var::<u64>(var_name, value, "u64 (> 0)")? {
        0 => Err(ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type: "u64 (> 0)".to_string(),
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn parse_var<T: FromStr>(var_name: &str, value: &str, expected_type: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type: expected_type.to_string(),
        })
}
