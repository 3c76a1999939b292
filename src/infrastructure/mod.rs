//! 基础设施层：持有外部引擎，只暴露"限时处理一个条目"的能力

pub mod extractor;
pub mod timeout_executor;

pub use extractor::{CommandExtractor, CommandExtractorFactory, Extractor, ExtractorFactory};
pub use timeout_executor::{ItemOutcome, TimeoutExecutor};
