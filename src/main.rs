use anyhow::Result;
use header_batch::utils::logging;
use header_batch::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let _report = App::initialize(config)?.run().await?;

    Ok(())
}
