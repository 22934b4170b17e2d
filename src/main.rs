use anyhow::Result;
use clap::Parser;
use sage_assist::cli::Args;
use sage_assist::llm::client::LLMClient;
use sage_assist::workflow::Workflow;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

/// RUST_LOG优先，否则按verbose选择级别
fn log_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "sage_assist=debug" } else { "sage_assist=info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// 初始化日志，返回的句柄用于在配置加载后调整级别
fn init_tracing(verbose: bool) -> reload::Handle<EnvFilter, Registry> {
    let (filter, handle) = reload::Layer::new(log_filter(verbose));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
    handle
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let log_handle = init_tracing(args.verbose);

    let config = args.build_config()?;
    // 配置文件中的verbose同样生效
    if config.verbose && !args.verbose {
        log_handle.reload(log_filter(true))?;
    }
    let llm = Arc::new(LLMClient::new(config.llm.clone())?);

    // 启动时检查模型连接
    if args.check_connection {
        llm.check_connection().await?;
    }

    let interactive = args.interactive;
    let task = args.command.into_task()?;
    let workflow = Workflow::new(config, llm);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    workflow
        .run(task, interactive, stdin.lock(), &mut stdout)
        .await?;

    Ok(())
}
