//! CLI entrypoint for prismatic
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use prismatic_application::{
    ConversationLogger, ProgressNotifier, RunReviewInput, RunReviewUseCase, ScatterGatherUseCase,
    SharedProvider,
};
use prismatic_infrastructure::{
    AnthropicConfig, AnthropicProvider, ConfigIssue, ConfigLoader, FileConfig,
    JsonlConversationLogger, LocalToolExecutor, Severity,
};
use prismatic_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli.log_level()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        println!("Configuration sources (lowest to highest priority):");
        for source in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("  {}", source);
        }
        return Ok(());
    }

    let config = load_config(&cli)?;
    report_issues(&config.validate())?;

    info!("Starting prismatic");

    let context = read_change(&cli)?;
    if context.trim().is_empty() {
        bail!("Nothing to review: the change is empty");
    }

    // === Dependency Injection ===
    let api_key = config.provider.resolve_api_key().with_context(|| {
        format!(
            "No API key found. Set {} or provider.api_key in the config",
            config.provider.api_key_env
        )
    })?;
    let provider = AnthropicProvider::new(AnthropicConfig {
        api_key,
        base_url: config.provider.base_url.clone(),
        api_version: config.provider.api_version.clone(),
        default_model: config.provider.model.clone(),
        timeout: config.provider.timeout_secs.map(Duration::from_secs),
    })?;

    let mut tools = LocalToolExecutor::new();
    if let Some(dir) = &cli.workdir {
        tools = tools.with_working_dir(dir);
    }

    let mut scatter_gather =
        ScatterGatherUseCase::new(Arc::new(SharedProvider(Arc::new(provider))), Arc::new(tools))
            .with_retry_policy(config.retry.to_policy());

    if let Some(path) = &cli.conversation_log {
        let logger = JsonlConversationLogger::open(path)
            .with_context(|| format!("Failed to open conversation log {}", path.display()))?;
        info!("Conversation log: {} (run {})", logger.path().display(), logger.run_id());
        let logger: Arc<dyn ConversationLogger> = Arc::new(logger);
        scatter_gather = scatter_gather.with_conversation_logger(logger);
    }

    let mut input = RunReviewInput::new(context, config.review_job()?);
    if !cli.no_summary
        && let Some(summarizer) = config.summarizer()?
    {
        input = input.with_summarizer(summarizer);
    }

    let cancellation = CancellationToken::new();
    let ctrl_c = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling review");
            ctrl_c.cancel();
        }
    });

    let use_case = RunReviewUseCase::new(scatter_gather);
    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(prismatic_application::NoProgress)
    } else {
        Box::new(ProgressReporter::new())
    };

    let report = match use_case
        .execute_with_progress(input, progress.as_ref(), Some(&cancellation))
        .await
    {
        Ok(report) => report,
        Err(e) if e.is_cancelled() => bail!("Review cancelled"),
        Err(e) => return Err(e.into()),
    };

    let output = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format(&report),
        OutputFormat::Final => ConsoleFormatter::format_final_only(&report),
        OutputFormat::Json => ConsoleFormatter::format_json(&report),
    };

    println!("{}", output);

    Ok(())
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_deref()).map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))
}

fn report_issues(issues: &[ConfigIssue]) -> Result<()> {
    for issue in issues {
        match issue.severity {
            Severity::Warning => warn!("config: {}", issue.message()),
            Severity::Error => eprintln!("config error: {}", issue.message()),
        }
    }
    if ConfigIssue::has_errors(issues) {
        bail!("Configuration has errors");
    }
    Ok(())
}

fn read_change(cli: &Cli) -> Result<String> {
    match &cli.input {
        Some(path) if !cli.reads_stdin() => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read the change from stdin")?;
            Ok(buf)
        }
    }
}
