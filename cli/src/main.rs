//! CLI entrypoint for agent-lab
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use lab_application::{
    AgentBuilder, InteractionLogger, InvocationRetrier, NoInteractionLogger, NoRunProgress,
    QueryRunner, RunError, RunProgress, example_queries,
};
use lab_domain::evaluate;
use lab_infrastructure::{
    ConfigLoader, FileConfig, JsonlInteractionLogger, OpenAiChatModel, OpenAiConfig, ProbeReport,
    TokioSleeper, ToolCallingAgentFactory, default_registry, probe,
};
use lab_presentation::{Cli, Command, ConsoleFormatter, ProgressReporter};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    if let Some(dry_run) = cli.dry_run_override() {
        config.agent.dry_run = dry_run;
    }
    config.validate().context("Invalid configuration")?;

    // Initialize logging based on verbosity level; `agent.debug` raises the floor
    let level = if config.agent.debug {
        cli.verbose.max(2)
    } else {
        cli.verbose
    };
    let filter = match level {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting agent-lab");

    match &cli.command {
        Command::Eval { expression } => {
            println!("{}", evaluate(expression));
            Ok(())
        }
        Command::Tools => {
            let registry = default_registry()?;
            println!("{}", ConsoleFormatter::format_tools(&registry.definitions()));
            Ok(())
        }
        Command::ShowConfig => show_config(&cli, &config),
        Command::Probe => run_probe(&config).await,
        Command::Run { queries } => run_queries(&cli, &config, queries).await,
    }
}

fn chat_model(config: &FileConfig) -> Result<OpenAiChatModel> {
    let token = std::env::var(&config.model.token_env).ok();
    let model_config = OpenAiConfig::new(&config.model.name, &config.model.base_url)
        .with_temperature(config.model.temperature)
        .with_token(token, &config.model.token_env)
        .with_timeout(config.model.timeout());
    Ok(OpenAiChatModel::new(model_config)?)
}

fn transcript_logger(cli: &Cli, config: &FileConfig) -> Arc<dyn InteractionLogger> {
    let path: Option<PathBuf> = cli
        .log_file
        .clone()
        .or_else(|| config.logging.transcript.clone());
    let Some(path) = path else {
        return Arc::new(NoInteractionLogger);
    };
    match JsonlInteractionLogger::open(&path) {
        Ok(logger) => {
            info!(path = %path.display(), run = logger.run_id(), "Writing interaction transcript");
            Arc::new(logger)
        }
        Err(e) => {
            warn!(path = %path.display(), "Transcript disabled: {}", e);
            Arc::new(NoInteractionLogger)
        }
    }
}

async fn run_queries(cli: &Cli, config: &FileConfig, queries: &[String]) -> Result<()> {
    let queries = if queries.is_empty() {
        example_queries()
    } else {
        queries.to_vec()
    };

    let run_config = config.run_config()?;
    let model = chat_model(config)?;
    if !run_config.dry_run && model.config().token.is_none() {
        bail!(
            "Missing {}. Export it (or put it in your shell profile) before running with --live.",
            config.model.token_env
        );
    }

    let logger = transcript_logger(cli, config);
    let tools = Arc::new(default_registry()?);

    // === Dependency Injection ===
    let factory = ToolCallingAgentFactory::new(config.agent.parse_framework()?)
        .with_max_tool_turns(config.agent.max_tool_turns)
        .with_interaction_logger(logger.clone());
    let builder = AgentBuilder::new(Arc::new(factory));
    let built = builder.negotiate(Arc::new(model), tools, &config.build_options())?;

    if !cli.quiet {
        println!(
            "{}",
            ConsoleFormatter::format_construction(builder.signature(), &built.shape, built.attempt)
        );
    }

    let progress: Arc<dyn RunProgress> = if cli.quiet {
        Arc::new(NoRunProgress)
    } else {
        Arc::new(ProgressReporter::new())
    };
    let retrier = InvocationRetrier::new(run_config.retry.clone(), Arc::new(TokioSleeper))
        .with_progress(progress.clone())
        .with_interaction_logger(logger.clone());
    let runner = QueryRunner::new(retrier, run_config)
        .with_progress(progress)
        .with_interaction_logger(logger);

    match runner.run(built.handle.as_ref(), &queries).await {
        Ok(reports) => {
            println!("{}", ConsoleFormatter::format_run(&reports));
            Ok(())
        }
        Err(RunError::RateLimitExceeded {
            index,
            completed,
            source,
        }) => {
            if !completed.is_empty() {
                println!("{}", ConsoleFormatter::format_run(&completed));
            }
            eprint!("{}", ConsoleFormatter::failure(&source.to_string()));
            bail!(
                "Stopped at query {} of {}: rate limit not lifted",
                index,
                queries.len()
            )
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_probe(config: &FileConfig) -> Result<()> {
    let model = chat_model(config)?;
    let report = probe(&model).await?;

    match report {
        ProbeReport::NotLimited => {
            print!(
                "{}",
                ConsoleFormatter::success("Request succeeded (not rate-limited right now).")
            );
        }
        ProbeReport::Failed {
            status,
            error,
            headers,
            retry_after,
            reset_utc,
        } => {
            print!("{}", ConsoleFormatter::failure("Request failed."));
            println!("Error: {}", error);

            print!(
                "{}",
                ConsoleFormatter::section_header("Rate limit / retry headers (if present)")
            );
            let shown = |v: &Option<String>| v.clone().unwrap_or_else(|| "None".to_string());
            print!("{}", ConsoleFormatter::key_value("status", status));
            print!("{}", ConsoleFormatter::key_value("retry-after", shown(&headers.retry_after)));
            print!(
                "{}",
                ConsoleFormatter::key_value("x-ratelimit-remaining", shown(&headers.remaining))
            );
            print!("{}", ConsoleFormatter::key_value("x-ratelimit-limit", shown(&headers.limit)));
            print!("{}", ConsoleFormatter::key_value("x-ratelimit-reset", shown(&headers.reset)));

            match retry_after {
                Some(Ok(wait)) => {
                    print!("{}", ConsoleFormatter::section_header("Retry-After interpretation"));
                    print!("{}", ConsoleFormatter::key_value("wait", &wait.wait));
                    print!("{}", ConsoleFormatter::key_value("ready_at (local)", &wait.ready_at));
                }
                Some(Err(reason)) => println!("\n({})", reason),
                None => {}
            }
            match reset_utc {
                Some(Ok(at)) => print!("{}", ConsoleFormatter::key_value("reset (UTC)", at)),
                Some(Err(reason)) => println!("({})", reason),
                None => {}
            }
        }
    }
    Ok(())
}

fn show_config(cli: &Cli, config: &FileConfig) -> Result<()> {
    println!("{}", ConsoleFormatter::header("Configuration"));
    print!("{}", ConsoleFormatter::section_header("Sources (highest priority first)"));
    if cli.no_config {
        println!("  --no-config: built-in defaults only");
    } else {
        for source in ConfigLoader::config_sources(cli.config.as_ref()) {
            let status = if source.found { "found" } else { "not found" };
            print!(
                "{}",
                ConsoleFormatter::key_value(
                    source.label,
                    format!("{} ({})", source.location, status)
                )
            );
        }
    }

    print!("{}", ConsoleFormatter::section_header("Effective settings"));
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{}", ConsoleFormatter::indent(&rendered, "  "));
    Ok(())
}
