use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use serde_json::Value;
use tracing::{debug, info, warn};

use pitchcraft::cli::{Cli, Command, OutputFormat};
use pitchcraft::config::Config;
use pitchcraft::generator::{GenerateError, Generators};
use pitchcraft::llm::create_backend;
use pitchcraft::server::{self, AppState};
use pitchcraft::store::PitchStore;
use pitchcraft::validation::{IdeaLimit, validate};
use pitchcraft::{PitchContext, PromptLoader};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = pitchcraft::cli::get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(provider = %config.llm.provider, model = %config.llm.model, "Pitchcraft loaded config");

    let backend = create_backend(&config.llm).context("Failed to create LLM client")?;
    let loader = Arc::new(PromptLoader::from_config(&config.prompts));
    let generators = Generators::new(&config.generation, backend, loader);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Serve { bind } => cmd_serve(&config, generators, bind).await,
        Command::Pitch { idea, format } => cmd_pitch(&config, &generators, &idea, format).await,
        Command::CodePrompt {
            idea,
            pitch_file,
            format,
        } => cmd_code_prompt(&generators, &idea, pitch_file, format).await,
        Command::BuildPrompt {
            idea,
            pitch_file,
            format,
        } => cmd_build_prompt(&generators, &idea, pitch_file, format).await,
        Command::History { page, limit, format } => cmd_history(&config, page, limit, format),
    }
}

fn open_store(config: &Config) -> Option<PitchStore> {
    if !config.storage.enabled {
        debug!("open_store: storage disabled");
        return None;
    }
    match PitchStore::open(&config.storage.path) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("Pitch history unavailable: {}", e);
            None
        }
    }
}

async fn cmd_serve(config: &Config, generators: Generators, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let state = AppState::new(generators, open_store(config));

    println!("{} Listening on http://{}", "✓".green(), bind.cyan());
    if !state.generators.remote_configured() {
        println!(
            "{} {} is not set: pitch generation disabled, prompts use templates",
            "!".yellow(),
            config.llm.api_key_env
        );
    }
    server::serve(&bind, state).await
}

async fn cmd_pitch(config: &Config, generators: &Generators, idea: &str, format: OutputFormat) -> Result<()> {
    let pitch = generators.pitch.generate(idea).await.map_err(report)?;

    if let Some(store) = open_store(config)
        && let Err(e) = store.save(idea, &pitch)
    {
        warn!("Failed to store pitch: {}", e);
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&pitch)?),
        OutputFormat::Text => {
            println!("{}", pitch.name.bold().green());
            println!("{}\n", pitch.elevator.italic());
            for (i, slide) in pitch.slides.iter().enumerate() {
                println!("{} {}", format!("Slide {}:", i + 1).yellow(), slide);
            }
        }
    }
    Ok(())
}

/// Read and validate `--pitch-file` the same way the API checks `pitchData`
fn read_pitch_file(path: Option<PathBuf>, idea: &str, limit: IdeaLimit) -> Result<Option<PitchContext>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let content =
        fs::read_to_string(&path).context(format!("Failed to read pitch file {}", path.display()))?;
    let value: Value = serde_json::from_str(&content).context(format!("Invalid JSON in {}", path.display()))?;

    let validation = validate(Some(&Value::String(idea.to_string())), Some(&value), limit);
    if !validation.is_valid {
        return Err(report(GenerateError::Validation(validation)));
    }

    let context = serde_json::from_value(value).context(format!("Invalid pitch data in {}", path.display()))?;
    Ok(Some(context))
}

async fn cmd_code_prompt(
    generators: &Generators,
    idea: &str,
    pitch_file: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let context = read_pitch_file(pitch_file, idea, IdeaLimit::Standard)?;
    let result = generators
        .code_prompt
        .generate(idea, context.as_ref())
        .await
        .map_err(report)?;

    match format {
        OutputFormat::Json => {
            let stamped: pitchcraft::domain::TimestampedCodePrompt = result.into();
            println!("{}", serde_json::to_string_pretty(&stamped)?);
        }
        OutputFormat::Text => {
            println!("{} {}", "Summary:".bold(), result.summary);
            println!("{} {}", "Tech stack:".bold(), result.tech_stack.join(", ").cyan());
            println!("{} {}\n", "Features:".bold(), result.features.join(", "));
            println!("{}", result.prompt);
        }
    }
    Ok(())
}

async fn cmd_build_prompt(
    generators: &Generators,
    idea: &str,
    pitch_file: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let context = read_pitch_file(pitch_file, idea, IdeaLimit::Quick)?;
    let result = generators
        .build_prompt
        .generate(idea, context.as_ref())
        .await
        .map_err(report)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            println!("{}", result.prompt);
            println!("\n{}", format!("{} characters", result.character_count).dimmed());
        }
    }
    Ok(())
}

fn cmd_history(config: &Config, page: usize, limit: usize, format: OutputFormat) -> Result<()> {
    if !config.storage.enabled {
        return Err(eyre!("Pitch history is not enabled (set storage.enabled: true in the config)"));
    }
    let store = PitchStore::open(&config.storage.path)?;
    let page = store.list(page, limit)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&page)?),
        OutputFormat::Text => {
            for record in &page.items {
                println!(
                    "{} {} {}",
                    record.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
                    record.name.green(),
                    record.id.yellow()
                );
                println!("    {}", record.elevator);
            }
            println!(
                "{}",
                format!("Page {} of {} ({} pitches)", page.page, page.total_pages.max(1), page.total).dimmed()
            );
        }
    }
    Ok(())
}

/// Print every validation detail before handing the error back
fn report(err: GenerateError) -> eyre::Report {
    if let GenerateError::Validation(result) = &err {
        for detail in &result.details {
            eprintln!("{} {}", "✗".red(), detail);
        }
    }
    eyre::Report::new(err)
}
