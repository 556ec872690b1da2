use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use macrowatch::audit::AuditLog;
use macrowatch::config::Config;
use macrowatch::feed::HttpFeedClient;
use macrowatch::notify::{WebhookConfig, WebhookSink};
use macrowatch::pipeline::{
    AlertPipeline, AlertPipelineConfig, SessionPipeline, SessionPipelineConfig,
};
use macrowatch::scheduler::{slots, TriggerRegistry};

#[derive(Parser)]
#[command(
    name = "macrowatch",
    version,
    about = "Economic calendar alert scheduler with timezone-correct triggers",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the alert and session pipelines
    Run {
        /// Configuration file path (falls back to environment variables)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Run one pipeline pass and exit instead of looping
        #[arg(long, default_value = "false")]
        once: bool,
    },

    /// Print the generated session slot plan for one month
    Slots {
        /// Target year
        year: i32,

        /// Target month (1-12)
        month: u32,

        /// Configuration file path (falls back to environment variables)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate configuration and exit
    Check {
        /// Configuration file path (falls back to environment variables)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    match cli.command {
        Commands::Run { config, once } => {
            let config = load_config(config)?;
            run(config, once).await?;
        }

        Commands::Slots {
            year,
            month,
            config,
        } => {
            let config = load_config(config)?;
            print_slots(&config, year, month)?;
        }

        Commands::Check { config } => {
            let config = load_config(config)?;
            println!("configuration ok");
            println!("  timezone: {}", config.timezone()?);
            println!("  feed: {}", config.feed.url);
            println!("  refresh every {} min", config.pipeline.interval_minutes);
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(&path)?,
        None => Config::from_env()?,
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("macrowatch=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("macrowatch=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

async fn run(config: Config, once: bool) -> Result<()> {
    let tz = config.timezone()?;

    let feed = Arc::new(HttpFeedClient::new(
        &config.feed.url,
        config.request_timeout(),
    )?);

    let mut webhook = WebhookConfig::new(&config.delivery.webhook_url);
    if let Some(token) = &config.delivery.auth_token {
        webhook = webhook.with_auth_token(token);
    }
    let sink = Arc::new(WebhookSink::new(webhook)?);

    let alert_pipeline = Arc::new(AlertPipeline::new(
        feed,
        Arc::clone(&sink) as _,
        Arc::new(TriggerRegistry::new("alerts", tz)),
        AlertPipelineConfig {
            timezone: tz,
            filter: config.event_filter(),
            daily_time: config.daily_alert_time()?,
            pre_event_lead: config.pre_event_lead(),
            destination: config.calendar.destination.clone(),
        },
    ));

    let session_pipeline = Arc::new(SessionPipeline::new(
        sink,
        Arc::new(TriggerRegistry::new("sessions", tz)),
        AuditLog::new(&config.sessions.audit_dir),
        SessionPipelineConfig {
            anchor: config.anchor()?,
            pattern: config.sessions.pattern_hours.clone(),
            timezone: tz,
            lead: config.session_lead(),
            destination: config.sessions.destination.clone(),
        },
    ));

    if once {
        let installed = session_pipeline.refresh_current_month().await?;
        let report = alert_pipeline.run_once().await?;
        println!(
            "one pass complete: {} event triggers, {} session triggers",
            report.installed, installed
        );
        alert_pipeline.registry().cancel_all().await;
        session_pipeline.registry().cancel_all().await;
        return Ok(());
    }

    let alerts = Arc::clone(&alert_pipeline);
    let interval = config.refresh_interval();
    let alert_task = tokio::spawn(async move { alerts.start(interval).await });

    let sessions = Arc::clone(&session_pipeline);
    let session_task = tokio::spawn(async move { sessions.start().await });

    tracing::info!("macrowatch running, press Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    println!("\nShutdown signal received, stopping...");

    alert_pipeline.stop().await;
    session_pipeline.stop().await;
    let _ = alert_task.await;
    let _ = session_task.await;

    alert_pipeline.registry().cancel_all().await;
    session_pipeline.registry().cancel_all().await;

    tracing::info!("shutdown complete");
    Ok(())
}

fn print_slots(config: &Config, year: i32, month: u32) -> Result<()> {
    let tz = config.timezone()?;
    let plan = slots::generate(
        config.anchor()?,
        &config.sessions.pattern_hours,
        year,
        month,
        tz,
    )?;

    print!("{}", plan.display(tz));
    if plan.truncated {
        println!("warning: generation hit the cycle cap before passing the month");
    }
    Ok(())
}
