use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, load_settings_from},
    AdvisorSession, CycleError, FeedbackOutcome, PredictionClient, Settings,
};
use shared::domain::{label_for, ACTION_CATALOG};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "BeeAgent apiary advisor")]
struct Cli {
    /// Overrides the configured backend base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit one observation, wait for the recommendation and optionally
    /// answer it.
    Predict {
        #[arg(long, allow_negative_numbers = true)]
        temperature: f64,
        #[arg(long, allow_negative_numbers = true)]
        humidity: f64,
        #[arg(long, allow_negative_numbers = true)]
        frames: i64,
        #[arg(long, allow_negative_numbers = true)]
        strength: i64,
        /// 1 if varroa is present, 0 otherwise.
        #[arg(long, allow_negative_numbers = true)]
        varroa: i64,
        /// Accept the recommendation.
        #[arg(long, conflicts_with = "correct_to")]
        accept: bool,
        /// Reject the recommendation and send this action code instead.
        #[arg(long)]
        correct_to: Option<String>,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// List action codes and their labels.
    Actions,
    /// Show the backend agent status.
    AgentStatus {
        #[arg(long)]
        json: bool,
    },
}

fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings(),
    };
    if let Some(api_url) = &cli.api_url {
        settings.api_base_url = api_url.clone();
    }
    Ok(settings)
}

/// Prefers the message the form state shows over the raw error.
fn shown_error(state_error: Option<&str>, err: &CycleError) -> String {
    state_error.map_or_else(|| err.to_string(), str::to_string)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;

    match cli.command {
        Command::Actions => {
            for option in ACTION_CATALOG {
                println!("{:<20} {}", option.code, option.label);
            }
        }
        Command::AgentStatus { json } => {
            let client = PredictionClient::from_settings(&settings)?;
            let service = client
                .service_info()
                .await
                .with_context(|| format!("failed to reach {}", client.base_url()))?;
            let status = client
                .agent_status()
                .await
                .with_context(|| format!("failed to reach {}", client.base_url()))?;
            if json {
                let combined = serde_json::json!({ "service": service, "agent": status });
                println!("{}", serde_json::to_string_pretty(&combined)?);
            } else {
                match &service.version {
                    Some(version) => println!("{} (v{version})", service.message),
                    None => println!("{}", service.message),
                }
                println!(
                    "running={} processed={} avg_ms={:.1} queued={}",
                    status.is_running,
                    status.processed_count,
                    status.avg_processing_time_ms,
                    status.queue_size
                );
            }
        }
        Command::Predict {
            temperature,
            humidity,
            frames,
            strength,
            varroa,
            accept,
            correct_to,
            comment,
        } => {
            let client = PredictionClient::from_settings(&settings)?;
            info!(base_url = client.base_url(), "starting advisor cycle");
            let mut session = AdvisorSession::new(client);
            session.state.form.temperature = Some(temperature);
            session.state.form.humidity = Some(humidity);
            session.state.form.frames = Some(frames);
            session.state.form.strength = Some(strength);
            session.state.form.varroa = Some(varroa);
            session.state.comment = comment;

            let prediction = match session.predict().await {
                Ok(prediction) => prediction,
                Err(err) => bail!(shown_error(session.state.error(), &err)),
            };
            println!("Observation ID: {}", prediction.observation_id);
            match prediction.confidence {
                Some(confidence) => println!(
                    "Preporuka agenta: {} ({:.0}%)",
                    prediction.label(),
                    confidence * 100.0
                ),
                None => println!("Preporuka agenta: {}", prediction.label()),
            }

            let outcome = if accept {
                session.send_feedback(true, None).await
            } else if let Some(code) = correct_to.as_deref() {
                session.send_feedback(false, Some(code)).await
            } else {
                return Ok(());
            };

            match outcome {
                Ok(FeedbackOutcome::Sent) => {
                    println!("Hvala! Model je naučio iz tvog feedbacka.");
                    if let Some(code) = correct_to {
                        println!("Ispravak poslan: {}", label_for(&code));
                    }
                }
                Ok(FeedbackOutcome::Skipped) => {
                    println!("Feedback nije poslan: nije odabrana akcija.");
                }
                Err(err) => bail!(shown_error(session.state.error(), &err)),
            }
        }
    }

    Ok(())
}
