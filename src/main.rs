use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use serde::Deserialize;

use rusty_rally::handlers::{poll_results, submit_ballot};
use rusty_rally::models::{Actor, Ballot, TimeFormat, UserPreferences};
use rusty_rally::{Config, CreatePollWizard, Database, PollStore, StepData, StepOutcome};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "rusty-rally", about = "Find a date that works for everyone")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the creation wizard over a JSON script of steps
    Create { file: PathBuf },
    /// Add a participant's ballot (JSON) to a poll
    Vote { poll_id: String, file: PathBuf },
    /// Print the tally for a poll
    Results { poll_id: String },
    /// Manage a user's display preferences
    Prefs {
        user_id: String,
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Subcommand)]
enum PrefsAction {
    Show,
    Set {
        #[arg(long)]
        time_zone: Option<String>,
        #[arg(long)]
        week_start: Option<u8>,
        /// hours12 or hours24
        #[arg(long)]
        time_format: Option<String>,
    },
    Delete,
}

/// A recorded wizard session: who is creating the poll and what they typed.
#[derive(Deserialize)]
struct CreateScript {
    actor: Actor,
    steps: Vec<StepData>,
}

#[tokio::main]
async fn main() {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    let database = match Database::new(&config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.command, &database, &config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command, database: &Database, config: &Config) -> Result<(), BoxError> {
    match command {
        Command::Create { file } => {
            let script: CreateScript = serde_json::from_str(&tokio::fs::read_to_string(&file).await?)?;
            let wizard = CreatePollWizard::from_config(script.actor, config);
            for data in script.steps {
                match wizard.submit_step(database, data).await? {
                    StepOutcome::Advanced { current_step } => {
                        info!("Moved on to step {}", current_step + 1)
                    }
                    StepOutcome::Created(created) => {
                        println!("{}", created.id);
                        return Ok(());
                    }
                }
            }
            warn!("Script ended before the last step; no poll was created");
            Ok(())
        }
        Command::Vote { poll_id, file } => {
            let ballot: Ballot = serde_json::from_str(&tokio::fs::read_to_string(&file).await?)?;
            let participant = submit_ballot(database, &poll_id, ballot).await?;
            println!("{}", participant.id);
            Ok(())
        }
        Command::Results { poll_id } => {
            let results = poll_results(database, &poll_id).await?;
            println!("{}", results.summary);
            Ok(())
        }
        Command::Prefs { user_id, action } => match action {
            PrefsAction::Show => {
                let prefs = database.get_user_preferences(&user_id).await?;
                println!("{}", serde_json::to_string_pretty(&prefs.unwrap_or_default())?);
                Ok(())
            }
            PrefsAction::Set {
                time_zone,
                week_start,
                time_format,
            } => {
                let time_format = match time_format {
                    Some(raw) => Some(
                        TimeFormat::parse(&raw).ok_or_else(|| format!("unknown time format: {}", raw))?,
                    ),
                    None => None,
                };
                let prefs = UserPreferences {
                    time_zone,
                    week_start,
                    time_format,
                };
                prefs.validate()?;
                database.upsert_user_preferences(&user_id, &prefs).await?;
                Ok(())
            }
            PrefsAction::Delete => {
                database.delete_user_preferences(&user_id).await?;
                Ok(())
            }
        },
    }
}
