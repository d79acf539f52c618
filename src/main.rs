use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::{ArgGroup, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

mod classify;
mod db;
mod models;
mod monitor;
mod reading;
mod report;
mod risk;
mod transport;

use classify::EmotionAnalysis;
use monitor::{BreakdownMonitor, Evaluation};
use reading::Reading;
use transport::{LogDialer, LogNotifier};

#[derive(Parser)]
#[command(name = "breakdown-escalation")]
#[command(about = "Breakdown detection and caregiver escalation", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load demo users and caregivers
    Seed,
    /// Register a caregiver for a user
    AddCaregiver {
        #[arg(long)]
        user: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
    },
    /// Remove a caregiver from a user by email
    RemoveCaregiver {
        #[arg(long)]
        user: String,
        #[arg(long)]
        email: String,
    },
    /// List a user's caregivers
    Caregivers {
        #[arg(long)]
        user: String,
    },
    /// Import caregivers from a CSV file
    ImportCaregivers {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Feed readings through a live monitor for a user
    #[command(group(
        ArgGroup::new("input")
            .args(["readings", "analyses"])
            .required(true)
            .multiple(false)
    ))]
    Monitor {
        #[arg(long)]
        user: String,
        /// CSV with intensity,stress columns (0-100)
        #[arg(long)]
        readings: Option<PathBuf>,
        /// Treat reading columns as 0-10 scores
        #[arg(long, requires = "readings")]
        scaled: bool,
        /// CSV with emotion,confidence,text columns from the classifier
        #[arg(long)]
        analyses: Option<PathBuf>,
        /// Delay between rows in milliseconds
        #[arg(long, default_value_t = 0)]
        pause_ms: u64,
    },
    /// Generate a markdown escalation report
    Report {
        #[arg(long)]
        user: Option<String>,
        #[arg(long, default_value_t = 30)]
        since_days: i64,
        #[arg(long, default_value = "escalations.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set to a Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::AddCaregiver {
            user,
            name,
            phone,
            email,
        } => {
            let caregiver = db::validate_caregiver(&name, &phone, &email)?;
            db::add_caregiver(&pool, &user, &caregiver).await?;
            println!("Added {} ({}) for {}.", caregiver.name, caregiver.email, user);
        }
        Commands::RemoveCaregiver { user, email } => {
            let removed = db::remove_caregiver(&pool, &user, &email).await?;
            if removed == 0 {
                println!("No caregiver {email} found for {user}.");
            } else {
                println!("Removed {email} from {user}.");
            }
        }
        Commands::Caregivers { user } => {
            let user_id = db::find_user_id(&pool, &user)
                .await?
                .with_context(|| format!("no user registered with email {user}"))?;
            let caregivers = db::list_caregivers(&pool, user_id).await?;
            if caregivers.is_empty() {
                println!("No caregivers on file for {user}.");
            }
            for caregiver in caregivers {
                let phone = if caregiver.phone.is_empty() {
                    "no phone"
                } else {
                    caregiver.phone.as_str()
                };
                println!("- {} ({}, {})", caregiver.name, caregiver.email, phone);
            }
        }
        Commands::ImportCaregivers { csv } => {
            let inserted = db::import_caregivers_csv(&pool, &csv).await?;
            println!("Inserted {inserted} caregivers from {}.", csv.display());
        }
        Commands::Monitor {
            user,
            readings,
            scaled,
            analyses,
            pause_ms,
        } => {
            let user_id = db::find_user_id(&pool, &user)
                .await?
                .with_context(|| format!("no user registered with email {user}"))?;
            let input = match (readings, analyses) {
                (Some(path), _) => load_readings(&path, scaled)?,
                (None, Some(path)) => load_analyses(&path)?,
                (None, None) => anyhow::bail!("either --readings or --analyses is required"),
            };
            run_monitor(&pool, user_id, input, Duration::from_millis(pause_ms)).await?;
        }
        Commands::Report {
            user,
            since_days,
            out,
        } => {
            let since = Utc::now() - chrono::Duration::days(since_days.max(1));
            let escalations = db::fetch_escalations(&pool, since, user.as_deref()).await?;
            let contacts = db::fetch_contacts(&pool, since, user.as_deref()).await?;
            let report = report::build_report(user.as_deref(), since, &escalations, &contacts);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn load_readings(path: &Path, scaled: bool) -> anyhow::Result<Vec<Reading>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        intensity: f64,
        stress: f64,
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut readings = Vec::new();
    if scaled {
        for result in reader.deserialize::<CsvRow>() {
            let row = result?;
            readings.push(Reading::from_scaled(row.intensity, row.stress));
        }
        return Ok(readings);
    }

    for (line, result) in reader.deserialize::<Reading>().enumerate() {
        match result {
            Ok(reading) => readings.push(reading),
            Err(err) if matches!(err.kind(), csv::ErrorKind::Deserialize { .. }) => {
                warn!(row = line + 1, error = %err, "skipping invalid reading")
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(readings)
}

fn load_analyses(path: &Path) -> anyhow::Result<Vec<Reading>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut readings = Vec::new();
    for (line, result) in reader.deserialize::<EmotionAnalysis>().enumerate() {
        let analysis = result?;
        match analysis.to_reading() {
            Some(reading) => readings.push(reading),
            None => debug!(row = line + 1, emotion = %analysis.emotion, "no distress detected"),
        }
    }
    Ok(readings)
}

async fn run_monitor(
    pool: &PgPool,
    user_id: uuid::Uuid,
    readings: Vec<Reading>,
    pause: Duration,
) -> anyhow::Result<()> {
    let monitor = BreakdownMonitor::new(
        user_id,
        Arc::new(db::PgCaregiverStore::new(pool.clone())),
        Arc::new(LogNotifier),
        Arc::new(LogDialer),
    );

    let mut events = monitor.subscribe();
    let recorder_pool = pool.clone();
    let recorder = tokio::spawn(async move {
        let mut recorded = 0usize;
        loop {
            match events.recv().await {
                Ok(report) => match db::record_escalation(&recorder_pool, &report).await {
                    Ok(()) => recorded += 1,
                    Err(err) => error!(escalation_id = %report.id, error = %err, "failed to record escalation"),
                },
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "escalation recorder fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
        recorded
    });

    info!(user_id = %monitor.user_id(), readings = readings.len(), "monitoring started");
    let (mut calm, mut suppressed, mut escalated) = (0usize, 0usize, 0usize);
    for reading in readings {
        let evaluation = monitor.update_metrics(reading).await;
        if let Some(report) = evaluation.report() {
            let delivered = report.contacts.iter().filter(|c| c.is_success()).count();
            info!(
                status = report.status.as_str(),
                delivered,
                contacts = report.contacts.len(),
                "escalation complete"
            );
        }
        match evaluation {
            Evaluation::Calm => calm += 1,
            Evaluation::Suppressed => suppressed += 1,
            Evaluation::Escalated(_) => escalated += 1,
        }
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }

    let metrics = monitor.metrics();
    debug!(
        intensity = %metrics.emotion_intensity,
        stress = %metrics.stress_level,
        trigger_count = metrics.trigger_count,
        "final metrics"
    );
    monitor.shutdown();
    drop(monitor);
    let recorded = recorder.await?;

    println!(
        "Processed {} readings: {calm} calm, {suppressed} suppressed, {escalated} escalated ({recorded} recorded).",
        calm + suppressed + escalated
    );
    Ok(())
}
