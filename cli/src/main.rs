//! trailguard: audit trail maintenance CLI
//!
//! Verifies, inspects, and (for maintenance) appends to a trailguard hash
//! chain.
//!
//! Usage:
//!   trailguard --store audit/trail.jsonl verify
//!   trailguard --config trailguard.toml verify --first-failure
//!   trailguard verify --checkpoint-records 120 --checkpoint-hash <hex>
//!   trailguard append --action LOGIN --details '{"ip":"1.2.3.4"}' --actor user-42
//!   trailguard list --actor user-42 --since 2024-01-01T00:00:00Z
//!   trailguard checkpoint
//!
//! Exit status: 0 intact / success, 1 tampering detected, 2 operational error.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use trailguard_audit::{open_store, query, ChainWriter, RecordFilter};
use trailguard_contracts::{
    error::{AuditError, AuditResult},
    report::{Checkpoint, VerificationResult, VerifyMode},
};
use trailguard_core::config::{StoreKind, TrailConfig};
use trailguard_verify::ChainVerifier;

// ── CLI definition ────────────────────────────────────────────────────────────

/// trailguard: tamper-evident audit trail tooling.
#[derive(Parser)]
#[command(
    name = "trailguard",
    about = "Verify and inspect a hash-chained audit trail",
    long_about = "Verifies the integrity of a trailguard audit chain, lists its records,\n\
                  and issues checkpoints for incremental verification."
)]
struct Cli {
    /// TOML configuration file.  Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON Lines store to operate on.  Overrides the configured store.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check every hash and link in the chain.
    Verify {
        /// Report every break instead of stopping at the first.
        #[arg(long, conflicts_with = "first_failure")]
        exhaustive: bool,

        /// Stop at the first break.
        #[arg(long)]
        first_failure: bool,

        /// Number of records covered by a previous checkpoint.
        #[arg(long, requires = "checkpoint_hash")]
        checkpoint_records: Option<usize>,

        /// Terminal hash of a previous checkpoint.
        #[arg(long, requires = "checkpoint_records")]
        checkpoint_hash: Option<String>,
    },
    /// Append one record (maintenance use; applications use the library).
    Append {
        #[arg(long)]
        action: String,

        /// JSON payload.  Text that is not valid JSON is stored as a string.
        #[arg(long)]
        details: Option<String>,

        #[arg(long)]
        actor: Option<String>,
    },
    /// Print matching records as JSON Lines, in chain order.
    List {
        #[arg(long)]
        actor: Option<String>,

        #[arg(long)]
        action: Option<String>,

        /// Inclusive lower bound, RFC 3339.
        #[arg(long)]
        since: Option<DateTime<Utc>>,

        /// Exclusive upper bound, RFC 3339.
        #[arg(long)]
        until: Option<DateTime<Utc>>,
    },
    /// Verify the whole chain and print a checkpoint for later runs.
    Checkpoint,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let outcome = run(cli);
    if let Err(e) = &outcome {
        eprintln!("trailguard error: {}", e);
    }
    let code = exit_code(&outcome);
    if code != 0 {
        std::process::exit(code);
    }
}

/// 0 intact / success, 1 tampering detected, 2 operational error.
fn exit_code(outcome: &AuditResult<bool>) -> i32 {
    match outcome {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(_) => 2,
    }
}

/// Returns `Ok(false)` when tampering was detected.
fn run(cli: Cli) -> AuditResult<bool> {
    let config = load_config(&cli)?;
    let store = open_store(&config.store)?;

    match cli.command {
        Command::Verify {
            exhaustive,
            first_failure,
            checkpoint_records,
            checkpoint_hash,
        } => {
            let mode = if first_failure {
                VerifyMode::FirstFailure
            } else if exhaustive {
                VerifyMode::Exhaustive
            } else {
                config.verify.mode
            };
            let verifier = ChainVerifier::new(store, mode);
            let result = match checkpoint_records {
                Some(records) => verifier.verify_from(&Checkpoint {
                    records,
                    terminal_hash: checkpoint_hash,
                })?,
                None => verifier.verify()?,
            };
            Ok(print_report(&result))
        }
        Command::Append {
            action,
            details,
            actor,
        } => {
            let details = details.map(|d| parse_details(&d)).unwrap_or(Value::Null);
            let writer = ChainWriter::from_config(store, &config.writer);
            let record = writer.append(&action, details, actor.as_deref())?;
            println!("{}", to_json(&record)?);
            Ok(true)
        }
        Command::List {
            actor,
            action,
            since,
            until,
        } => {
            let filter = RecordFilter {
                actor_id: actor,
                action,
                since,
                until,
            };
            for record in query(&*store, &filter)? {
                println!("{}", to_json(&record)?);
            }
            Ok(true)
        }
        Command::Checkpoint => {
            let result = ChainVerifier::new(store, config.verify.mode).verify()?;
            match &result {
                VerificationResult::Intact { checkpoint, .. } => {
                    println!("{}", to_json(checkpoint)?);
                    Ok(true)
                }
                VerificationResult::Tampered { .. } => Ok(print_report(&result)),
            }
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn load_config(cli: &Cli) -> AuditResult<TrailConfig> {
    let mut config = match &cli.config {
        Some(path) => TrailConfig::from_file(path)?,
        None => TrailConfig::default(),
    };
    if let Some(path) = &cli.store {
        config.store.kind = StoreKind::File;
        config.store.path = Some(path.clone());
    }
    config.validate()?;
    info!(store = ?config.store.path, "configuration resolved");
    Ok(config)
}

fn parse_details(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn to_json<T: serde::Serialize>(value: &T) -> AuditResult<String> {
    serde_json::to_string(value).map_err(|e| AuditError::Serialization {
        reason: e.to_string(),
    })
}

/// Print a human-readable report; returns true when the chain is intact.
fn print_report(result: &VerificationResult) -> bool {
    match result {
        VerificationResult::Intact {
            records_checked,
            checkpoint,
        } => {
            println!(
                "Audit trail intact: {} record(s) checked, {} in chain.",
                records_checked, checkpoint.records
            );
            if let Some(hash) = &checkpoint.terminal_hash {
                println!("Terminal hash: {}", hash);
            }
            true
        }
        VerificationResult::Tampered {
            records_checked,
            findings,
        } => {
            eprintln!(
                "Tampering detected: {} finding(s) in {} record(s) checked.",
                findings.len(),
                records_checked
            );
            for finding in findings {
                eprintln!("  {}", finding);
            }
            false
        }
    }
}
