//! wolfpack - drive the events skill core from the command line.
//!
//! Stands in for the voice platform: dates and names come in as arguments,
//! events come from a JSON file, session state is read from and written back
//! to a JSON file, and every result is printed as JSON on stdout.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use wolfpack_core::{
    best_match_scored, resolve_date_code_with_options, Conversation, InMemoryEvents, Intent,
    Outcome, SessionState, SkillConfig, SkillError, Turn,
};

#[derive(Parser)]
#[command(name = "wolfpack", version, about = "Campus events skill: dates, names, and turns")]
struct Cli {
    /// JSON config file (timezone, minimal_days_in_first_week, max_events)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log resolution steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a date slot code (e.g. 2016-W44, 2016-11, 2016-11-01) into a range
    Resolve {
        /// Date code as sent by the voice platform
        code: String,

        /// Local date to resolve against (defaults to today in the configured timezone)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Pick the candidate most similar to a spoken name
    Match {
        /// The spoken, possibly misheard, name
        query: String,

        /// Candidate names, in presentation order
        #[arg(required = true)]
        candidates: Vec<String>,
    },

    /// Run one conversation turn
    Turn {
        /// Platform intent name (e.g. GetEventsOnDateIntent, SportsCategoryIntent)
        intent: String,

        /// Slot value as NAME=VALUE (e.g. date=2016-W44, eventName="art show")
        #[arg(long = "slot", value_parser = parse_slot)]
        slots: Vec<(String, String)>,

        /// JSON array of event records
        #[arg(long)]
        events: PathBuf,

        /// Session state file; a missing file means a fresh session
        #[arg(long)]
        session: Option<PathBuf>,

        /// Write the next state back to the session file
        #[arg(long, requires = "session")]
        update_session: bool,

        /// Local date to resolve against; the turn runs at its midnight
        #[arg(long, conflicts_with = "now")]
        today: Option<NaiveDate>,

        /// Local time of the turn, e.g. 2016-11-01T08:00:00 (defaults to now in
        /// the configured timezone)
        #[arg(long)]
        now: Option<NaiveDateTime>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Resolve { code, today } => {
            let today = resolve_today(&config, today)?;
            match resolve_date_code_with_options(&code, today, &config.resolve_options()) {
                Ok(range) => print_json(&serde_json::to_value(&range)?),
                Err(e) => print_json(&json!({ "error": error_report(&e) })),
            }
        }
        Command::Match { query, candidates } => {
            let found = best_match_scored(&query, candidates.iter().map(String::as_str))?;
            print_json(&json!({ "candidate": found.candidate, "score": found.score }))
        }
        Command::Turn {
            intent,
            slots,
            events,
            session,
            update_session,
            today,
            now,
        } => {
            let now = resolve_now(&config, today, now)?;
            let source = load_events(&events)?;
            let state = match &session {
                Some(path) => load_session(path)?,
                None => SessionState::Idle,
            };

            let conversation = Conversation::from_config(&source, &config)?;
            let slots: HashMap<String, String> = slots.into_iter().collect();

            let turn = match Intent::from_request(&intent, &slots) {
                Ok(intent) => conversation.handle(state, intent, now),
                Err(e) => Turn {
                    state,
                    outcome: Err(e),
                },
            };

            if update_session {
                if let Some(path) = &session {
                    let body = serde_json::to_string_pretty(&turn.state)?;
                    fs::write(path, body)
                        .with_context(|| format!("writing session {}", path.display()))?;
                }
            }

            let mut report = json!({ "session": serde_json::to_value(&turn.state)? });
            match &turn.outcome {
                Ok(outcome) => report["outcome"] = outcome_report(outcome, &source)?,
                Err(e) => report["error"] = error_report(e),
            }
            print_json(&report)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SkillConfig> {
    let Some(path) = path else {
        return Ok(SkillConfig::default());
    };
    let body =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    SkillConfig::from_json(&body).with_context(|| format!("loading config {}", path.display()))
}

fn load_events(path: &Path) -> Result<InMemoryEvents> {
    let body =
        fs::read_to_string(path).with_context(|| format!("reading events {}", path.display()))?;
    let events = InMemoryEvents::from_json(&body)
        .with_context(|| format!("loading events {}", path.display()))?;
    tracing::debug!(count = events.len(), path = %path.display(), "loaded events");
    Ok(events)
}

fn load_session(path: &Path) -> Result<SessionState> {
    if !path.exists() {
        return Ok(SessionState::Idle);
    }
    let body =
        fs::read_to_string(path).with_context(|| format!("reading session {}", path.display()))?;
    serde_json::from_str(&body).with_context(|| format!("parsing session {}", path.display()))
}

fn resolve_today(config: &SkillConfig, today: Option<NaiveDate>) -> Result<NaiveDate> {
    match today {
        Some(today) => Ok(today),
        None => Ok(config.today(Utc::now())?),
    }
}

fn resolve_now(
    config: &SkillConfig,
    today: Option<NaiveDate>,
    now: Option<NaiveDateTime>,
) -> Result<NaiveDateTime> {
    match (now, today) {
        (Some(now), _) => Ok(now),
        (None, Some(today)) => Ok(today.and_time(NaiveTime::MIN)),
        (None, None) => Ok(config.local_now(Utc::now())?),
    }
}

/// The outcome as JSON; a matched event also carries the detail asked for.
fn outcome_report(outcome: &Outcome, source: &InMemoryEvents) -> Result<Value> {
    let mut report = serde_json::to_value(outcome)?;
    if let Outcome::ResolvedSingle { id, detail, .. } = outcome {
        let value = source.get(*id).and_then(|record| record.detail(*detail));
        report[detail.key()] = value.map_or(Value::Null, Value::from);
    }
    Ok(report)
}

fn error_report(error: &SkillError) -> Value {
    json!({
        "kind": error.kind(),
        "message": error.to_string(),
        "speech": error.user_message(),
    })
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_slot(s: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    Ok((name.to_string(), value.to_string()))
}
