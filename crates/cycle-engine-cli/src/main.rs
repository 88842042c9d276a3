//! `cycle` - compute recurring task cycles from the command line.
//!
//! ```bash
//! cycle due --rule '{"type":"daily","value":3}' --at 2024-01-30T09:00:00Z
//! cycle start --rule @rule.json --at 2024-02-02T09:00:00Z --calendar lunar
//! cycle describe --rule '{"type":"weekly","value":2,"weekDay":"Mon"}'
//! cycle lunar --date 2024-09-17
//! ```

use std::fs;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand, ValueEnum};
use cycle_engine::{
    compute_advanced_due, compute_advanced_start, compute_due, compute_start, describe_advanced,
    describe_rule, Computed, CycleContext, DateSystem, LunarTable, TaskRule,
};

#[derive(Parser)]
#[command(name = "cycle", version, about = "Compute recurring task cycles")]
struct Cli {
    /// Log engine diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Due date of the cycle starting at --at
    Due(ComputeArgs),
    /// Start date of the cycle due at --at
    Start(ComputeArgs),
    /// Describe a rule in plain English
    Describe {
        /// Rule as JSON, or @path to a JSON file
        #[arg(long)]
        rule: String,
    },
    /// Convert a Gregorian date to the lunar calendar
    Lunar {
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
    },
}

#[derive(Args)]
struct ComputeArgs {
    /// Rule as JSON, or @path to a JSON file
    #[arg(long)]
    rule: String,

    /// Anchor instant (RFC 3339); defaults to now
    #[arg(long, value_parser = parse_instant)]
    at: Option<DateTime<Utc>>,

    /// Calendar the rule counts in
    #[arg(long, value_enum, default_value_t = Calendar::Solar)]
    calendar: Calendar,

    /// IANA time zone that defines local calendar days
    #[arg(long, default_value = "UTC", value_parser = parse_timezone)]
    timezone: Tz,
}

#[derive(Clone, Copy, ValueEnum)]
enum Calendar {
    Solar,
    Lunar,
}

impl From<Calendar> for DateSystem {
    fn from(calendar: Calendar) -> Self {
        match calendar {
            Calendar::Solar => DateSystem::Solar,
            Calendar::Lunar => DateSystem::Lunar,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    match run(cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<String> {
    match command {
        Command::Due(args) => compute(args, Direction::Due),
        Command::Start(args) => compute(args, Direction::Start),
        Command::Describe { rule } => Ok(match load_rule(&rule)? {
            TaskRule::Simple(rule) => describe_rule(&rule),
            TaskRule::Advanced(rule) => describe_advanced(&rule),
        }),
        Command::Lunar { date } => {
            let lunar = LunarTable::bundled()
                .to_lunar(date)
                .with_context(|| format!("failed to convert {date}"))?;
            Ok(serde_json::to_string_pretty(&lunar)?)
        }
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Due,
    Start,
}

fn compute(args: ComputeArgs, direction: Direction) -> Result<String> {
    let rule = load_rule(&args.rule)?;
    let anchor = args.at.unwrap_or_else(Utc::now);
    let system = DateSystem::from(args.calendar);
    let ctx = CycleContext::new(args.timezone);
    tracing::debug!(%anchor, timezone = %args.timezone, "computing cycle boundary");

    let computed: Computed = match (&rule, direction) {
        (TaskRule::Simple(rule), Direction::Due) => compute_due(anchor, rule, system, &ctx),
        (TaskRule::Simple(rule), Direction::Start) => compute_start(anchor, rule, system, &ctx),
        (TaskRule::Advanced(rule), Direction::Due) => {
            compute_advanced_due(anchor, rule, system, &ctx)
        }
        (TaskRule::Advanced(rule), Direction::Start) => {
            compute_advanced_start(anchor, rule, system, &ctx)
        }
    }?;
    Ok(serde_json::to_string_pretty(&computed)?)
}

/// Parse a rule from inline JSON or from `@path`.
fn load_rule(source: &str) -> Result<TaskRule> {
    let json = match source.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?,
        None => source.to_string(),
    };
    let rule: TaskRule = serde_json::from_str(&json).context("failed to parse rule JSON")?;
    rule.validate()?;
    Ok(rule)
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("'{value}' is not an RFC 3339 instant"))
}

fn parse_timezone(value: &str) -> Result<Tz> {
    value
        .parse::<Tz>()
        .map_err(|_| anyhow!("unknown time zone '{value}'"))
}
