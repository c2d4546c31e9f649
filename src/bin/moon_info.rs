//! Moon Phase Information Tool
//!
//! This binary answers lunar phase questions from the command line: whether a
//! date has a full moon, when the next full moon (or other phase) occurs, which
//! phases fall on a date, and the Moon's illumination at an instant.
//!
//! Usage:
//!   cargo run --bin moon_info -- is-full 2018-01-02
//!   cargo run --bin moon_info -- next --from "2018-01-04 08:54:00"
//!   cargo run --bin moon_info -- --json phases 2018-01-24
//!
//! Set `RUST_LOG=debug` to trace the phase search.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, Subcommand};
use fullmoon::almanac::{AlmanacConfig, MoonAlmanac};
use fullmoon::phase::{CorrectionSeries, PhaseType};
use fullmoon::search::PhaseWindow;
use fullmoon::time::{parse_date, unix_seconds_to_datetime, Clock, SystemClock};
use fullmoon::MoonDetail;
use serde::Serialize;

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Moon Phase Information Tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Full moon detection and lunar phase predictions",
    long_about = None
)]
struct Args {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Apply every periodic correction term instead of the leading term only
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    complete_series: bool,

    /// Print results as JSON
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report whether a date contains a full moon
    IsFull {
        /// Calendar date, e.g. 2018-01-02
        date: String,
    },
    /// Predict the next occurrence of a phase
    Next {
        /// Start instant (defaults to now)
        #[arg(short, long)]
        from: Option<String>,

        /// Phase to look for: new, first-quarter, full, last-quarter, a tag 0-3 or a fraction
        #[arg(short, long, default_value = "full", value_parser = parse_phase)]
        phase: PhaseType,
    },
    /// List the principal phases falling on a date
    Phases {
        /// Calendar date, e.g. 2018-01-24
        date: String,
    },
    /// Show the Moon's illumination and position
    Detail {
        /// Instant to evaluate (defaults to now)
        date: Option<String>,
    },
}

fn parse_phase(s: &str) -> std::result::Result<PhaseType, String> {
    s.parse()
}

#[derive(Serialize)]
struct NextPhaseReport {
    phase: PhaseType,
    unix_seconds: i64,
    utc: DateTime<Utc>,
}

/// Prints a section header with a title and separator line
fn print_section_header(title: &str) {
    println!("\n{}:", title);
    println!("-------------------------------------------------------");
}

/// Helper to print named values in a formatted way
fn print_named_value(name: &str, value: impl std::fmt::Display) {
    println!("{}: {}", name, value);
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(args: &Args) -> Result<AlmanacConfig> {
    let mut config = match &args.config {
        Some(path) => AlmanacConfig::from_json_file(path)?,
        None => AlmanacConfig::default(),
    };
    if args.complete_series {
        config.correction_series = CorrectionSeries::Complete;
    }
    Ok(config)
}

fn resolve_instant(input: Option<&str>) -> Result<DateTime<Utc>> {
    match input {
        Some(s) => Ok(parse_date(s)?),
        None => Ok(SystemClock.now()),
    }
}

fn display_phases(date: &str, window: &PhaseWindow) {
    print_section_header(&format!("Phases around {}", date));
    if window.is_empty() {
        println!("No principal phase within the window.");
        return;
    }
    for event in &window.events {
        let utc = unix_seconds_to_datetime(event.unix_seconds.floor() as i64)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|_| "out of range".to_string());
        println!(
            "{:<14} lunation {:>5}  JD {:.5}  {}",
            event.phase.name(),
            event.lunation,
            event.julian_date,
            utc
        );
    }
}

fn display_detail(instant: &DateTime<Utc>, detail: &MoonDetail) {
    print_section_header(&format!("Moon at {}", instant.to_rfc3339()));
    print_named_value("Julian date", format!("{:.6}", detail.julian_date));
    print_named_value(
        "Illuminated fraction",
        format!("{:.2}%", detail.illuminated_fraction * 100.0),
    );
    print_named_value("Phase fraction", format!("{:.4}", detail.phase_fraction));
    print_named_value("Age", format!("{:.2} days", detail.age_days));
    print_named_value("Distance", format!("{:.0} km", detail.moon_distance_km));
    print_named_value(
        "Angular diameter",
        format!("{:.4} deg", detail.moon_angular_diameter),
    );
    print_named_value("Parallax", format!("{:.4} deg", detail.moon_parallax));
    print_named_value(
        "Ecliptic position",
        format!(
            "lon {:.3} deg, lat {:.3} deg",
            detail.moon_longitude, detail.moon_latitude
        ),
    );
    print_named_value("Sun distance", format!("{:.0} km", detail.sun_distance_km));
    print_named_value(
        "Sun angular diameter",
        format!("{:.4} deg", detail.sun_angular_diameter),
    );
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let almanac = MoonAlmanac::new().with_config(load_config(&args)?)?;

    match &args.command {
        Command::IsFull { date } => {
            let full = almanac.is_full_moon(date)?;
            if args.json {
                print_json(&serde_json::json!({ "date": date, "full_moon": full }))?;
            } else {
                print_named_value(date, if full { "full moon" } else { "no full moon" });
            }
        }
        Command::Next { from, phase } => {
            let from = resolve_instant(from.as_deref())?;
            let seconds = almanac.next_phase_from(from, *phase)?;
            let report = NextPhaseReport {
                phase: *phase,
                unix_seconds: seconds,
                utc: unix_seconds_to_datetime(seconds)?,
            };
            if args.json {
                print_json(&report)?;
            } else {
                print_named_value(
                    &format!("Next {}", phase),
                    format!("{} ({})", report.utc.to_rfc3339(), report.unix_seconds),
                );
            }
        }
        Command::Phases { date } => {
            let window = almanac.phases_on(date)?;
            if args.json {
                print_json(&window)?;
            } else {
                display_phases(date, &window);
            }
        }
        Command::Detail { date } => {
            let instant = resolve_instant(date.as_deref())?;
            let detail = almanac.moon_detail_at(instant)?;
            if args.json {
                print_json(&detail)?;
            } else {
                display_detail(&instant, &detail);
            }
        }
    }

    Ok(())
}
