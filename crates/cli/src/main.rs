// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sledz::{CoreError, EngineConfig, ValidationService};
use sledz_domain::{
    CompletedCounts, ErrorKind, ModuleId, Procedure, ProcedureFields, ProcedureRequirement,
    RequirementProgress, ShiftDetails, Specialization, available_years, current_year_at,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use time::Date;
use time::macros::format_description;
use tracing::info;

/// Sledz - validate residency training records from JSON files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a JSON engine configuration file. Defaults apply if omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the specialization JSON file
    #[arg(short, long)]
    specialization: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Validate a candidate procedure
    #[command(visible_alias = "vp")]
    ValidateProcedure {
        /// Path to the procedure fields JSON file
        fields: PathBuf,
    },

    /// Validate a medical shift
    #[command(visible_alias = "vs")]
    ValidateShift {
        /// Path to the shift JSON file
        shift: PathBuf,
    },

    /// List assignable training years and the current year
    #[command(visible_alias = "y")]
    AvailableYears {
        /// Date to derive the current year for (YYYY-MM-DD). Defaults to today.
        #[arg(long, value_parser = parse_date)]
        on: Option<Date>,
    },

    /// Compute a module's progress
    #[command(visible_alias = "p")]
    Progress {
        /// The module id
        #[arg(short, long)]
        module: i64,

        /// Path to the completed counts JSON file
        completed: PathBuf,
    },

    /// Measure procedures against a per-code requirement catalogue
    #[command(visible_alias = "r")]
    Requirements {
        /// Path to the requirement catalogue JSON file
        #[arg(long)]
        catalogue: PathBuf,

        /// Only list requirements that are not yet met
        #[arg(long)]
        unmet: bool,

        /// Path to a JSON array of accepted procedures
        procedures: PathBuf,
    },
}

/// Printed when the engine rejects a record.
#[derive(Debug, Serialize)]
struct Rejection {
    accepted: bool,
    kind: Option<ErrorKind>,
    fields: Vec<&'static str>,
    reason: String,
}

#[derive(Debug, Serialize)]
struct ShiftReport {
    accepted: bool,
    total_minutes: i64,
    display: String,
}

#[derive(Debug, Serialize)]
struct RequirementReport {
    #[serde(flatten)]
    progress: RequirementProgress,
    messages: Vec<String>,
}

#[derive(Debug, Serialize)]
struct YearsReport {
    available_years: Vec<i32>,
    current_year: i32,
    on: Date,
}

fn parse_date(value: &str) -> Result<Date, String> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map_err(|e| format!("invalid date '{value}': {e}"))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let contents: String = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {e}", path.display()))?;
    Ok(value)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints a rule violation as JSON. Any other error is passed through.
fn report(err: CoreError) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match err {
        CoreError::DomainViolation(violation) => {
            print_json(&Rejection {
                accepted: false,
                kind: Some(violation.kind()),
                fields: violation.fields(),
                reason: violation.to_string(),
            })?;
            Ok(ExitCode::FAILURE)
        }
        other @ CoreError::Config(_) => Err(other.into()),
    }
}

impl Command {
    fn run(
        &self,
        service: &ValidationService,
        specialization: &Specialization,
    ) -> Result<ExitCode, Box<dyn std::error::Error>> {
        match self {
            Self::ValidateProcedure { fields } => {
                let fields: ProcedureFields = read_json(fields)?;
                match service.validate_procedure(specialization, &fields) {
                    Ok(procedure) => {
                        print_json(&procedure)?;
                        Ok(ExitCode::SUCCESS)
                    }
                    Err(err) => report(err),
                }
            }
            Self::ValidateShift { shift } => {
                let details: ShiftDetails = read_json(shift)?;
                match service.validate_shift(specialization, &details) {
                    Ok(duration) => {
                        print_json(&ShiftReport {
                            accepted: true,
                            total_minutes: duration.total_minutes(),
                            display: duration.to_string(),
                        })?;
                        Ok(ExitCode::SUCCESS)
                    }
                    Err(err) => report(err),
                }
            }
            Self::AvailableYears { on } => {
                let on: Date = on.unwrap_or_else(|| time::OffsetDateTime::now_utc().date());
                print_json(&YearsReport {
                    available_years: available_years(specialization),
                    current_year: current_year_at(specialization, on),
                    on,
                })?;
                Ok(ExitCode::SUCCESS)
            }
            Self::Progress { module, completed } => {
                let completed: CompletedCounts = read_json(completed)?;
                match service.module_progress(specialization, ModuleId::new(*module), &completed) {
                    Ok(progress) => {
                        print_json(&progress)?;
                        Ok(ExitCode::SUCCESS)
                    }
                    Err(err) => report(err),
                }
            }
            Self::Requirements {
                catalogue,
                unmet,
                procedures,
            } => {
                let catalogue: Vec<ProcedureRequirement> = read_json(catalogue)?;
                let procedures: Vec<Procedure> = read_json(procedures)?;
                let visible: Vec<Procedure> = service
                    .visible_procedures(specialization, &procedures)
                    .into_iter()
                    .cloned()
                    .collect();
                let progress: Vec<RequirementProgress> = if *unmet {
                    service.unmet_procedure_requirements(&catalogue, &visible)
                } else {
                    service.procedure_requirements(&catalogue, &visible)
                };
                let reports: Vec<RequirementReport> = progress
                    .into_iter()
                    .map(|progress| RequirementReport {
                        messages: progress.messages(),
                        progress,
                    })
                    .collect();
                print_json(&reports)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing. Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config: EngineConfig = if let Some(path) = &args.config {
        info!("Loading configuration from: {}", path.display());
        EngineConfig::load(path)?
    } else {
        info!("Using default configuration");
        EngineConfig::default()
    };

    let specialization: Specialization = read_json(&args.specialization)?;
    info!(
        specialization = %specialization.id(),
        regime = %specialization.smk_version(),
        active_module = ?specialization.active_module_id(),
        "Loaded specialization"
    );

    let service: ValidationService = ValidationService::new(config);
    args.command.run(&service, &specialization)
}
