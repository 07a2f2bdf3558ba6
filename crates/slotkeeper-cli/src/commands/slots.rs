//! Time slot generation and bulk chapter actions.

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;
use tracing::{info, warn};

use slotkeeper_core::error::AppError;
use slotkeeper_core::types::{ChapterId, ScenarioId, TimeSlotId};
use slotkeeper_database::store::SlotQuery;
use slotkeeper_entity::slot::{DateRange, TimeSlot, TimeWindow};
use slotkeeper_service::{BulkAction, GenerateSlots};

use crate::output::{self, OutputFormat};

/// Arguments for slot commands
#[derive(Debug, Args)]
pub struct SlotsArgs {
    /// Slot subcommand
    #[command(subcommand)]
    pub command: SlotsCommand,
}

/// Slot subcommands
#[derive(Debug, Subcommand)]
pub enum SlotsCommand {
    /// Generate slots for every day of a range
    Generate {
        /// Target chapter
        #[arg(long)]
        chapter: ChapterId,
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
        /// Monday to Friday window, e.g. 09:00-18:00
        #[arg(long)]
        weekday: String,
        /// Weekend window, defaults to the weekday window
        #[arg(long)]
        weekend: Option<String>,
        /// Extra window added on every day, repeatable
        #[arg(long = "range")]
        ranges: Vec<String>,
    },
    /// List slots
    List {
        /// Only chapters of this scenario
        #[arg(long)]
        scenario: Option<ScenarioId>,
        /// Only this chapter
        #[arg(long)]
        chapter: Option<ChapterId>,
        /// Only this date
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Only bookable slots
        #[arg(long)]
        bookable: bool,
    },
    /// Set one slot's availability
    Toggle {
        /// Slot ID
        id: TimeSlotId,
        /// Target availability
        #[arg(long, action = clap::ArgAction::Set)]
        available: bool,
    },
    /// Apply one action to several chapters
    Bulk {
        /// Action to apply
        #[arg(value_enum)]
        action: BulkActionArg,
        /// Target chapters
        #[arg(long = "chapter", required = true, num_args = 1..)]
        chapters: Vec<ChapterId>,
        /// Date for the day-scoped actions
        #[arg(long)]
        date: Option<NaiveDate>,
        /// First day for add-slots
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day for add-slots
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Weekday window for add-slots
        #[arg(long)]
        weekday: Option<String>,
        /// Weekend window for add-slots
        #[arg(long)]
        weekend: Option<String>,
        /// Extra window for add-slots, repeatable
        #[arg(long = "range")]
        ranges: Vec<String>,
        /// Skip the confirmation prompt for destructive actions
        #[arg(short, long)]
        yes: bool,
    },
}

/// Bulk action names
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BulkActionArg {
    /// Delete every unheld slot
    ClearAll,
    /// Delete every unheld slot on a date
    ClearDay,
    /// Block every slot on a date
    DisableDay,
    /// Unblock every unheld slot on a date
    EnableDay,
    /// Generate slots over a range
    AddSlots,
}

#[derive(Debug, Serialize, Tabled)]
struct SlotRow {
    id: String,
    chapter: String,
    date: String,
    start: String,
    end: String,
    available: bool,
    disabled: bool,
}

impl From<&TimeSlot> for SlotRow {
    fn from(s: &TimeSlot) -> Self {
        Self {
            id: s.id.to_string(),
            chapter: s.chapter_id.to_string(),
            date: s.date.to_string(),
            start: s.start_time.format("%H:%M").to_string(),
            end: s.end_time.format("%H:%M").to_string(),
            available: s.is_available,
            disabled: s.is_disabled,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct BulkRow {
    chapter: String,
    success: bool,
    detail: String,
}

/// Parse `HH:MM-HH:MM`.
fn parse_window(value: &str) -> Result<TimeWindow, AppError> {
    let (start, end) = value.split_once('-').ok_or_else(|| {
        AppError::validation(format!("Invalid window '{value}', expected HH:MM-HH:MM"))
    })?;
    TimeWindow::parse(start.trim(), end.trim())
}

fn parse_windows(values: &[String]) -> Result<Vec<TimeWindow>, AppError> {
    values.iter().map(|v| parse_window(v)).collect()
}

fn required<T>(value: Option<T>, flag: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::validation(format!("--{flag} is required for this action")))
}

/// Execute slot commands
pub async fn execute(
    args: &SlotsArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let state = super::open_state(config_path).await?;
    let ctx = super::operator_context();

    match &args.command {
        SlotsCommand::Generate {
            chapter,
            from,
            to,
            weekday,
            weekend,
            ranges,
        } => {
            let req = GenerateSlots {
                chapter_id: *chapter,
                date_range: DateRange::new(*from, *to)?,
                weekday_time: parse_window(weekday)?,
                weekend_time: weekend.as_deref().map(parse_window).transpose()?,
                time_ranges: parse_windows(ranges)?,
            };
            let report = state.generator_service.generate(&ctx, req).await?;
            match format {
                OutputFormat::Json => output::print_json(&report),
                OutputFormat::Table => {
                    let rows: Vec<SlotRow> = report.created.iter().map(SlotRow::from).collect();
                    output::print_list(&rows, format);
                    output::print_success(&format!("{} slot(s) created", report.created.len()));
                    if !report.skipped_existing.is_empty() {
                        output::print_kv(
                            "Already present",
                            &report.skipped_existing.len().to_string(),
                        );
                    }
                    if !report.conflicts.is_empty() {
                        output::print_warning(&format!(
                            "{} day(s) skipped due to overlapping slots",
                            report.conflicts.len()
                        ));
                    }
                }
            }
        }
        SlotsCommand::List {
            scenario,
            chapter,
            date,
            bookable,
        } => {
            let query = SlotQuery {
                scenario_id: *scenario,
                chapter_id: *chapter,
                date: *date,
                only_bookable: *bookable,
                ..Default::default()
            };
            let slots = state.availability_service.list(&query).await?;
            let rows: Vec<SlotRow> = slots.iter().map(SlotRow::from).collect();
            output::print_list(&rows, format);
        }
        SlotsCommand::Toggle { id, available } => {
            let slot = state
                .availability_service
                .toggle(&ctx, *id, *available)
                .await?;
            output::print_list(&[SlotRow::from(&slot)], format);
        }
        SlotsCommand::Bulk {
            action,
            chapters,
            date,
            from,
            to,
            weekday,
            weekend,
            ranges,
            yes,
        } => {
            let action = match action {
                BulkActionArg::ClearAll => BulkAction::ClearAll,
                BulkActionArg::ClearDay => BulkAction::ClearDay {
                    date: required(*date, "date")?,
                },
                BulkActionArg::DisableDay => BulkAction::DisableDay {
                    date: required(*date, "date")?,
                },
                BulkActionArg::EnableDay => BulkAction::EnableDay {
                    date: required(*date, "date")?,
                },
                BulkActionArg::AddSlots => BulkAction::AddSlots {
                    date_range: DateRange::new(required(*from, "from")?, required(*to, "to")?)?,
                    weekday_time: parse_window(&required(weekday.clone(), "weekday")?)?,
                    weekend_time: weekend.as_deref().map(parse_window).transpose()?,
                    time_ranges: parse_windows(ranges)?,
                },
            };

            let destructive = matches!(action, BulkAction::ClearAll | BulkAction::ClearDay { .. });
            if destructive && !*yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Delete unheld slots on {} chapter(s)?",
                        chapters.len()
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            } else if destructive {
                warn!(action = action.name(), "Confirmation skipped with --yes");
            }

            info!(
                action = action.name(),
                chapters = chapters.len(),
                "Applying bulk action from the command line"
            );

            let report = state.bulk_service.apply(&ctx, chapters, &action).await?;
            match format {
                OutputFormat::Json => output::print_json(&report),
                OutputFormat::Table => {
                    let rows: Vec<BulkRow> = report
                        .results
                        .iter()
                        .map(|item| BulkRow {
                            chapter: item.id.to_string(),
                            success: item.success,
                            detail: match (&item.outcome, &item.error) {
                                (_, Some(err)) => format!("{}: {}", err.code, err.message),
                                (Some(outcome), None) => {
                                    serde_json::to_string(outcome).unwrap_or_default()
                                }
                                (None, None) => String::new(),
                            },
                        })
                        .collect();
                    output::print_list(&rows, format);
                }
            }
            if report.is_partial() {
                output::print_warning(&format!(
                    "{} of {} chapter(s) failed",
                    report.failed,
                    report.results.len()
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window() {
        let w = parse_window("09:00 - 18:00").unwrap();
        assert_eq!(w.to_string(), "09:00-18:00");
        assert!(parse_window("09:00").is_err());
        assert!(parse_window("18:00-09:00").is_err());
    }

    #[test]
    fn test_parse_windows_stops_at_first_bad_range() {
        let ok = parse_windows(&["10:00-11:00".into(), "14:00-15:00".into()]).unwrap();
        assert_eq!(ok.len(), 2);
        assert!(parse_windows(&["10:00-11:00".into(), "noon".into()]).is_err());
        assert!(parse_windows(&[]).unwrap().is_empty());
    }
}
