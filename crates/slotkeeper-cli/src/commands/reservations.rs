//! Reservation inspection and triage.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use slotkeeper_core::error::AppError;
use slotkeeper_core::types::pagination::PageRequest;
use slotkeeper_core::types::{ChapterId, ReservationId};
use slotkeeper_entity::reservation::{Reservation, ReservationFilter, ReservationStatus};

use crate::output::{self, OutputFormat};

/// Arguments for reservation commands
#[derive(Debug, Args)]
pub struct ReservationsArgs {
    /// Reservation subcommand
    #[command(subcommand)]
    pub command: ReservationsCommand,
}

/// Reservation subcommands
#[derive(Debug, Subcommand)]
pub enum ReservationsCommand {
    /// List reservations
    List {
        /// Status bucket (pending, approved, declined, deleted)
        #[arg(short, long)]
        status: Option<String>,
        /// Slot date
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Chapter
        #[arg(long)]
        chapter: Option<ChapterId>,
        /// Match on name or email
        #[arg(long)]
        search: Option<String>,
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Items per page
        #[arg(long, default_value_t = 50)]
        per_page: u64,
    },
    /// Show counts per status
    Summary,
    /// Move a reservation to another status
    SetStatus {
        /// Reservation ID
        id: ReservationId,
        /// Target status
        status: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct ReservationRow {
    id: String,
    status: String,
    date: String,
    start: String,
    name: String,
    email: String,
    people: i32,
    language: String,
}

impl From<&Reservation> for ReservationRow {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r.id.to_string(),
            status: r.status.to_string(),
            date: r.slot_date.to_string(),
            start: r.slot_start.format("%H:%M").to_string(),
            name: r.name.clone(),
            email: r.email.clone(),
            people: r.people,
            language: r.language.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct SummaryRow {
    status: &'static str,
    count: u64,
}

/// Execute reservation commands
pub async fn execute(
    args: &ReservationsArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let state = super::open_state(config_path).await?;
    let ctx = super::operator_context();

    match &args.command {
        ReservationsCommand::List {
            status,
            date,
            chapter,
            search,
            page,
            per_page,
        } => {
            let filter = ReservationFilter {
                status: status
                    .as_deref()
                    .map(ReservationStatus::from_bucket)
                    .transpose()?,
                date: *date,
                chapter_id: *chapter,
                search: search.clone(),
                ..Default::default()
            };
            let result = state
                .reservation_service
                .list(&ctx, &filter, PageRequest::new(*page, *per_page))
                .await?;
            let rows: Vec<ReservationRow> = result.items.iter().map(ReservationRow::from).collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                println!(
                    "Page {}/{} ({} total)",
                    result.page, result.total_pages, result.total_items
                );
            }
        }
        ReservationsCommand::Summary => {
            let summary = state.reservation_service.summary(&ctx).await?;
            let rows = vec![
                SummaryRow {
                    status: "pending",
                    count: summary.pending,
                },
                SummaryRow {
                    status: "approved",
                    count: summary.approved,
                },
                SummaryRow {
                    status: "declined",
                    count: summary.declined,
                },
                SummaryRow {
                    status: "deleted",
                    count: summary.deleted,
                },
            ];
            output::print_list(&rows, format);
        }
        ReservationsCommand::SetStatus { id, status } => {
            let next = ReservationStatus::from_bucket(status)?;
            let reservation = state
                .reservation_service
                .update_status(&ctx, *id, None, next)
                .await?;
            output::print_success(&format!("Reservation {} is now {}", id, reservation.status));
        }
    }

    Ok(())
}
