//! Applies one slot operation to a set of chapters.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use slotkeeper_auth::rbac::{RbacEnforcer, SystemPermission};
use slotkeeper_core::error::AppError;
use slotkeeper_core::types::ChapterId;
use slotkeeper_database::store::SlotChange;
use slotkeeper_entity::slot::{DateRange, TimeWindow};

use super::report::BulkReport;
use crate::context::RequestContext;
use crate::reservation::service::unique;
use crate::slot::{AvailabilityService, GenerateSlots, SlotGeneratorService};

/// The operation to apply to every selected chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "action",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum BulkAction {
    /// Delete every unheld slot.
    ClearAll,
    /// Delete every unheld slot on one date.
    ClearDay {
        /// Target date.
        date: NaiveDate,
    },
    /// Block every slot on one date.
    DisableDay {
        /// Target date.
        date: NaiveDate,
    },
    /// Unblock every unheld slot on one date.
    EnableDay {
        /// Target date.
        date: NaiveDate,
    },
    /// Generate slots over a date range.
    AddSlots {
        /// Inclusive date range.
        date_range: DateRange,
        /// Window used Monday to Friday.
        weekday_time: TimeWindow,
        /// Window used on weekends, defaults to the weekday window.
        #[serde(default)]
        weekend_time: Option<TimeWindow>,
        /// Further windows generated on every day.
        #[serde(default)]
        time_ranges: Vec<TimeWindow>,
    },
}

impl BulkAction {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClearAll => "clearAll",
            Self::ClearDay { .. } => "clearDay",
            Self::DisableDay { .. } => "disableDay",
            Self::EnableDay { .. } => "enableDay",
            Self::AddSlots { .. } => "addSlots",
        }
    }
}

/// What the action did to one chapter.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BulkOutcome {
    /// Result of `addSlots`.
    #[serde(rename_all = "camelCase")]
    Generated {
        /// Slots created.
        created: usize,
        /// Dates that already had the slot.
        skipped_existing: usize,
        /// Dates with an overlapping slot.
        conflicts: usize,
    },
    /// Result of the day and clear actions.
    Changed(SlotChange),
}

/// Runs slot operations chapter by chapter.
#[derive(Clone)]
pub struct BulkService {
    /// Slot generator.
    generator: Arc<SlotGeneratorService>,
    /// Availability service.
    availability: Arc<AvailabilityService>,
    /// RBAC enforcer.
    rbac: Arc<RbacEnforcer>,
}

impl BulkService {
    /// Creates a new bulk service.
    pub fn new(
        generator: Arc<SlotGeneratorService>,
        availability: Arc<AvailabilityService>,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            generator,
            availability,
            rbac,
        }
    }

    /// Applies `action` to each chapter in order.
    ///
    /// A failing chapter is recorded and the remaining chapters still run.
    pub async fn apply(
        &self,
        ctx: &RequestContext,
        chapter_ids: &[ChapterId],
        action: &BulkAction,
    ) -> Result<BulkReport<ChapterId, BulkOutcome>, AppError> {
        self.rbac
            .require_permission(&ctx.role, &SystemPermission::BulkOperate)?;
        if chapter_ids.is_empty() {
            return Err(AppError::validation("No chapters selected"));
        }

        let mut report = BulkReport::new();
        for chapter_id in unique(chapter_ids) {
            let result = self.apply_one(chapter_id, action).await;
            if let Err(e) = &result {
                warn!(
                    chapter_id = %chapter_id,
                    action = action.name(),
                    error = %e,
                    "Bulk action failed for chapter"
                );
            }
            report.push(chapter_id, result);
        }

        info!(
            action = action.name(),
            succeeded = report.succeeded,
            failed = report.failed,
            actor = ctx.actor(),
            "Bulk action finished"
        );
        Ok(report)
    }

    async fn apply_one(
        &self,
        chapter_id: ChapterId,
        action: &BulkAction,
    ) -> Result<BulkOutcome, AppError> {
        let change = match action {
            BulkAction::ClearAll => self.availability.clear_all_unchecked(chapter_id).await?,
            BulkAction::ClearDay { date } => {
                self.availability
                    .clear_day_unchecked(chapter_id, *date)
                    .await?
            }
            BulkAction::DisableDay { date } => {
                self.availability
                    .disable_day_unchecked(chapter_id, *date)
                    .await?
            }
            BulkAction::EnableDay { date } => {
                self.availability
                    .enable_day_unchecked(chapter_id, *date)
                    .await?
            }
            BulkAction::AddSlots {
                date_range,
                weekday_time,
                weekend_time,
                time_ranges,
            } => {
                let report = self
                    .generator
                    .generate_unchecked(&GenerateSlots {
                        chapter_id,
                        date_range: *date_range,
                        weekday_time: *weekday_time,
                        weekend_time: *weekend_time,
                        time_ranges: time_ranges.clone(),
                    })
                    .await?;
                return Ok(BulkOutcome::Generated {
                    created: report.created.len(),
                    skipped_existing: report.skipped_existing.len(),
                    conflicts: report.conflicts.len(),
                });
            }
        };
        Ok(BulkOutcome::Changed(change))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin, fixture, seed_day, window};
    use slotkeeper_core::error::ErrorKind;
    use slotkeeper_entity::user::UserRole;

    #[tokio::test]
    async fn test_missing_chapter_does_not_abort_others() {
        let fx = fixture().await;
        let missing = ChapterId::new();
        let from = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let action = BulkAction::AddSlots {
            date_range: DateRange::new(from, from).unwrap(),
            weekday_time: window("18:00", "19:00"),
            weekend_time: None,
            time_ranges: vec![],
        };

        let report = fx
            .bulk
            .apply(&admin(), &[missing, fx.chapter.id], &action)
            .await
            .unwrap();

        assert_eq!(report.results.len(), 2);
        assert!(!report.results[0].success);
        assert_eq!(
            report.results[0].error.as_ref().unwrap().code,
            ErrorKind::Validation.code()
        );
        assert!(report.results[1].success);
        assert!(report.is_partial());
    }

    #[tokio::test]
    async fn test_disable_day_across_chapters() {
        let fx = fixture().await;
        let slot = seed_day(&fx, 3).await;
        let report = fx
            .bulk
            .apply(
                &admin(),
                &[fx.chapter.id],
                &BulkAction::DisableDay { date: slot.date },
            )
            .await
            .unwrap();
        assert_eq!(report.failed, 0);
        assert!(fx.availability.get(slot.id).await.unwrap().is_disabled);
    }

    #[tokio::test]
    async fn test_requires_admin() {
        let fx = fixture().await;
        let err = fx
            .bulk
            .apply(
                &RequestContext::new("desk", UserRole::Subadmin),
                &[fx.chapter.id],
                &BulkAction::ClearAll,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[test]
    fn test_action_wire_format() {
        let action: BulkAction = serde_json::from_value(serde_json::json!({
            "action": "addSlots",
            "dateRange": { "from": "2025-03-01", "to": "2025-03-07" },
            "weekdayTime": { "startTime": "18:00", "endTime": "19:00" }
        }))
        .unwrap();
        assert_eq!(action.name(), "addSlots");

        let day: BulkAction = serde_json::from_value(serde_json::json!({
            "action": "clearDay",
            "date": "2025-03-01"
        }))
        .unwrap();
        assert!(matches!(day, BulkAction::ClearDay { .. }));
    }
}
