//! Expands a date range and daily windows into per-day slots for a chapter.

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use slotkeeper_auth::rbac::{RbacEnforcer, SystemPermission};
use slotkeeper_core::config::ScheduleConfig;
use slotkeeper_core::error::AppError;
use slotkeeper_core::types::ChapterId;
use slotkeeper_database::store::{ChapterStore, SlotStore};
use slotkeeper_entity::slot::{DailyWindows, DateRange, TimeSlot, TimeWindow, expand};

use crate::context::RequestContext;

/// Most windows a single day may receive in one request.
pub const MAX_WINDOWS_PER_DAY: usize = 24;

/// Request to generate slots for one chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSlots {
    /// Chapter that will own the slots.
    pub chapter_id: ChapterId,
    /// Inclusive date range.
    pub date_range: DateRange,
    /// Window used Monday to Friday.
    pub weekday_time: TimeWindow,
    /// Window used on Saturday and Sunday. Defaults to the weekday window.
    #[serde(default)]
    pub weekend_time: Option<TimeWindow>,
    /// Further windows generated on every day of the range.
    #[serde(default)]
    pub time_ranges: Vec<TimeWindow>,
}

impl GenerateSlots {
    /// Windows to generate on weekdays and weekend days.
    pub fn windows(&self) -> Result<DailyWindows, AppError> {
        if self.time_ranges.len() + 1 > MAX_WINDOWS_PER_DAY {
            return Err(AppError::validation(format!(
                "{} time ranges requested; at most {MAX_WINDOWS_PER_DAY} per day allowed",
                self.time_ranges.len() + 1
            )));
        }
        let with_extra = |first: TimeWindow| {
            std::iter::once(first)
                .chain(self.time_ranges.iter().copied())
                .collect::<Vec<_>>()
        };
        DailyWindows::new(
            with_extra(self.weekday_time),
            with_extra(self.weekend_time.unwrap_or(self.weekday_time)),
        )
    }
}

/// What a generation run did.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// Chapter the slots belong to.
    pub chapter_id: ChapterId,
    /// Newly created slots.
    pub created: Vec<TimeSlot>,
    /// Dates that already had a slot with the same start.
    pub skipped_existing: Vec<NaiveDate>,
    /// Dates where another slot overlaps the planned interval. A window of
    /// this request that overlaps an earlier one lands here too.
    pub conflicts: Vec<NaiveDate>,
}

/// Generates time slots from date ranges.
#[derive(Clone)]
pub struct SlotGeneratorService {
    /// Chapter store.
    chapters: Arc<dyn ChapterStore>,
    /// Slot store.
    slots: Arc<dyn SlotStore>,
    /// RBAC enforcer.
    rbac: Arc<RbacEnforcer>,
    /// Timezone and range limits.
    schedule: ScheduleConfig,
}

impl SlotGeneratorService {
    /// Creates a new generator service.
    pub fn new(
        chapters: Arc<dyn ChapterStore>,
        slots: Arc<dyn SlotStore>,
        rbac: Arc<RbacEnforcer>,
        schedule: ScheduleConfig,
    ) -> Self {
        Self {
            chapters,
            slots,
            rbac,
            schedule,
        }
    }

    /// Offset applied to wall-clock windows.
    pub fn offset(&self) -> Result<FixedOffset, AppError> {
        FixedOffset::east_opt(self.schedule.utc_offset_minutes * 60).ok_or_else(|| {
            AppError::configuration(format!(
                "Invalid schedule offset: {} minutes",
                self.schedule.utc_offset_minutes
            ))
        })
    }

    /// Generates one slot per window per day of the range for the chapter.
    pub async fn generate(
        &self,
        ctx: &RequestContext,
        req: GenerateSlots,
    ) -> Result<GenerationReport, AppError> {
        self.rbac
            .require_permission(&ctx.role, &SystemPermission::SlotManage)?;
        self.generate_unchecked(&req).await
    }

    /// Generation without the caller check, for the bulk façade.
    pub(crate) async fn generate_unchecked(
        &self,
        req: &GenerateSlots,
    ) -> Result<GenerationReport, AppError> {
        let days = req.date_range.len_days();
        if days > self.schedule.max_range_days {
            return Err(AppError::validation(format!(
                "Date range covers {days} days; at most {} allowed",
                self.schedule.max_range_days
            )));
        }

        if self.chapters.find_chapter(req.chapter_id).await?.is_none() {
            return Err(AppError::validation(format!(
                "Chapter {} does not exist",
                req.chapter_id
            )));
        }

        let windows = req.windows()?;
        let plans = expand(req.date_range, &windows, self.offset()?);
        let outcome = self.slots.insert_planned(req.chapter_id, &plans).await?;

        info!(
            chapter_id = %req.chapter_id,
            from = %req.date_range.from(),
            to = %req.date_range.to(),
            windows_per_day = windows.max_per_day(),
            created = outcome.created.len(),
            skipped = outcome.skipped_existing.len(),
            conflicts = outcome.conflicts.len(),
            "Time slots generated"
        );

        Ok(GenerationReport {
            chapter_id: req.chapter_id,
            created: outcome.created,
            skipped_existing: outcome.skipped_existing,
            conflicts: outcome.conflicts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin, fixture, window};
    use slotkeeper_core::error::ErrorKind;
    use slotkeeper_entity::user::UserRole;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[tokio::test]
    async fn test_week_uses_weekend_window() {
        let fx = fixture().await;
        let report = fx
            .generator
            .generate(
                &admin(),
                GenerateSlots {
                    chapter_id: fx.chapter.id,
                    date_range: DateRange::new(d(3), d(9)).unwrap(),
                    weekday_time: window("18:00", "19:00"),
                    weekend_time: Some(window("10:00", "11:00")),
                    time_ranges: vec![],
                },
            )
            .await
            .unwrap();

        assert_eq!(report.created.len(), 7);
        let saturday = report.created.iter().find(|s| s.date == d(8)).unwrap();
        assert_eq!(saturday.start_time.format("%H:%M").to_string(), "10:00");
        let monday = report.created.iter().find(|s| s.date == d(3)).unwrap();
        assert_eq!(monday.start_time.format("%H:%M").to_string(), "18:00");
        assert!(report.created.iter().all(|s| s.is_available && !s.is_disabled));
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let fx = fixture().await;
        let req = GenerateSlots {
            chapter_id: fx.chapter.id,
            date_range: DateRange::new(d(3), d(5)).unwrap(),
            weekday_time: window("18:00", "19:00"),
            weekend_time: None,
            time_ranges: vec![],
        };
        fx.generator.generate(&admin(), req.clone()).await.unwrap();
        let again = fx.generator.generate(&admin(), req).await.unwrap();

        assert!(again.created.is_empty());
        assert_eq!(again.skipped_existing, vec![d(3), d(4), d(5)]);
    }

    #[tokio::test]
    async fn test_overlapping_window_reported_as_conflict() {
        let fx = fixture().await;
        let range = DateRange::new(d(3), d(3)).unwrap();
        fx.generator
            .generate(
                &admin(),
                GenerateSlots {
                    chapter_id: fx.chapter.id,
                    date_range: range,
                    weekday_time: window("18:00", "19:00"),
                    weekend_time: None,
                    time_ranges: vec![],
                },
            )
            .await
            .unwrap();
        let report = fx
            .generator
            .generate(
                &admin(),
                GenerateSlots {
                    chapter_id: fx.chapter.id,
                    date_range: range,
                    weekday_time: window("18:30", "19:30"),
                    weekend_time: None,
                    time_ranges: vec![],
                },
            )
            .await
            .unwrap();

        assert!(report.created.is_empty());
        assert_eq!(report.conflicts, vec![d(3)]);
    }

    #[tokio::test]
    async fn test_unknown_chapter_is_validation_error() {
        let fx = fixture().await;
        let err = fx
            .generator
            .generate(
                &admin(),
                GenerateSlots {
                    chapter_id: ChapterId::new(),
                    date_range: DateRange::new(d(3), d(4)).unwrap(),
                    weekday_time: window("18:00", "19:00"),
                    weekend_time: None,
                    time_ranges: vec![],
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_range_longer_than_limit_rejected() {
        let fx = fixture().await;
        let err = fx
            .generator
            .generate(
                &admin(),
                GenerateSlots {
                    chapter_id: fx.chapter.id,
                    date_range: DateRange::new(
                        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
                    )
                    .unwrap(),
                    weekday_time: window("18:00", "19:00"),
                    weekend_time: None,
                    time_ranges: vec![],
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_subadmin_cannot_generate() {
        let fx = fixture().await;
        let err = fx
            .generator
            .generate(
                &RequestContext::new("desk", UserRole::Subadmin),
                GenerateSlots {
                    chapter_id: fx.chapter.id,
                    date_range: DateRange::new(d(3), d(4)).unwrap(),
                    weekday_time: window("18:00", "19:00"),
                    weekend_time: None,
                    time_ranges: vec![],
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_several_time_ranges_per_day() {
        let fx = fixture().await;
        let report = fx
            .generator
            .generate(
                &admin(),
                GenerateSlots {
                    chapter_id: fx.chapter.id,
                    date_range: DateRange::new(d(3), d(4)).unwrap(),
                    weekday_time: window("18:00", "19:00"),
                    weekend_time: None,
                    time_ranges: vec![window("10:00", "11:00"), window("14:00", "15:00")],
                },
            )
            .await
            .unwrap();

        assert_eq!(report.created.len(), 6);
        let monday: Vec<_> = report
            .created
            .iter()
            .filter(|s| s.date == d(3))
            .map(|s| s.start_time.format("%H:%M").to_string())
            .collect();
        assert_eq!(monday, ["10:00", "14:00", "18:00"]);
    }

    #[tokio::test]
    async fn test_overlapping_ranges_in_one_request_conflict() {
        let fx = fixture().await;
        let report = fx
            .generator
            .generate(
                &admin(),
                GenerateSlots {
                    chapter_id: fx.chapter.id,
                    date_range: DateRange::new(d(3), d(3)).unwrap(),
                    weekday_time: window("18:00", "19:00"),
                    weekend_time: None,
                    time_ranges: vec![window("18:30", "19:30"), window("19:00", "20:00")],
                },
            )
            .await
            .unwrap();

        let starts: Vec<_> = report
            .created
            .iter()
            .map(|s| s.start_time.format("%H:%M").to_string())
            .collect();
        assert_eq!(starts, ["18:00", "19:00"]);
        assert_eq!(report.conflicts, vec![d(3)]);
    }

    #[tokio::test]
    async fn test_too_many_time_ranges_rejected() {
        let fx = fixture().await;
        let err = fx
            .generator
            .generate(
                &admin(),
                GenerateSlots {
                    chapter_id: fx.chapter.id,
                    date_range: DateRange::new(d(3), d(3)).unwrap(),
                    weekday_time: window("18:00", "19:00"),
                    weekend_time: None,
                    time_ranges: vec![window("10:00", "11:00"); MAX_WINDOWS_PER_DAY],
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
