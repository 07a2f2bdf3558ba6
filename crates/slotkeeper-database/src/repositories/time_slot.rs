//! Time slot repository implementation.
//!
//! Every availability change runs in a transaction that first locks the
//! affected slot rows (`FOR UPDATE`) so it serializes with reservation
//! binding on the same slots.

use async_trait::async_trait;
use chrono::{NaiveDate, TimeDelta};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::info;

use slotkeeper_core::error::AppError;
use slotkeeper_core::result::AppResult;
use slotkeeper_core::types::{ChapterId, TimeSlotId};
use slotkeeper_entity::slot::{PlanVerdict, SlotPlan, TimeSlot, classify};

use super::{ACTIVE_STATUSES, db_error};
use crate::store::{InsertOutcome, SlotChange, SlotQuery, SlotStore};

/// Repository for time slot queries and availability changes.
#[derive(Debug, Clone)]
pub struct TimeSlotRepository {
    pool: PgPool,
}

impl TimeSlotRepository {
    /// Create a new time slot repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Lock a slot row and report whether an active reservation holds it.
pub(crate) async fn lock_slot(
    conn: &mut PgConnection,
    id: TimeSlotId,
) -> AppResult<(TimeSlot, bool)> {
    let slot = sqlx::query_as::<_, TimeSlot>("SELECT * FROM time_slots WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error("Failed to lock time slot"))?
        .ok_or_else(|| AppError::not_found(format!("Time slot {id} not found")))?;

    let held: bool = sqlx::query_scalar(&format!(
        "SELECT EXISTS (SELECT 1 FROM reservations WHERE time_slot_id = $1 AND status IN {ACTIVE_STATUSES})"
    ))
    .bind(id)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_error("Failed to check slot holds"))?;

    Ok((slot, held))
}

/// Lock a chapter row; generation and rescheduling serialize on it.
async fn lock_chapter(conn: &mut PgConnection, id: ChapterId) -> AppResult<()> {
    let locked: Option<ChapterId> =
        sqlx::query_scalar("SELECT id FROM chapters WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_error("Failed to lock chapter"))?;
    locked
        .map(|_| ())
        .ok_or_else(|| AppError::not_found(format!("Chapter {id} not found")))
}

/// Lock the chapter's slots in scope and count the held ones.
async fn lock_scope(
    conn: &mut PgConnection,
    chapter_id: ChapterId,
    date: Option<NaiveDate>,
) -> AppResult<u64> {
    sqlx::query(
        "SELECT id FROM time_slots WHERE chapter_id = $1 AND ($2::date IS NULL OR date = $2) FOR UPDATE",
    )
    .bind(chapter_id)
    .bind(date)
    .execute(&mut *conn)
    .await
    .map_err(db_error("Failed to lock time slots"))?;

    let held: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(DISTINCT s.id) FROM time_slots s \
         JOIN reservations r ON r.time_slot_id = s.id AND r.status IN {ACTIVE_STATUSES} \
         WHERE s.chapter_id = $1 AND ($2::date IS NULL OR s.date = $2)"
    ))
    .bind(chapter_id)
    .bind(date)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_error("Failed to count held slots"))?;

    Ok(held as u64)
}

impl TimeSlotRepository {
    async fn delete_unheld(
        &self,
        chapter_id: ChapterId,
        date: Option<NaiveDate>,
    ) -> AppResult<SlotChange> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let retained_held = lock_scope(&mut tx, chapter_id, date).await?;

        let affected = sqlx::query(&format!(
            "DELETE FROM time_slots s WHERE s.chapter_id = $1 AND ($2::date IS NULL OR s.date = $2) \
             AND NOT EXISTS (SELECT 1 FROM reservations r WHERE r.time_slot_id = s.id AND r.status IN {ACTIVE_STATUSES})"
        ))
        .bind(chapter_id)
        .bind(date)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to delete time slots"))?
        .rows_affected();

        tx.commit()
            .await
            .map_err(db_error("Failed to commit slot deletion"))?;

        Ok(SlotChange {
            affected,
            retained_held,
        })
    }
}

#[async_trait]
impl SlotStore for TimeSlotRepository {
    async fn find_slots(&self, query: &SlotQuery) -> AppResult<Vec<TimeSlot>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM time_slots WHERE TRUE");
        if let Some(scenario_id) = query.scenario_id {
            qb.push(" AND chapter_id IN (SELECT id FROM chapters WHERE scenario_id = ")
                .push_bind(scenario_id)
                .push(")");
        }
        if let Some(chapter_id) = query.chapter_id {
            qb.push(" AND chapter_id = ").push_bind(chapter_id);
        }
        if let Some(date) = query.date {
            qb.push(" AND date = ").push_bind(date);
        }
        if let Some(from) = query.from {
            qb.push(" AND date >= ").push_bind(from);
        }
        if let Some(to) = query.to {
            qb.push(" AND date <= ").push_bind(to);
        }
        if query.only_bookable {
            qb.push(" AND is_available AND NOT is_disabled");
        }
        qb.push(" ORDER BY start_time, chapter_id");

        qb.build_query_as::<TimeSlot>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list time slots"))
    }

    async fn find_slot(&self, id: TimeSlotId) -> AppResult<Option<TimeSlot>> {
        sqlx::query_as::<_, TimeSlot>("SELECT * FROM time_slots WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find time slot"))
    }

    async fn insert_planned(
        &self,
        chapter_id: ChapterId,
        plans: &[SlotPlan],
    ) -> AppResult<InsertOutcome> {
        let mut outcome = InsertOutcome::default();
        let (Some(first), Some(last)) = (
            plans.iter().map(|p| p.date).min(),
            plans.iter().map(|p| p.date).max(),
        ) else {
            return Ok(outcome);
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        lock_chapter(&mut tx, chapter_id).await?;

        // Neighbouring days are loaded too: a local window can straddle a UTC midnight.
        let mut existing = sqlx::query_as::<_, TimeSlot>(
            "SELECT * FROM time_slots WHERE chapter_id = $1 AND date BETWEEN $2 AND $3",
        )
        .bind(chapter_id)
        .bind(first - TimeDelta::days(1))
        .bind(last + TimeDelta::days(1))
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to load existing slots"))?;

        for plan in plans {
            match classify(&existing, plan) {
                PlanVerdict::Duplicate(_) => outcome.skipped_existing.push(plan.date),
                PlanVerdict::Overlap(_) => outcome.conflicts.push(plan.date),
                PlanVerdict::Create => {
                    let slot = sqlx::query_as::<_, TimeSlot>(
                        "INSERT INTO time_slots (id, chapter_id, date, start_time, end_time) \
                         VALUES ($1, $2, $3, $4, $5) RETURNING *",
                    )
                    .bind(TimeSlotId::new())
                    .bind(chapter_id)
                    .bind(plan.date)
                    .bind(plan.start_time)
                    .bind(plan.end_time)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(db_error("Failed to insert time slot"))?;
                    existing.push(slot.clone());
                    outcome.created.push(slot);
                }
            }
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit slot generation"))?;

        Ok(outcome)
    }

    async fn set_availability(&self, id: TimeSlotId, is_available: bool) -> AppResult<TimeSlot> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let (_, held) = lock_slot(&mut tx, id).await?;
        if is_available && held {
            return Err(AppError::slot_unavailable(format!(
                "Time slot {id} is held by an active reservation"
            )));
        }

        let slot = sqlx::query_as::<_, TimeSlot>(
            "UPDATE time_slots SET is_available = $2, is_disabled = NOT $2, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_available)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to update slot availability"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit availability change"))?;

        Ok(slot)
    }

    async fn disable_day(&self, chapter_id: ChapterId, date: NaiveDate) -> AppResult<SlotChange> {
        let affected = sqlx::query(
            "UPDATE time_slots SET is_available = FALSE, is_disabled = TRUE, updated_at = NOW() \
             WHERE chapter_id = $1 AND date = $2",
        )
        .bind(chapter_id)
        .bind(date)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to disable day"))?
        .rows_affected();

        Ok(SlotChange {
            affected,
            retained_held: 0,
        })
    }

    async fn enable_day(&self, chapter_id: ChapterId, date: NaiveDate) -> AppResult<SlotChange> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let retained_held = lock_scope(&mut tx, chapter_id, Some(date)).await?;

        let affected = sqlx::query(&format!(
            "UPDATE time_slots s SET is_available = TRUE, is_disabled = FALSE, updated_at = NOW() \
             WHERE s.chapter_id = $1 AND s.date = $2 \
             AND NOT EXISTS (SELECT 1 FROM reservations r WHERE r.time_slot_id = s.id AND r.status IN {ACTIVE_STATUSES})"
        ))
        .bind(chapter_id)
        .bind(date)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to enable day"))?
        .rows_affected();

        sqlx::query(
            "UPDATE time_slots SET is_disabled = FALSE, updated_at = NOW() \
             WHERE chapter_id = $1 AND date = $2 AND is_disabled",
        )
        .bind(chapter_id)
        .bind(date)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to unblock held slots"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit enable day"))?;

        Ok(SlotChange {
            affected,
            retained_held,
        })
    }

    async fn clear_day(&self, chapter_id: ChapterId, date: NaiveDate) -> AppResult<SlotChange> {
        self.delete_unheld(chapter_id, Some(date)).await
    }

    async fn clear_chapter(&self, chapter_id: ChapterId) -> AppResult<SlotChange> {
        self.delete_unheld(chapter_id, None).await
    }

    async fn reschedule_slot(&self, id: TimeSlotId, plan: &SlotPlan) -> AppResult<TimeSlot> {
        let chapter_id: ChapterId =
            sqlx::query_scalar("SELECT chapter_id FROM time_slots WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to find time slot"))?
                .ok_or_else(|| AppError::not_found(format!("Time slot {id} not found")))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        lock_chapter(&mut tx, chapter_id).await?;
        let (_, held) = lock_slot(&mut tx, id).await?;
        if held {
            return Err(AppError::slot_unavailable(format!(
                "Time slot {id} is held by an active reservation"
            )));
        }

        let clash: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM time_slots WHERE chapter_id = $1 AND id <> $2 \
             AND start_time < $4 AND $3 < end_time)",
        )
        .bind(chapter_id)
        .bind(id)
        .bind(plan.start_time)
        .bind(plan.end_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to check slot overlap"))?;
        if clash {
            return Err(AppError::conflict(format!(
                "New interval for time slot {id} overlaps another slot"
            )));
        }

        let slot = sqlx::query_as::<_, TimeSlot>(
            "UPDATE time_slots SET date = $2, start_time = $3, end_time = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(plan.date)
        .bind(plan.start_time)
        .bind(plan.end_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to reschedule time slot"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit reschedule"))?;

        info!(slot_id = %id, start = %slot.start_time, end = %slot.end_time, "Time slot rescheduled");
        Ok(slot)
    }

    async fn delete_slot(&self, id: TimeSlotId) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let (_, held) = lock_slot(&mut tx, id).await?;
        if held {
            return Err(AppError::slot_unavailable(format!(
                "Time slot {id} is held by an active reservation"
            )));
        }

        sqlx::query("DELETE FROM time_slots WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete time slot"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit slot deletion"))?;
        Ok(())
    }
}
