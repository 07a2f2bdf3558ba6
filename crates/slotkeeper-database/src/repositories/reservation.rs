//! Reservation repository implementation.
//!
//! Binding and status transitions lock the reservation and slot rows in
//! that order, inside one transaction, so a slot's availability flag and
//! the reservations holding it never disagree.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, warn};

use slotkeeper_core::error::AppError;
use slotkeeper_core::result::AppResult;
use slotkeeper_core::types::ReservationId;
use slotkeeper_core::types::ScenarioId;
use slotkeeper_core::types::pagination::{PageRequest, PageResponse};
use slotkeeper_entity::reservation::{
    NewReservation, Reservation, ReservationFilter, ReservationStatus, StatusSummary,
};

use super::time_slot::lock_slot;
use super::{ACTIVE_STATUSES, db_error};
use crate::store::{ReservationStore, Transition};

/// Repository for reservation queries and slot binding.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    /// Create a new reservation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &'a ReservationFilter) {
    qb.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(date) = filter.date {
        qb.push(" AND slot_date = ").push_bind(date);
    }
    if let Some(chapter_id) = filter.chapter_id {
        qb.push(" AND chapter_id = ").push_bind(chapter_id);
    }
    if let Some(scenario_id) = filter.scenario_id {
        qb.push(" AND scenario_id = ").push_bind(scenario_id);
    }
    if let Some(language) = filter.language {
        qb.push(" AND language = ").push_bind(language);
    }
    if let Some(pattern) = filter.search_pattern() {
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl ReservationStore for ReservationRepository {
    async fn bind_reservation(
        &self,
        new: &NewReservation,
        scenario_id: ScenarioId,
    ) -> AppResult<Reservation> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let (slot, held) = lock_slot(&mut tx, new.time_slot_id).await?;
        if slot.chapter_id != new.chapter_id {
            return Err(AppError::not_found(format!(
                "Time slot {} does not belong to chapter {}",
                slot.id, new.chapter_id
            )));
        }
        if held || !slot.is_bookable() {
            return Err(AppError::slot_unavailable(format!(
                "Time slot {} is no longer available",
                slot.id
            )));
        }

        let pending = Reservation::pending(new.clone(), scenario_id, &slot, Utc::now());
        let reservation = sqlx::query_as::<_, Reservation>(
            "INSERT INTO reservations (id, scenario_id, chapter_id, time_slot_id, name, email, phone, \
             people, language, status, slot_date, slot_start, slot_end, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) RETURNING *",
        )
        .bind(pending.id)
        .bind(pending.scenario_id)
        .bind(pending.chapter_id)
        .bind(pending.time_slot_id)
        .bind(&pending.name)
        .bind(&pending.email)
        .bind(&pending.phone)
        .bind(pending.people)
        .bind(pending.language)
        .bind(pending.status)
        .bind(pending.slot_date)
        .bind(pending.slot_start)
        .bind(pending.slot_end)
        .bind(pending.created_at)
        .bind(pending.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create reservation"))?;

        sqlx::query("UPDATE time_slots SET is_available = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(slot.id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to mark slot unavailable"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit reservation"))?;

        Ok(reservation)
    }

    async fn find_reservation(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find reservation"))
    }

    async fn find_reservations(
        &self,
        filter: &ReservationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Reservation>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM reservations");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count reservations"))?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM reservations");
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let items = select
            .build_query_as::<Reservation>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list reservations"))?;

        Ok(PageResponse::new(items, *page, total as u64))
    }

    async fn status_summary(&self) -> AppResult<StatusSummary> {
        let rows: Vec<(ReservationStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM reservations GROUP BY status")
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("Failed to summarize reservations"))?;

        let mut summary = StatusSummary::default();
        for (status, count) in rows {
            summary.add(status, count as u64);
        }
        Ok(summary)
    }

    async fn transition(
        &self,
        id: ReservationId,
        expected: Option<ReservationStatus>,
        next: ReservationStatus,
    ) -> AppResult<Transition> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let current =
            sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to lock reservation"))?
                .ok_or_else(|| AppError::not_found(format!("Reservation {id} not found")))?;

        let previous = current.status;
        if let Some(expected) = expected
            && expected != previous
        {
            return Err(AppError::conflict(format!(
                "Reservation {id} is {previous}, not {expected}"
            )));
        }
        if !previous.can_transition_to(next) {
            return Err(AppError::conflict(format!(
                "Reservation {id} cannot move from {previous} to {next}"
            )));
        }

        match (previous.holds_slot(), next.holds_slot(), current.time_slot_id) {
            (false, true, None) => {
                return Err(AppError::slot_unavailable(format!(
                    "The time slot of reservation {id} no longer exists"
                )));
            }
            (false, true, Some(slot_id)) => {
                let (slot, held) = lock_slot(&mut tx, slot_id).await?;
                if held || !slot.is_bookable() {
                    return Err(AppError::slot_unavailable(format!(
                        "Time slot {slot_id} was taken since reservation {id} was declined"
                    )));
                }
                sqlx::query(
                    "UPDATE time_slots SET is_available = FALSE, updated_at = NOW() WHERE id = $1",
                )
                .bind(slot_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to take time slot"))?;
            }
            (true, false, Some(slot_id)) => {
                lock_slot(&mut tx, slot_id).await?;
                let released = sqlx::query(&format!(
                    "UPDATE time_slots SET is_available = TRUE, updated_at = NOW() \
                     WHERE id = $1 AND NOT is_disabled AND NOT EXISTS ( \
                         SELECT 1 FROM reservations \
                         WHERE time_slot_id = $1 AND id <> $2 AND status IN {ACTIVE_STATUSES})"
                ))
                .bind(slot_id)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to release time slot"))?
                .rows_affected();
                if released == 0 {
                    warn!(reservation_id = %id, slot_id = %slot_id, "Time slot kept unavailable after release");
                }
            }
            _ => {}
        }

        let reservation = sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to update reservation status"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit status change"))?;

        info!(reservation_id = %id, from = %previous, to = %next, "Reservation status changed");
        Ok(Transition {
            reservation,
            previous,
        })
    }
}
