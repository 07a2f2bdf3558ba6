//! Chapter repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use slotkeeper_core::error::AppError;
use slotkeeper_core::result::AppResult;
use slotkeeper_core::types::{ChapterId, ScenarioId};
use slotkeeper_entity::chapter::Chapter;

use super::{ACTIVE_STATUSES, db_error};
use crate::store::{ChapterRemoval, ChapterStore};

/// Repository for chapter CRUD operations.
#[derive(Debug, Clone)]
pub struct ChapterRepository {
    pool: PgPool,
}

impl ChapterRepository {
    /// Create a new chapter repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChapterStore for ChapterRepository {
    async fn find_chapters(&self, scenario_id: Option<ScenarioId>) -> AppResult<Vec<Chapter>> {
        sqlx::query_as::<_, Chapter>(
            "SELECT * FROM chapters WHERE ($1::uuid IS NULL OR scenario_id = $1) ORDER BY name",
        )
        .bind(scenario_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list chapters"))
    }

    async fn find_chapter(&self, id: ChapterId) -> AppResult<Option<Chapter>> {
        sqlx::query_as::<_, Chapter>("SELECT * FROM chapters WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find chapter"))
    }

    async fn insert_chapter(&self, chapter: &Chapter) -> AppResult<Chapter> {
        sqlx::query_as::<_, Chapter>(
            "INSERT INTO chapters (id, scenario_id, name, min_player_number, max_player_number, \
             duration_minutes, difficulty, percentage_of_success, description, place, image, video, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING *",
        )
        .bind(chapter.id)
        .bind(chapter.scenario_id)
        .bind(&chapter.name)
        .bind(chapter.min_player_number)
        .bind(chapter.max_player_number)
        .bind(chapter.duration_minutes)
        .bind(chapter.difficulty)
        .bind(chapter.percentage_of_success)
        .bind(&chapter.description)
        .bind(&chapter.place)
        .bind(&chapter.image)
        .bind(&chapter.video)
        .bind(chapter.created_at)
        .bind(chapter.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create chapter"))
    }

    async fn update_chapter(&self, chapter: &Chapter) -> AppResult<Chapter> {
        sqlx::query_as::<_, Chapter>(
            "UPDATE chapters SET scenario_id = $2, name = $3, min_player_number = $4, \
             max_player_number = $5, duration_minutes = $6, difficulty = $7, \
             percentage_of_success = $8, description = $9, place = $10, image = $11, video = $12, \
             updated_at = $13 WHERE id = $1 RETURNING *",
        )
        .bind(chapter.id)
        .bind(chapter.scenario_id)
        .bind(&chapter.name)
        .bind(chapter.min_player_number)
        .bind(chapter.max_player_number)
        .bind(chapter.duration_minutes)
        .bind(chapter.difficulty)
        .bind(chapter.percentage_of_success)
        .bind(&chapter.description)
        .bind(&chapter.place)
        .bind(&chapter.image)
        .bind(&chapter.video)
        .bind(chapter.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update chapter"))?
        .ok_or_else(|| AppError::not_found(format!("Chapter {} not found", chapter.id)))
    }

    async fn delete_chapter(&self, id: ChapterId) -> AppResult<ChapterRemoval> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let locked: Option<ChapterId> =
            sqlx::query_scalar("SELECT id FROM chapters WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to lock chapter"))?;
        if locked.is_none() {
            return Err(AppError::not_found(format!("Chapter {id} not found")));
        }

        let active: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM reservations WHERE chapter_id = $1 AND status IN {ACTIVE_STATUSES}"
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to count active reservations"))?;
        if active > 0 {
            return Err(AppError::conflict(format!(
                "Chapter {id} has {active} pending or approved reservation(s)"
            )));
        }

        let reservations = sqlx::query("DELETE FROM reservations WHERE chapter_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete chapter reservations"))?
            .rows_affected();

        let slots = sqlx::query("DELETE FROM time_slots WHERE chapter_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete chapter slots"))?
            .rows_affected();

        sqlx::query("DELETE FROM chapters WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete chapter"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit chapter deletion"))?;

        info!(chapter_id = %id, slots, reservations, "Chapter deleted");
        Ok(ChapterRemoval {
            slots_deleted: slots,
            reservations_deleted: reservations,
        })
    }
}
