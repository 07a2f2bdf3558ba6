//! Scenario repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use slotkeeper_core::error::AppError;
use slotkeeper_core::result::AppResult;
use slotkeeper_core::types::ScenarioId;
use slotkeeper_entity::scenario::Scenario;

use super::db_error;
use crate::store::ScenarioStore;

/// Repository for scenario CRUD operations.
#[derive(Debug, Clone)]
pub struct ScenarioRepository {
    pool: PgPool,
}

impl ScenarioRepository {
    /// Create a new scenario repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScenarioStore for ScenarioRepository {
    async fn find_all_scenarios(&self) -> AppResult<Vec<Scenario>> {
        sqlx::query_as::<_, Scenario>("SELECT * FROM scenarios ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list scenarios"))
    }

    async fn find_scenario(&self, id: ScenarioId) -> AppResult<Option<Scenario>> {
        sqlx::query_as::<_, Scenario>("SELECT * FROM scenarios WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find scenario"))
    }

    async fn insert_scenario(&self, scenario: &Scenario) -> AppResult<Scenario> {
        sqlx::query_as::<_, Scenario>(
            "INSERT INTO scenarios (id, name, category, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(scenario.id)
        .bind(&scenario.name)
        .bind(&scenario.category)
        .bind(&scenario.description)
        .bind(scenario.created_at)
        .bind(scenario.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create scenario"))
    }

    async fn update_scenario(&self, scenario: &Scenario) -> AppResult<Scenario> {
        sqlx::query_as::<_, Scenario>(
            "UPDATE scenarios SET name = $2, category = $3, description = $4, updated_at = $5 \
             WHERE id = $1 RETURNING *",
        )
        .bind(scenario.id)
        .bind(&scenario.name)
        .bind(&scenario.category)
        .bind(&scenario.description)
        .bind(scenario.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update scenario"))?
        .ok_or_else(|| AppError::not_found(format!("Scenario {} not found", scenario.id)))
    }

    async fn delete_scenario(&self, id: ScenarioId) -> AppResult<()> {
        let chapters: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM chapters WHERE scenario_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("Failed to count scenario chapters"))?;
        if chapters > 0 {
            return Err(AppError::conflict(format!(
                "Scenario {id} still has {chapters} chapter(s)"
            )));
        }

        let result = sqlx::query("DELETE FROM scenarios WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete scenario"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Scenario {id} not found")));
        }
        Ok(())
    }
}
