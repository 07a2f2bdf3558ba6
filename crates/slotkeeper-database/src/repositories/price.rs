//! Price rule repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use slotkeeper_core::error::AppError;
use slotkeeper_core::result::AppResult;
use slotkeeper_core::types::PriceId;
use slotkeeper_entity::price::Price;

use super::db_error;
use crate::store::PriceStore;

/// Repository for price rule CRUD operations.
#[derive(Debug, Clone)]
pub struct PriceRepository {
    pool: PgPool,
}

impl PriceRepository {
    /// Create a new price repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceStore for PriceRepository {
    async fn find_all_prices(&self) -> AppResult<Vec<Price>> {
        sqlx::query_as::<_, Price>("SELECT * FROM prices ORDER BY players_count, is_and_above")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list prices"))
    }

    async fn find_price(&self, id: PriceId) -> AppResult<Option<Price>> {
        sqlx::query_as::<_, Price>("SELECT * FROM prices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find price"))
    }

    async fn insert_price(&self, price: &Price) -> AppResult<Price> {
        sqlx::query_as::<_, Price>(
            "INSERT INTO prices (id, players_count, is_and_above, price_per_person, currency, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(price.id)
        .bind(price.players_count)
        .bind(price.is_and_above)
        .bind(price.price_per_person)
        .bind(&price.currency)
        .bind(price.created_at)
        .bind(price.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create price"))
    }

    async fn update_price(&self, price: &Price) -> AppResult<Price> {
        sqlx::query_as::<_, Price>(
            "UPDATE prices SET players_count = $2, is_and_above = $3, price_per_person = $4, \
             currency = $5, updated_at = $6 WHERE id = $1 RETURNING *",
        )
        .bind(price.id)
        .bind(price.players_count)
        .bind(price.is_and_above)
        .bind(price.price_per_person)
        .bind(&price.currency)
        .bind(price.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update price"))?
        .ok_or_else(|| AppError::not_found(format!("Price {} not found", price.id)))
    }

    async fn delete_price(&self, id: PriceId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM prices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete price"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Price {id} not found")));
        }
        Ok(())
    }
}
