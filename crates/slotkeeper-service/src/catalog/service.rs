//! CRUD for the bookable catalog and price lookup.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use slotkeeper_auth::rbac::{RbacEnforcer, SystemPermission};
use slotkeeper_core::error::AppError;
use slotkeeper_core::types::{ChapterId, PriceId, ScenarioId};
use slotkeeper_database::store::{ChapterRemoval, ChapterStore, PriceStore, ScenarioStore};
use slotkeeper_entity::chapter::{Chapter, CreateChapter, UpdateChapter};
use slotkeeper_entity::price::{CreatePrice, Price, Quote, UpdatePrice, select_rule};
use slotkeeper_entity::scenario::{CreateScenario, Scenario, UpdateScenario};

use crate::context::RequestContext;

/// Manages scenarios, chapters and price rules.
#[derive(Clone)]
pub struct CatalogService {
    /// Scenario store.
    scenarios: Arc<dyn ScenarioStore>,
    /// Chapter store.
    chapters: Arc<dyn ChapterStore>,
    /// Price store.
    prices: Arc<dyn PriceStore>,
    /// RBAC enforcer.
    rbac: Arc<RbacEnforcer>,
}

impl CatalogService {
    /// Creates a new catalog service.
    pub fn new(
        scenarios: Arc<dyn ScenarioStore>,
        chapters: Arc<dyn ChapterStore>,
        prices: Arc<dyn PriceStore>,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            scenarios,
            chapters,
            prices,
            rbac,
        }
    }

    // ── Scenarios ────────────────────────────────────────────

    /// Lists all scenarios.
    pub async fn list_scenarios(&self) -> Result<Vec<Scenario>, AppError> {
        self.scenarios.find_all_scenarios().await
    }

    /// Gets a scenario by ID.
    pub async fn get_scenario(&self, id: ScenarioId) -> Result<Scenario, AppError> {
        self.scenarios
            .find_scenario(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Scenario {id} not found")))
    }

    /// Creates a scenario.
    pub async fn create_scenario(
        &self,
        ctx: &RequestContext,
        req: CreateScenario,
    ) -> Result<Scenario, AppError> {
        self.require_manage(ctx)?;
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Scenario name cannot be empty"));
        }
        let now = Utc::now();
        let scenario = Scenario {
            id: ScenarioId::new(),
            name: req.name.trim().to_string(),
            category: req.category,
            description: req.description,
            created_at: now,
            updated_at: now,
        };
        let created = self.scenarios.insert_scenario(&scenario).await?;
        info!(scenario_id = %created.id, name = %created.name, "Scenario created");
        Ok(created)
    }

    /// Updates a scenario.
    pub async fn update_scenario(
        &self,
        ctx: &RequestContext,
        id: ScenarioId,
        req: UpdateScenario,
    ) -> Result<Scenario, AppError> {
        self.require_manage(ctx)?;
        if req.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::validation("Scenario name cannot be empty"));
        }
        let mut scenario = self.get_scenario(id).await?;
        scenario.apply(req, Utc::now());
        self.scenarios.update_scenario(&scenario).await
    }

    /// Deletes a scenario that no longer owns chapters.
    pub async fn delete_scenario(&self, ctx: &RequestContext, id: ScenarioId) -> Result<(), AppError> {
        self.require_manage(ctx)?;
        self.scenarios.delete_scenario(id).await?;
        info!(scenario_id = %id, "Scenario deleted");
        Ok(())
    }

    // ── Chapters ─────────────────────────────────────────────

    /// Lists chapters, optionally for one scenario.
    pub async fn list_chapters(
        &self,
        scenario_id: Option<ScenarioId>,
    ) -> Result<Vec<Chapter>, AppError> {
        self.chapters.find_chapters(scenario_id).await
    }

    /// Gets a chapter by ID.
    pub async fn get_chapter(&self, id: ChapterId) -> Result<Chapter, AppError> {
        self.chapters
            .find_chapter(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Chapter {id} not found")))
    }

    /// Creates a chapter under an existing scenario.
    pub async fn create_chapter(
        &self,
        ctx: &RequestContext,
        req: CreateChapter,
    ) -> Result<Chapter, AppError> {
        self.require_manage(ctx)?;
        req.validate()?;
        self.ensure_scenario(req.scenario_id).await?;

        let now = Utc::now();
        let chapter = Chapter {
            id: ChapterId::new(),
            scenario_id: req.scenario_id,
            name: req.name.trim().to_string(),
            min_player_number: req.min_player_number,
            max_player_number: req.max_player_number,
            duration_minutes: req.duration_minutes,
            difficulty: req.difficulty,
            percentage_of_success: req.percentage_of_success,
            description: req.description,
            place: req.place,
            image: req.image,
            video: req.video,
            created_at: now,
            updated_at: now,
        };
        let created = self.chapters.insert_chapter(&chapter).await?;
        info!(
            chapter_id = %created.id,
            scenario_id = %created.scenario_id,
            name = %created.name,
            "Chapter created"
        );
        Ok(created)
    }

    /// Updates a chapter.
    pub async fn update_chapter(
        &self,
        ctx: &RequestContext,
        id: ChapterId,
        req: UpdateChapter,
    ) -> Result<Chapter, AppError> {
        self.require_manage(ctx)?;
        if let Some(scenario_id) = req.scenario_id {
            self.ensure_scenario(scenario_id).await?;
        }
        let mut chapter = self.get_chapter(id).await?;
        chapter.apply(req, Utc::now())?;
        self.chapters.update_chapter(&chapter).await
    }

    /// Deletes a chapter with its slots and inactive reservations.
    pub async fn delete_chapter(
        &self,
        ctx: &RequestContext,
        id: ChapterId,
    ) -> Result<ChapterRemoval, AppError> {
        self.require_manage(ctx)?;
        self.chapters.delete_chapter(id).await
    }

    // ── Prices ───────────────────────────────────────────────

    /// Lists all price rules.
    pub async fn list_prices(&self) -> Result<Vec<Price>, AppError> {
        self.prices.find_all_prices().await
    }

    /// Gets a price rule by ID.
    pub async fn get_price(&self, id: PriceId) -> Result<Price, AppError> {
        self.prices
            .find_price(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Price {id} not found")))
    }

    /// Creates a price rule.
    pub async fn create_price(
        &self,
        ctx: &RequestContext,
        req: CreatePrice,
    ) -> Result<Price, AppError> {
        self.require_manage(ctx)?;
        req.validate()?;
        let now = Utc::now();
        let price = Price {
            id: PriceId::new(),
            players_count: req.players_count,
            is_and_above: req.is_and_above,
            price_per_person: req.price_per_person,
            currency: req.currency.to_uppercase(),
            created_at: now,
            updated_at: now,
        };
        let created = self.prices.insert_price(&price).await?;
        info!(price_id = %created.id, players = created.players_count, "Price created");
        Ok(created)
    }

    /// Updates a price rule.
    pub async fn update_price(
        &self,
        ctx: &RequestContext,
        id: PriceId,
        req: UpdatePrice,
    ) -> Result<Price, AppError> {
        self.require_manage(ctx)?;
        let mut price = self.get_price(id).await?;
        price.apply(req, Utc::now())?;
        self.prices.update_price(&price).await
    }

    /// Deletes a price rule.
    pub async fn delete_price(&self, ctx: &RequestContext, id: PriceId) -> Result<(), AppError> {
        self.require_manage(ctx)?;
        self.prices.delete_price(id).await
    }

    /// Price for a party of `party_size`.
    pub async fn quote(&self, party_size: i32) -> Result<Quote, AppError> {
        if party_size < 1 {
            return Err(AppError::validation("Party size must be at least 1"));
        }
        let prices = self.prices.find_all_prices().await?;
        select_rule(&prices, party_size)
            .map(|rule| Quote::new(rule, party_size))
            .ok_or_else(|| {
                AppError::not_found(format!("No price rule covers {party_size} player(s)"))
            })
    }

    fn require_manage(&self, ctx: &RequestContext) -> Result<(), AppError> {
        self.rbac
            .require_permission(&ctx.role, &SystemPermission::CatalogManage)
    }

    async fn ensure_scenario(&self, id: ScenarioId) -> Result<(), AppError> {
        match self.scenarios.find_scenario(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::validation(format!("Scenario {id} does not exist"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin, fixture, new_reservation, seed_day};
    use slotkeeper_core::error::ErrorKind;

    #[tokio::test]
    async fn test_scenario_with_chapters_cannot_be_deleted() {
        let fx = fixture().await;
        let err = fx
            .catalog
            .delete_scenario(&admin(), fx.chapter.scenario_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_chapter_with_active_reservation_is_blocked() {
        let fx = fixture().await;
        let slot = seed_day(&fx, 3).await;
        fx.reservations
            .create(&RequestContext::public(), new_reservation(&fx, slot.id))
            .await
            .unwrap();

        let err = fx
            .catalog
            .delete_chapter(&admin(), fx.chapter.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_chapter_delete_cascades_slots() {
        let fx = fixture().await;
        seed_day(&fx, 3).await;
        seed_day(&fx, 4).await;

        let removal = fx
            .catalog
            .delete_chapter(&admin(), fx.chapter.id)
            .await
            .unwrap();
        assert_eq!(removal.slots_deleted, 2);
        assert!(fx.catalog.get_chapter(fx.chapter.id).await.is_err());
    }

    #[tokio::test]
    async fn test_update_chapter_rejects_inverted_bounds() {
        let fx = fixture().await;
        let err = fx
            .catalog
            .update_chapter(
                &admin(),
                fx.chapter.id,
                UpdateChapter {
                    min_player_number: Some(8),
                    max_player_number: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_quote_prefers_exact_then_and_above() {
        let fx = fixture().await;
        for (count, and_above, amount) in [(2, false, 3000), (4, true, 2500), (3, false, 2800)] {
            fx.catalog
                .create_price(
                    &admin(),
                    CreatePrice {
                        players_count: count,
                        is_and_above: and_above,
                        price_per_person: amount,
                        currency: "eur".into(),
                    },
                )
                .await
                .unwrap();
        }

        let exact = fx.catalog.quote(3).await.unwrap();
        assert_eq!(exact.price_per_person, 2800);
        let above = fx.catalog.quote(6).await.unwrap();
        assert_eq!(above.total, 6 * 2500);
        assert_eq!(above.currency, "EUR");
        assert_eq!(fx.catalog.quote(1).await.unwrap_err().kind, ErrorKind::NotFound);
    }
}
