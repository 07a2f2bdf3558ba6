//! Price entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slotkeeper_core::types::PriceId;
use slotkeeper_core::{AppError, AppResult};
use sqlx::FromRow;

/// A per-person price keyed by party size.
///
/// Amounts are stored in minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// Unique rule identifier.
    pub id: PriceId,
    /// Party size the rule applies to.
    pub players_count: i32,
    /// Also applies to every larger party not covered by an exact rule.
    pub is_and_above: bool,
    /// Price per person in minor units.
    pub price_per_person: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// When the rule was created.
    pub created_at: DateTime<Utc>,
    /// When the rule was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Price {
    /// Apply a partial update and re-check invariants.
    pub fn apply(&mut self, update: UpdatePrice, now: DateTime<Utc>) -> AppResult<()> {
        if let Some(v) = update.players_count {
            self.players_count = v;
        }
        if let Some(v) = update.is_and_above {
            self.is_and_above = v;
        }
        if let Some(v) = update.price_per_person {
            self.price_per_person = v;
        }
        if let Some(v) = update.currency {
            self.currency = v.to_uppercase();
        }
        self.updated_at = now;
        validate(self.players_count, self.price_per_person, &self.currency)
    }
}

/// Data required to create a price rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrice {
    /// Party size.
    pub players_count: i32,
    /// "And above" flag.
    pub is_and_above: bool,
    /// Price per person in minor units.
    pub price_per_person: i64,
    /// ISO 4217 currency code.
    pub currency: String,
}

impl CreatePrice {
    /// Check the rule's invariants.
    pub fn validate(&self) -> AppResult<()> {
        validate(self.players_count, self.price_per_person, &self.currency)
    }
}

/// Partial update of a price rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePrice {
    /// New party size.
    pub players_count: Option<i32>,
    /// New "and above" flag.
    pub is_and_above: Option<bool>,
    /// New price per person.
    pub price_per_person: Option<i64>,
    /// New currency.
    pub currency: Option<String>,
}

/// The price a party would pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Rule that matched.
    pub price_id: PriceId,
    /// Requested party size.
    pub party_size: i32,
    /// Per-person amount in minor units.
    pub price_per_person: i64,
    /// Total amount in minor units.
    pub total: i64,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// Pick the rule for `party_size`: an exact match wins, otherwise the
/// largest "and above" rule whose count does not exceed the party.
pub fn select_rule(prices: &[Price], party_size: i32) -> Option<&Price> {
    prices
        .iter()
        .find(|p| p.players_count == party_size)
        .or_else(|| {
            prices
                .iter()
                .filter(|p| p.is_and_above && p.players_count <= party_size)
                .max_by_key(|p| p.players_count)
        })
}

impl Quote {
    /// Quote `party_size` against `rule`.
    pub fn new(rule: &Price, party_size: i32) -> Self {
        Self {
            price_id: rule.id,
            party_size,
            price_per_person: rule.price_per_person,
            total: rule.price_per_person * i64::from(party_size),
            currency: rule.currency.clone(),
        }
    }
}

fn validate(players_count: i32, price_per_person: i64, currency: &str) -> AppResult<()> {
    if players_count < 1 {
        return Err(AppError::validation("Players count must be at least 1"));
    }
    if price_per_person <= 0 {
        return Err(AppError::validation("Price per person must be positive"));
    }
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::validation(format!(
            "Invalid currency code: '{currency}'"
        )));
    }
    Ok(())
}
