//! Probabilistic card drops.
//!
//! One uniform roll decides both whether a reward fires and which rarity it
//! has. The eligibility threshold for the task's difficulty is scaled by the
//! completion ratio, so finishing well over the estimate makes a drop more
//! likely:
//!
//! ```text
//! fires  <=>  roll < threshold(difficulty) * clamp(ratio, 0, 1.5)
//! rarity  =   first band in rarity_bands(difficulty) with roll < upper
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, Rarity};
use super::collection::CardInstance;
use crate::random::RandomSource;
use crate::task::Difficulty;

/// Upper bound applied to the completion ratio.
pub const MAX_COMPLETION_RATIO: f64 = 1.5;

/// Odds for one difficulty tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierOdds {
    /// A roll below this (before ratio scaling) earns a card.
    pub threshold: f64,
    /// `(upper, rarity)` pairs checked in order against the same roll.
    pub rarity_bands: Vec<(f64, Rarity)>,
    /// Rarity when the roll clears every band.
    pub fallback: Rarity,
}

impl TierOdds {
    pub fn rarity_for(&self, roll: f64) -> Rarity {
        self.rarity_bands
            .iter()
            .find(|(upper, _)| roll < *upper)
            .map(|(_, rarity)| *rarity)
            .unwrap_or(self.fallback)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTable {
    pub easy: TierOdds,
    pub medium: TierOdds,
    pub hard: TierOdds,
}

impl DropTable {
    /// Canonical thresholds: easy 0.3, medium 0.6, hard 0.8.
    pub fn standard() -> Self {
        Self {
            easy: TierOdds {
                threshold: 0.3,
                rarity_bands: Vec::new(),
                fallback: Rarity::Common,
            },
            medium: TierOdds {
                threshold: 0.6,
                rarity_bands: vec![(0.5, Rarity::Common)],
                fallback: Rarity::Rare,
            },
            hard: TierOdds {
                threshold: 0.8,
                rarity_bands: vec![
                    (0.4, Rarity::Common),
                    (0.7, Rarity::Rare),
                    (0.8, Rarity::Epic),
                    (0.9, Rarity::Legendary),
                ],
                fallback: Rarity::Common,
            },
        }
    }

    pub fn tier(&self, difficulty: Difficulty) -> &TierOdds {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    /// Rarity earned by `roll`, or `None` when the reward doesn't fire.
    pub fn resolve(&self, difficulty: Difficulty, completion_ratio: f64, roll: f64) -> Option<Rarity> {
        let tier = self.tier(difficulty);
        let chance = tier.threshold * clamp_ratio(completion_ratio);
        if roll < chance {
            Some(tier.rarity_for(roll))
        } else {
            None
        }
    }
}

impl Default for DropTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Clamp a completion ratio into `[0, MAX_COMPLETION_RATIO]`. NaN becomes 0.
pub fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, MAX_COMPLETION_RATIO)
}

/// Rolls against a catalog.
#[derive(Debug, Clone, Default)]
pub struct DropEngine {
    table: DropTable,
}

impl DropEngine {
    pub fn new(table: DropTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &DropTable {
        &self.table
    }

    /// Roll for a reward. Consumes one sample for eligibility and, when the
    /// reward fires, one more to choose among cards of the resolved rarity.
    pub fn roll(
        &self,
        catalog: &Catalog,
        rng: &mut dyn RandomSource,
        difficulty: Difficulty,
        completion_ratio: f64,
    ) -> Option<CardInstance> {
        let roll = rng.next_f64();
        let Some(rarity) = self.table.resolve(difficulty, completion_ratio, roll) else {
            tracing::debug!(%difficulty, completion_ratio, roll, "no card this time");
            return None;
        };

        let pool: Vec<_> = catalog.by_rarity(rarity).collect();
        if pool.is_empty() {
            tracing::warn!(%rarity, "catalog has no cards for rarity");
            return None;
        }
        let definition = pool[rng.pick(pool.len())];
        tracing::info!(card = %definition.name, %rarity, "card dropped");
        Some(CardInstance::from_definition(definition, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::catalog::CardDefinition;
    use crate::random::FixedSequence;

    #[test]
    fn easy_is_always_common_below_threshold() {
        let table = DropTable::standard();
        assert_eq!(table.resolve(Difficulty::Easy, 1.0, 0.1), Some(Rarity::Common));
        assert_eq!(table.resolve(Difficulty::Easy, 1.0, 0.29), Some(Rarity::Common));
        assert_eq!(table.resolve(Difficulty::Easy, 1.0, 0.3), None);
    }

    #[test]
    fn medium_splits_common_and_rare() {
        let table = DropTable::standard();
        assert_eq!(table.resolve(Difficulty::Medium, 1.0, 0.49), Some(Rarity::Common));
        assert_eq!(table.resolve(Difficulty::Medium, 1.0, 0.55), Some(Rarity::Rare));
        assert_eq!(table.resolve(Difficulty::Medium, 1.0, 0.6), None);
    }

    #[test]
    fn hard_bands_share_one_roll() {
        let table = DropTable::standard();
        assert_eq!(table.resolve(Difficulty::Hard, 1.0, 0.2), Some(Rarity::Common));
        assert_eq!(table.resolve(Difficulty::Hard, 1.0, 0.5), Some(Rarity::Rare));
        assert_eq!(table.resolve(Difficulty::Hard, 1.0, 0.75), Some(Rarity::Epic));
        assert_eq!(table.resolve(Difficulty::Hard, 1.0, 0.85), None);
        assert_eq!(table.resolve(Difficulty::Hard, 1.5, 0.75), Some(Rarity::Epic));
        assert_eq!(table.resolve(Difficulty::Hard, 1.5, 0.85), Some(Rarity::Legendary));
        assert_eq!(table.resolve(Difficulty::Hard, 1.5, 0.95), Some(Rarity::Common));
    }

    #[test]
    fn higher_completion_ratio_widens_eligibility() {
        let table = DropTable::standard();
        assert_eq!(table.resolve(Difficulty::Easy, 0.8, 0.25), None);
        assert_eq!(table.resolve(Difficulty::Easy, 1.2, 0.25), Some(Rarity::Common));
        // Capped at 1.5: 0.3 * 1.5 = 0.45.
        assert_eq!(table.resolve(Difficulty::Easy, 10.0, 0.44), Some(Rarity::Common));
        assert_eq!(table.resolve(Difficulty::Easy, 10.0, 0.46), None);
    }

    #[test]
    fn clamp_ratio_handles_out_of_range() {
        assert_eq!(clamp_ratio(-1.0), 0.0);
        assert_eq!(clamp_ratio(f64::NAN), 0.0);
        assert_eq!(clamp_ratio(3.0), MAX_COMPLETION_RATIO);
    }

    #[test]
    fn roll_picks_within_rarity() {
        let engine = DropEngine::default();
        let catalog = Catalog::standard();
        // 0.5 -> rare on hard; 0.99 -> last rare card.
        let mut rng = FixedSequence::new(vec![0.5, 0.99]);
        let card = engine.roll(&catalog, &mut rng, Difficulty::Hard, 1.0).unwrap();
        assert_eq!(card.rarity, Rarity::Rare);
        assert_eq!(card.catalog_id, "card-4");
        assert!(!card.is_duplicated);
    }

    #[test]
    fn roll_misses_return_none() {
        let engine = DropEngine::default();
        let mut rng = FixedSequence::new(vec![0.9]);
        assert!(engine
            .roll(&Catalog::standard(), &mut rng, Difficulty::Medium, 1.0)
            .is_none());
    }

    #[test]
    fn empty_rarity_tier_yields_no_reward() {
        let engine = DropEngine::default();
        let catalog = Catalog::new(vec![CardDefinition {
            id: "card-0".into(),
            name: "Only Rare".into(),
            description: String::new(),
            rarity: Rarity::Rare,
            theme: crate::cards::Theme::Action,
            subject: crate::cards::Subject::Art,
            image_url: String::new(),
        }]);
        let mut rng = FixedSequence::new(vec![0.1]);
        assert!(engine.roll(&catalog, &mut rng, Difficulty::Easy, 1.0).is_none());
    }
}
