//! Owned cards and collection progress.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{CardDefinition, Catalog, Rarity, Subject, Theme};
use crate::error::{CoreError, Result};

/// A card the user owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Identity of this owned copy.
    pub id: String,
    /// Catalog entry it was minted from.
    pub catalog_id: String,
    pub name: String,
    pub description: String,
    pub rarity: Rarity,
    pub theme: Theme,
    pub subject: Subject,
    pub image_url: String,
    pub obtained_at: DateTime<Utc>,
    /// Set once the same (name, rarity) has been received again.
    pub is_duplicated: bool,
}

impl CardInstance {
    pub fn from_definition(def: &CardDefinition, obtained_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            catalog_id: def.id.clone(),
            name: def.name.clone(),
            description: def.description.clone(),
            rarity: def.rarity,
            theme: def.theme,
            subject: def.subject,
            image_url: def.image_url.clone(),
            obtained_at,
            is_duplicated: false,
        }
    }
}

/// What happened when a card was handed to the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Acquisition {
    /// First copy; the instance was stored.
    Added { card: CardInstance },
    /// Already owned; the existing instance was flagged and nothing was stored.
    Duplicate { existing: CardInstance },
}

impl Acquisition {
    pub fn card(&self) -> &CardInstance {
        match self {
            Acquisition::Added { card } => card,
            Acquisition::Duplicate { existing } => existing,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Acquisition::Duplicate { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityProgress {
    pub total: usize,
    /// 1 when any card of this rarity is owned, else 0.
    pub collected: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionProgress {
    pub total: usize,
    /// Distinct card names owned.
    pub collected: usize,
    /// `collected / total * 100`, 0 for an empty catalog.
    pub progress: f64,
    pub by_rarity: BTreeMap<Rarity, RarityProgress>,
}

/// The user's owned cards. At most one entry per (name, rarity).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardCollection {
    cards: Vec<CardInstance>,
}

impl CardCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self) -> &[CardInstance] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CardInstance> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Store `card`, or flag the copy already owned.
    pub fn acquire(&mut self, card: CardInstance) -> Acquisition {
        if let Some(existing) = self
            .cards
            .iter_mut()
            .find(|c| c.name == card.name && c.rarity == card.rarity)
        {
            existing.is_duplicated = true;
            tracing::debug!(card = %existing.name, "duplicate card flagged");
            return Acquisition::Duplicate {
                existing: existing.clone(),
            };
        }
        self.cards.push(card.clone());
        Acquisition::Added { card }
    }

    pub fn remove(&mut self, id: &str) -> Result<CardInstance> {
        let index = self
            .cards
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CoreError::CardNotFound(id.to_string()))?;
        Ok(self.cards.remove(index))
    }

    pub fn mark_duplicated(&mut self, id: &str) -> Result<&CardInstance> {
        let card = self
            .cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::CardNotFound(id.to_string()))?;
        card.is_duplicated = true;
        Ok(card)
    }

    pub fn by_rarity(&self, rarity: Rarity) -> Vec<&CardInstance> {
        self.cards.iter().filter(|c| c.rarity == rarity).collect()
    }

    pub fn by_theme(&self, theme: Theme) -> Vec<&CardInstance> {
        self.cards.iter().filter(|c| c.theme == theme).collect()
    }

    pub fn by_subject(&self, subject: Subject) -> Vec<&CardInstance> {
        self.cards.iter().filter(|c| c.subject == subject).collect()
    }

    pub fn progress(&self, catalog: &Catalog) -> CollectionProgress {
        let total = catalog.len();
        let collected = self
            .cards
            .iter()
            .map(|c| c.name.as_str())
            .collect::<HashSet<_>>()
            .len();
        let progress = if total > 0 {
            collected as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        // Presence flag per rarity, not a count.
        let by_rarity = Rarity::ALL
            .into_iter()
            .map(|rarity| {
                let owned = self.cards.iter().any(|c| c.rarity == rarity);
                (
                    rarity,
                    RarityProgress {
                        total: catalog.count_by_rarity(rarity),
                        collected: usize::from(owned),
                    },
                )
            })
            .collect();

        CollectionProgress {
            total,
            collected,
            progress,
            by_rarity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mint(catalog: &Catalog, id: &str) -> CardInstance {
        CardInstance::from_definition(catalog.get(id).unwrap(), Utc::now())
    }

    #[test]
    fn second_copy_flags_the_original() {
        let catalog = Catalog::standard();
        let mut collection = CardCollection::new();

        let first = collection.acquire(mint(&catalog, "card-0"));
        assert!(!first.is_duplicate());
        let original_id = first.card().id.clone();

        let second = collection.acquire(mint(&catalog, "card-0"));
        assert!(second.is_duplicate());
        assert_eq!(second.card().id, original_id);

        assert_eq!(collection.len(), 1);
        assert!(collection.cards()[0].is_duplicated);
    }

    #[test]
    fn progress_counts_distinct_names() {
        let catalog = Catalog::standard();
        let mut collection = CardCollection::new();
        for id in ["card-0", "card-1", "card-3", "card-0"] {
            collection.acquire(mint(&catalog, id));
        }

        let progress = collection.progress(&catalog);
        assert_eq!(progress.total, 8);
        assert_eq!(progress.collected, 3);
        assert_eq!(progress.progress, 37.5);
    }

    #[test]
    fn rarity_breakdown_is_a_presence_flag() {
        let catalog = Catalog::standard();
        let mut collection = CardCollection::new();
        for id in ["card-0", "card-1", "card-2"] {
            collection.acquire(mint(&catalog, id));
        }

        let progress = collection.progress(&catalog);
        let common = progress.by_rarity[&Rarity::Common];
        assert_eq!(common.total, 3);
        assert_eq!(common.collected, 1);
        assert_eq!(progress.by_rarity[&Rarity::Legendary].collected, 0);
        assert_eq!(progress.by_rarity[&Rarity::Legendary].total, 1);
    }

    #[test]
    fn empty_catalog_progress_is_zero() {
        let progress = CardCollection::new().progress(&Catalog::new(Vec::new()));
        assert_eq!(progress.total, 0);
        assert_eq!(progress.progress, 0.0);
    }

    #[test]
    fn filters_and_removal() {
        let catalog = Catalog::standard();
        let mut collection = CardCollection::new();
        for id in ["card-3", "card-4", "card-6"] {
            collection.acquire(mint(&catalog, id));
        }

        assert_eq!(collection.by_rarity(Rarity::Rare).len(), 2);
        assert_eq!(collection.by_theme(Theme::SliceOfLife).len(), 2);
        assert_eq!(collection.by_subject(Subject::History).len(), 1);

        let id = collection.by_subject(Subject::Music)[0].id.clone();
        collection.mark_duplicated(&id).unwrap();
        assert!(collection.get(&id).unwrap().is_duplicated);

        collection.remove(&id).unwrap();
        assert_eq!(collection.len(), 2);
        assert!(matches!(collection.remove(&id), Err(CoreError::CardNotFound(_))));
    }
}
