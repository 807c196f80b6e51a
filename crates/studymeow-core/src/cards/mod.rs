mod catalog;
mod collection;
mod drop;

pub use catalog::{CardDefinition, Catalog, Rarity, Subject, Theme};
pub use collection::{Acquisition, CardCollection, CardInstance, CollectionProgress, RarityProgress};
pub use drop::{clamp_ratio, DropEngine, DropTable, TierOdds, MAX_COMPLETION_RATIO};
