//! The fixed card catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    Academic,
    Action,
    SliceOfLife,
    Fantasy,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Academic => "academic",
            Theme::Action => "action",
            Theme::SliceOfLife => "slice-of-life",
            Theme::Fantasy => "fantasy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Math,
    English,
    Science,
    History,
    Art,
    Music,
}

impl Subject {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Math => "math",
            Subject::English => "english",
            Subject::Science => "science",
            Subject::History => "history",
            Subject::Art => "art",
            Subject::Music => "music",
        }
    }
}

macro_rules! display_and_parse {
    ($ty:ident, $what:literal, [$($variant:ident),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($ty::$variant.as_str()) {
                        return Ok($ty::$variant);
                    }
                )+
                Err(format!("unknown {}: {s}", $what))
            }
        }
    };
}

display_and_parse!(Rarity, "rarity", [Common, Rare, Epic, Legendary]);
display_and_parse!(Theme, "theme", [Academic, Action, SliceOfLife, Fantasy]);
display_and_parse!(Subject, "subject", [Math, English, Science, History, Art, Music]);

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rarity: Rarity,
    pub theme: Theme,
    pub subject: Subject,
    pub image_url: String,
}

/// Every card that can be collected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CardDefinition>,
}

impl Catalog {
    pub fn new(entries: Vec<CardDefinition>) -> Self {
        Self { entries }
    }

    /// The built-in eight-card library.
    pub fn standard() -> Self {
        let seed: [(&str, &str, Rarity, Theme, Subject, &str); 8] = [
            (
                "Math Prodigy",
                "A young genius of basic mathematics",
                Rarity::Common,
                Theme::Academic,
                Subject::Math,
                "/cards/math-genius.png",
            ),
            (
                "Word Master",
                "An English whiz with a huge vocabulary",
                Rarity::Common,
                Theme::Academic,
                Subject::English,
                "/cards/english-master.png",
            ),
            (
                "Science Explorer",
                "A little scientist who loves experiments",
                Rarity::Common,
                Theme::Academic,
                Subject::Science,
                "/cards/science-explorer.png",
            ),
            (
                "History Time Traveler",
                "A scholar who crosses the river of history",
                Rarity::Rare,
                Theme::Fantasy,
                Subject::History,
                "/cards/history-traveler.png",
            ),
            (
                "Art Creator",
                "An artist overflowing with ideas",
                Rarity::Rare,
                Theme::SliceOfLife,
                Subject::Art,
                "/cards/art-creator.png",
            ),
            (
                "All-Round Scholar",
                "A student who excels in every subject",
                Rarity::Epic,
                Theme::Academic,
                Subject::Math,
                "/cards/all-rounder.png",
            ),
            (
                "Music Maestro",
                "A prodigy who plays many instruments",
                Rarity::Epic,
                Theme::SliceOfLife,
                Subject::Music,
                "/cards/music-master.png",
            ),
            (
                "God of Wisdom",
                "The embodiment of all knowledge",
                Rarity::Legendary,
                Theme::Fantasy,
                Subject::Math,
                "/cards/wisdom-god.png",
            ),
        ];

        let entries = seed
            .into_iter()
            .enumerate()
            .map(|(index, (name, description, rarity, theme, subject, image))| CardDefinition {
                id: format!("card-{index}"),
                name: name.into(),
                description: description.into(),
                rarity,
                theme,
                subject,
                image_url: image.into(),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[CardDefinition] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_rarity(&self, rarity: Rarity) -> impl Iterator<Item = &CardDefinition> {
        self.entries.iter().filter(move |c| c.rarity == rarity)
    }

    pub fn count_by_rarity(&self, rarity: Rarity) -> usize {
        self.by_rarity(rarity).count()
    }

    pub fn get(&self, id: &str) -> Option<&CardDefinition> {
        self.entries.iter().find(|c| c.id == id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_tiers() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.count_by_rarity(Rarity::Common), 3);
        assert_eq!(catalog.count_by_rarity(Rarity::Rare), 2);
        assert_eq!(catalog.count_by_rarity(Rarity::Epic), 2);
        assert_eq!(catalog.count_by_rarity(Rarity::Legendary), 1);
        assert_eq!(catalog.get("card-7").map(|c| c.rarity), Some(Rarity::Legendary));
    }

    #[test]
    fn theme_serializes_kebab_case() {
        let json = serde_json::to_string(&Theme::SliceOfLife).unwrap();
        assert_eq!(json, "\"slice-of-life\"");
        assert_eq!("slice-of-life".parse::<Theme>(), Ok(Theme::SliceOfLife));
    }

    #[test]
    fn parse_rejects_unknown_rarity() {
        assert_eq!("Epic".parse::<Rarity>(), Ok(Rarity::Epic));
        assert!("mythic".parse::<Rarity>().is_err());
    }
}
