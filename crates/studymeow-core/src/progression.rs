//! Experience and leveling.
//!
//! A [`Progression`] record accumulates study minutes and converts them into
//! experience. Experience is always stored normalized: once the running total
//! reaches the requirement for the current level it is spent and the level
//! increments, so `experience < required_xp(level)` holds between calls.
//!
//! ```text
//! required_xp(L) = floor(100 * 1.2^(L-1))
//! xp_gain(m, L)  = floor(m/10) + floor(L/2) + floor(m/30) * 2
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Experience needed to advance *from* `level` to `level + 1`.
///
/// Levels below 1 are treated as level 1.
pub fn required_xp(level: u32) -> u64 {
    let exponent = level.max(1) - 1;
    (100.0 * 1.2f64.powf(exponent as f64)).floor() as u64
}

/// Experience earned for one block of `minutes` studied at `level`.
pub fn xp_gain(minutes: u32, level: u32) -> u64 {
    let base = u64::from(minutes / 10);
    let level_bonus = u64::from(level / 2);
    let streak_bonus = u64::from(minutes / 30) * 2;
    base + level_bonus + streak_bonus
}

/// Result of applying a block of study time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyOutcome {
    pub minutes: u32,
    pub xp_gained: u64,
    pub old_level: u32,
    pub new_level: u32,
    pub leveled_up: bool,
}

/// The single user's progression record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Cumulative study time in minutes.
    pub total_study_minutes: u64,
    /// Number of cards received, duplicates included.
    pub card_count: u32,
    pub level: u32,
    /// Experience left over after all level-ups.
    pub experience: u64,
    pub joined_at: DateTime<Utc>,
}

impl Progression {
    /// Fresh record for a newly registered user.
    pub fn register(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            email: email.into(),
            total_study_minutes: 0,
            card_count: 0,
            level: 1,
            experience: 0,
            joined_at: Utc::now(),
        }
    }

    /// Add study time, award experience, and apply any level-ups.
    ///
    /// Zero minutes must be rejected by the caller.
    pub fn apply_study_minutes(&mut self, minutes: u32) -> StudyOutcome {
        let old_level = self.level.max(1);
        let gained = xp_gain(minutes, old_level);

        let mut level = old_level;
        let mut experience = self.experience.saturating_add(gained);
        loop {
            let threshold = required_xp(level);
            if experience < threshold {
                break;
            }
            experience -= threshold;
            level += 1;
        }

        self.total_study_minutes = self.total_study_minutes.saturating_add(u64::from(minutes));
        self.level = level;
        self.experience = experience;

        StudyOutcome {
            minutes,
            xp_gained: gained,
            old_level,
            new_level: level,
            leveled_up: level > old_level,
        }
    }

    pub fn add_cards(&mut self, count: u32) {
        self.card_count = self.card_count.saturating_add(count);
    }

    /// Experience needed to finish the current level.
    pub fn required_xp(&self) -> u64 {
        required_xp(self.level)
    }

    /// Rounded percentage of the current level completed.
    pub fn experience_progress_pct(&self) -> u32 {
        let required = self.required_xp();
        if required == 0 {
            return 0;
        }
        (self.experience as f64 / required as f64 * 100.0).round() as u32
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::register("student", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(level: u32, experience: u64) -> Progression {
        Progression {
            level,
            experience,
            ..Progression::default()
        }
    }

    #[test]
    fn required_xp_curve() {
        assert_eq!(required_xp(1), 100);
        assert_eq!(required_xp(2), 120);
        assert_eq!(required_xp(3), 144);
        assert_eq!(required_xp(0), 100);
    }

    #[test]
    fn thirty_minutes_at_level_one() {
        let mut p = at(1, 0);
        let outcome = p.apply_study_minutes(30);
        assert_eq!(outcome.xp_gained, 5);
        assert!(!outcome.leveled_up);
        assert_eq!((p.level, p.experience), (1, 5));
        assert_eq!(p.total_study_minutes, 30);
    }

    #[test]
    fn stays_below_threshold() {
        let mut p = at(1, 98);
        let outcome = p.apply_study_minutes(10);
        assert_eq!(outcome.xp_gained, 1);
        assert!(!outcome.leveled_up);
        assert_eq!((p.level, p.experience), (1, 99));
    }

    #[test]
    fn crossing_threshold_levels_up() {
        let mut p = at(1, 99);
        let outcome = p.apply_study_minutes(20);
        assert_eq!(outcome.xp_gained, 2);
        assert!(outcome.leveled_up);
        assert_eq!(outcome.old_level, 1);
        assert_eq!(outcome.new_level, 2);
        assert_eq!((p.level, p.experience), (2, 1));
    }

    #[test]
    fn level_bonus_applies_from_level_two() {
        assert_eq!(xp_gain(0, 1), 0);
        assert_eq!(xp_gain(0, 2), 1);
        assert_eq!(xp_gain(60, 5), 6 + 2 + 4);
    }

    #[test]
    fn large_gain_crosses_several_levels() {
        let mut p = at(1, 100 + 120 + 10);
        let outcome = p.apply_study_minutes(10);
        assert_eq!(outcome.new_level, 3);
        assert_eq!(p.experience, 11);
    }

    #[test]
    fn experience_progress_is_rounded_percent() {
        let p = at(2, 60);
        assert_eq!(p.experience_progress_pct(), 50);
    }

    #[test]
    fn register_starts_at_level_one() {
        let p = Progression::register("neko", "neko@example.com");
        assert_eq!(p.level, 1);
        assert_eq!(p.experience, 0);
        assert_eq!(p.card_count, 0);
        assert_eq!(p.total_study_minutes, 0);
    }

    proptest! {
        #[test]
        fn required_xp_is_non_decreasing(level in 1u32..200) {
            prop_assert!(required_xp(level) <= required_xp(level + 1));
        }

        #[test]
        fn experience_is_always_normalized(
            level in 1u32..60,
            start in 0u64..100,
            minutes in 0u32..100_000,
        ) {
            let mut p = at(level, start.min(required_xp(level) - 1));
            p.apply_study_minutes(minutes);
            prop_assert!(p.experience < required_xp(p.level));
            prop_assert!(p.level >= level);
        }
    }
}
