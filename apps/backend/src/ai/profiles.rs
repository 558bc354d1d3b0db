//! Static bot opponent profiles.
//!
//! Loaded once at startup, looked up by id. Skill level maps onto the
//! engine's `Skill Level` option (0-20); the thinking delay paces the bot's
//! replies independently of actual search speed.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotDifficulty {
    Beginner,
    Easy,
    Intermediate,
    Advanced,
    Expert,
    Master,
}

#[derive(Debug, Clone)]
pub struct BotProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub difficulty: BotDifficulty,
    pub elo_min: u16,
    pub elo_max: u16,
    pub skill_level: u8,
    pub think_delay: Duration,
}

static BOT_PROFILES: &[BotProfile] = &[
    BotProfile {
        id: "rookie",
        name: "Rookie Robot",
        difficulty: BotDifficulty::Beginner,
        elo_min: 400,
        elo_max: 800,
        skill_level: 2,
        think_delay: Duration::from_millis(500),
    },
    BotProfile {
        id: "amateur",
        name: "Amateur Andy",
        difficulty: BotDifficulty::Easy,
        elo_min: 800,
        elo_max: 1200,
        skill_level: 5,
        think_delay: Duration::from_millis(800),
    },
    BotProfile {
        id: "clubplayer",
        name: "Club Player",
        difficulty: BotDifficulty::Intermediate,
        elo_min: 1200,
        elo_max: 1600,
        skill_level: 10,
        think_delay: Duration::from_millis(1200),
    },
    BotProfile {
        id: "advanced",
        name: "Advanced Annie",
        difficulty: BotDifficulty::Advanced,
        elo_min: 1600,
        elo_max: 2000,
        skill_level: 15,
        think_delay: Duration::from_millis(1500),
    },
    BotProfile {
        id: "expert",
        name: "Expert Edwin",
        difficulty: BotDifficulty::Expert,
        elo_min: 2000,
        elo_max: 2400,
        skill_level: 18,
        think_delay: Duration::from_millis(2000),
    },
    BotProfile {
        id: "grandmaster",
        name: "Grandmaster Gary",
        difficulty: BotDifficulty::Master,
        elo_min: 2400,
        elo_max: 3000,
        skill_level: 20,
        think_delay: Duration::from_millis(2500),
    },
];

/// Returns the statically registered bot profiles.
pub fn all() -> &'static [BotProfile] {
    BOT_PROFILES
}

/// Finds a profile by its stable id.
pub fn by_id(id: &str) -> Option<&'static BotProfile> {
    all().iter().find(|profile| profile.id == id)
}

#[cfg(test)]
mod bot_registry_smoke {
    use super::*;

    #[test]
    fn enumerates_registered_bots() {
        assert_eq!(all().len(), 6);
        assert!(all().iter().any(|p| p.id == "rookie"));
        assert!(all().iter().any(|p| p.id == "grandmaster"));
    }

    #[test]
    fn lookup_helper_behaves() {
        let rookie = by_id("rookie").expect("rookie must be registered");
        assert_eq!(rookie.skill_level, 2);
        assert_eq!(rookie.think_delay, Duration::from_millis(500));
        assert!(by_id("NotARealBot").is_none());
    }

    #[test]
    fn skill_levels_stay_in_engine_range() {
        assert!(all().iter().all(|p| p.skill_level <= 20));
    }

    #[test]
    fn elo_bands_are_ordered() {
        assert!(all().iter().all(|p| p.elo_min < p.elo_max));
    }
}
