//! Economy configuration: the immutable lookup tables every calculator
//! consumes.
//!
//! One [`EconomyConfig`] value is constructed at startup (production
//! defaults, optionally overridden from YAML), validated once with
//! [`EconomyConfig::validate`], and passed by reference into the energy,
//! tap, bot, upgrade, check-in, and referral modules. Tables are
//! level-indexed (`level - 1`) and fixed-length; nothing here mutates at
//! runtime.

use serde::Deserialize;

use zentari_types::{BotTier, StatKind};

use crate::error::GameError;

/// Highest level on every upgrade ladder.
pub const MAX_LEVEL: u32 = 8;

/// Highest level reachable with point purchases; levels above use stars.
pub const POINT_LEVEL_CAP: u32 = 5;

/// Errors raised by [`EconomyConfig::validate`].
#[derive(Debug, thiserror::Error)]
pub enum EconomyConfigError {
    /// A lookup table has the wrong number of entries.
    #[error("table {table} must have {expected} entries, found {actual}")]
    TableLength {
        /// Name of the offending table.
        table: &'static str,
        /// Required entry count.
        expected: usize,
        /// Actual entry count.
        actual: usize,
    },

    /// A table entry that must be positive is zero.
    #[error("table {table} entry {index} must be positive")]
    ZeroEntry {
        /// Name of the offending table.
        table: &'static str,
        /// Zero-based index of the offending entry.
        index: usize,
    },

    /// Referral reward thresholds are not strictly increasing.
    #[error("referral reward tiers must have strictly increasing thresholds")]
    UnsortedReferralTiers,
}

// ---------------------------------------------------------------------------
// Per-stat ladders
// ---------------------------------------------------------------------------

/// One star-purchased rung of an upgrade ladder (levels 6 through 8).
///
/// Star upgrades both cost and pay: the star price is deducted and the
/// power reward credited in the same operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StarTier {
    /// Stars deducted for the upgrade.
    pub stars: u64,
    /// Power credited alongside the level-up.
    pub power_reward: u64,
    /// Permanent tap-power increase (multi-tap ladder only).
    #[serde(default)]
    pub tap_power_bonus: u32,
}

/// Multi-tap ladder: tap power per level plus purchase costs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MultiTapConfig {
    /// Point cost for each transition 1→2 through 4→5.
    #[serde(default = "default_point_costs")]
    pub point_costs: Vec<u64>,
    /// Base tap power at levels 1 through 5.
    #[serde(default = "default_base_power")]
    pub base_power: Vec<u64>,
    /// Star rungs for levels 6 through 8.
    #[serde(default = "default_multi_tap_star_tiers")]
    pub star_tiers: Vec<StarTier>,
}

impl Default for MultiTapConfig {
    fn default() -> Self {
        Self {
            point_costs: default_point_costs(),
            base_power: default_base_power(),
            star_tiers: default_multi_tap_star_tiers(),
        }
    }
}

/// Speed ladder: energy refill time per level plus purchase costs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpeedConfig {
    /// Point cost for each transition 1→2 through 4→5.
    #[serde(default = "default_point_costs")]
    pub point_costs: Vec<u64>,
    /// Minutes to refill from zero to the cap, at levels 1 through 8.
    #[serde(default = "default_refill_minutes")]
    pub refill_minutes: Vec<u32>,
    /// Star rungs for levels 6 through 8.
    #[serde(default = "default_star_tiers")]
    pub star_tiers: Vec<StarTier>,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            point_costs: default_point_costs(),
            refill_minutes: default_refill_minutes(),
            star_tiers: default_star_tiers(),
        }
    }
}

/// Energy-limit ladder: energy capacity per level plus purchase costs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnergyLimitConfig {
    /// Point cost for each transition 1→2 through 4→5.
    #[serde(default = "default_point_costs")]
    pub point_costs: Vec<u64>,
    /// Energy cap at levels 1 through 8.
    #[serde(default = "default_capacity")]
    pub capacity: Vec<u32>,
    /// Star rungs for levels 6 through 8.
    #[serde(default = "default_star_tiers")]
    pub star_tiers: Vec<StarTier>,
}

impl Default for EnergyLimitConfig {
    fn default() -> Self {
        Self {
            point_costs: default_point_costs(),
            capacity: default_capacity(),
            star_tiers: default_star_tiers(),
        }
    }
}

// ---------------------------------------------------------------------------
// Auto-bot tiers
// ---------------------------------------------------------------------------

/// Configuration for one auto-bot tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BotTierConfig {
    /// Mining window duration in hours.
    pub duration_hours: u32,
    /// Advertised star price. The purchase settles on the payment rail
    /// outside the core; activation itself never deducts stars.
    pub star_cost: u64,
    /// Days the session stays valid after activation.
    pub validity_days: u32,
}

/// The auto-bot tier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BotConfig {
    /// Free tier: one two-hour window inside a one-day validity.
    #[serde(default = "default_free_tier")]
    pub free: BotTierConfig,
    /// Basic paid tier: seven hours per day for seven days.
    #[serde(default = "default_basic_tier")]
    pub basic: BotTierConfig,
    /// Advanced paid tier: fourteen hours per day for seven days.
    #[serde(default = "default_advanced_tier")]
    pub advanced: BotTierConfig,
    /// Premium paid tier: twenty-four hours per day for seven days.
    #[serde(default = "default_premium_tier")]
    pub premium: BotTierConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            free: default_free_tier(),
            basic: default_basic_tier(),
            advanced: default_advanced_tier(),
            premium: default_premium_tier(),
        }
    }
}

impl BotConfig {
    /// Return the configuration for a tier.
    pub const fn tier(&self, tier: BotTier) -> &BotTierConfig {
        match tier {
            BotTier::Free => &self.free,
            BotTier::Basic => &self.basic,
            BotTier::Advanced => &self.advanced,
            BotTier::Premium => &self.premium,
        }
    }
}

// ---------------------------------------------------------------------------
// Referrals and check-in
// ---------------------------------------------------------------------------

/// One referral reward tier: claimable once the direct-referral count
/// reaches the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ReferralTier {
    /// Direct referrals required to qualify.
    pub referrals: u32,
    /// Referral points paid on claim.
    pub reward: u64,
}

/// Referral bonuses and the reward tier table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReferralConfig {
    /// Points credited to the direct referrer per signup.
    #[serde(default = "default_direct_bonus")]
    pub direct_bonus: u64,
    /// Points credited to the referrer's own referrer per signup.
    #[serde(default = "default_indirect_bonus")]
    pub indirect_bonus: u64,
    /// Reward tiers in strictly increasing threshold order.
    #[serde(default = "default_reward_tiers")]
    pub reward_tiers: Vec<ReferralTier>,
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self {
            direct_bonus: default_direct_bonus(),
            indirect_bonus: default_indirect_bonus(),
            reward_tiers: default_reward_tiers(),
        }
    }
}

/// Daily check-in reward schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CheckInConfig {
    /// Reward when the streak was broken (or on the first check-in ever).
    #[serde(default = "default_streak_broken_reward")]
    pub streak_broken_reward: u64,
    /// Reward on an ordinary streak day.
    #[serde(default = "default_daily_reward")]
    pub daily_reward: u64,
    /// Reward on the first completed week (streak 7).
    #[serde(default = "default_first_week_reward")]
    pub first_week_reward: u64,
    /// Per-week reward multiplier base beyond the first week.
    #[serde(default = "default_weekly_reward_step")]
    pub weekly_reward_step: u64,
    /// Cap on the weekly bonus.
    #[serde(default = "default_weekly_reward_cap")]
    pub weekly_reward_cap: u64,
}

impl Default for CheckInConfig {
    fn default() -> Self {
        Self {
            streak_broken_reward: default_streak_broken_reward(),
            daily_reward: default_daily_reward(),
            first_week_reward: default_first_week_reward(),
            weekly_reward_step: default_weekly_reward_step(),
            weekly_reward_cap: default_weekly_reward_cap(),
        }
    }
}

// ---------------------------------------------------------------------------
// EconomyConfig
// ---------------------------------------------------------------------------

/// The complete, immutable economy configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Multi-tap ladder tables.
    #[serde(default)]
    pub multi_tap: MultiTapConfig,
    /// Speed ladder tables.
    #[serde(default)]
    pub speed: SpeedConfig,
    /// Energy-limit ladder tables.
    #[serde(default)]
    pub energy_limit: EnergyLimitConfig,
    /// Auto-bot tier table.
    #[serde(default)]
    pub bot: BotConfig,
    /// Referral bonuses and reward tiers.
    #[serde(default)]
    pub referrals: ReferralConfig,
    /// Daily check-in schedule.
    #[serde(default)]
    pub check_in: CheckInConfig,
}

/// Entries in a point-cost table (transitions 1→2 through 4→5).
const POINT_STEPS: usize = 4;
/// Entries in a star ladder (levels 6 through 8).
const STAR_STEPS: usize = 3;
/// Entries in the base tap-power table (levels 1 through 5).
const BASE_POWER_LEVELS: usize = 5;
/// Entries in a full per-level table (levels 1 through 8).
const LEVEL_COUNT: usize = 8;

impl EconomyConfig {
    /// Validate every table's shape.
    ///
    /// Called once at startup so the level-indexed accessors can treat a
    /// missing entry as a caller bug rather than a configuration problem.
    ///
    /// # Errors
    ///
    /// Returns the first [`EconomyConfigError`] found.
    pub fn validate(&self) -> Result<(), EconomyConfigError> {
        check_len("multi_tap.point_costs", self.multi_tap.point_costs.len(), POINT_STEPS)?;
        check_len("multi_tap.base_power", self.multi_tap.base_power.len(), BASE_POWER_LEVELS)?;
        check_len("multi_tap.star_tiers", self.multi_tap.star_tiers.len(), STAR_STEPS)?;
        check_len("speed.point_costs", self.speed.point_costs.len(), POINT_STEPS)?;
        check_len("speed.refill_minutes", self.speed.refill_minutes.len(), LEVEL_COUNT)?;
        check_len("speed.star_tiers", self.speed.star_tiers.len(), STAR_STEPS)?;
        check_len("energy_limit.point_costs", self.energy_limit.point_costs.len(), POINT_STEPS)?;
        check_len("energy_limit.capacity", self.energy_limit.capacity.len(), LEVEL_COUNT)?;
        check_len("energy_limit.star_tiers", self.energy_limit.star_tiers.len(), STAR_STEPS)?;

        // Refill times and capacities divide or bound the energy math; a
        // zero entry would mean division by zero or a dead energy economy.
        for (index, minutes) in self.speed.refill_minutes.iter().enumerate() {
            if *minutes == 0 {
                return Err(EconomyConfigError::ZeroEntry {
                    table: "speed.refill_minutes",
                    index,
                });
            }
        }
        for (index, cap) in self.energy_limit.capacity.iter().enumerate() {
            if *cap == 0 {
                return Err(EconomyConfigError::ZeroEntry {
                    table: "energy_limit.capacity",
                    index,
                });
            }
        }
        for tier in BotTier::ALL {
            let cfg = self.bot.tier(tier);
            if cfg.duration_hours == 0 {
                return Err(EconomyConfigError::ZeroEntry {
                    table: "bot.duration_hours",
                    index: 0,
                });
            }
            if cfg.validity_days == 0 {
                return Err(EconomyConfigError::ZeroEntry {
                    table: "bot.validity_days",
                    index: 0,
                });
            }
        }

        let thresholds = self.referrals.reward_tiers.iter().map(|tier| tier.referrals);
        let mut previous: Option<u32> = None;
        for threshold in thresholds {
            if let Some(prev) = previous {
                if threshold <= prev {
                    return Err(EconomyConfigError::UnsortedReferralTiers);
                }
            }
            previous = Some(threshold);
        }

        Ok(())
    }

    /// Minutes to refill from zero to the cap at a speed level.
    pub fn refill_minutes(&self, speed_level: u32) -> Result<u32, GameError> {
        table_entry(&self.speed.refill_minutes, speed_level).copied()
    }

    /// Energy cap at an energy-limit level.
    pub fn capacity(&self, energy_limit_level: u32) -> Result<u32, GameError> {
        table_entry(&self.energy_limit.capacity, energy_limit_level).copied()
    }

    /// Tap power at a multi-tap level: base power for the level (clamped
    /// to the point ladder) plus every star-tier bonus earned so far.
    pub fn tap_power(&self, multi_tap_level: u32) -> Result<u64, GameError> {
        if multi_tap_level == 0 || multi_tap_level > MAX_LEVEL {
            return Err(GameError::InvalidLevel {
                level: multi_tap_level,
            });
        }

        let base_level = multi_tap_level.min(POINT_LEVEL_CAP);
        let base = *table_entry(&self.multi_tap.base_power, base_level)?;

        let earned_star_tiers =
            usize::try_from(multi_tap_level.saturating_sub(POINT_LEVEL_CAP)).unwrap_or(0);
        let mut power = base;
        for tier in self.multi_tap.star_tiers.iter().take(earned_star_tiers) {
            power = power
                .checked_add(u64::from(tier.tap_power_bonus))
                .ok_or_else(|| GameError::ArithmeticOverflow {
                    context: String::from("tap power star bonus overflow"),
                })?;
        }
        Ok(power)
    }

    /// Point cost for the transition `current_level → current_level + 1`.
    ///
    /// Only transitions into the point ladder (targets 2 through 5) have
    /// an entry.
    pub fn point_cost(&self, stat: StatKind, current_level: u32) -> Result<u64, GameError> {
        let costs = match stat {
            StatKind::MultiTap => &self.multi_tap.point_costs,
            StatKind::Speed => &self.speed.point_costs,
            StatKind::EnergyLimit => &self.energy_limit.point_costs,
        };
        table_entry(costs, current_level).copied()
    }

    /// Star rung for the transition into `target_level` (6 through 8).
    pub fn star_tier(&self, stat: StatKind, target_level: u32) -> Result<&StarTier, GameError> {
        let tiers = match stat {
            StatKind::MultiTap => &self.multi_tap.star_tiers,
            StatKind::Speed => &self.speed.star_tiers,
            StatKind::EnergyLimit => &self.energy_limit.star_tiers,
        };
        let offset = target_level
            .checked_sub(POINT_LEVEL_CAP)
            .ok_or(GameError::InvalidLevel {
                level: target_level,
            })?;
        table_entry(tiers, offset)
    }
}

/// Look up a one-based level in a level-indexed table.
fn table_entry<T>(table: &[T], level: u32) -> Result<&T, GameError> {
    let index = level
        .checked_sub(1)
        .and_then(|offset| usize::try_from(offset).ok())
        .ok_or(GameError::InvalidLevel { level })?;
    table.get(index).ok_or(GameError::InvalidLevel { level })
}

const fn check_len(
    table: &'static str,
    actual: usize,
    expected: usize,
) -> Result<(), EconomyConfigError> {
    if actual == expected {
        Ok(())
    } else {
        Err(EconomyConfigError::TableLength {
            table,
            expected,
            actual,
        })
    }
}

// ---------------------------------------------------------------------------
// Production defaults
// ---------------------------------------------------------------------------

fn default_point_costs() -> Vec<u64> {
    vec![1_000, 10_000, 100_000, 1_000_000]
}

fn default_base_power() -> Vec<u64> {
    vec![1, 2, 3, 4, 5]
}

fn default_refill_minutes() -> Vec<u32> {
    vec![40, 35, 30, 25, 20, 15, 10, 5]
}

fn default_capacity() -> Vec<u32> {
    vec![500, 1_000, 1_500, 2_000, 3_000, 4_000, 5_000, 6_000]
}

fn default_star_tiers() -> Vec<StarTier> {
    vec![
        StarTier {
            stars: 10,
            power_reward: 100_000,
            tap_power_bonus: 0,
        },
        StarTier {
            stars: 20,
            power_reward: 500_000,
            tap_power_bonus: 0,
        },
        StarTier {
            stars: 50,
            power_reward: 1_000_000,
            tap_power_bonus: 0,
        },
    ]
}

fn default_multi_tap_star_tiers() -> Vec<StarTier> {
    default_star_tiers()
        .into_iter()
        .map(|tier| StarTier {
            tap_power_bonus: 2,
            ..tier
        })
        .collect()
}

const fn default_free_tier() -> BotTierConfig {
    BotTierConfig {
        duration_hours: 2,
        star_cost: 0,
        validity_days: 1,
    }
}

const fn default_basic_tier() -> BotTierConfig {
    BotTierConfig {
        duration_hours: 7,
        star_cost: 20,
        validity_days: 7,
    }
}

const fn default_advanced_tier() -> BotTierConfig {
    BotTierConfig {
        duration_hours: 14,
        star_cost: 50,
        validity_days: 7,
    }
}

const fn default_premium_tier() -> BotTierConfig {
    BotTierConfig {
        duration_hours: 24,
        star_cost: 100,
        validity_days: 7,
    }
}

const fn default_direct_bonus() -> u64 {
    500
}

const fn default_indirect_bonus() -> u64 {
    100
}

fn default_reward_tiers() -> Vec<ReferralTier> {
    vec![
        ReferralTier {
            referrals: 5,
            reward: 1_000,
        },
        ReferralTier {
            referrals: 10,
            reward: 2_500,
        },
        ReferralTier {
            referrals: 25,
            reward: 5_000,
        },
        ReferralTier {
            referrals: 50,
            reward: 10_000,
        },
        ReferralTier {
            referrals: 100,
            reward: 25_000,
        },
        ReferralTier {
            referrals: 500,
            reward: 50_000,
        },
        ReferralTier {
            referrals: 1_000,
            reward: 100_000,
        },
    ]
}

const fn default_streak_broken_reward() -> u64 {
    1_000
}

const fn default_daily_reward() -> u64 {
    5_000
}

const fn default_first_week_reward() -> u64 {
    25_000
}

const fn default_weekly_reward_step() -> u64 {
    50_000
}

const fn default_weekly_reward_cap() -> u64 {
    250_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EconomyConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn wrong_table_length_is_rejected() {
        let mut config = EconomyConfig::default();
        config.speed.refill_minutes.pop();
        assert!(matches!(
            config.validate(),
            Err(EconomyConfigError::TableLength {
                table: "speed.refill_minutes",
                expected: 8,
                actual: 7,
            })
        ));
    }

    #[test]
    fn zero_refill_time_is_rejected() {
        let mut config = EconomyConfig::default();
        if let Some(first) = config.speed.refill_minutes.first_mut() {
            *first = 0;
        }
        assert!(matches!(
            config.validate(),
            Err(EconomyConfigError::ZeroEntry {
                table: "speed.refill_minutes",
                index: 0,
            })
        ));
    }

    #[test]
    fn unsorted_referral_tiers_are_rejected() {
        let mut config = EconomyConfig::default();
        config.referrals.reward_tiers.reverse();
        assert!(matches!(
            config.validate(),
            Err(EconomyConfigError::UnsortedReferralTiers)
        ));
    }

    #[test]
    fn refill_minutes_match_speed_ladder() {
        let config = EconomyConfig::default();
        assert_eq!(config.refill_minutes(1).ok(), Some(40));
        assert_eq!(config.refill_minutes(8).ok(), Some(5));
        assert!(config.refill_minutes(0).is_err());
        assert!(config.refill_minutes(9).is_err());
    }

    #[test]
    fn capacity_matches_energy_ladder() {
        let config = EconomyConfig::default();
        assert_eq!(config.capacity(1).ok(), Some(500));
        assert_eq!(config.capacity(5).ok(), Some(3_000));
        assert_eq!(config.capacity(8).ok(), Some(6_000));
    }

    #[test]
    fn tap_power_base_levels() {
        let config = EconomyConfig::default();
        assert_eq!(config.tap_power(1).ok(), Some(1));
        assert_eq!(config.tap_power(3).ok(), Some(3));
        assert_eq!(config.tap_power(5).ok(), Some(5));
    }

    #[test]
    fn tap_power_accumulates_star_bonuses() {
        let config = EconomyConfig::default();
        // Level 6: base 5 + one bonus of 2.
        assert_eq!(config.tap_power(6).ok(), Some(7));
        assert_eq!(config.tap_power(7).ok(), Some(9));
        assert_eq!(config.tap_power(8).ok(), Some(11));
    }

    #[test]
    fn tap_power_rejects_levels_off_ladder() {
        let config = EconomyConfig::default();
        assert!(config.tap_power(0).is_err());
        assert!(config.tap_power(9).is_err());
    }

    #[test]
    fn point_cost_covers_transitions_into_point_ladder() {
        let config = EconomyConfig::default();
        assert_eq!(config.point_cost(StatKind::Speed, 1).ok(), Some(1_000));
        assert_eq!(config.point_cost(StatKind::Speed, 4).ok(), Some(1_000_000));
        assert!(config.point_cost(StatKind::Speed, 5).is_err());
    }

    #[test]
    fn star_tier_covers_targets_six_through_eight() {
        let config = EconomyConfig::default();
        let rung = config.star_tier(StatKind::MultiTap, 6).ok();
        assert_eq!(rung.map(|tier| tier.stars), Some(10));
        assert_eq!(rung.map(|tier| tier.tap_power_bonus), Some(2));
        let top = config.star_tier(StatKind::Speed, 8).ok();
        assert_eq!(top.map(|tier| tier.stars), Some(50));
        assert_eq!(top.map(|tier| tier.tap_power_bonus), Some(0));
        assert!(config.star_tier(StatKind::Speed, 5).is_err());
        assert!(config.star_tier(StatKind::Speed, 9).is_err());
    }

    #[test]
    fn bot_tier_table_matches_catalog() {
        let config = EconomyConfig::default();
        assert_eq!(config.bot.tier(BotTier::Free).duration_hours, 2);
        assert_eq!(config.bot.tier(BotTier::Free).validity_days, 1);
        assert_eq!(config.bot.tier(BotTier::Basic).duration_hours, 7);
        assert_eq!(config.bot.tier(BotTier::Advanced).star_cost, 50);
        assert_eq!(config.bot.tier(BotTier::Premium).duration_hours, 24);
    }
}
