//! The upgrade ladder.
//!
//! Each stat levels 1 through 8. Transitions into levels 2 through 5 are
//! bought with power points from the per-stat cost table; transitions into
//! levels 6 through 8 are star purchases that deduct stars and credit a
//! fixed power reward in the same operation (star rungs pay as well as
//! cost). Offering the wrong currency for a target level is rejected
//! outright.
//!
//! Derived fields are recomputed on level change: an energy-limit upgrade
//! refreshes `max_energy` from the capacity table, and tap power is always
//! derived from the multi-tap level (see
//! [`EconomyConfig::tap_power`]). The per-stat high-water mark ratchets up
//! with every upgrade.
//!
//! All cost lookups and balance arithmetic happen before any field is
//! written, so a rejected upgrade leaves the record untouched.

use zentari_types::{PlayerState, StatKind};

use crate::config::{EconomyConfig, MAX_LEVEL, POINT_LEVEL_CAP};
use crate::error::{Currency, GameError};

/// What a successful upgrade charged (and, for star rungs, paid out).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeCost {
    /// A point purchase: power deducted.
    Points {
        /// Power deducted from the balance.
        power_spent: u64,
    },
    /// A star purchase: stars deducted, power credited.
    Stars {
        /// Stars deducted from the balance.
        stars_spent: u64,
        /// Power credited alongside the level-up.
        power_reward: u64,
    },
}

/// Result of a successful upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeOutcome {
    /// The upgraded stat.
    pub stat: StatKind,
    /// The level reached.
    pub new_level: u32,
    /// What the upgrade charged.
    pub cost: UpgradeCost,
    /// Tap power after the upgrade (changes only for multi-tap).
    pub tap_power: u64,
    /// Energy cap after the upgrade (changes only for energy-limit).
    pub max_energy: u32,
}

/// Upgrade `stat` by one level, paying with points or stars.
pub fn upgrade(
    state: &mut PlayerState,
    stat: StatKind,
    use_stars: bool,
    config: &EconomyConfig,
) -> Result<UpgradeOutcome, GameError> {
    let current = state.level(stat);
    if current >= MAX_LEVEL {
        return Err(GameError::MaxLevelReached { stat });
    }
    let target = current
        .checked_add(1)
        .ok_or_else(|| overflow("target level"))?;

    // Resolve the charge and the post-upgrade balances before touching
    // anything.
    let (cost, power_after, stars_after) = if use_stars {
        if target <= POINT_LEVEL_CAP {
            return Err(GameError::WrongCurrencyForLevel {
                target_level: target,
            });
        }
        let rung = config.star_tier(stat, target)?;
        if state.stars < rung.stars {
            return Err(GameError::InsufficientFunds {
                currency: Currency::Stars,
                required: rung.stars,
                available: state.stars,
            });
        }
        let stars_after = state
            .stars
            .checked_sub(rung.stars)
            .ok_or_else(|| overflow("star deduction"))?;
        let power_after = state
            .power
            .checked_add(rung.power_reward)
            .ok_or_else(|| overflow("star reward credit"))?;
        let cost = UpgradeCost::Stars {
            stars_spent: rung.stars,
            power_reward: rung.power_reward,
        };
        (cost, power_after, stars_after)
    } else {
        if target > POINT_LEVEL_CAP {
            return Err(GameError::WrongCurrencyForLevel {
                target_level: target,
            });
        }
        let price = config.point_cost(stat, current)?;
        if state.power < price {
            return Err(GameError::InsufficientFunds {
                currency: Currency::Power,
                required: price,
                available: state.power,
            });
        }
        let power_after = state
            .power
            .checked_sub(price)
            .ok_or_else(|| overflow("point deduction"))?;
        let cost = UpgradeCost::Points { power_spent: price };
        (cost, power_after, state.stars)
    };

    let max_energy_after = if stat == StatKind::EnergyLimit {
        config.capacity(target)?
    } else {
        state.max_energy
    };
    let multi_tap_after = if stat == StatKind::MultiTap {
        target
    } else {
        state.multi_tap_level
    };
    let tap_power_after = config.tap_power(multi_tap_after)?;

    state.power = power_after;
    state.stars = stars_after;
    state.set_level(stat, target);
    state.max_energy = max_energy_after;
    // The cap never shrinks with the shipped tables; the clamp keeps the
    // energy invariant under any configuration.
    state.energy = state.energy.min(rust_decimal::Decimal::from(max_energy_after));
    state.statistics.highest_level.ratchet(stat, target);

    Ok(UpgradeOutcome {
        stat,
        new_level: target,
        cost,
        tap_power: tap_power_after,
        max_energy: max_energy_after,
    })
}

fn overflow(context: &str) -> GameError {
    GameError::ArithmeticOverflow {
        context: String::from(context),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;
    use zentari_types::PlayerId;

    use crate::player::create_player;

    use super::*;

    fn test_player(config: &EconomyConfig) -> PlayerState {
        create_player(
            String::from("climber"),
            PlayerId::new(),
            None,
            config,
            DateTime::<Utc>::UNIX_EPOCH,
        )
        .unwrap()
    }

    #[test]
    fn point_upgrade_deducts_power_and_raises_the_level() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.power = 1_500;

        let outcome = upgrade(&mut state, StatKind::Speed, false, &config).unwrap();
        assert_eq!(outcome.new_level, 2);
        assert_eq!(outcome.cost, UpgradeCost::Points { power_spent: 1_000 });
        assert_eq!(state.speed_level, 2);
        assert_eq!(state.power, 500);
        assert_eq!(config.refill_minutes(state.speed_level).unwrap(), 35);
    }

    #[test]
    fn point_upgrade_with_short_balance_is_rejected() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.power = 999;
        let before = state.clone();

        let rejected = upgrade(&mut state, StatKind::Speed, false, &config);
        assert!(matches!(
            rejected,
            Err(GameError::InsufficientFunds {
                currency: Currency::Power,
                required: 1_000,
                available: 999,
            })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn points_cannot_buy_star_levels() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.multi_tap_level = 5;
        state.power = u64::MAX / 2;

        let rejected = upgrade(&mut state, StatKind::MultiTap, false, &config);
        assert!(matches!(
            rejected,
            Err(GameError::WrongCurrencyForLevel { target_level: 6 })
        ));
        assert_eq!(state.multi_tap_level, 5);
    }

    #[test]
    fn stars_cannot_buy_point_levels() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.stars = 100;

        let rejected = upgrade(&mut state, StatKind::Speed, true, &config);
        assert!(matches!(
            rejected,
            Err(GameError::WrongCurrencyForLevel { target_level: 2 })
        ));
        assert_eq!(state.speed_level, 1);
        assert_eq!(state.stars, 100);
    }

    #[test]
    fn star_upgrade_with_short_balance_leaves_everything_unchanged() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.multi_tap_level = 5;
        state.stars = 9; // rung 6 costs 10
        let before = state.clone();

        let rejected = upgrade(&mut state, StatKind::MultiTap, true, &config);
        assert!(matches!(
            rejected,
            Err(GameError::InsufficientFunds {
                currency: Currency::Stars,
                required: 10,
                available: 9,
            })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn star_upgrade_charges_stars_and_pays_the_reward() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.multi_tap_level = 5;
        state.stars = 25;
        state.power = 10;

        let outcome = upgrade(&mut state, StatKind::MultiTap, true, &config).unwrap();
        assert_eq!(outcome.new_level, 6);
        assert_eq!(
            outcome.cost,
            UpgradeCost::Stars {
                stars_spent: 10,
                power_reward: 100_000,
            }
        );
        assert_eq!(state.stars, 15);
        assert_eq!(state.power, 100_010);
        // Tap power picks up the star rung's +2.
        assert_eq!(outcome.tap_power, 7);
    }

    #[test]
    fn energy_limit_upgrade_recomputes_the_cap() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.power = 1_000;

        let outcome = upgrade(&mut state, StatKind::EnergyLimit, false, &config).unwrap();
        assert_eq!(outcome.max_energy, 1_000);
        assert_eq!(state.max_energy, 1_000);
        // Existing energy is not topped up by the bigger cap.
        assert_eq!(state.energy, Decimal::from(500));
    }

    #[test]
    fn ladder_stops_at_the_cap() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.speed_level = 8;
        state.stars = 1_000;

        let rejected = upgrade(&mut state, StatKind::Speed, true, &config);
        assert!(matches!(
            rejected,
            Err(GameError::MaxLevelReached {
                stat: StatKind::Speed
            })
        ));
        assert_eq!(state.speed_level, 8);
    }

    #[test]
    fn highest_level_ratchets_with_each_upgrade() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.power = 20_000;

        upgrade(&mut state, StatKind::MultiTap, false, &config).unwrap();
        upgrade(&mut state, StatKind::MultiTap, false, &config).unwrap();
        assert_eq!(state.statistics.highest_level.get(StatKind::MultiTap), 3);
        assert_eq!(state.statistics.highest_level.get(StatKind::Speed), 1);
    }

    #[test]
    fn full_point_ladder_climb() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.power = 1_111_000; // 1000 + 10000 + 100000 + 1000000

        for expected in 2..=5 {
            let outcome = upgrade(&mut state, StatKind::MultiTap, false, &config).unwrap();
            assert_eq!(outcome.new_level, expected);
        }
        assert_eq!(state.power, 0);
        assert_eq!(state.multi_tap_level, 5);
        assert_eq!(config.tap_power(state.multi_tap_level).unwrap(), 5);
    }
}
