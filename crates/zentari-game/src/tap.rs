//! Tap resolution.
//!
//! A tap costs `tap_power` energy and credits `tap_power` power. The
//! resolver recomputes energy at `now`, authorizes or rejects, and applies
//! the four mutations (energy, anchor, power, statistics) as one unit --
//! every new value is computed before any field is written, so a failed
//! tap leaves the record untouched.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use zentari_types::PlayerState;

use crate::config::EconomyConfig;
use crate::energy;
use crate::error::GameError;

/// Result of an accepted tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapOutcome {
    /// Power credited (equals the energy spent).
    pub power_gained: u64,
    /// Energy remaining after the tap.
    pub energy_after: Decimal,
    /// Lifetime accepted-tap count after this tap.
    pub total_taps: u64,
}

/// Resolve one tap at `now`.
///
/// Rejects with [`GameError::InsufficientEnergy`] -- including the wait
/// time until one tap's worth of energy is available -- when the
/// regenerated energy does not cover the tap cost.
pub fn resolve_tap(
    state: &mut PlayerState,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<TapOutcome, GameError> {
    let snapshot = energy::snapshot(state, config, now)?;
    let tap_power = config.tap_power(state.multi_tap_level)?;
    let cost = Decimal::from(tap_power);

    if snapshot.energy < cost {
        let seconds_to_next =
            energy::seconds_until(tap_power, snapshot.energy, snapshot.rate_per_second)?;
        return Err(GameError::InsufficientEnergy {
            required: tap_power,
            available: snapshot.energy,
            seconds_to_next,
        });
    }

    let energy_after = snapshot
        .energy
        .checked_sub(cost)
        .ok_or_else(|| overflow("tap energy deduction"))?;
    let power_after = state
        .power
        .checked_add(tap_power)
        .ok_or_else(|| overflow("tap power credit"))?;
    let total_taps = state
        .statistics
        .total_taps
        .checked_add(1)
        .ok_or_else(|| overflow("tap counter"))?;
    let total_generated = state
        .statistics
        .total_power_generated
        .checked_add(tap_power)
        .ok_or_else(|| overflow("generated power counter"))?;

    state.energy = energy_after;
    state.last_tap_time = now;
    state.power = power_after;
    state.statistics.total_taps = total_taps;
    state.statistics.total_power_generated = total_generated;

    Ok(TapOutcome {
        power_gained: tap_power,
        energy_after,
        total_taps,
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
    use zentari_types::PlayerId;

    use crate::player::create_player;

    use super::*;

    fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    fn test_player(config: &EconomyConfig) -> PlayerState {
        create_player(String::from("tapper"), PlayerId::new(), None, config, epoch()).unwrap()
    }

    #[test]
    fn tap_debits_energy_and_credits_power_atomically() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        let now = epoch();

        let outcome = resolve_tap(&mut state, &config, now);
        assert!(outcome.is_ok());
        assert_eq!(state.energy, Decimal::from(499));
        assert_eq!(state.power, 1);
        assert_eq!(state.statistics.total_taps, 1);
        assert_eq!(state.statistics.total_power_generated, 1);
        assert_eq!(state.last_tap_time, now);
    }

    #[test]
    fn five_hundred_taps_drain_the_default_cap_exactly() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        let now = epoch();

        for _ in 0..500 {
            let outcome = resolve_tap(&mut state, &config, now);
            assert!(outcome.is_ok());
        }
        assert_eq!(state.energy, Decimal::ZERO);
        assert_eq!(state.power, 500);

        // The 501st attempt at the same instant must be rejected.
        let rejected = resolve_tap(&mut state, &config, now);
        assert!(matches!(
            rejected,
            Err(GameError::InsufficientEnergy { required: 1, .. })
        ));
    }

    #[test]
    fn rejected_tap_leaves_state_unchanged() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.energy = Decimal::ZERO;
        let before = state.clone();
        let now = epoch();

        let rejected = resolve_tap(&mut state, &config, now);
        assert!(rejected.is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn rejection_reports_the_wait_for_one_tap() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.energy = Decimal::ZERO;

        let rejected = resolve_tap(&mut state, &config, epoch());
        // Rate 500/2400 per second; one energy in 4.8s, rounded up to 5.
        assert!(matches!(
            rejected,
            Err(GameError::InsufficientEnergy {
                seconds_to_next: 5,
                ..
            })
        ));
    }

    #[test]
    fn tap_cost_follows_the_multi_tap_level() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.multi_tap_level = 6; // tap power 7
        let now = epoch();

        let outcome = resolve_tap(&mut state, &config, now);
        assert_eq!(outcome.ok().map(|tap| tap.power_gained), Some(7));
        assert_eq!(state.energy, Decimal::from(493));
        assert_eq!(state.power, 7);
    }

    #[test]
    fn regeneration_is_applied_before_the_cost_check() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.energy = Decimal::ZERO;
        // 2.4 seconds regenerates exactly 0.5 energy at level 1 -- still
        // short of one tap.
        let now = epoch()
            .checked_add_signed(chrono::TimeDelta::milliseconds(2_400))
            .unwrap_or_else(epoch);
        let rejected = resolve_tap(&mut state, &config, now);
        assert!(rejected.is_err());

        // 4.8 seconds regenerates exactly one energy.
        let now = epoch()
            .checked_add_signed(chrono::TimeDelta::milliseconds(4_800))
            .unwrap_or_else(epoch);
        let outcome = resolve_tap(&mut state, &config, now);
        assert!(outcome.is_ok());
        assert_eq!(state.energy, Decimal::ZERO);
    }
}
