//! Daily check-in streaks.
//!
//! One check-in per UTC calendar day. A gap of more than 24 hours since
//! the previous check-in breaks the streak (reward drops to the base
//! amount and the streak restarts at zero); otherwise the streak advances
//! and every seventh day pays a weekly bonus instead of the daily reward.
//!
//! The status preview uses the same reset rule and reward schedule as the
//! claim path, so the previewed next reward always matches what the next
//! check-in actually pays.

use chrono::{DateTime, TimeDelta, Utc};

use zentari_types::PlayerState;

use crate::config::{CheckInConfig, EconomyConfig};
use crate::error::GameError;

/// Result of a successful daily check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInOutcome {
    /// Points credited.
    pub reward: u64,
    /// Streak after this check-in.
    pub streak: u32,
    /// Lifetime check-in count after this check-in.
    pub total_check_ins: u64,
}

/// Non-mutating check-in status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInStatus {
    /// Whether a check-in right now would be accepted.
    pub can_check_in: bool,
    /// The reward the next accepted check-in will pay.
    pub next_reward: u64,
    /// Current streak.
    pub streak: u32,
    /// When the player last checked in, if ever.
    pub last_check_in: Option<DateTime<Utc>>,
    /// Lifetime check-in count.
    pub total_check_ins: u64,
    /// Longest streak ever held.
    pub longest_streak: u32,
    /// Points earned from check-ins so far.
    pub check_in_points: u64,
}

/// Perform the daily check-in at `now`.
pub fn check_in(
    state: &mut PlayerState,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<CheckInOutcome, GameError> {
    if let Some(last) = state.last_check_in {
        if last.date_naive() == now.date_naive() {
            return Err(GameError::AlreadyCompletedToday);
        }
    }

    let (streak, reward) = next_check_in(state, &config.check_in, now)?;

    let points_after = state
        .check_in_points
        .checked_add(reward)
        .ok_or_else(|| overflow("check-in points credit"))?;
    let total_check_ins = state
        .statistics
        .total_check_ins
        .checked_add(1)
        .ok_or_else(|| overflow("check-in counter"))?;

    state.last_check_in = Some(now);
    state.check_in_streak = streak;
    state.check_in_points = points_after;
    state.statistics.total_check_ins = total_check_ins;
    if streak > state.statistics.longest_check_in_streak {
        state.statistics.longest_check_in_streak = streak;
    }

    Ok(CheckInOutcome {
        reward,
        streak,
        total_check_ins,
    })
}

/// Non-mutating status at `now`, using the claim path's exact rules.
pub fn status(
    state: &PlayerState,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<CheckInStatus, GameError> {
    let can_check_in = state
        .last_check_in
        .is_none_or(|last| last.date_naive() != now.date_naive());
    let next_reward = if can_check_in {
        next_check_in(state, &config.check_in, now)?.1
    } else {
        0
    };
    Ok(CheckInStatus {
        can_check_in,
        next_reward,
        streak: state.check_in_streak,
        last_check_in: state.last_check_in,
        total_check_ins: state.statistics.total_check_ins,
        longest_streak: state.statistics.longest_check_in_streak,
        check_in_points: state.check_in_points,
    })
}

/// The (streak, reward) pair an accepted check-in at `now` would produce.
fn next_check_in(
    state: &PlayerState,
    config: &CheckInConfig,
    now: DateTime<Utc>,
) -> Result<(u32, u64), GameError> {
    let continues = state.last_check_in.is_some_and(|last| {
        now.signed_duration_since(last) <= TimeDelta::hours(24)
    });
    if !continues {
        return Ok((0, config.streak_broken_reward));
    }

    let streak = state
        .check_in_streak
        .checked_add(1)
        .ok_or_else(|| overflow("streak counter"))?;
    let reward = reward_for_streak(streak, config)?;
    Ok((streak, reward))
}

/// Reward for an unbroken streak of the given length.
fn reward_for_streak(streak: u32, config: &CheckInConfig) -> Result<u64, GameError> {
    if streak % 7 != 0 {
        return Ok(config.daily_reward);
    }
    if streak == 7 {
        return Ok(config.first_week_reward);
    }
    let weeks = u64::from(streak / 7);
    let bonus = config
        .weekly_reward_step
        .checked_mul(weeks)
        .ok_or_else(|| overflow("weekly bonus"))?;
    Ok(bonus.min(config.weekly_reward_cap))
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

    fn at(base: DateTime<Utc>, delta: TimeDelta) -> DateTime<Utc> {
        base.checked_add_signed(delta).unwrap()
    }

    fn test_player(config: &EconomyConfig) -> PlayerState {
        create_player(String::from("regular"), PlayerId::new(), None, config, epoch()).unwrap()
    }

    #[test]
    fn first_check_in_pays_the_base_reward() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);

        let outcome = check_in(&mut state, &config, epoch()).unwrap();
        assert_eq!(outcome.reward, 1_000);
        assert_eq!(outcome.streak, 0);
        assert_eq!(state.check_in_points, 1_000);
        assert_eq!(state.statistics.total_check_ins, 1);
    }

    #[test]
    fn second_check_in_on_the_same_day_is_rejected() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        check_in(&mut state, &config, epoch()).unwrap();
        let before = state.clone();

        let again = check_in(&mut state, &config, at(epoch(), TimeDelta::hours(5)));
        assert!(matches!(again, Err(GameError::AlreadyCompletedToday)));
        assert_eq!(state, before);
    }

    #[test]
    fn consecutive_days_advance_the_streak() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        check_in(&mut state, &config, epoch()).unwrap();

        let outcome = check_in(&mut state, &config, at(epoch(), TimeDelta::hours(24))).unwrap();
        assert_eq!(outcome.streak, 1);
        assert_eq!(outcome.reward, 5_000);
    }

    #[test]
    fn a_gap_over_24_hours_breaks_the_streak() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.check_in_streak = 5;
        state.last_check_in = Some(epoch());

        let outcome =
            check_in(&mut state, &config, at(epoch(), TimeDelta::hours(30))).unwrap();
        assert_eq!(outcome.streak, 0);
        assert_eq!(outcome.reward, 1_000);
        assert_eq!(state.check_in_streak, 0);
    }

    #[test]
    fn weekly_milestones_pay_the_bonus_schedule() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        // Streak 6 checked in yesterday: today's check-in reaches 7.
        state.check_in_streak = 6;
        state.last_check_in = Some(epoch());

        let week_one = check_in(&mut state, &config, at(epoch(), TimeDelta::hours(24))).unwrap();
        assert_eq!(week_one.streak, 7);
        assert_eq!(week_one.reward, 25_000);

        // Streak 13 -> 14: second weekly milestone.
        state.check_in_streak = 13;
        let week_two =
            check_in(&mut state, &config, at(epoch(), TimeDelta::hours(48))).unwrap();
        assert_eq!(week_two.streak, 14);
        assert_eq!(week_two.reward, 100_000); // 50000 * 2
    }

    #[test]
    fn weekly_bonus_is_capped() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        // Streak 41 -> 42: six weeks, 50000 * 6 = 300000, capped at 250000.
        state.check_in_streak = 41;
        state.last_check_in = Some(epoch());

        let outcome = check_in(&mut state, &config, at(epoch(), TimeDelta::hours(24))).unwrap();
        assert_eq!(outcome.streak, 42);
        assert_eq!(outcome.reward, 250_000);
    }

    #[test]
    fn longest_streak_ratchets() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.check_in_streak = 9;
        state.last_check_in = Some(epoch());
        state.statistics.longest_check_in_streak = 9;

        check_in(&mut state, &config, at(epoch(), TimeDelta::hours(24))).unwrap();
        assert_eq!(state.statistics.longest_check_in_streak, 10);

        // A broken streak never lowers the record.
        check_in(&mut state, &config, at(epoch(), TimeDelta::hours(72))).unwrap();
        assert_eq!(state.check_in_streak, 0);
        assert_eq!(state.statistics.longest_check_in_streak, 10);
    }

    #[test]
    fn status_preview_matches_the_claim() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        state.check_in_streak = 6;
        state.last_check_in = Some(epoch());

        let later = at(epoch(), TimeDelta::hours(24));
        let preview = status(&state, &config, later).unwrap();
        assert!(preview.can_check_in);

        let outcome = check_in(&mut state, &config, later).unwrap();
        assert_eq!(preview.next_reward, outcome.reward);
    }

    #[test]
    fn status_blocks_a_second_same_day_check_in() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        check_in(&mut state, &config, epoch()).unwrap();

        let preview = status(&state, &config, at(epoch(), TimeDelta::hours(2))).unwrap();
        assert!(!preview.can_check_in);
        assert_eq!(preview.next_reward, 0);
    }
}
