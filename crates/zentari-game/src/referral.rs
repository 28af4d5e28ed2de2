//! Referral bookkeeping and reward tiers.
//!
//! A signup credits the direct referrer (and the referrer's own referrer,
//! one hop up) with a fixed bonus and an ordered referral record. The
//! reward ledger is seeded at registration with every configured tier
//! unclaimed; each tier is claimable exactly once, lowest qualified tier
//! first, once the direct-referral count reaches its threshold.

use chrono::{DateTime, Utc};

use zentari_types::{DirectReferral, IndirectReferral, PlayerId, PlayerState, ReferralRewardSlot};

use crate::config::EconomyConfig;
use crate::error::GameError;

/// Result of a successful referral reward claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardClaim {
    /// Threshold of the claimed tier.
    pub referrals: u32,
    /// Points credited.
    pub reward: u64,
    /// Referral point balance after the claim.
    pub total_referral_points: u64,
}

/// One row of the reward-tier report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardTierStatus {
    /// Direct referrals required to qualify.
    pub referrals: u32,
    /// Points the tier pays.
    pub reward: u64,
    /// Whether the referral count has reached the threshold.
    pub qualified: bool,
    /// Whether the tier has been claimed.
    pub claimed: bool,
    /// Qualified and not yet claimed.
    pub claimable: bool,
}

/// The reward ledger a new player starts with: every tier unclaimed.
pub fn seeded_rewards(config: &EconomyConfig) -> Vec<ReferralRewardSlot> {
    config
        .referrals
        .reward_tiers
        .iter()
        .map(|tier| ReferralRewardSlot {
            referrals: tier.referrals,
            reward: tier.reward,
            claimed: false,
        })
        .collect()
}

/// Credit a direct referrer for a signup. Returns the bonus credited.
pub fn record_direct(
    referrer: &mut PlayerState,
    username: &str,
    player_id: PlayerId,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<u64, GameError> {
    let bonus = config.referrals.direct_bonus;
    let points_after = referrer
        .referral_points
        .checked_add(bonus)
        .ok_or_else(|| overflow("direct referral bonus"))?;

    referrer.referral_points = points_after;
    referrer.direct_referrals.push(DirectReferral {
        username: String::from(username),
        player_id,
        joined_at: now,
        points_earned: bonus,
    });
    Ok(bonus)
}

/// Credit an indirect referrer (two hops up) for a signup. Returns the
/// bonus credited.
pub fn record_indirect(
    upstream: &mut PlayerState,
    username: &str,
    player_id: PlayerId,
    referred_by: &str,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<u64, GameError> {
    let bonus = config.referrals.indirect_bonus;
    let points_after = upstream
        .referral_points
        .checked_add(bonus)
        .ok_or_else(|| overflow("indirect referral bonus"))?;

    upstream.referral_points = points_after;
    upstream.indirect_referrals.push(IndirectReferral {
        username: String::from(username),
        player_id,
        referred_by: String::from(referred_by),
        joined_at: now,
        points_earned: bonus,
    });
    Ok(bonus)
}

/// Claim the lowest qualified unclaimed reward tier.
pub fn claim_reward(state: &mut PlayerState) -> Result<RewardClaim, GameError> {
    let count = state.direct_referral_count();

    // The ledger is seeded in ascending threshold order, so the first
    // qualified unclaimed slot is the lowest one.
    let slot_index = state
        .referral_rewards
        .iter()
        .position(|slot| !slot.claimed && count >= u64::from(slot.referrals));
    let Some(slot_index) = slot_index else {
        let next_threshold = state
            .referral_rewards
            .iter()
            .filter(|slot| !slot.claimed)
            .map(|slot| slot.referrals)
            .min();
        return Err(GameError::NoRewardToClaim { next_threshold });
    };

    let (referrals, reward) = state
        .referral_rewards
        .get(slot_index)
        .map(|slot| (slot.referrals, slot.reward))
        .ok_or_else(|| overflow("reward ledger index"))?;
    let total_referral_points = state
        .referral_points
        .checked_add(reward)
        .ok_or_else(|| overflow("referral reward credit"))?;

    if let Some(slot) = state.referral_rewards.get_mut(slot_index) {
        slot.claimed = true;
    }
    state.referral_points = total_referral_points;

    Ok(RewardClaim {
        referrals,
        reward,
        total_referral_points,
    })
}

/// Per-tier qualification report.
pub fn reward_status(state: &PlayerState) -> Vec<RewardTierStatus> {
    let count = state.direct_referral_count();
    state
        .referral_rewards
        .iter()
        .map(|slot| {
            let qualified = count >= u64::from(slot.referrals);
            RewardTierStatus {
                referrals: slot.referrals,
                reward: slot.reward,
                qualified,
                claimed: slot.claimed,
                claimable: qualified && !slot.claimed,
            }
        })
        .collect()
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
        create_player(String::from("inviter"), PlayerId::new(), None, config, epoch()).unwrap()
    }

    fn add_direct_referrals(state: &mut PlayerState, config: &EconomyConfig, count: usize) {
        for index in 0..count {
            let name = format!("friend-{index}");
            record_direct(state, &name, PlayerId::new(), config, epoch()).unwrap();
        }
    }

    #[test]
    fn direct_signup_credits_the_bonus_and_the_record() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);

        let bonus =
            record_direct(&mut state, "friend-0", PlayerId::new(), &config, epoch()).unwrap();
        assert_eq!(bonus, 500);
        assert_eq!(state.referral_points, 500);
        assert_eq!(state.direct_referrals.len(), 1);
        assert_eq!(
            state.direct_referrals.first().map(|r| r.points_earned),
            Some(500)
        );
    }

    #[test]
    fn indirect_signup_credits_the_smaller_bonus() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);

        let bonus = record_indirect(
            &mut state,
            "friend-of-friend",
            PlayerId::new(),
            "friend-0",
            &config,
            epoch(),
        )
        .unwrap();
        assert_eq!(bonus, 100);
        assert_eq!(state.referral_points, 100);
        assert_eq!(
            state.indirect_referrals.first().map(|r| r.referred_by.clone()),
            Some(String::from("friend-0"))
        );
    }

    #[test]
    fn claim_at_the_exact_threshold_succeeds_exactly_once() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        add_direct_referrals(&mut state, &config, 5);
        assert_eq!(state.referral_points, 2_500); // 5 signups * 500

        let claimed = claim_reward(&mut state).unwrap();
        assert_eq!(claimed.referrals, 5);
        assert_eq!(claimed.reward, 1_000);
        assert_eq!(state.referral_points, 3_500);

        // No new referrals: the next tier (10) is out of reach.
        let again = claim_reward(&mut state);
        assert!(matches!(
            again,
            Err(GameError::NoRewardToClaim {
                next_threshold: Some(10)
            })
        ));
    }

    #[test]
    fn claims_pay_lowest_qualified_tier_first() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        add_direct_referrals(&mut state, &config, 12);

        let first = claim_reward(&mut state).unwrap();
        assert_eq!(first.referrals, 5);
        let second = claim_reward(&mut state).unwrap();
        assert_eq!(second.referrals, 10);
        let third = claim_reward(&mut state);
        assert!(matches!(third, Err(GameError::NoRewardToClaim { .. })));
    }

    #[test]
    fn claim_below_every_threshold_reports_the_nearest_one() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        add_direct_referrals(&mut state, &config, 3);

        let rejected = claim_reward(&mut state);
        assert!(matches!(
            rejected,
            Err(GameError::NoRewardToClaim {
                next_threshold: Some(5)
            })
        ));
        assert!(state.referral_rewards.iter().all(|slot| !slot.claimed));
    }

    #[test]
    fn reward_status_reflects_qualification_and_claims() {
        let config = EconomyConfig::default();
        let mut state = test_player(&config);
        add_direct_referrals(&mut state, &config, 10);
        claim_reward(&mut state).unwrap();

        let report = reward_status(&state);
        let tier5 = report.iter().find(|row| row.referrals == 5).copied();
        let tier10 = report.iter().find(|row| row.referrals == 10).copied();
        let tier25 = report.iter().find(|row| row.referrals == 25).copied();
        assert_eq!(tier5.map(|row| (row.claimed, row.claimable)), Some((true, false)));
        assert_eq!(tier10.map(|row| (row.claimed, row.claimable)), Some((false, true)));
        assert_eq!(tier25.map(|row| (row.qualified, row.claimable)), Some((false, false)));
    }
}
