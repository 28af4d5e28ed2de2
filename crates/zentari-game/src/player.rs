//! Player registration.
//!
//! Builds the initial [`PlayerState`] record: levels at 1, energy at the
//! level-1 cap, all counters at zero, the referral reward ledger seeded
//! with every configured tier unclaimed, and the auto-bot inactive.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use zentari_types::{AutoBotState, PlayerId, PlayerState, Statistics};

use crate::config::EconomyConfig;
use crate::error::GameError;
use crate::referral;

/// Create a fresh player record.
///
/// `referral` is the username of the direct referrer, if any; crediting
/// that referrer is a separate operation on the referrer's own record
/// (see [`referral::record_direct`]).
pub fn create_player(
    username: String,
    player_id: PlayerId,
    referral: Option<String>,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<PlayerState, GameError> {
    let max_energy = config.capacity(1)?;

    Ok(PlayerState {
        player_id,
        username,
        energy: Decimal::from(max_energy),
        max_energy,
        last_tap_time: now,
        multi_tap_level: 1,
        speed_level: 1,
        energy_limit_level: 1,
        power: 0,
        stars: 0,
        check_in_points: 0,
        referral_points: 0,
        last_check_in: None,
        check_in_streak: 0,
        referral,
        direct_referrals: Vec::new(),
        indirect_referrals: Vec::new(),
        referral_rewards: referral::seeded_rewards(config),
        auto_bot: AutoBotState::default(),
        statistics: Statistics::default(),
        is_active: true,
        created_at: now,
        last_active: now,
    })
}
