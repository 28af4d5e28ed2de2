//! Auto-tap bot accrual.
//!
//! The bot is a lazy state machine: nothing ticks in the background, and
//! nothing about the mining window or the accrued yield is ever stored.
//! Both are derived from the stored session timestamps at read and claim
//! time, so the two paths can never disagree.
//!
//! Per player the machine is `Inactive → Mining → Claimable → (claim) →
//! Inactive`. [`phase`] computes the current [`BotPhase`]; [`status`] and
//! [`claim`] are thin shells over it.
//!
//! # Windows
//!
//! The activation instant is derived as `valid_until - validity(tier)`.
//! The free tier mines a single fixed window of the configured duration
//! starting at activation, then stays claimable until claimed. Paid tiers
//! mine one window per day, anchored to the activation's hour and minute
//! (seconds zeroed); when the same-day anchor is still in the future the
//! window steps back one day, so the chosen window is always the most
//! recent one whose start is not after `now`.
//!
//! # Yield
//!
//! The bot taps `speed_level` times per second for the whole window:
//! `taps = window_secs * speed_level`, `power = taps * tap_power`, and
//! the claim drains `min(taps, max_energy)` energy.

use chrono::{DateTime, NaiveTime, TimeDelta, Timelike, Utc};
use rust_decimal::Decimal;

use zentari_types::{AutoBotState, BotTier, PlayerState};

use crate::config::{BotTierConfig, EconomyConfig};
use crate::error::GameError;

/// One mining window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningWindow {
    /// When the window opens.
    pub start: DateTime<Utc>,
    /// When the window closes.
    pub end: DateTime<Utc>,
}

impl MiningWindow {
    /// Whole seconds until the window closes; 0 once it has.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        let remaining = self.end.signed_duration_since(now).num_seconds();
        u64::try_from(remaining).unwrap_or(0)
    }
}

/// Yield accrued over one completed mining window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotYield {
    /// Taps accrued over the window.
    pub taps: u64,
    /// Power the claim will credit.
    pub power: u64,
    /// Energy the claim will drain, capped at the player's maximum.
    pub energy_consumed: u64,
}

/// The derived state of a player's auto-bot at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotPhase {
    /// No session, or the last session was claimed.
    Inactive,
    /// Inside a mining window; claiming is rejected.
    Mining {
        /// The window currently accruing.
        window: MiningWindow,
    },
    /// Past the window; the yield is collectable.
    Claimable {
        /// The completed window.
        window: MiningWindow,
        /// The yield a claim would pay right now.
        pending: BotYield,
    },
}

/// Result of a successful activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotActivation {
    /// The activated tier.
    pub tier: BotTier,
    /// When the session's validity ends.
    pub valid_until: DateTime<Utc>,
    /// The first mining window of the session.
    pub first_window: MiningWindow,
}

/// Non-mutating bot status report.
///
/// Built from the same [`phase`] computation as [`claim`], so the
/// previewed `pending_power` always matches what a claim at the same
/// instant would pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotStatus {
    /// Whether a session is active.
    pub is_active: bool,
    /// Tier of the active session, if any.
    pub tier: Option<BotTier>,
    /// Validity end of the active session, if any.
    pub valid_until: Option<DateTime<Utc>>,
    /// Whether `now` is inside a mining window.
    pub is_mining: bool,
    /// Seconds until the current window closes, while mining.
    pub remaining_secs: Option<u64>,
    /// Power a claim would pay right now.
    pub pending_power: u64,
    /// Whether a claim right now would succeed.
    pub can_claim: bool,
}

/// Result of a successful claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimOutcome {
    /// Taps accrued over the claimed window.
    pub taps: u64,
    /// Power credited.
    pub power_gained: u64,
    /// Energy drained by the bot.
    pub energy_consumed: u64,
    /// Energy remaining after the claim.
    pub energy_after: Decimal,
}

/// Activate a bot tier at `now`.
///
/// Rejected with [`GameError::BotAlreadyActive`] while a previous session
/// is active and unexpired. An expired session may be replaced without
/// claiming it first (its unclaimed yield is forfeited, as the new
/// session overwrites the timestamps).
pub fn activate(
    state: &mut PlayerState,
    tier: BotTier,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<BotActivation, GameError> {
    if state.auto_bot.is_active {
        if let Some(valid_until) = state.auto_bot.valid_until {
            if now < valid_until {
                return Err(GameError::BotAlreadyActive { valid_until });
            }
        }
    }

    let tier_config = config.bot.tier(tier);
    let valid_until = now
        .checked_add_signed(TimeDelta::days(i64::from(tier_config.validity_days)))
        .ok_or_else(|| overflow("bot validity end"))?;

    state.auto_bot = AutoBotState {
        tier,
        valid_until: Some(valid_until),
        last_claimed: Some(now),
        is_active: true,
    };

    let first_window = current_window(tier, tier_config, now, now)?;
    Ok(BotActivation {
        tier,
        valid_until,
        first_window,
    })
}

/// Compute the bot's phase at `now`.
///
/// This is the single window/yield computation both [`status`] and
/// [`claim`] use.
pub fn phase(
    state: &PlayerState,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<BotPhase, GameError> {
    let bot = &state.auto_bot;
    if !bot.is_active {
        return Ok(BotPhase::Inactive);
    }
    let valid_until = bot.valid_until.ok_or(GameError::BotNotActive)?;

    let tier_config = config.bot.tier(bot.tier);
    let activation = valid_until
        .checked_sub_signed(TimeDelta::days(i64::from(tier_config.validity_days)))
        .ok_or_else(|| overflow("bot activation time"))?;

    let window = current_window(bot.tier, tier_config, activation, now)?;

    // The free tier's single window closes at its end instant; a paid
    // tier's daily window includes it.
    let mining = if bot.tier.is_free() {
        now < window.end
    } else {
        now <= window.end
    };
    if mining {
        return Ok(BotPhase::Mining { window });
    }

    let pending = accrue(state, config, tier_config)?;
    Ok(BotPhase::Claimable { window, pending })
}

/// Non-mutating status report at `now`.
pub fn status(
    state: &PlayerState,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<BotStatus, GameError> {
    let report = match phase(state, config, now)? {
        BotPhase::Inactive => BotStatus {
            is_active: false,
            tier: None,
            valid_until: None,
            is_mining: false,
            remaining_secs: None,
            pending_power: 0,
            can_claim: false,
        },
        BotPhase::Mining { window } => BotStatus {
            is_active: true,
            tier: Some(state.auto_bot.tier),
            valid_until: state.auto_bot.valid_until,
            is_mining: true,
            remaining_secs: Some(window.remaining_secs(now)),
            pending_power: 0,
            can_claim: false,
        },
        BotPhase::Claimable { pending, .. } => BotStatus {
            is_active: true,
            tier: Some(state.auto_bot.tier),
            valid_until: state.auto_bot.valid_until,
            is_mining: false,
            remaining_secs: None,
            pending_power: pending.power,
            can_claim: pending.power > 0,
        },
    };
    Ok(report)
}

/// Claim the accrued yield at `now` and deactivate the session.
///
/// A claimed session does not restart; the player must activate again.
pub fn claim(
    state: &mut PlayerState,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<ClaimOutcome, GameError> {
    let (window, pending) = match phase(state, config, now)? {
        BotPhase::Inactive => return Err(GameError::BotNotActive),
        BotPhase::Mining { window } => {
            return Err(GameError::MiningInProgress {
                window_ends: window.end,
            });
        }
        BotPhase::Claimable { window, pending } => (window, pending),
    };
    if pending.power == 0 {
        return Err(GameError::NoEarningsToClaim);
    }

    let power_after = state
        .power
        .checked_add(pending.power)
        .ok_or_else(|| overflow("claim power credit"))?;
    let total_taps = state
        .statistics
        .total_taps
        .checked_add(pending.taps)
        .ok_or_else(|| overflow("claim tap counter"))?;
    let total_generated = state
        .statistics
        .total_power_generated
        .checked_add(pending.power)
        .ok_or_else(|| overflow("claim generated power counter"))?;
    let energy_after =
        Decimal::from(u64::from(state.max_energy).saturating_sub(pending.energy_consumed));

    state.power = power_after;
    state.energy = energy_after;
    state.last_tap_time = now;
    state.statistics.total_taps = total_taps;
    state.statistics.total_power_generated = total_generated;
    state.auto_bot.is_active = false;
    state.auto_bot.last_claimed = Some(window.start);

    Ok(ClaimOutcome {
        taps: pending.taps,
        power_gained: pending.power,
        energy_consumed: pending.energy_consumed,
        energy_after,
    })
}

/// The most recent window whose start is not after `now`.
fn current_window(
    tier: BotTier,
    tier_config: &BotTierConfig,
    activation: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<MiningWindow, GameError> {
    let duration = TimeDelta::hours(i64::from(tier_config.duration_hours));

    if tier.is_free() {
        let end = activation
            .checked_add_signed(duration)
            .ok_or_else(|| overflow("free window end"))?;
        return Ok(MiningWindow {
            start: activation,
            end,
        });
    }

    // Daily recurrence: today's window opens at the activation's hour and
    // minute (seconds zeroed), stepping back one day while that anchor is
    // still ahead of `now`.
    let anchor_time = NaiveTime::from_hms_opt(activation.hour(), activation.minute(), 0)
        .ok_or_else(|| overflow("window anchor time"))?;
    let mut start = now.date_naive().and_time(anchor_time).and_utc();
    if start > now {
        start = start
            .checked_sub_signed(TimeDelta::days(1))
            .ok_or_else(|| overflow("window step-back"))?;
    }
    let end = start
        .checked_add_signed(duration)
        .ok_or_else(|| overflow("daily window end"))?;
    Ok(MiningWindow { start, end })
}

/// Yield for one completed window of the tier's full duration.
fn accrue(
    state: &PlayerState,
    config: &EconomyConfig,
    tier_config: &BotTierConfig,
) -> Result<BotYield, GameError> {
    let window_secs = u64::from(tier_config.duration_hours)
        .checked_mul(3_600)
        .ok_or_else(|| overflow("window seconds"))?;
    let taps = window_secs
        .checked_mul(u64::from(state.speed_level))
        .ok_or_else(|| overflow("accrued taps"))?;
    let tap_power = config.tap_power(state.multi_tap_level)?;
    let power = taps
        .checked_mul(tap_power)
        .ok_or_else(|| overflow("accrued power"))?;
    let energy_consumed = taps.min(u64::from(state.max_energy));
    Ok(BotYield {
        taps,
        power,
        energy_consumed,
    })
}

fn overflow(context: &str) -> GameError {
    GameError::ArithmeticOverflow {
        context: String::from(context),
    }
}
