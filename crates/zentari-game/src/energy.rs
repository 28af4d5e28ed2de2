//! Energy regeneration.
//!
//! Energy refills continuously from the last energy-affecting event up to
//! the player's cap. The refill table gives minutes from zero to full, so
//! the per-second rate is `max_energy / (refill_minutes * 60)`.
//!
//! [`regenerate`] is a pure function of stored state and the supplied
//! instant: calling it repeatedly at the same `now` returns the same
//! value, and it never mutates anything itself. Callers refresh
//! `energy`/`last_tap_time` with its result before any energy-consuming
//! decision.
//!
//! All fractional math uses [`Decimal`] with checked operations; the
//! multiplication happens before the division so that exact quotients
//! (e.g. 20 minutes at a 40-minute refill) stay exact.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use zentari_types::PlayerState;

use crate::config::EconomyConfig;
use crate::error::GameError;

/// Milliseconds per second, as a [`Decimal`].
const MILLIS_PER_SECOND: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);

/// Seconds per minute, as a [`Decimal`].
const SECONDS_PER_MINUTE: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// A player's regenerated energy at one instant, with the rate that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegenSnapshot {
    /// Energy at the snapshot instant, capped at the maximum.
    pub energy: Decimal,
    /// Regeneration rate in energy units per second.
    pub rate_per_second: Decimal,
    /// Refill time (minutes from empty to full) at the player's speed level.
    pub refill_minutes: u32,
}

/// Regeneration rate in energy units per second.
pub fn regen_rate(max_energy: u32, refill_minutes: u32) -> Result<Decimal, GameError> {
    let refill_seconds = refill_seconds(refill_minutes)?;
    Decimal::from(max_energy)
        .checked_div(refill_seconds)
        .ok_or_else(|| overflow("regeneration rate division"))
}

/// Compute current energy from the stored anchor.
///
/// `energy_now = min(max_energy, current + elapsed_seconds * rate)`, with
/// the elapsed time truncated to non-negative (a stored anchor in the
/// future regenerates nothing).
pub fn regenerate(
    last_tap_time: DateTime<Utc>,
    current_energy: Decimal,
    max_energy: u32,
    refill_minutes: u32,
    now: DateTime<Utc>,
) -> Result<Decimal, GameError> {
    let elapsed_ms = now
        .signed_duration_since(last_tap_time)
        .num_milliseconds()
        .max(0);
    let elapsed_seconds = Decimal::from(elapsed_ms)
        .checked_div(MILLIS_PER_SECOND)
        .ok_or_else(|| overflow("elapsed seconds division"))?;

    // Multiply before dividing: elapsed * max / refill_seconds keeps
    // exactly-representable quotients exact.
    let refill_seconds = refill_seconds(refill_minutes)?;
    let regained = elapsed_seconds
        .checked_mul(Decimal::from(max_energy))
        .and_then(|product| product.checked_div(refill_seconds))
        .ok_or_else(|| overflow("regenerated energy"))?;

    let energy = current_energy
        .checked_add(regained)
        .ok_or_else(|| overflow("energy accumulation"))?;
    Ok(energy.min(Decimal::from(max_energy)))
}

/// Regenerated energy and rate for a player at `now`.
pub fn snapshot(
    state: &PlayerState,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<RegenSnapshot, GameError> {
    let refill_minutes = config.refill_minutes(state.speed_level)?;
    let energy = regenerate(
        state.last_tap_time,
        state.energy,
        state.max_energy,
        refill_minutes,
        now,
    )?;
    let rate_per_second = regen_rate(state.max_energy, refill_minutes)?;
    Ok(RegenSnapshot {
        energy,
        rate_per_second,
        refill_minutes,
    })
}

/// Whole seconds (rounded up) until `required` energy is available.
///
/// Returns 0 when the requirement is already met.
pub fn seconds_until(
    required: u64,
    available: Decimal,
    rate_per_second: Decimal,
) -> Result<u64, GameError> {
    let deficit = Decimal::from(required)
        .checked_sub(available)
        .ok_or_else(|| overflow("energy deficit"))?;
    if deficit <= Decimal::ZERO {
        return Ok(0);
    }
    let seconds = deficit
        .checked_div(rate_per_second)
        .ok_or_else(|| overflow("wait time division"))?;
    seconds
        .ceil()
        .to_u64()
        .ok_or_else(|| overflow("wait time conversion"))
}

fn refill_seconds(refill_minutes: u32) -> Result<Decimal, GameError> {
    let seconds = Decimal::from(refill_minutes)
        .checked_mul(SECONDS_PER_MINUTE)
        .ok_or_else(|| overflow("refill seconds"))?;
    if seconds <= Decimal::ZERO {
        return Err(overflow("refill time must be positive"));
    }
    Ok(seconds)
}

fn overflow(context: &str) -> GameError {
    GameError::ArithmeticOverflow {
        context: String::from(context),
    }
}
