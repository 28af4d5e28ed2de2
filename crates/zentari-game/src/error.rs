//! Error types for the zentari-game crate.
//!
//! All operations that can fail return typed errors rather than panicking.
//! Every variant is a local, recoverable condition reported back to the
//! caller; a mutating operation that returns an error must leave the
//! player state unchanged.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use zentari_types::StatKind;

/// The currency a purchase draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    /// Soft currency earned by tapping.
    Power,
    /// Hard currency for star upgrades.
    Stars,
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Power => f.write_str("power"),
            Self::Stars => f.write_str("stars"),
        }
    }
}

/// Errors that can occur during game-state operations.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// A tap was attempted with less energy than one tap costs.
    #[error(
        "not enough energy: need {required}, have {available}, next tap in ~{seconds_to_next}s"
    )]
    InsufficientEnergy {
        /// Energy cost of one tap at the current multi-tap level.
        required: u64,
        /// Regenerated energy at the time of the attempt.
        available: Decimal,
        /// Ceiling of seconds until `required` energy is available.
        seconds_to_next: u64,
    },

    /// A purchase was attempted with an insufficient balance.
    #[error("insufficient {currency}: need {required}, have {available}")]
    InsufficientFunds {
        /// The currency the purchase draws from.
        currency: Currency,
        /// The purchase cost.
        required: u64,
        /// The player's balance.
        available: u64,
    },

    /// Points were offered for a star level, or stars for a point level.
    #[error("target level {target_level} cannot be bought with the offered currency")]
    WrongCurrencyForLevel {
        /// The level the upgrade would reach.
        target_level: u32,
    },

    /// An upgrade was attempted on a stat already at the ladder cap.
    #[error("{stat} is already at the maximum level")]
    MaxLevelReached {
        /// The stat that cannot be upgraded further.
        stat: StatKind,
    },

    /// A bot activation was attempted while a session is still valid.
    #[error("another bot tier is active until {valid_until}")]
    BotAlreadyActive {
        /// When the current session's validity ends.
        valid_until: DateTime<Utc>,
    },

    /// A bot claim or earnings query was attempted with no active session.
    #[error("auto-tap bot is not active")]
    BotNotActive,

    /// A bot claim was attempted inside a mining window.
    #[error("cannot claim while mining is in progress (window ends {window_ends})")]
    MiningInProgress {
        /// When the current mining window ends.
        window_ends: DateTime<Utc>,
    },

    /// A bot claim was attempted with zero accrued yield.
    #[error("no earnings to claim")]
    NoEarningsToClaim,

    /// A daily check-in was attempted twice within one UTC day.
    #[error("already checked in today")]
    AlreadyCompletedToday,

    /// An unknown bot tier name was requested.
    #[error("unknown bot tier: {0}")]
    InvalidTier(String),

    /// A referral reward claim was attempted with no qualified tier.
    #[error("no referral reward available to claim")]
    NoRewardToClaim {
        /// Threshold of the next unclaimed tier, if any remain.
        next_threshold: Option<u32>,
    },

    /// A level outside the 1..=8 ladder reached a table lookup.
    #[error("level {level} is outside the upgrade ladder")]
    InvalidLevel {
        /// The offending level value.
        level: u32,
    },

    /// An arithmetic overflow occurred during a game computation.
    #[error("arithmetic overflow in game computation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}
