//! Game logic for the Zentari tap-to-earn backend.
//!
//! This crate is the logic layer -- everything that operates on
//! [`PlayerState`](zentari_types::PlayerState) without touching I/O. It
//! sits between `zentari-types` (which defines the data structures) and
//! `zentari-core` (which handles the store, clock, and orchestration).
//!
//! Every calculator takes the same two collaborators: an immutable
//! [`EconomyConfig`] holding the lookup tables, and the current instant
//! supplied by the caller. Nothing here reads the wall clock or mutates
//! shared state.
//!
//! # Modules
//!
//! - [`bot`] -- Auto-tap bot accrual state machine ([`BotPhase`])
//! - [`checkin`] -- Daily check-in streaks and the weekly bonus schedule
//! - [`config`] -- The economy lookup tables ([`EconomyConfig`])
//! - [`energy`] -- Energy regeneration
//! - [`error`] -- Error taxonomy for all game operations ([`GameError`])
//! - [`player`] -- Registration defaults
//! - [`referral`] -- Referral bookkeeping and reward tiers
//! - [`tap`] -- Tap resolution
//! - [`tasks`] -- Sponsored task completion ([`TaskBook`])
//! - [`upgrade`] -- The 1-8 upgrade ladder with two purchase currencies

pub mod bot;
pub mod checkin;
pub mod config;
pub mod energy;
pub mod error;
pub mod player;
pub mod referral;
pub mod tap;
pub mod tasks;
pub mod upgrade;

// Re-export primary types at crate root for convenience.
pub use bot::{BotActivation, BotPhase, BotStatus, BotYield, ClaimOutcome, MiningWindow};
pub use checkin::{CheckInOutcome, CheckInStatus};
pub use config::{
    BotConfig, BotTierConfig, CheckInConfig, EconomyConfig, EconomyConfigError, EnergyLimitConfig,
    MAX_LEVEL, MultiTapConfig, POINT_LEVEL_CAP, ReferralConfig, ReferralTier, SpeedConfig,
    StarTier,
};
pub use energy::RegenSnapshot;
pub use error::{Currency, GameError};
pub use player::create_player;
pub use referral::{RewardClaim, RewardTierStatus};
pub use tap::TapOutcome;
pub use tasks::{TaskBook, TaskError};
pub use upgrade::{UpgradeCost, UpgradeOutcome};
