//! The service facade.
//!
//! One entry point per external operation, each following the same
//! sequence: take `now` from the [`Clock`] once, load the player record,
//! run the logic-layer calculator against a working copy, persist on
//! success. The store provides the per-player serialization; this module
//! provides the wiring and the log trail.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use zentari_game::config::EconomyConfig;
use zentari_game::{
    BotActivation, BotStatus, CheckInOutcome, CheckInStatus, ClaimOutcome, GameError, RewardClaim,
    RewardTierStatus, TapOutcome, TaskBook, TaskError, UpgradeOutcome, bot, checkin, create_player,
    energy, referral, tap, upgrade,
};
use zentari_types::{
    BotTier, PendingCompletion, PlayerId, PlayerState, StatKind, Statistics, Task, TaskId,
};

use crate::clock::{Clock, SystemClock};
use crate::leaderboard::{self, LeaderboardRow};
use crate::store::{PlayerStore, StoreError};

/// Errors returned by the service facade.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A game rule rejected the operation.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The store rejected the operation.
    #[error(transparent)]
    Store(StoreError),

    /// The task completion flow rejected the operation.
    #[error(transparent)]
    Task(#[from] TaskError),

    /// A registration named a referrer that does not exist.
    #[error("referral username does not exist: {0}")]
    UnknownReferrer(String),
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        // Flatten the store's game-rule wrapper so callers match one
        // `Game` variant regardless of which layer surfaced it.
        match error {
            StoreError::Game(game) => Self::Game(game),
            other => Self::Store(other),
        }
    }
}

/// Non-mutating energy report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnergyStatus {
    /// Regenerated energy at the query instant.
    pub energy: Decimal,
    /// Energy cap.
    pub max_energy: u32,
    /// Refill minutes at the player's speed level.
    pub refill_minutes: u32,
    /// Regeneration rate in energy per second.
    pub rate_per_second: Decimal,
}

/// One row of the bot tier catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierInfo {
    /// The tier.
    pub tier: BotTier,
    /// Advertised star price.
    pub star_cost: u64,
    /// Mining window duration in hours.
    pub duration_hours: u32,
    /// Validity in days.
    pub validity_days: u32,
}

/// Aggregated referral report for one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralSummary {
    /// The player's referral code (their username).
    pub referral_code: String,
    /// Number of direct referrals.
    pub direct_count: u64,
    /// Points earned from direct referrals.
    pub direct_points: u64,
    /// Number of indirect referrals.
    pub indirect_count: u64,
    /// Points earned from indirect referrals.
    pub indirect_points: u64,
    /// Total referral point balance (including claimed tier rewards).
    pub total_referral_points: u64,
}

/// The game service: store, task book, economy tables, and clock.
pub struct GameService {
    store: PlayerStore,
    tasks: Mutex<TaskBook>,
    config: EconomyConfig,
    clock: Arc<dyn Clock>,
}

impl GameService {
    /// Create a service over an empty store.
    pub fn new(config: EconomyConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: PlayerStore::new(),
            tasks: Mutex::new(TaskBook::new()),
            config,
            clock,
        }
    }

    /// Create a service on the real wall clock.
    pub fn with_system_clock(config: EconomyConfig) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    /// The underlying player store.
    pub const fn store(&self) -> &PlayerStore {
        &self.store
    }

    /// The economy tables in effect.
    pub const fn config(&self) -> &EconomyConfig {
        &self.config
    }

    // -----------------------------------------------------------------
    // Registration and referrals
    // -----------------------------------------------------------------

    /// Register a new player, optionally attributed to a referrer.
    ///
    /// The referrer is credited the direct bonus; the referrer's own
    /// referrer, when present, is credited the indirect bonus. Returns
    /// the new player's record as registered (before any later events).
    pub fn register(
        &self,
        username: &str,
        referral: Option<&str>,
    ) -> Result<PlayerState, ServiceError> {
        let now = self.clock.now();

        let referrer_id = match referral {
            Some(name) => Some(
                self.store
                    .lookup_username(name)
                    .ok_or_else(|| ServiceError::UnknownReferrer(String::from(name)))?,
            ),
            None => None,
        };

        let state = create_player(
            String::from(username),
            PlayerId::new(),
            referral.map(String::from),
            &self.config,
            now,
        )?;
        let player_id = state.player_id;
        self.store.insert(state.clone())?;

        if let Some(referrer) = referrer_id {
            let (referrer_name, upstream_name) = self.store.update(referrer, |record| {
                referral::record_direct(record, username, player_id, &self.config, now)?;
                record.last_active = now;
                Ok((record.username.clone(), record.referral.clone()))
            })?;
            info!(referrer = %referrer_name, referred = %username, "direct referral credited");

            if let Some(upstream_name) = upstream_name {
                if let Some(upstream_id) = self.store.lookup_username(&upstream_name) {
                    self.store.update(upstream_id, |record| {
                        referral::record_indirect(
                            record,
                            username,
                            player_id,
                            &referrer_name,
                            &self.config,
                            now,
                        )?;
                        record.last_active = now;
                        Ok(())
                    })?;
                    info!(
                        upstream = %upstream_name,
                        referred = %username,
                        "indirect referral credited"
                    );
                }
            }
        }

        info!(username = %username, player = %player_id, "player registered");
        Ok(state)
    }

    /// Resolve a username to a player ID.
    pub fn lookup_player(&self, username: &str) -> Option<PlayerId> {
        self.store.lookup_username(username)
    }

    /// Claim the lowest qualified unclaimed referral reward tier.
    pub fn claim_referral_reward(&self, player_id: PlayerId) -> Result<RewardClaim, ServiceError> {
        let claim = self.mutate(player_id, |state, _now| referral::claim_reward(state))?;
        info!(
            player = %player_id,
            tier = claim.referrals,
            reward = claim.reward,
            "referral reward claimed"
        );
        Ok(claim)
    }

    /// Per-tier referral reward qualification report.
    pub fn referral_reward_status(
        &self,
        player_id: PlayerId,
    ) -> Result<Vec<RewardTierStatus>, ServiceError> {
        let state = self.store.snapshot(player_id)?;
        Ok(referral::reward_status(&state))
    }

    /// Aggregated referral report.
    pub fn referral_summary(&self, player_id: PlayerId) -> Result<ReferralSummary, ServiceError> {
        let state = self.store.snapshot(player_id)?;
        let direct_points = state
            .direct_referrals
            .iter()
            .fold(0_u64, |sum, record| sum.saturating_add(record.points_earned));
        let indirect_points = state
            .indirect_referrals
            .iter()
            .fold(0_u64, |sum, record| sum.saturating_add(record.points_earned));
        Ok(ReferralSummary {
            referral_code: state.username.clone(),
            direct_count: state.direct_referral_count(),
            direct_points,
            indirect_count: u64::try_from(state.indirect_referrals.len()).unwrap_or(u64::MAX),
            indirect_points,
            total_referral_points: state.referral_points,
        })
    }

    // -----------------------------------------------------------------
    // Energy and taps
    // -----------------------------------------------------------------

    /// Resolve one tap.
    pub fn tap(&self, player_id: PlayerId) -> Result<TapOutcome, ServiceError> {
        let outcome = self.mutate(player_id, |state, now| {
            tap::resolve_tap(state, &self.config, now)
        })?;
        debug!(
            player = %player_id,
            power_gained = outcome.power_gained,
            "tap resolved"
        );
        Ok(outcome)
    }

    /// Non-mutating energy report at the current instant.
    pub fn energy_status(&self, player_id: PlayerId) -> Result<EnergyStatus, ServiceError> {
        let now = self.clock.now();
        let state = self.store.snapshot(player_id)?;
        let snapshot = energy::snapshot(&state, &self.config, now)?;
        Ok(EnergyStatus {
            energy: snapshot.energy,
            max_energy: state.max_energy,
            refill_minutes: snapshot.refill_minutes,
            rate_per_second: snapshot.rate_per_second,
        })
    }

    /// Refill energy to the cap (operator grant).
    pub fn refill_energy(&self, player_id: PlayerId) -> Result<Decimal, ServiceError> {
        let energy = self.mutate(player_id, |state, now| {
            state.energy = Decimal::from(state.max_energy);
            state.last_tap_time = now;
            Ok(state.energy)
        })?;
        info!(player = %player_id, "energy refilled to cap");
        Ok(energy)
    }

    /// Refresh stored energy to the current instant and return the
    /// updated record.
    pub fn monitor(&self, player_id: PlayerId) -> Result<PlayerState, ServiceError> {
        self.mutate(player_id, |state, now| {
            let snapshot = energy::snapshot(state, &self.config, now)?;
            state.energy = snapshot.energy;
            state.last_tap_time = now;
            Ok(state.clone())
        })
    }

    // -----------------------------------------------------------------
    // Upgrades
    // -----------------------------------------------------------------

    /// Upgrade a stat by one level, paying with points or stars.
    pub fn upgrade(
        &self,
        player_id: PlayerId,
        stat: StatKind,
        use_stars: bool,
    ) -> Result<UpgradeOutcome, ServiceError> {
        let outcome = self.mutate(player_id, |state, _now| {
            upgrade::upgrade(state, stat, use_stars, &self.config)
        })?;
        info!(
            player = %player_id,
            stat = %stat,
            level = outcome.new_level,
            "upgrade purchased"
        );
        Ok(outcome)
    }

    // -----------------------------------------------------------------
    // Auto-bot
    // -----------------------------------------------------------------

    /// Activate an auto-bot tier by its catalog name.
    pub fn activate_bot(
        &self,
        player_id: PlayerId,
        tier_name: &str,
    ) -> Result<BotActivation, ServiceError> {
        let tier = BotTier::from_name(tier_name)
            .ok_or_else(|| GameError::InvalidTier(String::from(tier_name)))?;
        let activation = self.mutate(player_id, |state, now| {
            bot::activate(state, tier, &self.config, now)
        })?;
        info!(
            player = %player_id,
            tier = %tier,
            valid_until = %activation.valid_until,
            "auto-bot activated"
        );
        Ok(activation)
    }

    /// Non-mutating bot status at the current instant.
    pub fn bot_status(&self, player_id: PlayerId) -> Result<BotStatus, ServiceError> {
        let now = self.clock.now();
        let state = self.store.snapshot(player_id)?;
        Ok(bot::status(&state, &self.config, now)?)
    }

    /// Claim the bot's accrued yield and deactivate the session.
    pub fn claim_bot_earnings(&self, player_id: PlayerId) -> Result<ClaimOutcome, ServiceError> {
        let outcome = self.mutate(player_id, |state, now| {
            bot::claim(state, &self.config, now)
        })?;
        info!(
            player = %player_id,
            power_gained = outcome.power_gained,
            taps = outcome.taps,
            "auto-bot earnings claimed"
        );
        Ok(outcome)
    }

    /// The bot tier catalog.
    pub fn tier_catalog(&self) -> Vec<TierInfo> {
        BotTier::ALL
            .into_iter()
            .map(|tier| {
                let config = self.config.bot.tier(tier);
                TierInfo {
                    tier,
                    star_cost: config.star_cost,
                    duration_hours: config.duration_hours,
                    validity_days: config.validity_days,
                }
            })
            .collect()
    }

    // -----------------------------------------------------------------
    // Check-in
    // -----------------------------------------------------------------

    /// Perform the daily check-in.
    pub fn check_in(&self, player_id: PlayerId) -> Result<CheckInOutcome, ServiceError> {
        let outcome = self.mutate(player_id, |state, now| {
            checkin::check_in(state, &self.config, now)
        })?;
        info!(
            player = %player_id,
            reward = outcome.reward,
            streak = outcome.streak,
            "daily check-in"
        );
        Ok(outcome)
    }

    /// Non-mutating check-in status at the current instant.
    pub fn check_in_status(&self, player_id: PlayerId) -> Result<CheckInStatus, ServiceError> {
        let now = self.clock.now();
        let state = self.store.snapshot(player_id)?;
        Ok(checkin::status(&state, &self.config, now)?)
    }

    // -----------------------------------------------------------------
    // Sponsored tasks
    // -----------------------------------------------------------------

    /// Publish (or replace) a sponsored task.
    pub fn publish_task(&self, task: Task) {
        let mut book = self.lock_tasks();
        info!(task = %task.id, topic = %task.topic, "task published");
        book.publish(task);
    }

    /// Deactivate a sponsored task.
    pub fn deactivate_task(&self, task_id: TaskId) -> Result<(), ServiceError> {
        let mut book = self.lock_tasks();
        book.deactivate(task_id)?;
        info!(task = %task_id, "task deactivated");
        Ok(())
    }

    /// Tasks currently offered.
    pub fn active_tasks(&self) -> Vec<Task> {
        let now = self.clock.now();
        let book = self.lock_tasks();
        book.active_tasks(now).into_iter().cloned().collect()
    }

    /// Start a completion for a player.
    pub fn start_task(
        &self,
        task_id: TaskId,
        player_id: PlayerId,
    ) -> Result<PendingCompletion, ServiceError> {
        let now = self.clock.now();
        // Confirm the player exists before recording anything.
        let _ = self.store.snapshot(player_id)?;
        let mut book = self.lock_tasks();
        let record = book.start(task_id, player_id, now)?;
        debug!(task = %task_id, player = %player_id, "task completion started");
        Ok(record)
    }

    /// Settle a pending completion, crediting the reward.
    pub fn settle_task(&self, task_id: TaskId, player_id: PlayerId) -> Result<u64, ServiceError> {
        let now = self.clock.now();
        let mut book = self.lock_tasks();
        let settled = self.store.with_player(player_id, |state| {
            let reward = book.settle(task_id, state, now)?;
            state.last_active = now;
            Ok::<u64, TaskError>(reward)
        })?;
        let reward = settled?;
        info!(task = %task_id, player = %player_id, reward, "task settled");
        Ok(reward)
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// Clone a player's current record.
    pub fn player(&self, player_id: PlayerId) -> Result<PlayerState, ServiceError> {
        Ok(self.store.snapshot(player_id)?)
    }

    /// A player's lifetime statistics.
    pub fn statistics(&self, player_id: PlayerId) -> Result<Statistics, ServiceError> {
        Ok(self.store.snapshot(player_id)?.statistics)
    }

    /// Top players by power balance.
    pub fn power_leaderboard(&self, limit: usize) -> Vec<LeaderboardRow> {
        leaderboard::by_power(&self.store.snapshots(), limit)
    }

    /// Top players by total score.
    pub fn total_points_leaderboard(&self, limit: usize) -> Vec<LeaderboardRow> {
        leaderboard::by_total_points(&self.store.snapshots(), limit)
    }

    /// Top players by check-in streak.
    pub fn check_in_leaderboard(&self, limit: usize) -> Vec<LeaderboardRow> {
        leaderboard::by_check_in_streak(&self.store.snapshots(), limit)
    }

    /// Top players by direct-referral count.
    pub fn referral_leaderboard(&self, limit: usize) -> Vec<LeaderboardRow> {
        leaderboard::by_direct_referrals(&self.store.snapshots(), limit)
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    /// Run a game mutation with the clock's `now`, bumping `last_active`
    /// on success.
    fn mutate<R>(
        &self,
        player_id: PlayerId,
        op: impl FnOnce(&mut PlayerState, DateTime<Utc>) -> Result<R, GameError>,
    ) -> Result<R, ServiceError> {
        let now = self.clock.now();
        let result = self.store.update(player_id, |state| {
            let value = op(state, now)?;
            state.last_active = now;
            Ok(value)
        })?;
        Ok(result)
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, TaskBook> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for GameService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GameService")
            .field("players", &self.store.len())
            .finish_non_exhaustive()
    }
}
