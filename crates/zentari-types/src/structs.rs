//! Core entity structs for the Zentari game backend.
//!
//! [`PlayerState`] is the single per-player record every game operation
//! reads and mutates. The surrounding structs are its components plus the
//! sponsored-task records. All types serialize with `serde` and export
//! `TypeScript` bindings for the webapp client.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BotTier, StatKind};
use crate::ids::{PlayerId, TaskId};

// ---------------------------------------------------------------------------
// Referral records
// ---------------------------------------------------------------------------

/// A player directly referred by this player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DirectReferral {
    /// Username of the referred player.
    pub username: String,
    /// ID of the referred player.
    pub player_id: PlayerId,
    /// When the referred player registered.
    pub joined_at: DateTime<Utc>,
    /// Referral points credited for this signup.
    pub points_earned: u64,
}

/// A player referred by one of this player's direct referrals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct IndirectReferral {
    /// Username of the referred player.
    pub username: String,
    /// ID of the referred player.
    pub player_id: PlayerId,
    /// Username of the intermediate referrer.
    pub referred_by: String,
    /// When the referred player registered.
    pub joined_at: DateTime<Utc>,
    /// Referral points credited for this signup.
    pub points_earned: u64,
}

/// One entry in the per-player referral reward ledger.
///
/// The ledger is seeded at registration with every configured tier
/// unclaimed; each tier can be claimed at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ReferralRewardSlot {
    /// Direct-referral count required to qualify.
    pub referrals: u32,
    /// Referral points paid out on claim.
    pub reward: u64,
    /// Whether the reward has been claimed.
    pub claimed: bool,
}

// ---------------------------------------------------------------------------
// Auto-bot session
// ---------------------------------------------------------------------------

/// Stored auto-tap bot session state.
///
/// The mining window and accrued yield are never stored -- they are derived
/// from these timestamps and the tier configuration at read and claim time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AutoBotState {
    /// The activated tier (meaningful only while a session exists).
    pub tier: BotTier,
    /// When the current session's validity period ends.
    pub valid_until: Option<DateTime<Utc>>,
    /// Start of the currently accruing or most recently claimed window.
    pub last_claimed: Option<DateTime<Utc>>,
    /// Whether a session is active (cleared by a successful claim).
    pub is_active: bool,
}

impl Default for AutoBotState {
    fn default() -> Self {
        Self {
            tier: BotTier::Free,
            valid_until: None,
            last_claimed: None,
            is_active: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Highest level ever reached per stat.
///
/// Live levels cannot downgrade, but the ratchet is tracked independently
/// so the invariant holds even if that ever changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HighestLevels {
    /// Highest multi-tap level reached.
    pub multi_tap: u32,
    /// Highest speed level reached.
    pub speed: u32,
    /// Highest energy-limit level reached.
    pub energy_limit: u32,
}

impl Default for HighestLevels {
    fn default() -> Self {
        Self {
            multi_tap: 1,
            speed: 1,
            energy_limit: 1,
        }
    }
}

impl HighestLevels {
    /// Return the recorded high-water mark for a stat.
    pub const fn get(&self, stat: StatKind) -> u32 {
        match stat {
            StatKind::MultiTap => self.multi_tap,
            StatKind::Speed => self.speed,
            StatKind::EnergyLimit => self.energy_limit,
        }
    }

    /// Raise the high-water mark for a stat. Never lowers it.
    pub const fn ratchet(&mut self, stat: StatKind, level: u32) {
        let slot = match stat {
            StatKind::MultiTap => &mut self.multi_tap,
            StatKind::Speed => &mut self.speed,
            StatKind::EnergyLimit => &mut self.energy_limit,
        };
        if level > *slot {
            *slot = level;
        }
    }
}

/// Monotone lifetime counters for a player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Statistics {
    /// Total accepted taps, including auto-bot taps.
    pub total_taps: u64,
    /// Total power earned from taps and auto-bot claims.
    pub total_power_generated: u64,
    /// Longest daily check-in streak ever held.
    pub longest_check_in_streak: u32,
    /// Total daily check-ins performed.
    pub total_check_ins: u64,
    /// Highest level ever reached per stat.
    pub highest_level: HighestLevels,
}

// ---------------------------------------------------------------------------
// PlayerState
// ---------------------------------------------------------------------------

/// The per-player game-state record.
///
/// Created once at registration and mutated by every subsequent operation
/// (tap, upgrade, check-in, bot claim, task settlement, referral event).
/// Never deleted in normal operation; `is_active` soft-deactivates the
/// account.
///
/// # Derived fields
///
/// Tap power is never stored -- it is fully determined by
/// `multi_tap_level` and the economy tables. `max_energy` is stored but
/// recomputed from the capacity table on every energy-limit upgrade, and
/// the total score (`power + check_in_points + referral_points`) is
/// computed at read time by [`total_points`](Self::total_points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerState {
    /// Unique external identifier.
    pub player_id: PlayerId,
    /// Unique display name, also used as the referral code.
    pub username: String,

    /// Current energy. Fractional because regeneration accrues
    /// continuously; never negative, never above `max_energy`.
    #[ts(as = "String")]
    pub energy: Decimal,
    /// Energy cap, determined by the energy-limit capacity table.
    pub max_energy: u32,
    /// Timestamp of the last energy-affecting event (regeneration anchor).
    pub last_tap_time: DateTime<Utc>,

    /// Multi-tap upgrade level, 1..=8.
    pub multi_tap_level: u32,
    /// Speed upgrade level, 1..=8.
    pub speed_level: u32,
    /// Energy-limit upgrade level, 1..=8.
    pub energy_limit_level: u32,

    /// Soft currency earned by tapping.
    pub power: u64,
    /// Hard currency spent on star upgrades.
    pub stars: u64,
    /// Points earned from daily check-ins.
    pub check_in_points: u64,
    /// Points earned from referrals.
    pub referral_points: u64,

    /// When the player last checked in, if ever.
    pub last_check_in: Option<DateTime<Utc>>,
    /// Current consecutive-day check-in streak.
    pub check_in_streak: u32,

    /// Username of the upstream referrer, if the player was referred.
    pub referral: Option<String>,
    /// Players directly referred by this player, in signup order.
    pub direct_referrals: Vec<DirectReferral>,
    /// Players referred by this player's direct referrals, in signup order.
    pub indirect_referrals: Vec<IndirectReferral>,
    /// Referral reward ledger, one slot per configured tier.
    pub referral_rewards: Vec<ReferralRewardSlot>,

    /// Auto-tap bot session state.
    pub auto_bot: AutoBotState,
    /// Monotone lifetime counters.
    pub statistics: Statistics,

    /// Account soft-deactivation flag.
    pub is_active: bool,
    /// When the player registered.
    pub created_at: DateTime<Utc>,
    /// When the player last performed any operation.
    pub last_active: DateTime<Utc>,
}

impl PlayerState {
    /// Total score: `power + check_in_points + referral_points`.
    ///
    /// Always derived, never stored, so it cannot drift from its parts.
    pub const fn total_points(&self) -> u64 {
        self.power
            .saturating_add(self.check_in_points)
            .saturating_add(self.referral_points)
    }

    /// Number of direct referrals, as the reward-tier comparison width.
    pub fn direct_referral_count(&self) -> u64 {
        u64::try_from(self.direct_referrals.len()).unwrap_or(u64::MAX)
    }

    /// Return the live level for a stat.
    pub const fn level(&self, stat: StatKind) -> u32 {
        match stat {
            StatKind::MultiTap => self.multi_tap_level,
            StatKind::Speed => self.speed_level,
            StatKind::EnergyLimit => self.energy_limit_level,
        }
    }

    /// Set the live level for a stat.
    ///
    /// Callers are responsible for the no-downgrade invariant; the upgrade
    /// ladder is the only writer in practice.
    pub const fn set_level(&mut self, stat: StatKind, level: u32) {
        match stat {
            StatKind::MultiTap => self.multi_tap_level = level,
            StatKind::Speed => self.speed_level = level,
            StatKind::EnergyLimit => self.energy_limit_level = level,
        }
    }
}

// ---------------------------------------------------------------------------
// Sponsored tasks
// ---------------------------------------------------------------------------

/// A sponsored task a player can complete for a one-time power reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Short headline shown in the task list.
    pub topic: String,
    /// Longer description of what the sponsor asks for.
    pub description: String,
    /// Optional promotional image.
    pub image_url: Option<String>,
    /// Power credited on settlement.
    pub reward_power: u64,
    /// Whether the task is currently offered.
    pub is_active: bool,
    /// When the task was published.
    pub created_at: DateTime<Utc>,
    /// Optional expiry; completions cannot start after this.
    pub expires_at: Option<DateTime<Utc>>,
    /// Seconds a started completion must wait before it can settle.
    pub completion_delay_secs: u64,
    /// Sponsor link the player is sent to.
    pub link: String,
}

/// A started-but-unsettled task completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PendingCompletion {
    /// The task being completed.
    pub task_id: TaskId,
    /// The completing player.
    pub player_id: PlayerId,
    /// When the completion was started.
    pub started_at: DateTime<Utc>,
    /// Earliest instant the completion may settle.
    pub settles_at: DateTime<Utc>,
}

/// A settled task completion. At most one per (task, player).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CompletedTask {
    /// The completed task.
    pub task_id: TaskId,
    /// The player who completed it.
    pub player_id: PlayerId,
    /// When the completion settled.
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_points_sums_all_score_sources() {
        let mut state = test_player();
        state.power = 100;
        state.check_in_points = 25;
        state.referral_points = 7;
        assert_eq!(state.total_points(), 132);
    }

    #[test]
    fn highest_levels_ratchet_never_lowers() {
        let mut levels = HighestLevels::default();
        levels.ratchet(StatKind::Speed, 4);
        assert_eq!(levels.get(StatKind::Speed), 4);
        levels.ratchet(StatKind::Speed, 2);
        assert_eq!(levels.get(StatKind::Speed), 4);
    }

    #[test]
    fn level_accessors_cover_all_stats() {
        let mut state = test_player();
        for stat in StatKind::ALL {
            assert_eq!(state.level(stat), 1);
        }
        state.set_level(StatKind::EnergyLimit, 3);
        assert_eq!(state.level(StatKind::EnergyLimit), 3);
        assert_eq!(state.level(StatKind::MultiTap), 1);
    }

    #[test]
    fn default_bot_state_is_inactive() {
        let bot = AutoBotState::default();
        assert!(!bot.is_active);
        assert!(bot.valid_until.is_none());
        assert!(bot.last_claimed.is_none());
    }

    #[test]
    fn player_state_roundtrip_serde() {
        let state = test_player();
        let json = serde_json::to_string(&state).ok();
        assert!(json.is_some());
        let restored: Result<PlayerState, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok().as_ref(), Some(&state));
    }

    fn test_player() -> PlayerState {
        let now = DateTime::<Utc>::UNIX_EPOCH;
        PlayerState {
            player_id: PlayerId::new(),
            username: String::from("tester"),
            energy: Decimal::from(500),
            max_energy: 500,
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
            referral: None,
            direct_referrals: Vec::new(),
            indirect_referrals: Vec::new(),
            referral_rewards: Vec::new(),
            auto_bot: AutoBotState::default(),
            statistics: Statistics::default(),
            is_active: true,
            created_at: now,
            last_active: now,
        }
    }
}
