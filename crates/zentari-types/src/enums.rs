//! Enumeration types for the Zentari game backend.
//!
//! The upgradeable stats and the auto-bot tier ladder. Both are closed
//! sets: the economy tables in `zentari-game` are indexed by them, so a
//! new variant requires a matching table entry.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Upgradeable stats
// ---------------------------------------------------------------------------

/// A player stat that can be leveled through the upgrade ladder.
///
/// Each stat has its own cost tables and its own derived effect:
/// multi-tap drives tap power, speed drives the energy refill time, and
/// energy limit drives the energy cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum StatKind {
    /// Power earned (and energy spent) per tap.
    MultiTap,
    /// Energy regeneration speed.
    Speed,
    /// Maximum energy capacity.
    EnergyLimit,
}

impl StatKind {
    /// All stats, in ladder order.
    pub const ALL: [Self; 3] = [Self::MultiTap, Self::Speed, Self::EnergyLimit];

    /// Canonical lower-camel name, as used by the client API.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MultiTap => "multiTap",
            Self::Speed => "speed",
            Self::EnergyLimit => "energyLimit",
        }
    }
}

impl core::fmt::Display for StatKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Auto-bot tiers
// ---------------------------------------------------------------------------

/// An auto-tap bot tier.
///
/// The free tier runs a single two-hour mining window within a one-day
/// validity. Paid tiers run one mining window per day (of tier-specific
/// duration) within a seven-day validity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum BotTier {
    /// One two-hour window, one-day validity, no star cost.
    #[default]
    Free,
    /// Seven hours of mining per day.
    Basic,
    /// Fourteen hours of mining per day.
    Advanced,
    /// Twenty-four hours of mining per day.
    Premium,
}

impl BotTier {
    /// All tiers, cheapest first.
    pub const ALL: [Self; 4] = [Self::Free, Self::Basic, Self::Advanced, Self::Premium];

    /// Canonical lower-case name, as used by the client API.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Advanced => "advanced",
            Self::Premium => "premium",
        }
    }

    /// Parse a tier from its canonical name. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "free" => Some(Self::Free),
            "basic" => Some(Self::Basic),
            "advanced" => Some(Self::Advanced),
            "premium" => Some(Self::Premium),
            _ => None,
        }
    }

    /// Whether this is the free tier (single fixed window, no daily recurrence).
    pub const fn is_free(self) -> bool {
        matches!(self, Self::Free)
    }
}

impl core::fmt::Display for BotTier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
