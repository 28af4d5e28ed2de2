//! Shared type definitions for the Zentari game backend.
//!
//! This crate is the single source of truth for all types used across the
//! Zentari workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the webapp client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for player and task identifiers
//! - [`enums`] -- Enumeration types (upgradeable stats, auto-bot tiers)
//! - [`structs`] -- The per-player state record and its components

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{BotTier, StatKind};
pub use ids::{PlayerId, TaskId};
pub use structs::{
    AutoBotState, CompletedTask, DirectReferral, HighestLevels, IndirectReferral,
    PendingCompletion, PlayerState, ReferralRewardSlot, Statistics, Task,
};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Importing them here triggers generation.
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::PlayerId::export_all();
        let _ = crate::ids::TaskId::export_all();

        // Enums
        let _ = crate::enums::StatKind::export_all();
        let _ = crate::enums::BotTier::export_all();

        // Structs
        let _ = crate::structs::DirectReferral::export_all();
        let _ = crate::structs::IndirectReferral::export_all();
        let _ = crate::structs::ReferralRewardSlot::export_all();
        let _ = crate::structs::AutoBotState::export_all();
        let _ = crate::structs::HighestLevels::export_all();
        let _ = crate::structs::Statistics::export_all();
        let _ = crate::structs::PlayerState::export_all();
        let _ = crate::structs::Task::export_all();
        let _ = crate::structs::PendingCompletion::export_all();
        let _ = crate::structs::CompletedTask::export_all();
    }
}
