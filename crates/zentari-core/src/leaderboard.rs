//! Leaderboard projections.
//!
//! Pure functions over a batch of player snapshots: pick a metric, sort
//! descending, take the top entries. Ties break by username so repeated
//! queries over the same data return the same order.

use zentari_types::{PlayerId, PlayerState};

/// One leaderboard entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    /// 1-based position.
    pub rank: u64,
    /// Player username.
    pub username: String,
    /// Player ID.
    pub player_id: PlayerId,
    /// The ranked metric's value.
    pub value: u64,
}

/// Rank players by an arbitrary metric, descending, top `limit`.
pub fn rank_by(
    snapshots: &[PlayerState],
    metric: impl Fn(&PlayerState) -> u64,
    limit: usize,
) -> Vec<LeaderboardRow> {
    let mut scored: Vec<(&PlayerState, u64)> = snapshots
        .iter()
        .map(|state| (state, metric(state)))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.username.cmp(&b.0.username)));

    scored
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, (state, value))| LeaderboardRow {
            rank: u64::try_from(index).unwrap_or(u64::MAX).saturating_add(1),
            username: state.username.clone(),
            player_id: state.player_id,
            value,
        })
        .collect()
}

/// Top players by power balance.
pub fn by_power(snapshots: &[PlayerState], limit: usize) -> Vec<LeaderboardRow> {
    rank_by(snapshots, |state| state.power, limit)
}

/// Top players by total score (power + check-in + referral points).
pub fn by_total_points(snapshots: &[PlayerState], limit: usize) -> Vec<LeaderboardRow> {
    rank_by(snapshots, PlayerState::total_points, limit)
}

/// Top players by current check-in streak.
pub fn by_check_in_streak(snapshots: &[PlayerState], limit: usize) -> Vec<LeaderboardRow> {
    rank_by(snapshots, |state| u64::from(state.check_in_streak), limit)
}

/// Top players by direct-referral count.
pub fn by_direct_referrals(snapshots: &[PlayerState], limit: usize) -> Vec<LeaderboardRow> {
    rank_by(snapshots, PlayerState::direct_referral_count, limit)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, Utc};
    use zentari_game::config::EconomyConfig;
    use zentari_game::create_player;

    use super::*;

    fn player_with_power(name: &str, power: u64) -> PlayerState {
        let config = EconomyConfig::default();
        let mut state = create_player(
            String::from(name),
            zentari_types::PlayerId::new(),
            None,
            &config,
            DateTime::<Utc>::UNIX_EPOCH,
        )
        .unwrap();
        state.power = power;
        state
    }

    #[test]
    fn ranks_descend_by_metric() {
        let players = vec![
            player_with_power("low", 10),
            player_with_power("high", 1_000),
            player_with_power("mid", 100),
        ];
        let board = by_power(&players, 10);
        let order: Vec<(u64, &str)> = board
            .iter()
            .map(|row| (row.rank, row.username.as_str()))
            .collect();
        assert_eq!(order, vec![(1, "high"), (2, "mid"), (3, "low")]);
    }

    #[test]
    fn limit_truncates_the_board() {
        let players = vec![
            player_with_power("a", 3),
            player_with_power("b", 2),
            player_with_power("c", 1),
        ];
        let board = by_power(&players, 2);
        assert_eq!(board.len(), 2);
        assert_eq!(board.last().map(|row| row.rank), Some(2));
    }

    #[test]
    fn ties_break_by_username_for_stable_output() {
        let players = vec![
            player_with_power("zeta", 5),
            player_with_power("alpha", 5),
        ];
        let board = by_power(&players, 10);
        assert_eq!(board.first().map(|row| row.username.clone()), Some(String::from("alpha")));
    }

    #[test]
    fn total_points_board_uses_the_derived_sum() {
        let mut rich = player_with_power("rich", 10);
        rich.check_in_points = 50;
        rich.referral_points = 40;
        let poor = player_with_power("poor", 60);

        let board = by_total_points(&[rich, poor], 10);
        assert_eq!(board.first().map(|row| (row.username.clone(), row.value)),
            Some((String::from("rich"), 100)));
    }
}
