//! The in-memory player store.
//!
//! The reference persistence collaborator: player records keyed by ID
//! with a username index, one mutex per record, and a copy-on-write
//! update API. [`PlayerStore::update`] runs the caller's closure against
//! a working copy under the record's lock and writes it back only when
//! the closure succeeds, so two concurrent operations on the same player
//! serialize, and a failed validation can never leave a partial write
//! behind. Operations on different players never contend.
//!
//! A database-backed implementation would replace this with transactions
//! providing the same two guarantees.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use zentari_game::GameError;
use zentari_types::{PlayerId, PlayerState};

/// Errors raised by the player store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No player with the given ID exists.
    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// The username is already registered.
    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    /// The player ID is already registered.
    #[error("player id already exists: {0}")]
    DuplicateId(PlayerId),

    /// The update closure rejected the operation.
    #[error(transparent)]
    Game(#[from] GameError),
}

/// In-memory player records with per-player update serialization.
#[derive(Debug, Default)]
pub struct PlayerStore {
    /// Records by player ID, each behind its own lock.
    records: RwLock<BTreeMap<PlayerId, Arc<Mutex<PlayerState>>>>,
    /// Username index.
    usernames: RwLock<BTreeMap<String, PlayerId>>,
}

impl PlayerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of players in the store.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no players.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a new player record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateUsername`] or
    /// [`StoreError::DuplicateId`] when either key is taken.
    pub fn insert(&self, state: PlayerState) -> Result<(), StoreError> {
        let mut usernames = self
            .usernames
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut records = self
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if usernames.contains_key(&state.username) {
            return Err(StoreError::DuplicateUsername(state.username));
        }
        if records.contains_key(&state.player_id) {
            return Err(StoreError::DuplicateId(state.player_id));
        }

        usernames.insert(state.username.clone(), state.player_id);
        records.insert(state.player_id, Arc::new(Mutex::new(state)));
        Ok(())
    }

    /// Resolve a username to a player ID.
    pub fn lookup_username(&self, username: &str) -> Option<PlayerId> {
        self.usernames
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(username)
            .copied()
    }

    /// Clone a player's current record.
    pub fn snapshot(&self, player_id: PlayerId) -> Result<PlayerState, StoreError> {
        let record = self.record(player_id)?;
        let guard = record.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }

    /// Run a fallible mutation against a player's record.
    ///
    /// The closure receives a working copy under the record's lock; the
    /// copy replaces the stored record only when the closure returns
    /// `Ok`. The closure's own error comes back in the inner `Result`,
    /// keeping its type open for callers with richer error enums.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PlayerNotFound`] when the ID is unknown.
    pub fn with_player<R, E>(
        &self,
        player_id: PlayerId,
        mutate: impl FnOnce(&mut PlayerState) -> Result<R, E>,
    ) -> Result<Result<R, E>, StoreError> {
        let record = self.record(player_id)?;
        let mut guard = record.lock().unwrap_or_else(PoisonError::into_inner);

        let mut working = guard.clone();
        match mutate(&mut working) {
            Ok(result) => {
                *guard = working;
                Ok(Ok(result))
            }
            Err(error) => Ok(Err(error)),
        }
    }

    /// [`with_player`](Self::with_player) specialized to [`GameError`]
    /// closures, flattening the rejection into [`StoreError::Game`].
    pub fn update<R>(
        &self,
        player_id: PlayerId,
        mutate: impl FnOnce(&mut PlayerState) -> Result<R, GameError>,
    ) -> Result<R, StoreError> {
        match self.with_player(player_id, mutate)? {
            Ok(result) => Ok(result),
            Err(error) => Err(StoreError::Game(error)),
        }
    }

    /// Clone every record (for leaderboard projections).
    pub fn snapshots(&self) -> Vec<PlayerState> {
        let records = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        records
            .values()
            .map(|record| {
                record
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone()
            })
            .collect()
    }

    fn record(&self, player_id: PlayerId) -> Result<Arc<Mutex<PlayerState>>, StoreError> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&player_id)
            .cloned()
            .ok_or(StoreError::PlayerNotFound(player_id))
    }
}
