//! Favorites persisted under a single key of the local key-value store.
//!
//! The value is a JSON array of episodes in append order.  Reads never fail
//! the caller: a missing, unreadable or malformed value means "no favorites
//! yet".  Writes replace the whole array and do report failure, since a
//! failed write means the user's action did not stick.

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::Episode;
use crate::storage::KeyValueStore;

pub const FAVORITES_KEY: &str = "favorites";

pub struct FavoritesStore<S> {
    store: S,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Vec<Episode> {
        let raw = match self.store.get(FAVORITES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("favorites: storage read failed, treating as empty: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Option<Vec<Episode>>>(&raw) {
            Ok(list) => list.unwrap_or_default(),
            Err(e) => {
                debug!("favorites: stored value is not an episode list ({}), ignoring", e);
                Vec::new()
            }
        }
    }

    pub fn save(&mut self, list: &[Episode]) -> Result<(), StoreError> {
        let json = serde_json::to_string(list).map_err(|source| StoreError::Encode {
            key: FAVORITES_KEY.to_string(),
            source,
        })?;
        self.store.set(FAVORITES_KEY, json)?;
        debug!("favorites: saved {} entries", list.len());
        Ok(())
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
