//! Argument resolution: human-friendly names to canonical resource ids.
//!
//! A [`ResolutionProvider`] fetches the resources it can match against once
//! per dispatch and hands back a [`Resolver`] closure over that snapshot.
//! Providers keep their snapshot in an instance field so commands can look
//! resolved ids back up with `get_cached` while their action runs.

use crate::api::Service;
use crate::error::{ApiError, ResolutionError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

mod matching;
mod network;
mod server;
mod storage;

pub use matching::{match_title, match_uuid, MatchType, Resolved};
pub use network::CachingNetwork;
pub use server::CachingServer;
pub use storage::CachingStorage;

/// Maps one raw argument onto the ids it matches.
pub type Resolver = Box<dyn Fn(&str) -> Resolved + Send + Sync>;

/// Something that can build a [`Resolver`] from the backend.
#[async_trait]
pub trait ResolutionProvider: Send + Sync {
    /// Fetch candidates and return a matcher over them.
    async fn get(&self, svc: &dyn Service) -> Result<Resolver, ApiError>;

    /// Usage string for the positional arguments this provider accepts.
    fn positional_argument_help(&self) -> &'static str;
}

/// Snapshot slot shared by the caching providers.
struct Cache<T> {
    kind: &'static str,
    items: Mutex<Option<Arc<Vec<T>>>>,
}

impl<T> Cache<T> {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            items: Mutex::new(None),
        }
    }

    fn store(&self, items: Vec<T>) -> Arc<Vec<T>> {
        let items = Arc::new(items);
        *self.items.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&items));
        items
    }

    fn load(&self) -> Result<Arc<Vec<T>>, ResolutionError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ResolutionError::Uninitialized(self.kind))
    }
}

impl<T: Clone> Cache<T> {
    fn find(&self, uuid: &str, id_of: impl Fn(&T) -> &str) -> Result<T, ResolutionError> {
        self.load()?
            .iter()
            .find(|item| id_of(item) == uuid)
            .cloned()
            .ok_or_else(|| ResolutionError::NotFound(uuid.to_string()))
    }
}
