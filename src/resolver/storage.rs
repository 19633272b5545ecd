use super::{match_title, match_uuid, Cache, ResolutionProvider, Resolved, Resolver};
use crate::api::{Service, Storage};
use crate::error::{ApiError, ResolutionError};
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves storages by title or UUID.
pub struct CachingStorage {
    cache: Cache<Storage>,
}

impl Default for CachingStorage {
    fn default() -> Self {
        Self {
            cache: Cache::new("storage"),
        }
    }
}

fn storage_matcher(cached: Arc<Vec<Storage>>) -> Resolver {
    Box::new(move |arg: &str| {
        let mut rv = Resolved::new(arg);
        for storage in cached.iter() {
            rv.add_match(&storage.uuid, match_title(arg, &storage.title));
            rv.add_match(&storage.uuid, match_uuid(arg, &storage.uuid));
        }
        rv
    })
}

impl CachingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_cached(&self, uuid: &str) -> Result<Storage, ResolutionError> {
        self.cache.find(uuid, |storage| storage.uuid.as_str())
    }

    pub fn resolve(&self, arg: &str) -> Result<String, ResolutionError> {
        storage_matcher(self.cache.load()?)(arg).get_only()
    }
}

#[async_trait]
impl ResolutionProvider for CachingStorage {
    async fn get(&self, svc: &dyn Service) -> Result<Resolver, ApiError> {
        let storages = svc.storages().await?;
        Ok(storage_matcher(self.cache.store(storages)))
    }

    fn positional_argument_help(&self) -> &'static str {
        "<UUID/Title...>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::{storage, MockService};

    #[tokio::test]
    async fn duplicate_titles_expand_in_all_mode() {
        let svc = MockService::default().with_storages(vec![
            storage("s-1", "backup"),
            storage("s-2", "backup"),
            storage("s-3", "root disk"),
        ]);
        let provider = CachingStorage::new();
        let resolve = provider.get(&svc).await.expect("resolver");

        assert_eq!(
            resolve("backup").get_all(),
            Ok(vec!["s-1".to_string(), "s-2".to_string()])
        );
        assert_eq!(resolve("Root Disk").get_only(), Ok("s-3".to_string()));
        assert_eq!(provider.resolve("s-1"), Ok("s-1".to_string()));
    }
}
