use super::{match_title, match_uuid, Cache, ResolutionProvider, Resolved, Resolver};
use crate::api::{Network, Service};
use crate::error::{ApiError, ResolutionError};
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves networks by name or UUID.
pub struct CachingNetwork {
    cache: Cache<Network>,
}

impl Default for CachingNetwork {
    fn default() -> Self {
        Self {
            cache: Cache::new("network"),
        }
    }
}

fn network_matcher(cached: Arc<Vec<Network>>) -> Resolver {
    Box::new(move |arg: &str| {
        let mut rv = Resolved::new(arg);
        for network in cached.iter() {
            rv.add_match(&network.uuid, match_title(arg, &network.name));
            rv.add_match(&network.uuid, match_uuid(arg, &network.uuid));
        }
        rv
    })
}

impl CachingNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_cached(&self, uuid: &str) -> Result<Network, ResolutionError> {
        self.cache.find(uuid, |network| network.uuid.as_str())
    }

    pub fn resolve(&self, arg: &str) -> Result<String, ResolutionError> {
        network_matcher(self.cache.load()?)(arg).get_only()
    }
}

#[async_trait]
impl ResolutionProvider for CachingNetwork {
    async fn get(&self, svc: &dyn Service) -> Result<Resolver, ApiError> {
        let networks = svc.networks().await?;
        Ok(network_matcher(self.cache.store(networks)))
    }

    fn positional_argument_help(&self) -> &'static str {
        "<UUID/Name...>"
    }
}
