use super::{match_title, match_uuid, Cache, ResolutionProvider, Resolved, Resolver};
use crate::api::{Server, Service};
use crate::error::{ApiError, ResolutionError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Resolves servers by title, hostname or UUID, caching the server list.
pub struct CachingServer {
    cache: Cache<Server>,
}

impl Default for CachingServer {
    fn default() -> Self {
        Self {
            cache: Cache::new("server"),
        }
    }
}

fn server_matcher(cached: Arc<Vec<Server>>) -> Resolver {
    Box::new(move |arg: &str| {
        let mut rv = Resolved::new(arg);
        for server in cached.iter() {
            rv.add_match(&server.uuid, match_title(arg, &server.hostname));
            rv.add_match(&server.uuid, match_title(arg, &server.title));
            rv.add_match(&server.uuid, match_uuid(arg, &server.uuid));
        }
        rv
    })
}

impl CachingServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a server from the snapshot taken by the last `get`.
    pub fn get_cached(&self, uuid: &str) -> Result<Server, ResolutionError> {
        self.cache.find(uuid, |server| server.uuid.as_str())
    }

    /// Resolve an argument that is not positional (e.g. a flag value).
    pub fn resolve(&self, arg: &str) -> Result<String, ResolutionError> {
        server_matcher(self.cache.load()?)(arg).get_only()
    }
}

#[async_trait]
impl ResolutionProvider for CachingServer {
    async fn get(&self, svc: &dyn Service) -> Result<Resolver, ApiError> {
        let servers = svc.servers().await?;
        debug!(count = servers.len(), "cached servers for resolution");
        Ok(server_matcher(self.cache.store(servers)))
    }

    fn positional_argument_help(&self) -> &'static str {
        "<UUID/Title/Hostname...>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::{server, MockService};

    fn fixtures() -> MockService {
        MockService::default().with_servers(vec![
            server("0001", "web", "web-1.example.com"),
            server("0002", "Web", "web-2.example.com"),
            server("0003", "db", "db.example.com"),
        ])
    }

    #[tokio::test]
    async fn resolves_by_title_hostname_and_uuid() {
        let svc = fixtures();
        let provider = CachingServer::new();
        let resolve = provider.get(&svc).await.expect("resolver");

        assert_eq!(resolve("db").get_only(), Ok("0003".to_string()));
        assert_eq!(resolve("web-2.example.com").get_only(), Ok("0002".to_string()));
        assert_eq!(resolve("0001").get_only(), Ok("0001".to_string()));
        // exact title beats the case-insensitive match on the other server
        assert_eq!(resolve("web").get_only(), Ok("0001".to_string()));
    }

    #[tokio::test]
    async fn wildcard_expands_to_all_matches() {
        let svc = fixtures();
        let provider = CachingServer::new();
        let resolve = provider.get(&svc).await.expect("resolver");

        assert_eq!(
            resolve("web-*").get_all(),
            Ok(vec!["0001".to_string(), "0002".to_string()])
        );
        assert!(matches!(
            resolve("web-*").get_only(),
            Err(ResolutionError::Ambiguous { matches: 2, .. })
        ));
        assert_eq!(
            resolve("mail").get_all(),
            Err(ResolutionError::NotFound("mail".into()))
        );
    }

    #[tokio::test]
    async fn cached_lookups_require_a_fetch() {
        let svc = fixtures();
        let provider = CachingServer::new();
        assert_eq!(
            provider.get_cached("0001"),
            Err(ResolutionError::Uninitialized("server"))
        );
        assert!(provider.resolve("db").is_err());

        let resolve = provider.get(&svc).await.expect("resolver");
        assert_eq!(resolve("db").get_only(), Ok("0003".to_string()));
        assert_eq!(provider.get_cached("0003").expect("cached").title, "db");
        assert_eq!(provider.resolve("db"), Ok("0003".to_string()));
        assert_eq!(
            provider.get_cached("9999"),
            Err(ResolutionError::NotFound("9999".into()))
        );
    }

    #[tokio::test]
    async fn fetch_failure_is_returned() {
        let svc = fixtures().failing_lists();
        assert!(CachingServer::new().get(&svc).await.is_err());
    }
}
