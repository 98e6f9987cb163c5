// Lazy, memoized reverse resolution
//
// Each address gets one cell the first time anyone asks about it. The first
// caller runs the lookup; concurrent callers for the same address wait on the
// same cell instead of issuing their own request. Failures are cached as
// "no domain" so an address is never queried twice in a process lifetime.

use crate::capture::DomainResolver;
use crate::net::Address;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::debug;

type Entry = Arc<OnceCell<Option<String>>>;

pub struct DomainCache {
    resolver: Arc<dyn DomainResolver>,
    entries: Mutex<HashMap<Address, Entry>>,
}

impl DomainCache {
    pub fn new(resolver: Arc<dyn DomainResolver>) -> Self {
        Self {
            resolver,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Resolved value without suspending: `None` while unresolved
    pub fn peek(&self, address: &Address) -> Option<Option<String>> {
        self.lock()
            .get(address)
            .and_then(|cell| cell.get().cloned())
    }

    /// Domain for `address`, resolving it on first use
    pub async fn get_domain(&self, address: &Address) -> Option<String> {
        let cell = self.lock().entry(*address).or_default().clone();

        cell.get_or_init(|| async {
            match self.resolver.ip_to_domain(address).await {
                Ok(domain) => {
                    debug!(address = %address, domain = ?domain, "Resolved domain");
                    domain
                }
                Err(e) => {
                    debug!(address = %address, error = %e, "Domain resolution failed");
                    None
                }
            }
        })
        .await
        .clone()
    }

    /// Number of addresses whose resolution has completed
    pub fn resolved_count(&self) -> usize {
        self.lock().values().filter(|cell| cell.initialized()).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Address, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::CaptureError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Resolver answering from a fixed table and counting requests
    #[derive(Default)]
    pub(crate) struct CountingResolver {
        pub answers: HashMap<Address, String>,
        pub failing: Vec<Address>,
        pub delay: Option<Duration>,
        pub calls: AtomicUsize,
    }

    impl CountingResolver {
        pub fn with_answer(address: &str, domain: &str) -> Self {
            let mut answers = HashMap::new();
            answers.insert(Address::parse(address).unwrap(), domain.to_string());
            Self {
                answers,
                ..Default::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DomainResolver for CountingResolver {
        async fn domain_to_ips(&self, domain: &str) -> Result<Vec<Address>, CaptureError> {
            Ok(self
                .answers
                .iter()
                .filter(|(_, name)| name.as_str() == domain)
                .map(|(addr, _)| *addr)
                .collect())
        }

        async fn ip_to_domain(&self, address: &Address) -> Result<Option<String>, CaptureError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing.contains(address) {
                return Err(CaptureError::Resolution {
                    address: address.to_string(),
                    message: "lookup refused".to_string(),
                });
            }
            Ok(self.answers.get(address).cloned())
        }
    }

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let resolver = Arc::new(CountingResolver::with_answer("93.184.216.34", "example.com"));
        let cache = DomainCache::new(resolver.clone());
        let target = addr("93.184.216.34");

        assert_eq!(cache.peek(&target), None);
        assert_eq!(cache.get_domain(&target).await, Some("example.com".to_string()));
        assert_eq!(cache.get_domain(&target).await, Some("example.com".to_string()));
        assert_eq!(resolver.calls(), 1);
        assert_eq!(cache.peek(&target), Some(Some("example.com".to_string())));
    }

    #[tokio::test]
    async fn test_missing_record_is_cached_as_none() {
        let resolver = Arc::new(CountingResolver::default());
        let cache = DomainCache::new(resolver.clone());
        let target = addr("198.51.100.7");

        assert_eq!(cache.get_domain(&target).await, None);
        assert_eq!(cache.get_domain(&target).await, None);
        assert_eq!(resolver.calls(), 1);
        assert_eq!(cache.peek(&target), Some(None));
    }

    #[tokio::test]
    async fn test_failure_is_swallowed_and_cached() {
        let target = addr("203.0.113.5");
        let resolver = Arc::new(CountingResolver {
            failing: vec![target],
            ..Default::default()
        });
        let cache = DomainCache::new(resolver.clone());

        assert_eq!(cache.get_domain(&target).await, None);
        assert_eq!(cache.get_domain(&target).await, None);
        assert_eq!(resolver.calls(), 1);
        assert_eq!(cache.resolved_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_request() {
        let mut resolver = CountingResolver::with_answer("93.184.216.34", "example.com");
        resolver.delay = Some(Duration::from_millis(20));
        let resolver = Arc::new(resolver);
        let cache = DomainCache::new(resolver.clone());
        let target = addr("93.184.216.34");

        let (a, b, c) = tokio::join!(
            cache.get_domain(&target),
            cache.get_domain(&target),
            cache.get_domain(&target)
        );
        assert_eq!(a.as_deref(), Some("example.com"));
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_alternate_spelling_hits_same_entry() {
        let resolver = Arc::new(CountingResolver::with_answer("2001:db8::1", "v6.example"));
        let cache = DomainCache::new(resolver.clone());

        cache.get_domain(&addr("2001:db8::1")).await;
        cache.get_domain(&addr("2001:0db8:0:0:0:0:0:1")).await;
        assert_eq!(resolver.calls(), 1);
    }
}
