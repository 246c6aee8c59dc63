//! Tenant resolution for client domains.
//!
//! State machine: `Unresolved → Resolving → Resolved | Failed`. The route
//! tree only evaluates the guard once this reaches `Resolved`.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use thiserror::Error;

use bookacut_core::{DomainClass, Host, TenantContext};
use bookacut_routing::TenantPhase;

use crate::directory::TenantDirectory;

/// Lookups per resolution: the first try plus one retry on transient failure.
const MAX_ATTEMPTS: u32 = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// Authoritative answer: no tenant serves this host. Never retried.
    #[error("salon not found for this domain")]
    NotFound,

    /// Network or server trouble.
    #[error("tenant lookup failed: {0}")]
    Transient(String),
}

impl ResolutionError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolutionError::Transient(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    Resolving {
        host: Host,
    },
    Resolved {
        host: Host,
        tenant: TenantContext,
        resolved_at: DateTime<Utc>,
    },
    Failed {
        host: Host,
        error: ResolutionError,
    },
}

impl ResolutionState {
    fn host(&self) -> Option<&Host> {
        match self {
            ResolutionState::Unresolved => None,
            ResolutionState::Resolving { host }
            | ResolutionState::Resolved { host, .. }
            | ResolutionState::Failed { host, .. } => Some(host),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Platform host: there is no tenant to resolve.
    Skipped,
    /// A lookup for this host is already in flight; this trigger is dropped.
    Pending,
    Resolved(TenantContext),
}

/// Resolves the serving host to a tenant, at most once per host.
///
/// The lookup runs on its own task: dropping the future returned by
/// [`TenantResolver::resolve`] does not cancel it, and its answer is still
/// recorded.
pub struct TenantResolver {
    platform_domain: String,
    directory: Arc<dyn TenantDirectory>,
    state: Arc<Mutex<ResolutionState>>,
}

impl core::fmt::Debug for TenantResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TenantResolver")
            .field("platform_domain", &self.platform_domain)
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}

fn lock_state(state: &Mutex<ResolutionState>) -> MutexGuard<'_, ResolutionState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

impl TenantResolver {
    pub fn new(platform_domain: impl Into<String>, directory: Arc<dyn TenantDirectory>) -> Self {
        Self {
            platform_domain: platform_domain.into(),
            directory,
            state: Arc::new(Mutex::new(ResolutionState::Unresolved)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ResolutionState> {
        lock_state(&self.state)
    }

    pub fn state(&self) -> ResolutionState {
        self.lock().clone()
    }

    /// The resolved tenant, if any.
    pub fn tenant(&self) -> Option<TenantContext> {
        match &*self.lock() {
            ResolutionState::Resolved { tenant, .. } => Some(tenant.clone()),
            _ => None,
        }
    }

    /// Resolve `host`, reusing any settled result for the same host.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn resolve(&self, host: &Host) -> Result<ResolveOutcome, ResolutionError> {
        if host.classify(&self.platform_domain) == DomainClass::Platform {
            tracing::debug!(%host, "platform domain; tenant resolution skipped");
            return Ok(ResolveOutcome::Skipped);
        }

        {
            let mut state = self.lock();
            match &*state {
                ResolutionState::Resolved { host: h, tenant, .. } if h == host => {
                    return Ok(ResolveOutcome::Resolved(tenant.clone()));
                }
                ResolutionState::Failed { host: h, error } if h == host => return Err(error.clone()),
                ResolutionState::Resolving { host: h } if h == host => {
                    tracing::debug!(%host, "tenant lookup already in flight");
                    return Ok(ResolveOutcome::Pending);
                }
                _ => {}
            }
            *state = ResolutionState::Resolving { host: host.clone() };
        }

        let task = tokio::spawn(run_lookup(self.directory.clone(), self.state.clone(), host.clone()));

        match task.await {
            Ok(result) => result.map(ResolveOutcome::Resolved),
            Err(join_error) => {
                // The lookup task panicked or the runtime is shutting down.
                let error = ResolutionError::Transient(join_error.to_string());
                record(&self.state, host, Err(error.clone()));
                Err(error)
            }
        }
    }

    /// Forget any settled result for `host` and resolve again.
    ///
    /// A lookup still in flight is left alone; the caller gets `Pending`.
    pub async fn refresh(&self, host: &Host) -> Result<ResolveOutcome, ResolutionError> {
        {
            let mut state = self.lock();
            if state.host() == Some(host) && !matches!(*state, ResolutionState::Resolving { .. }) {
                *state = ResolutionState::Unresolved;
            }
        }
        self.resolve(host).await
    }

    /// What the route tree should assume for `host` right now.
    pub fn phase(&self, host: &Host) -> TenantPhase {
        if host.classify(&self.platform_domain) == DomainClass::Platform {
            return TenantPhase::NotRequired;
        }
        match &*self.lock() {
            ResolutionState::Resolved { host: h, tenant, .. } if h == host => TenantPhase::Ready(tenant.clone()),
            ResolutionState::Failed { host: h, .. } if h == host => TenantPhase::NotFound,
            _ => TenantPhase::Loading,
        }
    }
}

async fn run_lookup(
    directory: Arc<dyn TenantDirectory>,
    state: Arc<Mutex<ResolutionState>>,
    host: Host,
) -> Result<TenantContext, ResolutionError> {
    let result = lookup_with_retry(directory.as_ref(), &host).await;
    record(&state, &host, result.clone());
    result
}

async fn lookup_with_retry(directory: &dyn TenantDirectory, host: &Host) -> Result<TenantContext, ResolutionError> {
    let mut attempt = 1;
    loop {
        match directory.lookup(host).await {
            Err(error) if error.is_retryable() && attempt < MAX_ATTEMPTS => {
                tracing::warn!(%host, %error, attempt, "tenant lookup failed; retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Settle the slot with a lookup result. Late answers still land: re-resolving
/// a host is idempotent.
fn record(state: &Mutex<ResolutionState>, host: &Host, result: Result<TenantContext, ResolutionError>) {
    let mut state = lock_state(state);
    match result {
        Ok(tenant) => {
            tracing::info!(%host, tenant_id = %tenant.id, tenant = %tenant.name, "tenant resolved");
            *state = ResolutionState::Resolved {
                host: host.clone(),
                tenant,
                resolved_at: Utc::now(),
            };
        }
        Err(error) => {
            tracing::warn!(%host, %error, "tenant resolution failed");
            *state = ResolutionState::Failed {
                host: host.clone(),
                error,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bookacut_core::TenantId;

    const PLATFORM: &str = "platform.example.com";

    /// Scripted directory: pops one answer per lookup and yields once so
    /// concurrent triggers can interleave.
    struct Scripted {
        answers: Mutex<VecDeque<Result<TenantContext, ResolutionError>>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(answers: Vec<Result<TenantContext, ResolutionError>>) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TenantDirectory for Scripted {
        async fn lookup(&self, _host: &Host) -> Result<TenantContext, ResolutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ResolutionError::Transient("script exhausted".into())))
        }
    }

    fn salon() -> TenantContext {
        TenantContext {
            id: TenantId::new("t-abc").unwrap(),
            name: "ABC Salon".to_string(),
            domain: Some("abcsalon.com".to_string()),
            database_name: Some("tenant_abc".to_string()),
        }
    }

    fn resolver(directory: Arc<Scripted>) -> TenantResolver {
        TenantResolver::new(PLATFORM, directory)
    }

    #[tokio::test]
    async fn platform_host_is_skipped_without_lookup() {
        let directory = Scripted::new(vec![]);
        let resolver = resolver(directory.clone());
        let host = Host::new("a.platform.example.com");

        assert_eq!(resolver.resolve(&host).await, Ok(ResolveOutcome::Skipped));
        assert_eq!(resolver.phase(&host), TenantPhase::NotRequired);
        assert_eq!(resolver.state(), ResolutionState::Unresolved);
        assert_eq!(directory.calls(), 0);
    }

    #[tokio::test]
    async fn resolves_once_and_caches() {
        let directory = Scripted::new(vec![Ok(salon())]);
        let resolver = resolver(directory.clone());
        let host = Host::new("abcsalon.com");

        assert_eq!(resolver.phase(&host), TenantPhase::Loading);
        assert_eq!(resolver.resolve(&host).await, Ok(ResolveOutcome::Resolved(salon())));
        assert_eq!(resolver.resolve(&host).await, Ok(ResolveOutcome::Resolved(salon())));

        assert_eq!(directory.calls(), 1);
        assert_eq!(resolver.phase(&host), TenantPhase::Ready(salon()));
        assert_eq!(resolver.tenant(), Some(salon()));
    }

    #[tokio::test]
    async fn concurrent_trigger_is_suppressed() {
        let directory = Scripted::new(vec![Ok(salon())]);
        let resolver = resolver(directory.clone());
        let host = Host::new("abcsalon.com");

        let (first, second) = tokio::join!(resolver.resolve(&host), resolver.resolve(&host));

        assert_eq!(first, Ok(ResolveOutcome::Resolved(salon())));
        assert_eq!(second, Ok(ResolveOutcome::Pending));
        assert_eq!(directory.calls(), 1);
    }

    #[tokio::test]
    async fn not_found_is_terminal_and_not_retried() {
        let directory = Scripted::new(vec![Err(ResolutionError::NotFound), Ok(salon())]);
        let resolver = resolver(directory.clone());
        let host = Host::new("unknown-salon.com");

        assert_eq!(resolver.resolve(&host).await, Err(ResolutionError::NotFound));
        assert_eq!(resolver.resolve(&host).await, Err(ResolutionError::NotFound));

        assert_eq!(directory.calls(), 1);
        assert_eq!(resolver.phase(&host), TenantPhase::NotFound);
    }

    #[tokio::test]
    async fn transient_failure_retries_once() {
        let directory = Scripted::new(vec![Err(ResolutionError::Transient("reset".into())), Ok(salon())]);
        let resolver = resolver(directory.clone());
        let host = Host::new("abcsalon.com");

        assert_eq!(resolver.resolve(&host).await, Ok(ResolveOutcome::Resolved(salon())));
        assert_eq!(directory.calls(), 2);
    }

    #[tokio::test]
    async fn repeated_transient_failure_gives_up_after_retry() {
        let directory = Scripted::new(vec![
            Err(ResolutionError::Transient("reset".into())),
            Err(ResolutionError::Transient("reset".into())),
            Ok(salon()),
        ]);
        let resolver = resolver(directory.clone());
        let host = Host::new("abcsalon.com");

        assert!(matches!(resolver.resolve(&host).await, Err(ResolutionError::Transient(_))));
        assert_eq!(directory.calls(), 2);
        assert_eq!(resolver.phase(&host), TenantPhase::NotFound);

        // Settled for the session; only an explicit refresh tries again.
        assert!(resolver.resolve(&host).await.is_err());
        assert_eq!(directory.calls(), 2);
        assert_eq!(resolver.refresh(&host).await, Ok(ResolveOutcome::Resolved(salon())));
        assert_eq!(directory.calls(), 3);
    }

    /// Answers after a delay, so the caller can give up first.
    struct Slow {
        delay: std::time::Duration,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TenantDirectory for Slow {
        async fn lookup(&self, _host: &Host) -> Result<TenantContext, ResolutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(salon())
        }
    }

    fn slow(delay_ms: u64) -> Arc<Slow> {
        Arc::new(Slow {
            delay: std::time::Duration::from_millis(delay_ms),
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn abandoned_caller_still_settles_the_slot() {
        let directory = slow(100);
        let resolver = TenantResolver::new(PLATFORM, directory.clone());
        let host = Host::new("abcsalon.com");

        let abandoned = tokio::time::timeout(std::time::Duration::from_millis(10), resolver.resolve(&host)).await;
        assert!(abandoned.is_err());
        assert_eq!(resolver.phase(&host), TenantPhase::Loading);

        // Still in flight: a new trigger is suppressed, not a second lookup.
        assert_eq!(resolver.resolve(&host).await, Ok(ResolveOutcome::Pending));

        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        assert_eq!(resolver.phase(&host), TenantPhase::Ready(salon()));
        assert_eq!(resolver.resolve(&host).await, Ok(ResolveOutcome::Resolved(salon())));
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refresh_after_abandoned_lookup_recovers() {
        let directory = slow(50);
        let resolver = TenantResolver::new(PLATFORM, directory.clone());
        let host = Host::new("abcsalon.com");

        let _ = tokio::time::timeout(std::time::Duration::from_millis(5), resolver.resolve(&host)).await;
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;

        assert_eq!(resolver.refresh(&host).await, Ok(ResolveOutcome::Resolved(salon())));
        assert_eq!(directory.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn another_host_replaces_the_slot() {
        let other = TenantContext {
            id: TenantId::new("t-fade").unwrap(),
            name: "Fade Lab".to_string(),
            domain: Some("fadelab.com".to_string()),
            database_name: None,
        };
        let directory = Scripted::new(vec![Ok(salon()), Ok(other.clone())]);
        let resolver = resolver(directory.clone());

        resolver.resolve(&Host::new("abcsalon.com")).await.unwrap();
        assert_eq!(resolver.phase(&Host::new("fadelab.com")), TenantPhase::Loading);

        assert_eq!(
            resolver.resolve(&Host::new("fadelab.com")).await,
            Ok(ResolveOutcome::Resolved(other))
        );
        assert_eq!(directory.calls(), 2);
    }
}
