use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use droplink_core::LinkError;

use super::ShareResolver;
use crate::lookup::{ShareLookup, StaticShareLookup};
use crate::ResolverResult;

/// Wrapper that counts how often the underlying lookup actually runs.
struct CountingLookup {
    inner: StaticShareLookup,
    calls: AtomicUsize,
}

impl CountingLookup {
    fn new(inner: StaticShareLookup) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShareLookup for CountingLookup {
    async fn share_root(&self, share: &str) -> ResolverResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.share_root(share).await
    }
}

fn resolver_with(lookup: Arc<CountingLookup>, machine: &str) -> ShareResolver {
    ShareResolver::new(machine, lookup)
}

#[tokio::test]
async fn local_paths_pass_through_untranslated() {
    let lookup = Arc::new(CountingLookup::new(StaticShareLookup::new()));
    let resolver = resolver_with(lookup.clone(), "agent01");

    let resolved = resolver.resolve("/mnt/artifacts/20/drop").await.unwrap();
    assert_eq!(resolved, Utf8PathBuf::from("/mnt/artifacts/20/drop"));

    let resolved = resolver.resolve(r"C:\artifacts\20").await.unwrap();
    assert_eq!(resolved, Utf8PathBuf::from(r"C:\artifacts\20"));

    assert_eq!(lookup.calls(), 0);
}

#[tokio::test]
async fn resolves_unc_path_against_share_root() {
    let lookup = Arc::new(CountingLookup::new(
        StaticShareLookup::new().with_share("artifacts", "/srv/shares/artifacts"),
    ));
    let resolver = resolver_with(lookup, "agent01");

    let resolved = resolver
        .resolve(r"\\agent01\artifacts\20\drop")
        .await
        .unwrap();
    assert_eq!(resolved, Utf8PathBuf::from("/srv/shares/artifacts/20/drop"));
}

#[tokio::test]
async fn unc_path_with_empty_remainder_resolves_to_root() {
    let lookup = Arc::new(CountingLookup::new(
        StaticShareLookup::new().with_share("artifacts", "/srv/shares/artifacts"),
    ));
    let resolver = resolver_with(lookup, "agent01");

    let resolved = resolver.resolve(r"\\agent01\artifacts\").await.unwrap();
    assert_eq!(resolved, Utf8PathBuf::from("/srv/shares/artifacts"));
}

#[tokio::test]
async fn share_root_is_queried_once_per_share() {
    let lookup = Arc::new(CountingLookup::new(
        StaticShareLookup::new()
            .with_share("artifacts", "/srv/shares/artifacts")
            .with_share("symbols", "/srv/shares/symbols"),
    ));
    let resolver = resolver_with(lookup.clone(), "agent01");

    resolver.resolve(r"\\agent01\artifacts\20\a").await.unwrap();
    resolver.resolve(r"\\agent01\Artifacts\20\b").await.unwrap();
    resolver.resolve(r"\\agent01\ARTIFACTS\21\c").await.unwrap();
    assert_eq!(lookup.calls(), 1);

    resolver.resolve(r"\\agent01\symbols\20\a").await.unwrap();
    assert_eq!(lookup.calls(), 2);
}

#[tokio::test]
async fn remote_host_is_rejected_without_querying() {
    let lookup = Arc::new(CountingLookup::new(
        StaticShareLookup::new().with_share("artifacts", "/srv/shares/artifacts"),
    ));
    let resolver = resolver_with(lookup.clone(), "agent01");

    let err = resolver
        .resolve(r"\\build-server\artifacts\20\drop")
        .await
        .unwrap_err();
    match err {
        LinkError::NonLocalShare { path } => {
            assert_eq!(path, r"\\build-server\artifacts\20\drop");
        }
        other => panic!("expected NonLocalShare, got {other:?}"),
    }
    assert_eq!(lookup.calls(), 0);
}

#[tokio::test]
async fn loopback_hosts_are_always_local() {
    let lookup = Arc::new(CountingLookup::new(
        StaticShareLookup::new().with_share("artifacts", "/srv/shares/artifacts"),
    ));
    let resolver = resolver_with(lookup, "agent01");

    resolver.resolve(r"\\localhost\artifacts\x").await.unwrap();
    resolver.resolve(r"\\127.0.0.1\artifacts\y").await.unwrap();
    resolver.resolve(r"\\LOCALHOST\artifacts\z").await.unwrap();
}

#[tokio::test]
async fn host_match_ignores_case() {
    let lookup = Arc::new(CountingLookup::new(
        StaticShareLookup::new().with_share("artifacts", "/srv/shares/artifacts"),
    ));
    let resolver = resolver_with(lookup, "Agent01");

    resolver.resolve(r"\\AGENT01\artifacts\x").await.unwrap();
    resolver.resolve(r"\\agent01\artifacts\y").await.unwrap();
}

#[tokio::test]
async fn unknown_share_surfaces_query_error() {
    let lookup = Arc::new(CountingLookup::new(StaticShareLookup::new()));
    let resolver = resolver_with(lookup, "agent01");

    let err = resolver
        .resolve(r"\\agent01\missing\20\drop")
        .await
        .unwrap_err();
    assert!(matches!(err, LinkError::ShareQuery { .. }));
}

#[tokio::test]
async fn share_root_output_is_trimmed() {
    let lookup = Arc::new(CountingLookup::new(
        StaticShareLookup::new().with_share("artifacts", "  /srv/shares/artifacts \n"),
    ));
    let resolver = resolver_with(lookup, "agent01");

    let resolved = resolver.resolve(r"\\agent01\artifacts\20").await.unwrap();
    assert_eq!(resolved, Utf8PathBuf::from("/srv/shares/artifacts/20"));
}
