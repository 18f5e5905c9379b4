//! Cache-aside behavior of the conditions listing.

mod common;

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use nourish::adapters::cache::{CachedConditionsRepository, MokaCache, CONDITIONS_CACHE_KEY};
use nourish::adapters::memory::InMemoryRepository;
use nourish::{
    CacheError, ConditionKind, KeyValueCache, MealFilter, PageRequest, Repository, RequestContext,
};

/// Moka-backed cache that counts calls and can be switched into failure or
/// slow mode.
#[derive(Default)]
struct RecordingCache {
    inner: MokaCache,
    gets: AtomicUsize,
    sets: AtomicUsize,
    deletes: AtomicUsize,
    failing: AtomicBool,
    delay: Option<Duration>,
}

impl RecordingCache {
    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    async fn enter(&self, counter: &AtomicUsize) -> Result<(), CacheError> {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("injected fault".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueCache for RecordingCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.enter(&self.gets).await?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.enter(&self.sets).await?;
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.enter(&self.deletes).await?;
        self.inner.delete(key).await
    }
}

fn decorate(cache: Arc<RecordingCache>) -> CachedConditionsRepository<InMemoryRepository> {
    let cache: Arc<dyn KeyValueCache> = cache;
    CachedConditionsRepository::new(Arc::new(InMemoryRepository::new()), Some(cache))
}

#[tokio::test]
async fn test_read_miss_populates_then_hits() {
    let cache = Arc::new(RecordingCache::default());
    let repo = decorate(cache.clone());
    let ctx = RequestContext::background();
    repo.inner()
        .create_condition(&ctx, "Asthma", ConditionKind::Disease)
        .await
        .unwrap();

    assert_eq!(repo.list_conditions(&ctx).await.unwrap().len(), 1);
    assert_eq!(cache.sets.load(Ordering::SeqCst), 1);
    assert!(cache.inner.get(CONDITIONS_CACHE_KEY).await.unwrap().is_some());

    // Warm: a row added behind the decorator stays invisible.
    repo.inner()
        .create_condition(&ctx, "Sprain", ConditionKind::Injury)
        .await
        .unwrap();
    assert_eq!(repo.list_conditions(&ctx).await.unwrap().len(), 1);
    assert_eq!(cache.gets.load(Ordering::SeqCst), 2);
    assert_eq!(cache.sets.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_write_invalidates_without_repopulating() {
    let cache = Arc::new(RecordingCache::default());
    let repo = decorate(cache.clone());
    let ctx = RequestContext::background();

    // Write against an absent key: still deleted, never set.
    let id = repo
        .create_condition(&ctx, "Asthma", ConditionKind::Disease)
        .await
        .unwrap();
    assert_eq!(cache.deletes.load(Ordering::SeqCst), 1);
    assert_eq!(cache.sets.load(Ordering::SeqCst), 0);

    repo.list_conditions(&ctx).await.unwrap();
    repo.update_condition(&ctx, id, "Exercise-induced asthma", ConditionKind::Disease)
        .await
        .unwrap();
    assert_eq!(cache.deletes.load(Ordering::SeqCst), 2);
    assert!(cache.inner.get(CONDITIONS_CACHE_KEY).await.unwrap().is_none());

    let conditions = repo.list_conditions(&ctx).await.unwrap();
    assert_eq!(conditions[0].name, "Exercise-induced asthma");
}

#[tokio::test]
async fn test_failed_write_leaves_cache_untouched() {
    let cache = Arc::new(RecordingCache::default());
    let repo = decorate(cache.clone());
    let ctx = RequestContext::background();

    let err = repo
        .update_condition(&ctx, 7, "Nope", ConditionKind::Injury)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(cache.deletes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_entry_expires_after_ttl() {
    let cache = Arc::new(RecordingCache::default());
    let repo = decorate(cache.clone()).with_ttl(Duration::from_millis(50));
    let ctx = RequestContext::background();
    repo.inner()
        .create_condition(&ctx, "Asthma", ConditionKind::Disease)
        .await
        .unwrap();
    repo.list_conditions(&ctx).await.unwrap();

    repo.inner()
        .create_condition(&ctx, "Sprain", ConditionKind::Injury)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(repo.list_conditions(&ctx).await.unwrap().len(), 2);
    assert_eq!(cache.sets.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_faulty_cache_is_invisible_to_callers() {
    common::setup_test_logging();
    let cache = Arc::new(RecordingCache::default());
    cache.failing.store(true, Ordering::SeqCst);
    let repo = decorate(cache.clone());
    let ctx = RequestContext::background();

    let id = repo
        .create_condition(&ctx, "Asthma", ConditionKind::Disease)
        .await
        .unwrap();
    repo.update_condition(&ctx, id, "Asthma", ConditionKind::Disease)
        .await
        .unwrap();
    assert_eq!(repo.list_conditions(&ctx).await.unwrap().len(), 1);

    assert_eq!(cache.gets.load(Ordering::SeqCst), 1);
    assert_eq!(cache.deletes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_slow_cache_is_bounded_by_op_timeout() {
    let cache = Arc::new(RecordingCache::slow(Duration::from_secs(5)));
    let repo = decorate(cache.clone()).with_op_timeout(Duration::from_millis(20));
    let ctx = RequestContext::background();

    let started = Instant::now();
    repo.create_condition(&ctx, "Asthma", ConditionKind::Disease)
        .await
        .unwrap();
    assert_eq!(repo.list_conditions(&ctx).await.unwrap().len(), 1);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_other_entities_bypass_cache() {
    let cache = Arc::new(RecordingCache::default());
    let repo = decorate(cache.clone());
    let ctx = RequestContext::background();

    repo.create_meal(&ctx, &common::meal("Toast", 120)).await.unwrap();
    let page = repo
        .list_meals(&ctx, PageRequest::default(), &MealFilter::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);

    assert_eq!(cache.gets.load(Ordering::SeqCst), 0);
    assert_eq!(cache.sets.load(Ordering::SeqCst), 0);
    assert_eq!(cache.deletes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_decorator_over_sqlite() {
    let store = common::sqlite_repo().await;
    let cache: Arc<dyn KeyValueCache> = Arc::new(MokaCache::default());
    let repo = CachedConditionsRepository::new(store, Some(cache));
    let ctx = RequestContext::background();

    let id = repo
        .create_condition(&ctx, "Asthma", ConditionKind::Disease)
        .await
        .unwrap();
    assert_eq!(repo.list_conditions(&ctx).await.unwrap().len(), 1);
    repo.update_condition(&ctx, id, "Tendonitis", ConditionKind::Injury)
        .await
        .unwrap();

    let conditions = repo.list_conditions(&ctx).await.unwrap();
    assert_eq!(conditions[0].name, "Tendonitis");
    assert_eq!(conditions[0].kind, ConditionKind::Injury);
}
