//! Cache-aside decorator for the conditions listing.
//!
//! `list_conditions` is served from a single well-known key (60s TTL) when
//! warm. Condition writes go to the inner repository first and, only on
//! success, delete the key; the next read repopulates it. Every other
//! operation passes straight through.
//!
//! The cache is strictly best effort: lookup, store and delete failures,
//! timeouts and undecodable payloads are logged and otherwise ignored.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::context::RequestContext;
use crate::domain::errors::DomainResult;
use crate::domain::models::{
    Condition, ConditionKind, Meal, MealInput, Page, PageRequest, Progress, ProgressInput,
    Workout, WorkoutInput,
};
use crate::domain::ports::{
    CacheError, KeyValueCache, MealFilter, ProgressFilter, Repository, WorkoutFilter,
};

/// Cache key holding the serialized conditions list.
pub const CONDITIONS_CACHE_KEY: &str = "conditions:list";

/// Default lifetime of the cached conditions list.
const CONDITIONS_CACHE_TTL_SECS: u64 = 60;

/// Default upper bound on a single cache round trip.
const CACHE_OP_TIMEOUT_MS: u64 = 250;

/// Repository decorator adding cache-aside reads for conditions.
///
/// With no cache configured it behaves exactly like the inner repository.
pub struct CachedConditionsRepository<R: Repository + ?Sized> {
    inner: Arc<R>,
    cache: Option<Arc<dyn KeyValueCache>>,
    ttl: Duration,
    op_timeout: Duration,
}

impl<R: Repository + ?Sized> CachedConditionsRepository<R> {
    /// Wrap `inner` with the default TTL and cache timeout.
    pub fn new(inner: Arc<R>, cache: Option<Arc<dyn KeyValueCache>>) -> Self {
        Self {
            inner,
            cache,
            ttl: Duration::from_secs(CONDITIONS_CACHE_TTL_SECS),
            op_timeout: Duration::from_millis(CACHE_OP_TIMEOUT_MS),
        }
    }

    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub const fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    pub const fn inner(&self) -> &Arc<R> {
        &self.inner
    }

    pub const fn is_cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Run one cache call under the op timeout; overruns become
    /// [`CacheError::Timeout`].
    async fn bounded<T, F>(&self, call: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        tokio::time::timeout(self.op_timeout, call)
            .await
            .unwrap_or(Err(CacheError::Timeout(self.op_timeout)))
    }

    /// Cached list, or `None` on miss, fault, timeout or bad payload.
    async fn lookup(&self, cache: &dyn KeyValueCache) -> Option<Vec<Condition>> {
        let payload = match self.bounded(cache.get(CONDITIONS_CACHE_KEY)).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!(key = CONDITIONS_CACHE_KEY, "Conditions cache miss");
                return None;
            }
            Err(e) => {
                warn!(key = CONDITIONS_CACHE_KEY, error = %e, "Conditions cache lookup failed");
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(conditions) => {
                debug!(key = CONDITIONS_CACHE_KEY, "Conditions cache hit");
                Some(conditions)
            }
            Err(e) => {
                warn!(key = CONDITIONS_CACHE_KEY, error = %e, "Discarding undecodable conditions cache entry");
                None
            }
        }
    }

    async fn populate(&self, cache: &dyn KeyValueCache, conditions: &[Condition]) {
        let payload = match serde_json::to_string(conditions) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to serialize conditions for cache");
                return;
            }
        };

        match self.bounded(cache.set(CONDITIONS_CACHE_KEY, &payload, self.ttl)).await {
            Ok(()) => debug!(key = CONDITIONS_CACHE_KEY, count = conditions.len(), "Populated conditions cache"),
            Err(e) => warn!(key = CONDITIONS_CACHE_KEY, error = %e, "Failed to populate conditions cache"),
        }
    }

    async fn invalidate(&self) {
        let Some(cache) = &self.cache else {
            return;
        };

        match self.bounded(cache.delete(CONDITIONS_CACHE_KEY)).await {
            Ok(()) => debug!(key = CONDITIONS_CACHE_KEY, "Invalidated conditions cache"),
            Err(e) => warn!(key = CONDITIONS_CACHE_KEY, error = %e, "Failed to invalidate conditions cache"),
        }
    }
}

#[async_trait]
impl<R: Repository + ?Sized + 'static> Repository for CachedConditionsRepository<R> {
    async fn list_conditions(&self, ctx: &RequestContext) -> DomainResult<Vec<Condition>> {
        let Some(cache) = &self.cache else {
            return self.inner.list_conditions(ctx).await;
        };

        if let Some(conditions) = self.lookup(cache.as_ref()).await {
            return Ok(conditions);
        }

        let conditions = self.inner.list_conditions(ctx).await?;
        self.populate(cache.as_ref(), &conditions).await;
        Ok(conditions)
    }

    async fn create_condition(
        &self,
        ctx: &RequestContext,
        name: &str,
        kind: ConditionKind,
    ) -> DomainResult<i64> {
        let id = self.inner.create_condition(ctx, name, kind).await?;
        self.invalidate().await;
        Ok(id)
    }

    async fn get_condition(&self, ctx: &RequestContext, id: i64) -> DomainResult<Condition> {
        self.inner.get_condition(ctx, id).await
    }

    async fn update_condition(
        &self,
        ctx: &RequestContext,
        id: i64,
        name: &str,
        kind: ConditionKind,
    ) -> DomainResult<()> {
        self.inner.update_condition(ctx, id, name, kind).await?;
        self.invalidate().await;
        Ok(())
    }

    // Everything below is not cached.

    async fn list_meals(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
        filter: &MealFilter,
    ) -> DomainResult<Page<Meal>> {
        self.inner.list_meals(ctx, page, filter).await
    }

    async fn get_meal(&self, ctx: &RequestContext, id: i64) -> DomainResult<Meal> {
        self.inner.get_meal(ctx, id).await
    }

    async fn create_meal(&self, ctx: &RequestContext, meal: &MealInput) -> DomainResult<i64> {
        self.inner.create_meal(ctx, meal).await
    }

    async fn update_meal(&self, ctx: &RequestContext, id: i64, meal: &MealInput) -> DomainResult<()> {
        self.inner.update_meal(ctx, id, meal).await
    }

    async fn list_workouts(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
        filter: &WorkoutFilter,
    ) -> DomainResult<Page<Workout>> {
        self.inner.list_workouts(ctx, page, filter).await
    }

    async fn get_workout(&self, ctx: &RequestContext, id: i64) -> DomainResult<Workout> {
        self.inner.get_workout(ctx, id).await
    }

    async fn create_workout(
        &self,
        ctx: &RequestContext,
        workout: &WorkoutInput,
    ) -> DomainResult<i64> {
        self.inner.create_workout(ctx, workout).await
    }

    async fn update_workout(
        &self,
        ctx: &RequestContext,
        id: i64,
        workout: &WorkoutInput,
    ) -> DomainResult<()> {
        self.inner.update_workout(ctx, id, workout).await
    }

    async fn list_progress(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
        filter: &ProgressFilter,
    ) -> DomainResult<Page<Progress>> {
        self.inner.list_progress(ctx, page, filter).await
    }

    async fn store_meals(&self, ctx: &RequestContext, meals: &[MealInput]) -> DomainResult<()> {
        self.inner.store_meals(ctx, meals).await
    }

    async fn store_workouts(
        &self,
        ctx: &RequestContext,
        workouts: &[WorkoutInput],
    ) -> DomainResult<()> {
        self.inner.store_workouts(ctx, workouts).await
    }

    async fn store_progress(
        &self,
        ctx: &RequestContext,
        entries: &[ProgressInput],
    ) -> DomainResult<()> {
        self.inner.store_progress(ctx, entries).await
    }
}
