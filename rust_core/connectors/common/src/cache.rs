//! Time-windowed caches owned by each adapter.
//!
//! Staleness is checked lazily on the calling path. The lock is held across
//! the refresh, so concurrent callers queue behind the first one instead of
//! issuing their own fetch, and the read that follows a refresh sees exactly
//! the data that refresh produced. A failed refresh leaves the previous
//! state and timestamp untouched, so the next call fetches again.

use log::{info, warn};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::errors::Result;
use crate::symbol;
use crate::types::{lookup_pair, CurrencyPair, RateMap, VolumeMap};

fn is_stale(last_updated: Option<Instant>, ttl: Duration) -> bool {
    match last_updated {
        Some(at) => at.elapsed() >= ttl,
        None => true,
    }
}

#[derive(Default)]
struct RateState {
    rate_map: RateMap,
    volume_map: VolumeMap,
    last_updated: Option<Instant>,
}

/// Rates and volumes for every pair of one exchange, refreshed together.
pub struct RateCache {
    name: &'static str,
    ttl: Duration,
    state: Mutex<RateState>,
}

impl RateCache {
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        RateCache {
            name,
            ttl,
            state: Mutex::new(RateState::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// True while the last successful refresh is inside the TTL window.
    /// The lock is released before returning.
    pub async fn is_fresh(&self) -> bool {
        !is_stale(self.state.lock().await.last_updated, self.ttl)
    }

    /// Refreshes if stale, then runs `read` under the same lock.
    async fn with_fresh<F, Fut, R>(
        &self,
        fetch: F,
        read: impl FnOnce(&RateMap, &VolumeMap) -> Result<R>,
    ) -> Result<R>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(RateMap, VolumeMap)>>,
    {
        let mut state = self.state.lock().await;
        if is_stale(state.last_updated, self.ttl) {
            let started = Instant::now();
            match fetch().await {
                Ok((rate_map, volume_map)) => {
                    info!(
                        "{}: refreshed rates for {} trading currencies",
                        self.name,
                        rate_map.len()
                    );
                    state.rate_map = rate_map;
                    state.volume_map = volume_map;
                    state.last_updated = Some(started);
                }
                Err(e) => {
                    warn!("{}: rate refresh failed: {}", self.name, e);
                    return Err(e);
                }
            }
        }
        read(&state.rate_map, &state.volume_map)
    }

    pub async fn rate_map<F, Fut>(&self, fetch: F) -> Result<RateMap>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(RateMap, VolumeMap)>>,
    {
        self.with_fresh(fetch, |rates, _| Ok(rates.clone())).await
    }

    pub async fn volume_map<F, Fut>(&self, fetch: F) -> Result<VolumeMap>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(RateMap, VolumeMap)>>,
    {
        self.with_fresh(fetch, |_, volumes| Ok(volumes.clone())).await
    }

    /// Last traded rate of `trading` in `settlement`. A currency against
    /// itself is always 1 and never touches the network.
    pub async fn rate<F, Fut>(&self, trading: &str, settlement: &str, fetch: F) -> Result<f64>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(RateMap, VolumeMap)>>,
    {
        let trading = trading.to_uppercase();
        let settlement = settlement.to_uppercase();
        if trading == settlement {
            return Ok(1.0);
        }
        self.with_fresh(fetch, |rates, _| lookup_pair(rates, &trading, &settlement))
            .await
    }

    pub async fn volume<F, Fut>(&self, trading: &str, settlement: &str, fetch: F) -> Result<f64>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(RateMap, VolumeMap)>>,
    {
        let trading = trading.to_uppercase();
        let settlement = settlement.to_uppercase();
        self.with_fresh(fetch, |_, volumes| lookup_pair(volumes, &trading, &settlement))
            .await
    }
}

#[derive(Default)]
struct PairState {
    pairs: Vec<CurrencyPair>,
    settlements: Vec<String>,
    last_updated: Option<Instant>,
}

/// The exchange's market listing. Changes rarely, so it has its own lock and
/// a much longer TTL than the rate cache.
pub struct CurrencyPairCache {
    name: &'static str,
    ttl: Duration,
    state: Mutex<PairState>,
}

impl CurrencyPairCache {
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        CurrencyPairCache {
            name,
            ttl,
            state: Mutex::new(PairState::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn with_fresh<F, Fut, R>(&self, fetch: F, read: impl FnOnce(&PairState) -> R) -> Result<R>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<CurrencyPair>>>,
    {
        let mut state = self.state.lock().await;
        if is_stale(state.last_updated, self.ttl) {
            let started = Instant::now();
            let fetched = fetch().await.map_err(|e| {
                warn!("{}: currency pair refresh failed: {}", self.name, e);
                e
            })?;
            let mut seen = HashSet::new();
            let total = fetched.len();
            let pairs: Vec<CurrencyPair> = fetched
                .into_iter()
                .filter(|p| seen.insert(p.clone()))
                .collect();
            if pairs.len() != total {
                warn!(
                    "{}: dropped {} duplicate currency pairs",
                    self.name,
                    total - pairs.len()
                );
            }
            info!("{}: loaded {} currency pairs", self.name, pairs.len());
            state.settlements = symbol::settlements(&pairs);
            state.pairs = pairs;
            state.last_updated = Some(started);
        }
        Ok(read(&state))
    }

    pub async fn currency_pairs<F, Fut>(&self, fetch: F) -> Result<Vec<CurrencyPair>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<CurrencyPair>>>,
    {
        self.with_fresh(fetch, |s| s.pairs.clone()).await
    }

    pub async fn settlements<F, Fut>(&self, fetch: F) -> Result<Vec<String>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<CurrencyPair>>>,
    {
        self.with_fresh(fetch, |s| s.settlements.clone()).await
    }
}
