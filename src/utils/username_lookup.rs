//! Fast username-availability checks for registration.
//!
//! Layered lookup: a cuckoo filter gives a cheap definite "never seen",
//! a moka cache gives a cheap definite "taken", the database settles the
//! rest. Both layers are warmed once at startup.

use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;
use std::time::Duration;

/// Sized for a campus, not a public site.
const FILTER_CAPACITY: usize = 50_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static TAKEN_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// value is always `true`; only taken names are stored
static TAKEN_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .time_to_live(Duration::from_secs(43_200)) // 12h
        .build()
});

fn normalize(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Record a freshly registered username in both layers.
pub async fn remember(username: &str) {
    let username = normalize(username);
    TAKEN_FILTER
        .write()
        .expect("username filter poisoned")
        .add(&username);
    TAKEN_CACHE.insert(username, true).await;
}

/// true  => username AVAILABLE
/// false => username TAKEN
pub async fn is_available(username: &str, pool: &MySqlPool) -> bool {
    let username = normalize(username);

    // Filter says never seen: definite negative, no I/O needed.
    if !TAKEN_FILTER
        .read()
        .expect("username filter poisoned")
        .contains(&username)
    {
        return true;
    }

    // Cache hit: definite positive.
    if TAKEN_CACHE.get(&username).await.unwrap_or(false) {
        return false;
    }

    // Could be a filter false positive; the database decides.
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? LIMIT 1)",
    )
    .bind(&username)
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe: treat DB trouble as taken

    if exists {
        TAKEN_CACHE.insert(username, true).await;
    }

    !exists
}

/// Stream every username into the filter; names active within
/// `recent_days` also go into the cache. Batched so a large user table
/// does not stall startup.
pub async fn warmup(pool: &MySqlPool, recent_days: i64, batch_size: usize) -> Result<()> {
    let recent_cutoff = Utc::now() - ChronoDuration::days(recent_days);

    let mut stream = sqlx::query_as::<_, (String, Option<DateTime<Utc>>)>(
        "SELECT username, last_login_at FROM users",
    )
    .fetch(pool);

    let mut batch: Vec<String> = Vec::with_capacity(batch_size);
    let mut total = 0usize;
    let mut recent = 0usize;

    while let Some(row) = stream.next().await {
        let (username, last_login_at) =
            row.map_err(|e| anyhow!("username warmup fetch failed: {}", e))?;
        let username = normalize(&username);

        {
            TAKEN_FILTER
                .write()
                .expect("username filter poisoned")
                .add(&username);
        }
        total += 1;

        if last_login_at.is_some_and(|at| at >= recent_cutoff) {
            batch.push(username);
            recent += 1;
            if batch.len() >= batch_size {
                cache_batch(&batch).await;
                batch.clear();
            }
        }
    }

    if !batch.is_empty() {
        cache_batch(&batch).await;
    }

    log::info!(
        "Username warmup complete: {} users in filter, {} recent (last {} days) cached",
        total,
        recent,
        recent_days
    );

    Ok(())
}

async fn cache_batch(usernames: &[String]) {
    let inserts: Vec<_> = usernames
        .iter()
        .map(|u| TAKEN_CACHE.insert(u.clone(), true))
        .collect();

    futures::future::join_all(inserts).await;
}
