//! Registration email availability fast path: cuckoo filter for fast
//! negatives, moka cache for fast positives, database as the final word.

use anyhow::Result;
use autoscale_cuckoo_filter::CuckooFilter;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;
use std::time::Duration;

/// Expected capacity and false-positive rate.
/// Tune these based on real resident counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static EMAIL_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// true => email is TAKEN (only taken emails are cached).
static EMAIL_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

#[inline]
fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Record a freshly registered email in both layers.
pub async fn mark_registered(email: &str) {
    let email = normalize(email);
    EMAIL_FILTER
        .write()
        .expect("email filter poisoned")
        .add(&email);
    EMAIL_CACHE.insert(email, true).await;
}

/// true  => email AVAILABLE
/// false => email TAKEN
pub async fn is_available(email: &str, pool: &MySqlPool) -> bool {
    let email = normalize(email);

    // Filter negative is definitive.
    if !EMAIL_FILTER
        .read()
        .expect("email filter poisoned")
        .contains(&email)
    {
        return true;
    }

    if EMAIL_CACHE.get(&email).await.unwrap_or(false) {
        return false;
    }

    // Database fallback for filter false positives.
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? LIMIT 1)",
    )
    .bind(&email)
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe

    !exists
}

/// Single streaming pass over the users table: every email lands in the
/// filter, recently active accounts also land in the cache.
pub async fn warmup(pool: &MySqlPool, recent_days: u32, batch_size: usize) -> Result<()> {
    let cutoff = Utc::now() - chrono::Duration::days(i64::from(recent_days));

    let mut stream = sqlx::query_as::<_, (String, Option<DateTime<Utc>>)>(
        "SELECT email, last_login_at FROM users",
    )
    .fetch(pool);

    let mut batch: Vec<(String, bool)> = Vec::with_capacity(batch_size);
    let mut total = 0usize;
    let mut recent = 0usize;

    while let Some(row) = stream.next().await {
        let (email, last_login_at) = row?;
        let is_recent = last_login_at.is_some_and(|at| at >= cutoff);

        batch.push((normalize(&email), is_recent));
        total += 1;
        if is_recent {
            recent += 1;
        }

        if batch.len() >= batch_size {
            load_batch(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        load_batch(&batch).await;
    }

    log::info!(
        "Email guard warmup complete: {} accounts, {} recent (last {} days)",
        total,
        recent,
        recent_days
    );

    Ok(())
}

async fn load_batch(batch: &[(String, bool)]) {
    {
        let mut filter = EMAIL_FILTER.write().expect("email filter poisoned");
        for (email, _) in batch {
            filter.add(email);
        }
    }

    let inserts: Vec<_> = batch
        .iter()
        .filter(|(_, is_recent)| *is_recent)
        .map(|(email, _)| EMAIL_CACHE.insert(email.clone(), true))
        .collect();
    futures::future::join_all(inserts).await;
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize("  Budi@Example.COM "), "budi@example.com");
    }
}
