//! Per-user permission rows.

use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tablekit_proto::{Row, Value};

/// Column of a permission row naming the company it applies to.
pub const COMPANY_COLUMN: &str = "company_id";

#[derive(Debug, Clone)]
struct CachedPermissions {
    rows: Arc<Vec<Row>>,
    loaded_at: Instant,
}

/// Process-wide cache of each user's permission rows.
///
/// Entries expire after the configured TTL and can be dropped explicitly
/// when the underlying rows change. Load failures are not cached.
#[derive(Debug)]
pub struct PermissionCache {
    entries: DashMap<i64, CachedPermissions>,
    ttl: Option<Duration>,
}

impl PermissionCache {
    /// Create a cache; `None` keeps entries until invalidated.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Cached rows of `user_id`, loading them with `load` when missing or stale.
    pub fn get_or_load<F>(&self, user_id: i64, load: F) -> Result<Arc<Vec<Row>>>
    where
        F: FnOnce() -> Result<Vec<Row>>,
    {
        if let Some(entry) = self.entries.get(&user_id) {
            if self.is_fresh(entry.loaded_at) {
                return Ok(entry.rows.clone());
            }
        }

        let rows = Arc::new(load()?);
        tracing::debug!(user_id, rows = rows.len(), "permission rows loaded");
        self.entries.insert(
            user_id,
            CachedPermissions {
                rows: rows.clone(),
                loaded_at: Instant::now(),
            },
        );
        Ok(rows)
    }

    /// Drop the cached rows of one user.
    pub fn invalidate(&self, user_id: i64) {
        self.entries.remove(&user_id);
    }

    /// Drop every cached entry.
    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    /// Number of cached users.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_fresh(&self, loaded_at: Instant) -> bool {
        self.ttl.map_or(true, |ttl| loaded_at.elapsed() < ttl)
    }
}

impl Default for PermissionCache {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Company ids present in `rows`, sorted and deduplicated.
pub fn company_ids(rows: &[Row]) -> Vec<i64> {
    collect_ids(rows.iter())
}

/// Company ids of the rows granting `permission`.
pub fn company_ids_granting(rows: &[Row], permission: &str) -> Vec<i64> {
    collect_ids(
        rows.iter()
            .filter(|row| row.get(permission).is_some_and(is_granted)),
    )
}

/// A permission column grants access when it holds a non-empty value
/// other than zero or false.
pub fn is_granted(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int64(i) => *i != 0,
        Value::Float64(f) => *f != 0.0,
        Value::String(s) => !s.is_empty() && s != "0",
    }
}

fn collect_ids<'a>(rows: impl Iterator<Item = &'a Row>) -> Vec<i64> {
    let mut ids: Vec<i64> = rows
        .filter_map(|row| row.get(COMPANY_COLUMN).and_then(Value::as_i64))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::Cell;

    fn rows() -> Vec<Row> {
        vec![
            Row::new().with("company_id", 3).with("can_edit", 1),
            Row::new().with("company_id", 1).with("can_edit", "0"),
            Row::new().with("company_id", 3).with("can_edit", Value::Null),
        ]
    }

    #[test]
    fn test_loads_once_until_invalidated() {
        let cache = PermissionCache::new(None);
        let loads = Cell::new(0);
        let load = || {
            loads.set(loads.get() + 1);
            Ok(rows())
        };

        assert_eq!(cache.get_or_load(7, load).unwrap().len(), 3);
        assert_eq!(cache.get_or_load(7, load).unwrap().len(), 3);
        assert_eq!(loads.get(), 1);

        cache.invalidate(7);
        cache.get_or_load(7, load).unwrap();
        assert_eq!(loads.get(), 2);

        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_ttl_always_reloads() {
        let cache = PermissionCache::new(Some(Duration::ZERO));
        let loads = Cell::new(0);
        let load = || {
            loads.set(loads.get() + 1);
            Ok(Vec::new())
        };
        cache.get_or_load(1, load).unwrap();
        cache.get_or_load(1, load).unwrap();
        assert_eq!(loads.get(), 2);
    }

    #[test]
    fn test_failures_not_cached() {
        let cache = PermissionCache::default();
        let err = cache
            .get_or_load(1, || Err(Error::Gateway("down".into())))
            .unwrap_err();
        assert!(matches!(err, Error::Gateway(_)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_company_ids() {
        let rows = rows();
        assert_eq!(company_ids(&rows), vec![1, 3]);
        assert_eq!(company_ids_granting(&rows, "can_edit"), vec![3]);
        assert!(company_ids_granting(&rows, "missing").is_empty());
    }
}
