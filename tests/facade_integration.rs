//! Integration tests for the cachedhash facade and stores.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use cachedhash::key::{cache_key, key_material};
use cachedhash::store::{CacheStore, LruStore, MemoryStore, SqliteStore};
use cachedhash::{CachedHash, CachedHashError, CachedHashResult};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

/// Store that records every call and can be told to fail.
///
/// `fail_with` sets the error message; `fail_on` limits failures to one
/// operation (`"get"`, `"set"` or `"remove"`), otherwise every call fails.
#[derive(Default)]
struct RecordingStore {
    inner: MemoryStore<Vec<String>>,
    calls: Mutex<Vec<String>>,
    fail_with: Mutex<Option<String>>,
    fail_on: Mutex<Option<&'static str>>,
}

impl RecordingStore {
    fn record(&self, op: &'static str, key: &str) -> CachedHashResult<()> {
        self.calls.lock().unwrap().push(format!("{}:{}", op, key));
        let Some(msg) = self.fail_with.lock().unwrap().clone() else {
            return Ok(());
        };
        match *self.fail_on.lock().unwrap() {
            Some(only) if only != op => Ok(()),
            _ => Err(CachedHashError::store(msg)),
        }
    }

    fn fail(&self, op: Option<&'static str>, msg: &str) {
        *self.fail_on.lock().unwrap() = op;
        *self.fail_with.lock().unwrap() = Some(msg.to_string());
    }

    fn recover(&self) {
        *self.fail_on.lock().unwrap() = None;
        *self.fail_with.lock().unwrap() = None;
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CacheStore<Vec<String>> for RecordingStore {
    fn get(&self, key: &str) -> CachedHashResult<Option<Vec<String>>> {
        self.record("get", key)?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: Vec<String>) -> CachedHashResult<()> {
        self.record("set", key)?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> CachedHashResult<()> {
        self.record("remove", key)?;
        self.inner.remove(key)
    }
}

// Cache hit and miss paths
mod hit_miss_tests {
    use super::*;

    #[test]
    fn test_query_result_is_cached() {
        let store = Arc::new(RecordingStore::default());
        let cache = CachedHash::new(Arc::clone(&store));
        let query = "SELECT Name FROM Users WHERE Id = {0}";
        let params = ["1"];
        let computed = AtomicUsize::new(0);

        let compute = || {
            computed.fetch_add(1, Ordering::SeqCst);
            assert!(query.contains("{0}"));
            vec!["John".to_string()]
        };

        let first = cache.get_or_compute(&params, compute).unwrap();
        let second = cache.get_or_compute(&params, compute).unwrap();

        assert_eq!(first, vec!["John"]);
        assert_eq!(second, vec!["John"]);
        assert_eq!(computed.load(Ordering::SeqCst), 1);

        let key = cache_key(&params);
        assert_eq!(
            store.calls(),
            vec![
                format!("get:{}", key),
                format!("set:{}", key),
                format!("get:{}", key),
            ]
        );
    }

    #[test]
    fn test_peek_after_compute() {
        let store = Arc::new(RecordingStore::default());
        let cache = CachedHash::new(Arc::clone(&store));

        cache
            .get_or_compute(&["1"], || vec!["John".to_string()])
            .unwrap();
        let peeked = cache.peek(&["1"]).unwrap();

        assert_eq!(peeked, Some(vec!["John".to_string()]));
        // peek is a single read
        assert_eq!(store.calls().len(), 3);
        assert!(store.calls()[2].starts_with("get:"));
    }

    #[test]
    fn test_null_parameter_entry() {
        let cache = CachedHash::new(Arc::new(MemoryStore::new()));
        let params = [Some("abc"), None, Some("def")];

        cache.get_or_compute(&params, || 42u64).unwrap();

        assert_eq!(key_material(&params), "_abc_null_def");
        assert_eq!(
            cache.key(&params),
            "36ce24b6bcccb917439e90315342d15628032f8c12829414ce6472b0b9412373"
        );
        assert_eq!(cache.peek(&params).unwrap(), Some(42));
    }

    #[test]
    fn test_null_collides_with_literal_null() {
        let cache = CachedHash::new(Arc::new(MemoryStore::new()));

        cache.get_or_compute(&[None::<&str>], || 1u8).unwrap();
        let value = cache.get_or_compute(&["null"], || 2u8).unwrap();

        assert_eq!(value, 1);
    }

    #[test]
    fn test_stored_default_value_is_a_hit() {
        let cache = CachedHash::new(Arc::new(MemoryStore::new()));
        let computed = AtomicUsize::new(0);

        for _ in 0..2 {
            let value = cache
                .get_or_compute(&["empty"], || {
                    computed.fetch_add(1, Ordering::SeqCst);
                    String::new()
                })
                .unwrap();
            assert_eq!(value, "");
        }

        assert_eq!(computed.load(Ordering::SeqCst), 1);
    }
}

// Error propagation
mod error_tests {
    use super::*;

    #[derive(Debug)]
    enum QueryError {
        Timeout,
        Cache(CachedHashError),
    }

    impl From<CachedHashError> for QueryError {
        fn from(err: CachedHashError) -> Self {
            QueryError::Cache(err)
        }
    }

    #[test]
    fn test_computation_error_propagates_unchanged() {
        let store = Arc::new(RecordingStore::default());
        let cache = CachedHash::new(Arc::clone(&store));

        let result = cache.try_get_or_compute(&["1"], || Err(QueryError::Timeout));

        assert!(matches!(result, Err(QueryError::Timeout)));
        // Only the lookup happened
        assert_eq!(store.calls().len(), 1);
        assert_eq!(cache.peek(&["1"]).unwrap(), None);
    }

    #[test]
    fn test_store_error_propagates() {
        let store = Arc::new(RecordingStore::default());
        store.fail(None, "backend down");
        let cache = CachedHash::new(Arc::clone(&store));
        let computed = AtomicUsize::new(0);

        let result = cache.try_get_or_compute(&["1"], || {
            computed.fetch_add(1, Ordering::SeqCst);
            Ok::<_, QueryError>(vec![])
        });

        match result {
            Err(QueryError::Cache(CachedHashError::Store(msg))) => {
                assert_eq!(msg, "backend down")
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(computed.load(Ordering::SeqCst), 0);

        assert!(matches!(
            cache.remove(&["1"]),
            Err(CachedHashError::Store(_))
        ));
        assert!(matches!(cache.peek(&["1"]), Err(CachedHashError::Store(_))));
    }

    #[test]
    fn test_store_write_error_propagates() {
        let store = Arc::new(RecordingStore::default());
        store.fail(Some("set"), "disk full");
        let cache = CachedHash::new(Arc::clone(&store));
        let computed = AtomicUsize::new(0);

        let result = cache.try_get_or_compute(&["1"], || {
            computed.fetch_add(1, Ordering::SeqCst);
            Ok::<_, QueryError>(vec!["John".to_string()])
        });

        assert!(matches!(
            result,
            Err(QueryError::Cache(CachedHashError::Store(ref msg))) if msg == "disk full"
        ));
        assert_eq!(computed.load(Ordering::SeqCst), 1);

        let key = cache_key(&["1"]);
        assert_eq!(
            store.calls(),
            vec![format!("get:{}", key), format!("set:{}", key)]
        );

        store.recover();
        assert_eq!(cache.peek(&["1"]).unwrap(), None);
    }

    #[test]
    fn test_remove_missing_entry() {
        let store = Arc::new(MemoryStore::<String>::new());
        store.set("unrelated", "keep".to_string()).unwrap();
        let cache = CachedHash::new(Arc::clone(&store));

        cache.remove(&["3"]).unwrap();

        assert_eq!(store.len().unwrap(), 1);
        assert!(store.contains_key("unrelated").unwrap());
    }
}

// Sharing one store between facades and threads
mod sharing_tests {
    use super::*;

    #[test]
    fn test_facades_share_one_store() {
        let store: Arc<dyn CacheStore<String>> = Arc::new(MemoryStore::new());
        let users: CachedHash<String, dyn CacheStore<String>> = CachedHash::builder()
            .store(Arc::clone(&store))
            .label("users")
            .build()
            .unwrap();
        let emails: CachedHash<String, dyn CacheStore<String>> = CachedHash::builder()
            .store(Arc::clone(&store))
            .label("emails")
            .build()
            .unwrap();

        users
            .get_or_compute(&["2"], || "john.doe@example.com".to_string())
            .unwrap();

        assert_eq!(
            emails.peek(&["2"]).unwrap().as_deref(),
            Some("john.doe@example.com")
        );
        assert_eq!(Arc::strong_count(&store), 3);
    }

    #[test]
    fn test_concurrent_callers() {
        let cache = CachedHash::new(Arc::new(MemoryStore::new()));
        let computed = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                let computed = Arc::clone(&computed);
                thread::spawn(move || {
                    let key = format!("item-{}", i % 4);
                    cache
                        .get_or_compute(&[key.as_str()], || {
                            computed.fetch_add(1, Ordering::SeqCst);
                            i % 4
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            let value = handle.join().unwrap();
            assert!(value < 4);
        }

        // No single-flight: duplicates may compute, but every key ends up stored
        let computed = computed.load(Ordering::SeqCst);
        assert!((4..=8).contains(&computed));
        for i in 0..4usize {
            let key = format!("item-{}", i);
            assert_eq!(cache.peek(&[key.as_str()]).unwrap(), Some(i));
        }
    }
}

// Bundled stores behind the facade
mod store_tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Report {
        rows: Vec<String>,
        total: u32,
    }

    #[test]
    fn test_lru_store_evicts_behind_the_facade() {
        let store = Arc::new(LruStore::new(1));
        let cache = CachedHash::new(Arc::clone(&store));

        cache.get_or_compute(&["a"], || 1).unwrap();
        cache.get_or_compute(&["b"], || 2).unwrap();

        assert_eq!(cache.peek(&["a"]).unwrap(), None);
        assert_eq!(cache.get_or_compute(&["a"], || 3).unwrap(), 3);
    }

    #[test]
    fn test_sqlite_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("cache.db");
        let report = Report {
            rows: vec!["John".to_string()],
            total: 1,
        };

        {
            let cache = CachedHash::new(Arc::new(SqliteStore::open(&db_path).unwrap()));
            let computed = cache
                .get_or_compute(&["report", "2024"], || report.clone())
                .unwrap();
            assert_eq!(computed, report);
        }

        let cache: CachedHash<Report, SqliteStore<Report>> =
            CachedHash::new(Arc::new(SqliteStore::open(&db_path).unwrap()));
        let cached = cache
            .get_or_compute(&["report", "2024"], || panic!("should be cached"))
            .unwrap();

        assert_eq!(cached, report);
        assert_eq!(cache.store().len().unwrap(), 1);
    }
}
