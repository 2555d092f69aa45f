//! Mapping store backed by the embedded redb database
//!
//! This module defines the database tables, the [`LinkRepository`] contract the
//! orchestration layer depends on, and [`LinkStore`], its redb implementation.
//!
//! redb runs one write transaction at a time, so every mutating operation here
//! is a single write transaction: the existence check and the write it guards
//! can never interleave with another writer.

use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::error::StoreError;
use crate::model::LinkRecord;

/// Main table for storing link records
///
/// Key: Short code as string
/// Value: JSON-serialized LinkRecord as string
///
/// Example:
/// - Key: "aB3x9Z"
/// - Value: '{"id":1,"original_url":"https://example.com","short_code":"aB3x9Z",...}'
pub const TABLE_LINKS: TableDefinition<&str, &str> = TableDefinition::new("links_v1");

/// Secondary index for deduplication by original URL
///
/// Key: Original URL exactly as submitted
/// Value: Short code of the only record for that URL
pub const TABLE_URL_INDEX: TableDefinition<&str, &str> = TableDefinition::new("url_index_v1");

/// Store metadata, currently only the id allocator under [`NEXT_ID_KEY`]
pub const TABLE_META: TableDefinition<&str, u64> = TableDefinition::new("meta_v1");

const NEXT_ID_KEY: &str = "next_id";

/// Storage contract used by link creation and redirect resolution
#[cfg_attr(test, mockall::automock)]
pub trait LinkRepository: Send + Sync {
    /// Creates a record for `short_code` unless the code or the URL is already mapped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] with the owning record if the code
    /// is taken or `original_url` already has a record. Nothing is written in
    /// either case.
    fn insert(&self, original_url: &str, short_code: &str) -> Result<LinkRecord, StoreError>;

    /// Looks up a record by its short code.
    fn find_by_code(&self, short_code: &str) -> Result<Option<LinkRecord>, StoreError>;

    /// Looks up the record for an exact original URL string.
    fn find_by_original_url(&self, original_url: &str) -> Result<Option<LinkRecord>, StoreError>;

    /// Atomically adds one to the record's click count.
    ///
    /// Returns `Ok(false)` without writing anything if the code is unknown.
    fn increment_clicks(&self, short_code: &str) -> Result<bool, StoreError>;
}

/// redb-backed [`LinkRepository`]
pub struct LinkStore {
    db: Database,
}

impl LinkStore {
    /// Creates or opens the database file and makes sure every table exists
    ///
    /// # Arguments
    ///
    /// * `db_path` - File path where the database should be stored (e.g., "data.db")
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use snaplink::database::LinkStore;
    /// let store = LinkStore::open("data.db").expect("Failed to open store");
    /// ```
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(db_path.as_ref())?;

        let write_txn = db.begin_write()?;
        {
            write_txn.open_table(TABLE_LINKS)?;
            write_txn.open_table(TABLE_URL_INDEX)?;
            write_txn.open_table(TABLE_META)?;
        }
        write_txn.commit()?;

        tracing::debug!(path = %db_path.as_ref().display(), "link store opened");

        Ok(Self { db })
    }
}

impl LinkRepository for LinkStore {
    fn insert(&self, original_url: &str, short_code: &str) -> Result<LinkRecord, StoreError> {
        let write_txn = self.db.begin_write()?;

        let outcome = {
            let mut links = write_txn.open_table(TABLE_LINKS)?;
            let mut url_index = write_txn.open_table(TABLE_URL_INDEX)?;

            // A code already taken, or a URL already mapped, resolves to its owner
            let owner_code = match links.get(short_code)? {
                Some(_) => Some(short_code.to_owned()),
                None => url_index.get(original_url)?.map(|guard| guard.value().to_owned()),
            };
            let owner = match owner_code {
                Some(code) => links.get(code.as_str())?.map(|guard| guard.value().to_owned()),
                None => None,
            };

            match owner {
                Some(json) => Err(serde_json::from_str::<LinkRecord>(&json)?),
                None => {
                    let mut meta = write_txn.open_table(TABLE_META)?;
                    let id = meta.get(NEXT_ID_KEY)?.map(|guard| guard.value()).unwrap_or(1);
                    meta.insert(NEXT_ID_KEY, id + 1)?;

                    let record = LinkRecord {
                        id,
                        original_url: original_url.to_owned(),
                        short_code: short_code.to_owned(),
                        created_at: Utc::now(),
                        click_count: 0,
                    };
                    let record_json = serde_json::to_string(&record)?;
                    links.insert(short_code, record_json.as_str())?;
                    url_index.insert(original_url, short_code)?;

                    Ok(record)
                }
            }
        };

        match outcome {
            Ok(record) => {
                write_txn.commit()?;
                tracing::debug!(id = record.id, short_code, "link record inserted");
                Ok(record)
            }
            Err(existing) => {
                write_txn.abort()?;
                Err(StoreError::AlreadyExists(Box::new(existing)))
            }
        }
    }

    fn find_by_code(&self, short_code: &str) -> Result<Option<LinkRecord>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let links = read_txn.open_table(TABLE_LINKS)?;

        let record = match links.get(short_code)? {
            Some(value) => Some(serde_json::from_str(value.value())?),
            None => None,
        };
        Ok(record)
    }

    fn find_by_original_url(&self, original_url: &str) -> Result<Option<LinkRecord>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let url_index = read_txn.open_table(TABLE_URL_INDEX)?;

        let Some(code) = url_index.get(original_url)?.map(|guard| guard.value().to_owned()) else {
            return Ok(None);
        };

        // Same snapshot, so the index and the main table agree
        let links = read_txn.open_table(TABLE_LINKS)?;
        let record = match links.get(code.as_str())? {
            Some(value) => Some(serde_json::from_str(value.value())?),
            None => None,
        };
        Ok(record)
    }

    fn increment_clicks(&self, short_code: &str) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;

        let updated = {
            let mut links = write_txn.open_table(TABLE_LINKS)?;
            let current = links.get(short_code)?.map(|guard| guard.value().to_owned());

            match current {
                Some(json) => {
                    let mut record: LinkRecord = serde_json::from_str(&json)?;
                    record.click_count += 1;
                    let record_json = serde_json::to_string(&record)?;
                    links.insert(short_code, record_json.as_str())?;
                    true
                }
                None => false,
            }
        };

        if updated {
            write_txn.commit()?;
        } else {
            write_txn.abort()?;
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::NamedTempFile;

    fn setup_store() -> (LinkStore, NamedTempFile) {
        let temp_db = NamedTempFile::new().expect("Failed to create temp file");
        let store = LinkStore::open(temp_db.path()).expect("Failed to open test store");
        (store, temp_db)
    }

    #[test]
    fn test_insert_and_find_by_code() {
        let (store, _temp_db) = setup_store();

        let record = store.insert("https://example.com/a", "abc123").unwrap();
        assert_eq!(record.short_code, "abc123");
        assert_eq!(record.original_url, "https://example.com/a");
        assert_eq!(record.click_count, 0);

        let found = store.find_by_code("abc123").unwrap().unwrap();
        assert_eq!(found, record);
    }

    #[test]
    fn test_find_unknown_code() {
        let (store, _temp_db) = setup_store();
        assert!(store.find_by_code("missing").unwrap().is_none());
    }

    #[test]
    fn test_insert_duplicate_code_is_rejected_without_side_effects() {
        let (store, _temp_db) = setup_store();

        let first = store.insert("https://example.com/b", "test123").unwrap();

        match store.insert("https://example.com/c", "test123") {
            Err(StoreError::AlreadyExists(existing)) => {
                assert_eq!(existing.original_url, "https://example.com/b");
            }
            other => panic!("expected AlreadyExists, got {other:?}"),
        }

        // The losing URL must not be indexed and no id was consumed
        assert!(store.find_by_original_url("https://example.com/c").unwrap().is_none());
        assert_eq!(store.find_by_code("test123").unwrap().unwrap(), first);

        let next = store.insert("https://example.com/d", "other1").unwrap();
        assert_eq!(next.id, first.id + 1);
    }

    #[test]
    fn test_ids_increase_monotonically() {
        let (store, _temp_db) = setup_store();

        let ids: Vec<u64> = (0..5)
            .map(|i| store.insert(&format!("https://example.com/{i}"), &format!("code{i}")).unwrap().id)
            .collect();

        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_find_by_original_url_is_exact_match() {
        let (store, _temp_db) = setup_store();

        store.insert("https://example.com/path", "path01").unwrap();

        let found = store.find_by_original_url("https://example.com/path").unwrap().unwrap();
        assert_eq!(found.short_code, "path01");

        assert!(store.find_by_original_url("https://example.com/path/").unwrap().is_none());
        assert!(store.find_by_original_url("http://example.com/path").unwrap().is_none());
    }

    #[test]
    fn test_insert_of_mapped_url_returns_owner() {
        let (store, _temp_db) = setup_store();

        let first = store.insert("https://example.com/same", "first1").unwrap();

        match store.insert("https://example.com/same", "second") {
            Err(StoreError::AlreadyExists(existing)) => assert_eq!(*existing, first),
            other => panic!("expected AlreadyExists, got {other:?}"),
        }

        assert!(store.find_by_code("second").unwrap().is_none());
        let found = store.find_by_original_url("https://example.com/same").unwrap().unwrap();
        assert_eq!(found.short_code, "first1");
        assert_eq!(store.insert("https://example.com/next", "next01").unwrap().id, first.id + 1);
    }

    #[test]
    fn test_increment_clicks() {
        let (store, _temp_db) = setup_store();
        store.insert("https://example.com/clicks", "click1").unwrap();

        for _ in 0..3 {
            assert!(store.increment_clicks("click1").unwrap());
        }

        assert_eq!(store.find_by_code("click1").unwrap().unwrap().click_count, 3);
    }

    #[test]
    fn test_increment_unknown_code_is_noop() {
        let (store, _temp_db) = setup_store();
        store.insert("https://example.com/quiet", "quiet1").unwrap();

        assert!(!store.increment_clicks("nosuch").unwrap());
        assert_eq!(store.find_by_code("quiet1").unwrap().unwrap().click_count, 0);
        assert!(store.find_by_code("nosuch").unwrap().is_none());
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let (store, _temp_db) = setup_store();
        store.insert("https://example.com/hot", "hot123").unwrap();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..25 {
                        store.increment_clicks("hot123").unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.find_by_code("hot123").unwrap().unwrap().click_count, 200);
    }

    #[test]
    fn test_concurrent_inserts_of_same_code_have_one_winner() {
        let (store, _temp_db) = setup_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.insert(&format!("https://example.com/race/{i}"), "race01").is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|inserted| *inserted)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_concurrent_creates_of_same_url_share_one_code() {
        use crate::service::LinkService;
        use std::collections::HashSet;

        for round in 0..20 {
            let (store, _temp_db) = setup_store();
            let store = Arc::new(store);
            let url = format!("https://example.com/same/{round}");

            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let service = LinkService::new(store.clone());
                    let url = url.clone();
                    thread::spawn(move || service.create_short_link(&url, None).unwrap())
                })
                .collect();

            let codes: HashSet<String> = handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect();

            assert_eq!(codes.len(), 1, "round {round}: {codes:?}");
            let code = codes.into_iter().next().unwrap();
            assert_eq!(store.find_by_original_url(&url).unwrap().unwrap().short_code, code);
            // Exactly one record was written
            assert_eq!(store.insert("https://example.com/other", "other1").unwrap().id, 2);
        }
    }

    #[test]
    fn test_reopen_keeps_records() {
        let temp_db = NamedTempFile::new().unwrap();
        {
            let store = LinkStore::open(temp_db.path()).unwrap();
            store.insert("https://example.com/durable", "durab1").unwrap();
            store.increment_clicks("durab1").unwrap();
        }

        let store = LinkStore::open(temp_db.path()).unwrap();
        let record = store.find_by_code("durab1").unwrap().unwrap();
        assert_eq!(record.original_url, "https://example.com/durable");
        assert_eq!(record.click_count, 1);
        assert_eq!(store.insert("https://example.com/next", "next01").unwrap().id, 2);
    }
}
