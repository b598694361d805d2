//! Identifiers of releases that were already downloaded.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rusqlite::{params, Connection};
use tracing::{debug, warn};

use crate::error::KazamiError;

const SCHEMA_V1: &str = include_str!("../../../migrations/001_feed_archive.sql");

/// SQLite-backed archive table.
pub struct ArchiveStore {
    conn: Connection,
}

impl ArchiveStore {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, KazamiError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, KazamiError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    pub fn all(&self) -> Result<Vec<String>, KazamiError> {
        let mut stmt = self
            .conn
            .prepare("SELECT identifier FROM feed_archive ORDER BY archived_at, rowid")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<String>, _>>().map_err(Into::into)
    }

    /// Append one identifier. Returns false if it was already present.
    pub fn insert(&self, identifier: &str) -> Result<bool, KazamiError> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO feed_archive (identifier) VALUES (?1)",
            params![identifier],
        )?;
        Ok(changed > 0)
    }

    /// Append many identifiers in one transaction, returning how many were new.
    pub fn insert_many<'a>(
        &mut self,
        identifiers: impl IntoIterator<Item = &'a str>,
    ) -> Result<usize, KazamiError> {
        let tx = self.conn.transaction()?;
        let mut added = 0;
        {
            let mut stmt =
                tx.prepare("INSERT OR IGNORE INTO feed_archive (identifier) VALUES (?1)")?;
            for identifier in identifiers {
                added += stmt.execute(params![identifier])?;
            }
        }
        tx.commit()?;
        Ok(added)
    }

    pub fn count(&self) -> Result<usize, KazamiError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM feed_archive", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn run_migrations(conn: &Connection) -> Result<(), KazamiError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    Ok(())
}

/// In-memory archive set shared between the filter pass and downloads,
/// optionally backed by an [`ArchiveStore`].
///
/// Membership is case-insensitive. [`Archive::claim`] performs the
/// check-then-insert under one lock so two downloads of the same release
/// cannot both proceed. Claims stay pending until [`Archive::commit`]; only
/// committed identifiers are counted or written by [`Archive::save`].
#[derive(Default)]
pub struct Archive {
    ids: Mutex<ArchiveSets>,
    store: Option<Mutex<ArchiveStore>>,
}

#[derive(Default)]
struct ArchiveSets {
    committed: HashSet<String>,
    /// Claimed by a download that has not finished yet.
    pending: HashSet<String>,
}

impl ArchiveSets {
    fn contains(&self, key: &str) -> bool {
        self.committed.contains(key) || self.pending.contains(key)
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("len", &self.len())
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

fn key(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

impl Archive {
    /// An archive without persistence.
    pub fn in_memory<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let committed = ids.into_iter().map(|s| key(s.as_ref())).collect();
        Self {
            ids: Mutex::new(ArchiveSets {
                committed,
                pending: HashSet::new(),
            }),
            store: None,
        }
    }

    /// Wrap an open store, reading its identifiers.
    pub fn with_store(store: ArchiveStore) -> Result<Self, KazamiError> {
        let committed = store.all()?.iter().map(|s| key(s)).collect();
        Ok(Self {
            ids: Mutex::new(ArchiveSets {
                committed,
                pending: HashSet::new(),
            }),
            store: Some(Mutex::new(store)),
        })
    }

    /// Open the archive database at `path`.
    pub fn open(path: &Path) -> Result<Self, KazamiError> {
        ArchiveStore::open(path)
            .and_then(Self::with_store)
            .map_err(|e| KazamiError::Archive(format!("{}: {e}", path.display())))
    }

    /// Like [`Archive::open`], but an unusable database is logged and an
    /// empty, non-persistent archive is returned.
    pub fn load(path: &Path) -> Self {
        match Self::open(path) {
            Ok(archive) => {
                debug!(path = %path.display(), count = archive.len(), "Loaded archive");
                archive
            }
            Err(e) => {
                warn!(error = %e, "Archive unreadable, starting empty");
                Self::default()
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Archived or currently claimed.
    pub fn search(&self, identifier: &str) -> bool {
        self.lock_ids().contains(&key(identifier))
    }

    /// Reserve an identifier. Returns false if it is already archived or claimed.
    pub fn claim(&self, identifier: &str) -> bool {
        let key = key(identifier);
        let mut ids = self.lock_ids();
        if ids.contains(&key) {
            return false;
        }
        ids.pending.insert(key)
    }

    /// Undo a claim whose download did not happen.
    pub fn release(&self, identifier: &str) {
        self.lock_ids().pending.remove(&key(identifier));
    }

    /// Persist a claimed identifier and mark it archived.
    pub fn commit(&self, identifier: &str) -> Result<(), KazamiError> {
        if let Some(store) = &self.store {
            let store = store.lock().unwrap_or_else(PoisonError::into_inner);
            store.insert(identifier.trim())?;
        }
        let key = key(identifier);
        let mut ids = self.lock_ids();
        ids.pending.remove(&key);
        ids.committed.insert(key);
        Ok(())
    }

    /// Claim and persist in one step. Returns false if already present.
    pub fn append(&self, identifier: &str) -> Result<bool, KazamiError> {
        if !self.claim(identifier) {
            return Ok(false);
        }
        if let Err(e) = self.commit(identifier) {
            self.release(identifier);
            return Err(e);
        }
        Ok(true)
    }

    /// Write every committed identifier to the store. Pending claims are skipped.
    pub fn save(&self) -> Result<usize, KazamiError> {
        let Some(store) = &self.store else {
            return Ok(0);
        };
        let ids: Vec<String> = self.lock_ids().committed.iter().cloned().collect();
        let mut store = store.lock().unwrap_or_else(PoisonError::into_inner);
        store.insert_many(ids.iter().map(String::as_str))
    }

    /// Number of committed identifiers.
    pub fn len(&self) -> usize {
        self.lock_ids().committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_ids(&self) -> std::sync::MutexGuard<'_, ArchiveSets> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
