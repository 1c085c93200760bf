//! SQLite Contact Book
//!
//! File-based persistent storage using SQLite with an in-memory mirror of the
//! `contacts` table.
//!
//! # Lifecycle
//! ```text
//! Closed ──initialize(path) ok──▶ Open
//!   ▲                               │
//!   └──── shutdown() / drop ────────┘
//! ```
//! A failed `initialize` leaves the book Closed; every CRUD call then fails
//! with `NotOpen` and `search` returns nothing.

mod schema;

use rusqlite::{params, Connection};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::domain::{fold_cmp, fold_key, Contact, ContactRepository};
use crate::error::{Result, StorageError};

/// Whether the durable handle is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Open,
    Closed,
}

impl fmt::Display for StoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreState::Open => write!(f, "open"),
            StoreState::Closed => write!(f, "closed"),
        }
    }
}

/// SQLite-backed contact repository
///
/// Owns the connection and the cache. After construction and after every
/// successful `add`/`delete`/`edit`, [`get_all`](Self::get_all) equals the full
/// table ordered case-insensitively by name (ties keep insertion order).
pub struct ContactBook {
    conn: Option<Connection>,
    path: Option<PathBuf>,
    contacts: Vec<Contact>,
}

impl ContactBook {
    /// A Closed book with no store attached
    pub fn new() -> Self {
        Self {
            conn: None,
            path: None,
            contacts: Vec::new(),
        }
    }

    /// Open (or create) the store at `db_path`.
    ///
    /// Never fails: if the store cannot be opened the error is logged and the
    /// returned book is Closed.
    pub fn open(db_path: impl AsRef<Path>) -> Self {
        let mut book = Self::new();
        // Logged by initialize; the book stays Closed.
        let _ = book.initialize(db_path);
        book
    }

    /// Open an in-memory store (for testing)
    pub fn in_memory() -> Self {
        let mut book = Self::new();
        match Connection::open_in_memory() {
            Ok(conn) => {
                // Logged by attach; the book stays Closed.
                let _ = book.attach(conn);
            }
            Err(err) => error!("Cannot open in-memory database: {}", err),
        }
        book
    }

    /// Open or create the store at `db_path`, bootstrap the schema and load
    /// the cache.
    ///
    /// An Open book is shut down first. On any failure the book ends Closed
    /// with an empty cache and no path.
    pub fn initialize(&mut self, db_path: impl AsRef<Path>) -> Result<()> {
        let db_path = db_path.as_ref();
        self.shutdown();
        // Nothing from the previous store survives a failed switch
        self.contacts.clear();
        self.path = None;

        info!("Opening database at: {}", db_path.display());
        let conn = Connection::open(db_path)
            .map_err(StorageError::from)
            .inspect_err(|err| error!("Cannot open database {}: {}", db_path.display(), err))?;

        self.attach(conn)?;
        self.path = Some(db_path.to_path_buf());
        info!(
            "Contact book initialized for DB: {} ({} contacts)",
            db_path.display(),
            self.contacts.len()
        );
        Ok(())
    }

    fn attach(&mut self, conn: Connection) -> Result<()> {
        let contacts = schema::bootstrap(&conn)
            .map_err(StorageError::from)
            .and_then(|_| Self::load_contacts(&conn))
            .inspect_err(|err| error!("Failed to prepare contacts table: {}", err))?;

        self.conn = Some(conn);
        self.contacts = contacts;
        Ok(())
    }

    /// Release the durable handle. No-op when already Closed.
    pub fn shutdown(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        match conn.close() {
            Ok(()) => info!("Database closed successfully."),
            // The returned handle is dropped here and never reused
            Err((_conn, err)) => error!("Failed to close database: {}", err),
        }
    }

    pub fn state(&self) -> StoreState {
        if self.conn.is_some() {
            StoreState::Open
        } else {
            StoreState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == StoreState::Open
    }

    /// Path of the last successfully initialized store, `None` for in-memory
    /// books and after a failed `initialize`
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn connection(&self, operation: &str) -> Result<&Connection> {
        self.conn.as_ref().ok_or_else(|| {
            error!("Database not open, cannot {}.", operation);
            StorageError::not_open(operation)
        })
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Cache
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    fn load_contacts(conn: &Connection) -> Result<Vec<Contact>> {
        let mut stmt = conn.prepare(schema::SELECT_ALL)?;
        let mut contacts = stmt
            .query_map([], schema::contact_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        sort_contacts(&mut contacts);
        Ok(contacts)
    }

    /// Rebuild the cache from the table. On failure the previous cache stays.
    fn reload(&mut self) -> Result<()> {
        let conn = self.connection("load contacts")?;
        let contacts = Self::load_contacts(conn)
            .inspect_err(|err| error!("Failed to load contacts: {}", err))?;
        self.contacts = contacts;
        debug!(
            "Contacts loaded from database. Count: {}",
            self.contacts.len()
        );
        Ok(())
    }

    /// Current cached contacts
    pub fn get_all(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Stable case-insensitive sort of the cache. The table is untouched.
    pub fn sort_by_name(&mut self) {
        sort_contacts(&mut self.contacts);
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // CRUD
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Insert `contact` unless its phone is already stored.
    pub fn add(&mut self, contact: &Contact) -> Result<()> {
        let conn = self.connection("add contact")?;

        let existing: i64 = conn
            .query_row(schema::COUNT_BY_PHONE, params![contact.phone()], |row| {
                row.get(0)
            })
            .map_err(StorageError::from)
            .inspect_err(|err| error!("Failed to check for duplicate phone: {}", err))?;
        if existing > 0 {
            warn!(
                "Contact with phone number '{}' already exists.",
                contact.phone()
            );
            return Err(StorageError::duplicate_phone(contact.phone()));
        }

        conn.execute(
            schema::INSERT,
            params![contact.name(), contact.phone(), contact.email()],
        )
        .map_err(StorageError::from)
        .inspect_err(|err| error!("Failed to insert contact: {}", err))?;

        self.reload()
    }

    /// Contacts whose name, phone or email contains `query`, ignoring case.
    ///
    /// Reads the table, not the cache. Returns an empty vector when the book
    /// is Closed or the query fails.
    pub fn search(&self, query: &str) -> Vec<Contact> {
        self.try_search(query).unwrap_or_default()
    }

    /// Like [`search`](Self::search) but reports why nothing came back.
    pub fn try_search(&self, query: &str) -> Result<Vec<Contact>> {
        let conn = self.connection("search contacts")?;
        let needle = fold_key(query);

        let run = || -> Result<Vec<Contact>> {
            let mut stmt = conn.prepare(schema::SEARCH)?;
            let hits = stmt
                .query_map(params![needle], schema::contact_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(hits)
        };
        run().inspect_err(|err| error!("Failed to search contacts: {}", err))
    }

    /// Remove every row keyed by `(name, phone)`. Zero matches is still `Ok`.
    pub fn delete(&mut self, name: &str, phone: &str) -> Result<usize> {
        let conn = self.connection("delete contact")?;

        let removed = conn
            .execute(schema::DELETE_BY_KEY, params![name, phone])
            .map_err(StorageError::from)
            .inspect_err(|err| error!("Failed to delete contact: {}", err))?;
        debug!("Deleted {} row(s) for ({}, {})", removed, name, phone);

        self.reload()?;
        Ok(removed)
    }

    /// Overwrite rows keyed by `(old_name, old_phone)` with `contact`.
    ///
    /// `contact` is written as given: field rules are the builder's concern,
    /// and phone uniqueness is only enforced by [`add`](Self::add).
    pub fn edit(&mut self, old_name: &str, old_phone: &str, contact: &Contact) -> Result<usize> {
        let conn = self.connection("edit contact")?;

        let changed = conn
            .execute(
                schema::UPDATE_BY_KEY,
                params![
                    contact.name(),
                    contact.phone(),
                    contact.email(),
                    old_name,
                    old_phone
                ],
            )
            .map_err(StorageError::from)
            .inspect_err(|err| error!("Failed to update contact: {}", err))?;
        debug!("Updated {} row(s) for ({}, {})", changed, old_name, old_phone);

        self.reload()?;
        Ok(changed)
    }
}

fn sort_contacts(contacts: &mut [Contact]) {
    contacts.sort_by(|a, b| fold_cmp(a.name(), b.name()));
}

impl Default for ContactBook {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ContactBook {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for ContactBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactBook")
            .field("state", &self.state())
            .field("path", &self.path)
            .field("contacts", &self.contacts.len())
            .finish()
    }
}

impl ContactRepository for ContactBook {
    fn add(&mut self, contact: &Contact) -> Result<()> {
        ContactBook::add(self, contact)
    }

    fn search(&self, query: &str) -> Vec<Contact> {
        ContactBook::search(self, query)
    }

    fn sort_by_name(&mut self) {
        ContactBook::sort_by_name(self)
    }

    fn delete(&mut self, name: &str, phone: &str) -> Result<usize> {
        ContactBook::delete(self, name, phone)
    }

    fn edit(&mut self, old_name: &str, old_phone: &str, contact: &Contact) -> Result<usize> {
        ContactBook::edit(self, old_name, old_phone, contact)
    }

    fn get_all(&self) -> &[Contact] {
        ContactBook::get_all(self)
    }

    fn shutdown(&mut self) {
        ContactBook::shutdown(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn contact(name: &str, phone: &str, email: &str) -> Contact {
        Contact::try_new(name, phone, email).unwrap()
    }

    fn alice() -> Contact {
        contact("Alice", "12345678901", "alice@example.com")
    }

    #[test]
    fn test_in_memory_starts_open_and_empty() {
        let book = ContactBook::in_memory();
        assert_eq!(book.state(), StoreState::Open);
        assert!(book.is_empty());
        assert!(book.path().is_none());
    }

    #[test]
    fn test_new_is_closed() {
        let book = ContactBook::new();
        assert_eq!(book.state(), StoreState::Closed);
        assert!(!book.is_open());
    }

    #[test]
    fn test_add_then_duplicate_phone() {
        let mut book = ContactBook::in_memory();
        book.add(&alice()).unwrap();

        let err = book.add(&alice()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateKey);
        assert!(err.is_rejection());
        assert_eq!(book.get_all(), &[alice()]);
    }

    #[test]
    fn test_duplicate_check_uses_phone_only() {
        let mut book = ContactBook::in_memory();
        book.add(&alice()).unwrap();

        let other = contact("Someone Else", "12345678901", "");
        assert_eq!(book.add(&other).unwrap_err().kind, ErrorKind::DuplicateKey);

        let same_name = contact("Alice", "99999999999", "");
        book.add(&same_name).unwrap();
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn test_cache_ordered_case_insensitively() {
        let mut book = ContactBook::in_memory();
        book.add(&contact("bob", "22222222222", "")).unwrap();
        book.add(&contact("Carol", "33333333333", "")).unwrap();
        book.add(&contact("alice", "11111111111", "")).unwrap();

        let names: Vec<&str> = book.get_all().iter().map(Contact::name).collect();
        assert_eq!(names, vec!["alice", "bob", "Carol"]);
    }

    #[test]
    fn test_equal_names_keep_insertion_order() {
        let mut book = ContactBook::in_memory();
        book.add(&contact("ALICE", "11111111111", "")).unwrap();
        book.add(&contact("alice", "22222222222", "")).unwrap();
        book.add(&contact("Alice", "33333333333", "")).unwrap();

        let phones: Vec<&str> = book.get_all().iter().map(Contact::phone).collect();
        assert_eq!(phones, vec!["11111111111", "22222222222", "33333333333"]);

        book.sort_by_name();
        let phones: Vec<&str> = book.get_all().iter().map(Contact::phone).collect();
        assert_eq!(phones, vec!["11111111111", "22222222222", "33333333333"]);
    }

    #[test]
    fn test_search_matches_any_field() {
        let mut book = ContactBook::in_memory();
        book.add(&alice()).unwrap();
        book.add(&contact("Bob", "22222222222", "bob@work.org")).unwrap();

        assert_eq!(book.search("ALI"), vec![alice()]);
        assert_eq!(book.search("45678"), vec![alice()]);
        assert_eq!(book.search("WORK.ORG").len(), 1);
        assert_eq!(book.search("").len(), 2);
        assert!(book.search("zzz").is_empty());
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let mut book = ContactBook::in_memory();
        book.add(&alice()).unwrap();
        book.add(&contact("100% Real", "22222222222", "")).unwrap();

        assert_eq!(book.search("%").len(), 1);
        assert!(book.search("_").is_empty());
    }

    #[test]
    fn test_search_reads_store_not_cache() {
        let mut book = ContactBook::in_memory();
        book.add(&alice()).unwrap();
        book.sort_by_name();

        // Row written behind the cache's back
        book.conn
            .as_ref()
            .unwrap()
            .execute(schema::INSERT, params!["Zoe", "55555555555", ""])
            .unwrap();

        assert_eq!(book.len(), 1);
        assert_eq!(book.search("zoe").len(), 1);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut book = ContactBook::in_memory();
        book.add(&alice()).unwrap();

        assert_eq!(book.delete("Alice", "12345678901").unwrap(), 1);
        let after_first = book.get_all().to_vec();
        assert_eq!(book.delete("Alice", "12345678901").unwrap(), 0);
        assert_eq!(book.get_all(), after_first.as_slice());
        assert!(book.is_empty());
    }

    #[test]
    fn test_delete_requires_both_key_fields() {
        let mut book = ContactBook::in_memory();
        book.add(&alice()).unwrap();

        assert_eq!(book.delete("Alice", "00000000000").unwrap(), 0);
        assert_eq!(book.delete("Bob", "12345678901").unwrap(), 0);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_edit_replaces_fields() {
        let mut book = ContactBook::in_memory();
        book.add(&alice()).unwrap();

        let updated = contact("Alice Johnson", "33344455566", "alicej@example.com");
        assert_eq!(book.edit("Alice", "12345678901", &updated).unwrap(), 1);
        assert_eq!(book.get_all(), &[updated]);
    }

    #[test]
    fn test_edit_unknown_key_changes_nothing() {
        let mut book = ContactBook::in_memory();
        book.add(&alice()).unwrap();

        let updated = contact("Nobody", "00000000000", "");
        assert_eq!(book.edit("Nobody", "00000000000", &updated).unwrap(), 0);
        assert_eq!(book.get_all(), &[alice()]);
    }

    #[test]
    fn test_closed_book_fails_fast() {
        let mut book = ContactBook::in_memory();
        book.add(&alice()).unwrap();
        book.shutdown();
        assert_eq!(book.state(), StoreState::Closed);

        assert_eq!(book.add(&alice()).unwrap_err().kind, ErrorKind::NotOpen);
        assert_eq!(
            book.delete("Alice", "12345678901").unwrap_err().kind,
            ErrorKind::NotOpen
        );
        assert_eq!(
            book.edit("Alice", "12345678901", &alice()).unwrap_err().kind,
            ErrorKind::NotOpen
        );
        assert!(book.search("alice").is_empty());
        assert_eq!(
            book.try_search("alice").unwrap_err().kind,
            ErrorKind::NotOpen
        );
        // Cache keeps its last known-good state
        assert_eq!(book.get_all(), &[alice()]);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut book = ContactBook::in_memory();
        book.shutdown();
        book.shutdown();
        assert_eq!(book.state(), StoreState::Closed);
    }

    #[test]
    fn test_engine_error_leaves_cache_untouched() {
        let mut book = ContactBook::in_memory();
        book.add(&alice()).unwrap();
        book.conn
            .as_ref()
            .unwrap()
            .execute("DROP TABLE contacts", [])
            .unwrap();

        let bob = contact("Bob", "22222222222", "");
        assert_eq!(book.add(&bob).unwrap_err().kind, ErrorKind::Engine);
        assert_eq!(
            book.delete("Alice", "12345678901").unwrap_err().kind,
            ErrorKind::Engine
        );
        assert_eq!(
            book.try_search("a").unwrap_err().kind,
            ErrorKind::Engine
        );
        assert!(book.search("a").is_empty());
        assert_eq!(book.get_all(), &[alice()]);
        assert!(book.is_open());
    }

    #[test]
    fn test_usable_through_repository_trait() {
        fn exercise(repo: &mut dyn ContactRepository) {
            repo.add(&Contact::new_unchecked("Eve", "44444444444", ""))
                .unwrap();
            assert_eq!(repo.search("eve").len(), 1);
            assert_eq!(repo.get_all().len(), 1);
            repo.shutdown();
        }

        let mut book = ContactBook::in_memory();
        exercise(&mut book);
        assert!(!book.is_open());
    }
}
