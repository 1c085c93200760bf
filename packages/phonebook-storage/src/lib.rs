//! phonebook-storage - Validated contacts over a durable SQLite store
//!
//! ## Core Principles
//!
//! 1. **Validated entity**: a [`Contact`] mutated through its setters always
//!    satisfies the name/phone/email rules
//! 2. **Single owner**: [`ContactBook`] owns the connection and the cache;
//!    callers only ever see `&[Contact]`
//! 3. **Cache contract**: after every successful write the cache equals the
//!    whole table, ordered case-insensitively by name
//!
//! ## Usage
//!
//! ```rust,no_run
//! use phonebook_storage::{Contact, ContactBook, ErrorKind};
//!
//! let mut book = ContactBook::open("contacts.db");
//!
//! let alice = Contact::try_new("Alice", "12345678901", "alice@example.com")?;
//! book.add(&alice)?;
//!
//! // Duplicate phone numbers are rejected on insert
//! let err = book.add(&alice).unwrap_err();
//! assert_eq!(err.kind, ErrorKind::DuplicateKey);
//!
//! let hits = book.search("ali");
//! assert_eq!(hits.len(), 1);
//!
//! book.delete("Alice", "12345678901")?;
//! book.shutdown();
//! # Ok::<(), phonebook_storage::StorageError>(())
//! ```

pub mod domain;
pub mod error;

#[cfg(feature = "sqlite")]
pub mod infrastructure;

pub use error::{ErrorKind, Result, StorageError};

pub use domain::{
    fold_cmp, fold_contains, fold_key, is_valid_email, is_valid_name, is_valid_phone, Contact,
    ContactRepository, MIN_PHONE_LEN,
};

#[cfg(feature = "sqlite")]
pub use infrastructure::{ContactBook, StoreState};
