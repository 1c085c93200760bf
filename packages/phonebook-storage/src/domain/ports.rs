//! Contact Repository Port (Trait Interface)
//!
//! The surface the presentation layer is written against. Every call is
//! synchronous and runs to completion.

use super::contact::Contact;
use crate::error::Result;

pub trait ContactRepository {
    /// Insert a contact. Fails with `DuplicateKey` if its phone is already stored.
    fn add(&mut self, contact: &Contact) -> Result<()>;

    /// Case-insensitive substring search over name, phone and email.
    ///
    /// Reads the store directly. Never fails; problems yield an empty result.
    fn search(&self, query: &str) -> Vec<Contact>;

    /// Reorder the cached view by name. The store is untouched.
    fn sort_by_name(&mut self);

    /// Remove every row matching `(name, phone)`. Returns rows removed.
    fn delete(&mut self, name: &str, phone: &str) -> Result<usize>;

    /// Overwrite rows matching `(old_name, old_phone)`. Returns rows changed.
    fn edit(&mut self, old_name: &str, old_phone: &str, contact: &Contact) -> Result<usize>;

    /// Current cached contacts
    fn get_all(&self) -> &[Contact];

    /// Release the store. Idempotent.
    fn shutdown(&mut self);
}
