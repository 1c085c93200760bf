//! Contact entity

use serde::Serialize;
use tracing::warn;

use super::validation::{is_valid_email, is_valid_name, is_valid_phone, phone_violation};
use crate::error::{Result, StorageError};

/// Contact Entity
///
/// No identity column: `(name, phone)` targets rows for edit/delete and
/// `phone` alone is unique on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contact {
    name: String,
    phone: String,
    email: String,
}

impl Contact {
    /// Build a contact without checking the field rules.
    ///
    /// For rows read back from the store, which were validated when written.
    pub fn new_unchecked(
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
        }
    }

    /// Build a contact through the setters, failing on the first rejected field.
    pub fn try_new(
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self> {
        let mut contact = Self::default();
        contact.set_name(name)?;
        contact.set_phone(phone)?;
        contact.set_email(email)?;
        Ok(contact)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Set the name. Rejects an empty name and leaves the field unchanged.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if !is_valid_name(&name) {
            warn!("Rejected contact name: name cannot be empty");
            return Err(StorageError::validation("name", "name cannot be empty"));
        }
        self.name = name;
        Ok(())
    }

    /// Set the phone. Requires at least 11 characters, all decimal digits.
    pub fn set_phone(&mut self, phone: impl Into<String>) -> Result<()> {
        let phone = phone.into();
        if !is_valid_phone(&phone) {
            let reason = phone_violation(&phone);
            warn!("Rejected contact phone '{}': {}", phone, reason);
            return Err(StorageError::validation("phone", reason));
        }
        self.phone = phone;
        Ok(())
    }

    /// Set the email. Empty is accepted; see [`is_valid_email`] for the rest.
    pub fn set_email(&mut self, email: impl Into<String>) -> Result<()> {
        let email = email.into();
        if !is_valid_email(&email) {
            warn!("Rejected contact email '{}'", email);
            return Err(StorageError::validation(
                "email",
                format!("'{}' must contain '@' followed by a domain with '.'", email),
            ));
        }
        self.email = email;
        Ok(())
    }
}
