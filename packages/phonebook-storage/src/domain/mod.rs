//! Domain layer - Contact entity, field rules and the repository port

pub mod casefold;
pub mod contact;
pub mod ports;
pub mod validation;

pub use casefold::{fold_cmp, fold_contains, fold_key};
pub use contact::Contact;
pub use ports::ContactRepository;
pub use validation::{is_valid_email, is_valid_name, is_valid_phone, MIN_PHONE_LEN};
