//! Table layout, SQL text and row mapping for the `contacts` table

use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row};

use crate::domain::{fold_key, Contact};

/// One row per contact, no primary key. Physical order is insertion order.
pub(super) const CREATE_CONTACTS: &str =
    "CREATE TABLE IF NOT EXISTS contacts (name TEXT, phone TEXT, email TEXT)";

pub(super) const SELECT_ALL: &str = "SELECT name, phone, email FROM contacts ORDER BY rowid";

pub(super) const COUNT_BY_PHONE: &str = "SELECT COUNT(*) FROM contacts WHERE phone = ?1";

pub(super) const INSERT: &str = "INSERT INTO contacts (name, phone, email) VALUES (?1, ?2, ?3)";

pub(super) const DELETE_BY_KEY: &str = "DELETE FROM contacts WHERE name = ?1 AND phone = ?2";

pub(super) const UPDATE_BY_KEY: &str =
    "UPDATE contacts SET name = ?1, phone = ?2, email = ?3 WHERE name = ?4 AND phone = ?5";

/// `?1` must already be folded. `instr` keeps `%` and `_` literal.
pub(super) const SEARCH: &str = "SELECT name, phone, email FROM contacts
     WHERE instr(casefold(name), ?1) > 0
        OR instr(casefold(phone), ?1) > 0
        OR instr(casefold(email), ?1) > 0
     ORDER BY rowid";

/// Create the table and register `casefold(text)`.
pub(super) fn bootstrap(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(value_text(ctx.get_raw(0)).map(|t| fold_key(&t))),
    )?;
    conn.execute(CREATE_CONTACTS, [])?;
    Ok(())
}

/// Text form of any stored value. Only NULL has none.
///
/// Rows written by other tools may hold INTEGER, REAL or BLOB cells; they are
/// read as text instead of failing the whole query.
fn value_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn column_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(value_text(row.get_ref(idx)?).unwrap_or_default())
}

/// Map a `(name, phone, email)` row. NULL columns read as empty text.
pub(super) fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact::new_unchecked(
        column_text(row, 0)?,
        column_text(row, 1)?,
        column_text(row, 2)?,
    ))
}
