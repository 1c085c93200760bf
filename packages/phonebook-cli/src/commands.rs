//! Subcommand handlers
//!
//! Each handler talks to the book through [`ContactRepository`], prints a
//! user-facing message and reports success as a bool, the way a form would
//! react to a button press.

use clap::Subcommand;
use phonebook_storage::{Contact, ContactRepository, ErrorKind, StorageError};
use std::io::Write;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a contact
    Add {
        name: String,
        /// At least 11 digits
        phone: String,
        /// Optional email address
        #[arg(default_value = "")]
        email: String,
    },

    /// Case-insensitive search over name, phone and email
    Search {
        /// Empty shows every contact
        #[arg(default_value = "")]
        query: String,
    },

    /// List all contacts
    List {
        /// Re-sort the list by name before printing
        #[arg(long)]
        sorted: bool,
    },

    /// Delete the contact identified by name and phone
    Delete { name: String, phone: String },

    /// Replace the contact identified by old name and phone
    Edit {
        old_name: String,
        old_phone: String,
        name: String,
        phone: String,
        #[arg(default_value = "")]
        email: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

pub fn execute<R, W>(
    repo: &mut R,
    command: &Commands,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<bool>
where
    R: ContactRepository + ?Sized,
    W: Write,
{
    match command {
        Commands::Add { name, phone, email } => {
            let outcome = Contact::try_new(name.as_str(), phone.as_str(), email.as_str())
                .and_then(|contact| repo.add(&contact));
            match outcome {
                Ok(()) => {
                    writeln!(out, "✅ Contact added successfully!")?;
                    Ok(true)
                }
                Err(err) => report_failure(out, "add contact", &err),
            }
        }

        Commands::Search { query } => {
            if query.is_empty() {
                writeln!(out, "The search field is empty. Displaying all contacts.")?;
                print_contacts(out, repo.get_all(), format)?;
                return Ok(true);
            }
            let hits = repo.search(query);
            if hits.is_empty() {
                writeln!(out, "No contacts found matching your search.")?;
            } else {
                print_contacts(out, &hits, format)?;
            }
            Ok(true)
        }

        Commands::List { sorted } => {
            if *sorted {
                repo.sort_by_name();
            }
            print_contacts(out, repo.get_all(), format)?;
            Ok(true)
        }

        Commands::Delete { name, phone } => match repo.delete(name, phone) {
            Ok(0) => {
                writeln!(out, "No contact named '{}' with phone {}.", name, phone)?;
                Ok(true)
            }
            Ok(_) => {
                writeln!(out, "✅ Contact deleted successfully.")?;
                Ok(true)
            }
            Err(err) => report_failure(out, "delete contact", &err),
        },

        Commands::Edit {
            old_name,
            old_phone,
            name,
            phone,
            email,
        } => {
            let outcome = Contact::try_new(name.as_str(), phone.as_str(), email.as_str())
                .and_then(|contact| repo.edit(old_name, old_phone, &contact));
            match outcome {
                Ok(0) => {
                    writeln!(
                        out,
                        "No contact named '{}' with phone {}.",
                        old_name, old_phone
                    )?;
                    Ok(true)
                }
                Ok(_) => {
                    writeln!(out, "✅ Contact updated successfully.")?;
                    Ok(true)
                }
                Err(err) => report_failure(out, "update contact", &err),
            }
        }
    }
}

fn report_failure<W: Write>(out: &mut W, action: &str, err: &StorageError) -> anyhow::Result<bool> {
    let reason = match err.kind {
        ErrorKind::Validation => format!("Input error: {}", err.message),
        ErrorKind::DuplicateKey => format!("Duplicate: {}", err.message),
        ErrorKind::NotOpen => "The contact database is not open.".to_string(),
        ErrorKind::Engine => "Database error. See logs for details.".to_string(),
    };
    writeln!(out, "❌ Failed to {}! {}", action, reason)?;
    Ok(false)
}

pub fn print_contacts<W: Write>(
    out: &mut W,
    contacts: &[Contact],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(contacts)?)?;
        }
        OutputFormat::Table => {
            let width = |header: &str, field: fn(&Contact) -> &str| {
                contacts
                    .iter()
                    .map(|c| field(c).chars().count())
                    .chain(std::iter::once(header.len()))
                    .max()
                    .unwrap_or(0)
            };
            let name_w = width("Name", Contact::name);
            let phone_w = width("Phone", Contact::phone);

            writeln!(out, "{:name_w$}  {:phone_w$}  Email", "Name", "Phone")?;
            for c in contacts {
                writeln!(
                    out,
                    "{:name_w$}  {:phone_w$}  {}",
                    c.name(),
                    c.phone(),
                    c.email()
                )?;
            }
            writeln!(out, "({} contacts)", contacts.len())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use phonebook_storage::ContactBook;
    use pretty_assertions::assert_eq;

    fn run(book: &mut ContactBook, command: Commands) -> (bool, String) {
        run_as(book, command, OutputFormat::Table)
    }

    fn run_as(book: &mut ContactBook, command: Commands, format: OutputFormat) -> (bool, String) {
        let mut out = Vec::new();
        let ok = execute(book, &command, format, &mut out).unwrap();
        (ok, String::from_utf8(out).unwrap())
    }

    fn add(name: &str, phone: &str, email: &str) -> Commands {
        Commands::Add {
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_add_success_and_duplicate() {
        let mut book = ContactBook::in_memory();

        let (ok, out) = run(&mut book, add("Alice", "12345678901", "alice@example.com"));
        assert!(ok);
        assert!(out.contains("Contact added successfully!"));

        let (ok, out) = run(&mut book, add("Alice", "12345678901", "alice@example.com"));
        assert!(!ok);
        assert!(out.contains("Duplicate"));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let mut book = ContactBook::in_memory();

        let (ok, out) = run(&mut book, add("Bob", "123", "bob@example.com"));
        assert!(!ok);
        assert!(out.contains("Input error"));
        assert!(out.contains("at least 11 digits"));

        let (ok, _) = run(&mut book, add("Jane", "12345678901", "janeexample.com"));
        assert!(!ok);
        assert!(book.is_empty());
    }

    #[test]
    fn test_search_messages() {
        let mut book = ContactBook::in_memory();
        run(&mut book, add("Alice", "11111111111", ""));
        run(&mut book, add("Bob", "22222222222", ""));

        let (_, out) = run(
            &mut book,
            Commands::Search {
                query: "zzz".to_string(),
            },
        );
        assert_eq!(out, "No contacts found matching your search.\n");

        let (_, out) = run(
            &mut book,
            Commands::Search {
                query: String::new(),
            },
        );
        assert!(out.starts_with("The search field is empty."));
        assert!(out.contains("(2 contacts)"));

        let (_, out) = run(
            &mut book,
            Commands::Search {
                query: "ALI".to_string(),
            },
        );
        assert!(out.contains("Alice"));
        assert!(!out.contains("Bob"));
    }

    #[test]
    fn test_list_table_layout() {
        let mut book = ContactBook::in_memory();
        run(&mut book, add("bob", "22222222222", "bob@example.com"));
        run(&mut book, add("Alice", "11111111111", ""));

        let (ok, out) = run(&mut book, Commands::List { sorted: true });
        assert!(ok);
        assert_eq!(
            out,
            "Name   Phone        Email\n\
             Alice  11111111111  \n\
             bob    22222222222  bob@example.com\n\
             (2 contacts)\n"
        );
    }

    #[test]
    fn test_list_json() {
        let mut book = ContactBook::in_memory();
        run(&mut book, add("Alice", "11111111111", "alice@example.com"));

        let (_, out) = run_as(&mut book, Commands::List { sorted: false }, OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["name"], "Alice");
        assert_eq!(parsed[0]["email"], "alice@example.com");
    }

    #[test]
    fn test_delete_and_edit() {
        let mut book = ContactBook::in_memory();
        run(&mut book, add("Alice", "12345678901", ""));

        let (ok, out) = run(
            &mut book,
            Commands::Edit {
                old_name: "Alice".to_string(),
                old_phone: "12345678901".to_string(),
                name: "Alice Johnson".to_string(),
                phone: "33344455566".to_string(),
                email: "alicej@example.com".to_string(),
            },
        );
        assert!(ok);
        assert!(out.contains("Contact updated successfully."));

        let (ok, out) = run(
            &mut book,
            Commands::Edit {
                old_name: "Alice Johnson".to_string(),
                old_phone: "33344455566".to_string(),
                name: "Alice Johnson".to_string(),
                phone: "123".to_string(),
                email: String::new(),
            },
        );
        assert!(!ok);
        assert!(out.contains("Failed to update contact!"));

        let (ok, out) = run(
            &mut book,
            Commands::Delete {
                name: "Alice Johnson".to_string(),
                phone: "33344455566".to_string(),
            },
        );
        assert!(ok);
        assert!(out.contains("Contact deleted successfully."));

        let (ok, out) = run(
            &mut book,
            Commands::Delete {
                name: "Alice Johnson".to_string(),
                phone: "33344455566".to_string(),
            },
        );
        assert!(ok);
        assert!(out.starts_with("No contact named"));
    }

    #[test]
    fn test_closed_book_reports_not_open() {
        let mut book = ContactBook::new();
        let (ok, out) = run(&mut book, add("Alice", "12345678901", ""));
        assert!(!ok);
        assert!(out.contains("not open"));
    }
}
