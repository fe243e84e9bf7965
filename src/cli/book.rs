//! Book CLI commands

use clap::{Args, Subcommand};

use crate::audit::{CommitHook, Entity};
use crate::display::{format_audit_history, format_book_details, format_book_list};
use crate::error::{AuditError, AuditResult};
use crate::models::{Book, Money};
use crate::services::{AuditLogService, BookService, BookUpdate};
use crate::storage::Store;

/// Optional book fields shared by `add` and `update`
#[derive(Args, Debug, Default)]
pub struct BookFieldArgs {
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub genre: Option<String>,
    /// Publication year
    #[arg(long)]
    pub year: Option<i32>,
    #[arg(long)]
    pub isbn: Option<String>,
    /// Price (e.g. "12.99")
    #[arg(long)]
    pub price: Option<String>,
    /// Whether the book is in stock (true/false)
    #[arg(long)]
    pub available: Option<bool>,
    #[arg(long)]
    pub publisher: Option<String>,
    /// Hardcover, Paperback, EPUB, ...
    #[arg(long)]
    pub format: Option<String>,
    #[arg(long)]
    pub pages: Option<i32>,
    #[arg(long)]
    pub language: Option<String>,
    #[arg(long)]
    pub edition: Option<String>,
}

impl BookFieldArgs {
    fn into_update(self, title: Option<String>) -> AuditResult<BookUpdate> {
        let price = self
            .price
            .map(|p| {
                Money::parse(&p).map_err(|e| {
                    AuditError::Validation(format!(
                        "Invalid price '{}'. Use a format like '12.99'. Error: {}",
                        p, e
                    ))
                })
            })
            .transpose()?;

        Ok(BookUpdate {
            title,
            author: self.author,
            genre: self.genre,
            publication_year: self.year,
            isbn: self.isbn,
            price,
            availability: self.available,
            publisher: self.publisher,
            format: self.format,
            pages: self.pages,
            language: self.language,
            edition: self.edition,
        })
    }
}

/// Book subcommands
#[derive(Subcommand, Debug)]
pub enum BookCommands {
    /// Add a book
    Add {
        /// Book title
        title: String,
        #[command(flatten)]
        fields: BookFieldArgs,
    },
    /// Update a book
    Update {
        /// Book title or ID
        book: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: BookFieldArgs,
    },
    /// Delete a book
    Delete {
        /// Book title or ID
        book: String,
    },
    /// List all books
    List,
    /// Show book details
    Show {
        /// Book title or ID
        book: String,
    },
    /// Show the audit history of a book
    History {
        /// Book title or ID
        book: String,
    },
}

/// Handle a book command
pub fn handle_book_command(store: &Store, hook: &CommitHook<'_>, cmd: BookCommands) -> AuditResult<()> {
    let service = BookService::new(store, hook);

    match cmd {
        BookCommands::Add { title, fields } => {
            let mut book = Book::new(title);
            fields.into_update(None)?.apply(&mut book);

            let book = service.create(book)?;
            println!("Added book: {}", book);
            println!("  ID: {}", book.id);
        }

        BookCommands::Update { book, title, fields } => {
            let found = service
                .find(&book)?
                .ok_or_else(|| AuditError::book_not_found(&book))?;

            let update = fields.into_update(title)?;
            if update.is_empty() {
                println!("No changes specified. Use --help to see the fields that can be set.");
                return Ok(());
            }

            let updated = service.update(found.id, update)?;
            println!("Updated book: {}", updated);
        }

        BookCommands::Delete { book } => {
            let found = service
                .find(&book)?
                .ok_or_else(|| AuditError::book_not_found(&book))?;

            let deleted = service.delete(found.id)?;
            println!("Deleted book: {}", deleted);
        }

        BookCommands::List => {
            print!("{}", format_book_list(&service.list()?));
        }

        BookCommands::Show { book } => {
            let found = service
                .find(&book)?
                .ok_or_else(|| AuditError::book_not_found(&book))?;
            print!("{}", format_book_details(&found));
        }

        BookCommands::History { book } => {
            let found = service
                .find(&book)?
                .ok_or_else(|| AuditError::book_not_found(&book))?;
            let history = AuditLogService::new(store).history(found.key())?;
            print!("{}", format_audit_history(&history));
        }
    }

    Ok(())
}
