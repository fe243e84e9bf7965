//! Book service
//!
//! CRUD for books. Every mutation runs in its own session and is committed
//! through the commit hook, so each one lands with its audit entry.

use tracing::instrument;

use crate::audit::{CommitHook, Entity};
use crate::error::{AuditError, AuditResult};
use crate::models::{Book, BookId, Money};
use crate::storage::Store;

/// Partial update of a book; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub publication_year: Option<i32>,
    pub isbn: Option<String>,
    pub price: Option<Money>,
    pub availability: Option<bool>,
    pub publisher: Option<String>,
    pub format: Option<String>,
    pub pages: Option<i32>,
    pub language: Option<String>,
    pub edition: Option<String>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.genre.is_none()
            && self.publication_year.is_none()
            && self.isbn.is_none()
            && self.price.is_none()
            && self.availability.is_none()
            && self.publisher.is_none()
            && self.format.is_none()
            && self.pages.is_none()
            && self.language.is_none()
            && self.edition.is_none()
    }

    /// Apply the set fields to `book`
    pub fn apply(self, book: &mut Book) {
        if let Some(v) = self.title {
            book.title = v;
        }
        if let Some(v) = self.author {
            book.author = v;
        }
        if let Some(v) = self.genre {
            book.genre = v;
        }
        if let Some(v) = self.publication_year {
            book.publication_year = v;
        }
        if let Some(v) = self.isbn {
            book.isbn = v;
        }
        if let Some(v) = self.price {
            book.price = v;
        }
        if let Some(v) = self.availability {
            book.availability = v;
        }
        if let Some(v) = self.publisher {
            book.publisher = v;
        }
        if let Some(v) = self.format {
            book.format = v;
        }
        if let Some(v) = self.pages {
            book.pages = v;
        }
        if let Some(v) = self.language {
            book.language = v;
        }
        if let Some(v) = self.edition {
            book.edition = v;
        }
    }
}

/// Service for book management
pub struct BookService<'a> {
    store: &'a Store,
    hook: &'a CommitHook<'a>,
}

impl<'a> BookService<'a> {
    pub fn new(store: &'a Store, hook: &'a CommitHook<'a>) -> Self {
        Self { store, hook }
    }

    /// Create a book; a nil id is replaced with a fresh one
    #[instrument(skip_all, fields(title = %book.title))]
    pub fn create(&self, mut book: Book) -> AuditResult<Book> {
        if book.id.as_uuid().is_nil() {
            book.id = BookId::new();
        }
        book.title = book.title.trim().to_string();
        book.validate()
            .map_err(|e| AuditError::Validation(e.to_string()))?;

        if !book.isbn.is_empty() && self.find_by_isbn(&book.isbn)?.is_some() {
            return Err(AuditError::Duplicate {
                entity_type: "Book",
                identifier: book.isbn.clone(),
            });
        }

        let mut session = self.store.begin()?;
        session.add(&book)?;
        self.hook.commit(session)?;

        Ok(book)
    }

    /// Apply a partial update and return the new state
    #[instrument(skip_all, fields(book = %id))]
    pub fn update(&self, id: BookId, update: BookUpdate) -> AuditResult<Book> {
        let mut book = self
            .get(id)?
            .ok_or_else(|| AuditError::book_not_found(id.to_string()))?;

        update.apply(&mut book);
        book.title = book.title.trim().to_string();
        book.validate()
            .map_err(|e| AuditError::Validation(e.to_string()))?;

        let mut session = self.store.begin()?;
        session.update(&book)?;
        self.hook.commit(session)?;

        Ok(book)
    }

    /// Delete a book and return its last state
    #[instrument(skip_all, fields(book = %id))]
    pub fn delete(&self, id: BookId) -> AuditResult<Book> {
        let mut session = self.store.begin()?;
        let book: Book = session
            .find(*id.as_uuid())?
            .ok_or_else(|| AuditError::book_not_found(id.to_string()))?;

        session.remove::<Book>(book.key())?;
        self.hook.commit(session)?;

        Ok(book)
    }

    pub fn get(&self, id: BookId) -> AuditResult<Option<Book>> {
        self.store.get(*id.as_uuid())
    }

    /// Find a book by id, short id (`book-1a2b3c4d`) or title
    pub fn find(&self, identifier: &str) -> AuditResult<Option<Book>> {
        if let Ok(id) = identifier.parse::<BookId>() {
            return self.get(id);
        }

        let books = self.list()?;
        let needle = identifier.trim().to_lowercase();

        if let Some(book) = books.iter().find(|b| b.id.to_string() == needle) {
            return Ok(Some(book.clone()));
        }

        Ok(books.into_iter().find(|b| b.title.to_lowercase() == needle))
    }

    pub fn find_by_isbn(&self, isbn: &str) -> AuditResult<Option<Book>> {
        Ok(self.list()?.into_iter().find(|b| b.isbn == isbn))
    }

    /// All books, sorted by title
    pub fn list(&self) -> AuditResult<Vec<Book>> {
        let mut books: Vec<Book> = self.store.list()?;
        books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(books)
    }
}
