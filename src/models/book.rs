//! Book model
//!
//! The auditable catalogue entry. `Price` is a sensitive field: changes to
//! it are recorded but never revealed.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ids::BookId;
use super::money::Money;
use crate::audit::{Entity, EntityDescriptor, FieldDef, FieldSnapshot};

const BOOK_FIELDS: &[FieldDef] = &[
    FieldDef::plain("ID"),
    FieldDef::plain("Title"),
    FieldDef::plain("Author"),
    FieldDef::plain("Genre"),
    FieldDef::plain("PublicationYear"),
    FieldDef::plain("ISBN"),
    FieldDef::sensitive("Price"),
    FieldDef::plain("Availability"),
    FieldDef::plain("Publisher"),
    FieldDef::plain("Format"),
    FieldDef::plain("Pages"),
    FieldDef::plain("Language"),
    FieldDef::plain("Edition"),
];

/// A book in the catalogue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Book {
    /// Unique identifier
    pub id: BookId,

    pub title: String,

    pub author: String,

    pub genre: String,

    pub publication_year: i32,

    pub isbn: String,

    /// List price; masked in change details
    pub price: Money,

    /// Whether the book is currently in stock
    pub availability: bool,

    pub publisher: String,

    /// e.g. "Hardcover", "Paperback", "EPUB"
    pub format: String,

    pub pages: i32,

    pub language: String,

    pub edition: String,
}

impl Book {
    /// Create a new book with a fresh id and default values
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: BookId::new(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Validate the book
    pub fn validate(&self) -> Result<(), BookValidationError> {
        if self.title.trim().is_empty() {
            return Err(BookValidationError::EmptyTitle);
        }

        if self.title.len() > 200 {
            return Err(BookValidationError::TitleTooLong(self.title.len()));
        }

        if self.price.is_negative() {
            return Err(BookValidationError::NegativePrice(self.price));
        }

        if self.pages < 0 {
            return Err(BookValidationError::NegativePages(self.pages));
        }

        Ok(())
    }
}

impl Entity for Book {
    const DESCRIPTOR: EntityDescriptor = EntityDescriptor::new("Book", "Books")
        .auditable()
        .id_field("ID")
        .fields(BOOK_FIELDS);

    fn key(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot::new()
            .with("ID", *self.id.as_uuid())
            .with("Title", self.title.as_str())
            .with("Author", self.author.as_str())
            .with("Genre", self.genre.as_str())
            .with("PublicationYear", self.publication_year)
            .with("ISBN", self.isbn.as_str())
            .with("Price", self.price)
            .with("Availability", self.availability)
            .with("Publisher", self.publisher.as_str())
            .with("Format", self.format.as_str())
            .with("Pages", self.pages)
            .with("Language", self.language.as_str())
            .with("Edition", self.edition.as_str())
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.author.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} by {}", self.title, self.author)
        }
    }
}

/// Validation errors for books
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    EmptyTitle,
    TitleTooLong(usize),
    NegativePrice(Money),
    NegativePages(i32),
}

impl fmt::Display for BookValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Book title cannot be empty"),
            Self::TitleTooLong(len) => {
                write!(f, "Book title too long ({} chars, max 200)", len)
            }
            Self::NegativePrice(price) => write!(f, "Book price cannot be negative: {}", price),
            Self::NegativePages(pages) => write!(f, "Page count cannot be negative: {}", pages),
        }
    }
}

impl std::error::Error for BookValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::FieldValue;

    #[test]
    fn test_new_book() {
        let book = Book::new("Dune");
        assert_eq!(book.title, "Dune");
        assert!(!book.id.as_uuid().is_nil());
        assert_eq!(book.price, Money::zero());
        assert!(!book.availability);
    }

    #[test]
    fn test_default_book_has_nil_id() {
        assert!(Book::default().key().is_nil());
    }

    #[test]
    fn test_snapshot_covers_every_declared_field() {
        let book = Book::new("Dune");
        let snapshot = book.snapshot();
        assert_eq!(snapshot.len(), Book::DESCRIPTOR.fields.len());
        for field in Book::DESCRIPTOR.fields {
            assert!(snapshot.get(field.name).is_some(), "missing {}", field.name);
        }
        assert_eq!(snapshot.get("ID"), Some(&FieldValue::Uuid(book.key())));
        assert_eq!(snapshot.get("Title"), Some(&FieldValue::from("Dune")));
    }

    #[test]
    fn test_price_is_the_only_sensitive_field() {
        let sensitive: Vec<_> = Book::DESCRIPTOR
            .fields
            .iter()
            .filter(|f| f.sensitive)
            .map(|f| f.name)
            .collect();
        assert_eq!(sensitive, vec!["Price"]);
        assert!(Book::DESCRIPTOR.auditable);
        assert!(!Book::DESCRIPTOR.not_auditable);
    }

    #[test]
    fn test_validation() {
        let mut book = Book::new("Dune");
        assert!(book.validate().is_ok());

        book.title = "  ".into();
        assert_eq!(book.validate(), Err(BookValidationError::EmptyTitle));

        book.title = "x".repeat(201);
        assert!(matches!(
            book.validate(),
            Err(BookValidationError::TitleTooLong(201))
        ));

        book.title = "Dune".into();
        book.price = Money::from_cents(-1);
        assert!(matches!(
            book.validate(),
            Err(BookValidationError::NegativePrice(_))
        ));
    }

    #[test]
    fn test_serde_fills_missing_fields() {
        let book: Book = serde_json::from_str(r#"{"title":"Emma"}"#).unwrap();
        assert_eq!(book.title, "Emma");
        assert_eq!(book.pages, 0);
    }

    #[test]
    fn test_display() {
        let mut book = Book::new("Dune");
        assert_eq!(book.to_string(), "Dune");
        book.author = "Frank Herbert".into();
        assert_eq!(book.to_string(), "Dune by Frank Herbert");
    }
}
