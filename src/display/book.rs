//! Book display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Book;

#[derive(Tabled)]
struct BookRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Year")]
    year: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "In Stock")]
    available: &'static str,
}

/// Format a list of books as a table
pub fn format_book_list(books: &[Book]) -> String {
    if books.is_empty() {
        return "No books found.\n".to_string();
    }

    let rows = books.iter().map(|b| BookRow {
        id: b.id.to_string(),
        title: b.title.clone(),
        author: b.author.clone(),
        year: if b.publication_year > 0 {
            b.publication_year.to_string()
        } else {
            String::new()
        },
        price: b.price.to_string(),
        available: if b.availability { "Yes" } else { "No" },
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Format a single book's details
pub fn format_book_details(book: &Book) -> String {
    let mut output = String::new();

    output.push_str(&format!("Book: {}\n", book.title));
    output.push_str(&format!("  ID:          {}\n", book.id.as_uuid()));
    output.push_str(&format!("  Author:      {}\n", book.author));
    output.push_str(&format!("  Genre:       {}\n", book.genre));
    output.push_str(&format!("  Year:        {}\n", book.publication_year));
    output.push_str(&format!("  ISBN:        {}\n", book.isbn));
    output.push_str(&format!("  Price:       {}\n", book.price));
    output.push_str(&format!(
        "  Available:   {}\n",
        if book.availability { "Yes" } else { "No" }
    ));
    output.push_str(&format!("  Publisher:   {}\n", book.publisher));
    output.push_str(&format!("  Format:      {}\n", book.format));
    output.push_str(&format!("  Pages:       {}\n", book.pages));
    output.push_str(&format!("  Language:    {}\n", book.language));
    output.push_str(&format!("  Edition:     {}\n", book.edition));

    output
}
