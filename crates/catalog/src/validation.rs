//! Declarative checks for book payloads.
//!
//! Every write path (create, partial update merged onto the stored record)
//! runs through [`validate_book_fields`], so the copy-count invariant
//! `0 <= available <= total` holds for anything that reaches storage.

use serde::Serialize;
use thiserror::Error;

use crate::model::{Book, NewBook};

/// Upper bound for either copy counter.
pub const MAX_COPIES: i64 = i32::MAX as i64;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Collected field errors for one payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} invalid field(s): {}", .errors.len(), summary(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

/// Field values shared by create payloads and merged records.
pub struct BookFields<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub total_copies: i64,
    pub available_copies: i64,
    pub price: Option<f64>,
}

impl<'a> From<&'a Book> for BookFields<'a> {
    fn from(book: &'a Book) -> Self {
        Self {
            title: &book.title,
            author: &book.author,
            total_copies: book.total_copies,
            available_copies: book.available_copies,
            price: book.price,
        }
    }
}

impl<'a> From<&'a NewBook> for BookFields<'a> {
    fn from(book: &'a NewBook) -> Self {
        Self {
            title: &book.title,
            author: &book.author,
            total_copies: book.total_copies,
            available_copies: book.initial_available(),
            price: book.price,
        }
    }
}

pub fn validate_book_fields(fields: BookFields<'_>) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if fields.title.trim().is_empty() {
        errors.push(FieldError {
            field: "title",
            message: "is required".to_string(),
        });
    }
    if fields.author.trim().is_empty() {
        errors.push(FieldError {
            field: "author",
            message: "is required".to_string(),
        });
    }
    if fields.total_copies < 0 {
        errors.push(FieldError {
            field: "totalCopies",
            message: "must not be negative".to_string(),
        });
    } else if fields.total_copies > MAX_COPIES {
        errors.push(FieldError {
            field: "totalCopies",
            message: format!("must not exceed {MAX_COPIES}"),
        });
    }
    if fields.available_copies < 0 {
        errors.push(FieldError {
            field: "availableCopies",
            message: "must not be negative".to_string(),
        });
    } else if fields.available_copies > MAX_COPIES {
        errors.push(FieldError {
            field: "availableCopies",
            message: format!("must not exceed {MAX_COPIES}"),
        });
    } else if fields.available_copies > fields.total_copies {
        errors.push(FieldError {
            field: "availableCopies",
            message: format!(
                "must not exceed totalCopies ({} > {})",
                fields.available_copies, fields.total_copies
            ),
        });
    }
    if let Some(price) = fields.price {
        if !price.is_finite() || price < 0.0 {
            errors.push(FieldError {
                field: "price",
                message: "must be a non-negative number".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { errors })
    }
}

pub fn validate_new_book(book: &NewBook) -> Result<(), ValidationErrors> {
    validate_book_fields(book.into())
}

pub fn validate_book(book: &Book) -> Result<(), ValidationErrors> {
    validate_book_fields(book.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_book(total: i64, available: Option<i64>) -> NewBook {
        NewBook {
            title: "Beloved".to_string(),
            author: "Toni Morrison".to_string(),
            total_copies: total,
            available_copies: available,
            ..NewBook::default()
        }
    }

    #[test]
    fn test_accepts_available_equal_to_total() {
        assert!(validate_new_book(&new_book(2, Some(2))).is_ok());
        assert!(validate_new_book(&new_book(0, None)).is_ok());
    }

    #[test]
    fn test_rejects_available_above_total() {
        let err = validate_new_book(&new_book(2, Some(3))).unwrap_err();
        assert!(err.has_field("availableCopies"));
        assert_eq!(err.errors.len(), 1);
    }

    #[test]
    fn test_rejects_negative_counts() {
        let err = validate_new_book(&new_book(-1, Some(-1))).unwrap_err();
        assert!(err.has_field("totalCopies"));
        assert!(err.has_field("availableCopies"));
    }

    #[test]
    fn test_counts_above_limit_are_rejected() {
        let err = validate_new_book(&new_book(i64::MAX, None)).unwrap_err();
        assert!(err.has_field("totalCopies"));
        assert!(err.has_field("availableCopies"));

        let err = validate_new_book(&new_book(MAX_COPIES + 1, Some(1))).unwrap_err();
        assert!(err.has_field("totalCopies"));
        assert!(!err.has_field("availableCopies"));

        assert!(validate_new_book(&new_book(MAX_COPIES, None)).is_ok());
    }

    #[test]
    fn test_blank_title_and_author_are_rejected() {
        let mut book = new_book(1, None);
        book.title = "   ".to_string();
        book.author = String::new();

        let err = validate_new_book(&book).unwrap_err();
        assert!(err.has_field("title"));
        assert!(err.has_field("author"));
        assert!(err.to_string().starts_with("2 invalid field(s)"));
    }

    #[test]
    fn test_price_must_be_finite_and_non_negative() {
        let mut book = new_book(1, None);
        book.price = Some(-0.5);
        assert!(validate_new_book(&book).unwrap_err().has_field("price"));

        book.price = Some(f64::NAN);
        assert!(validate_new_book(&book).unwrap_err().has_field("price"));

        book.price = Some(12.5);
        assert!(validate_new_book(&book).is_ok());
    }
}
