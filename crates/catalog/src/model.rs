use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Catalog entry for one title and its copy inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Stable identifier assigned at creation
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub series: Option<String>,
    pub publisher: Option<String>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub year_published: Option<i32>,
    /// Units or licenses the library owns
    pub total_copies: i64,
    /// Units not checked out, bounded by `total_copies`
    pub available_copies: i64,
    pub price: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Book {
    /// Current `(available, total)` pair.
    pub fn counts(&self) -> CopyCounts {
        CopyCounts {
            available: self.available_copies,
            total: self.total_copies,
        }
    }

    /// Apply a partial update on top of this record without validating it.
    pub fn merged(&self, patch: &BookPatch) -> Book {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next.title = title.clone();
        }
        if let Some(author) = &patch.author {
            next.author = author.clone();
        }
        if let Some(series) = &patch.series {
            next.series = series.clone();
        }
        if let Some(publisher) = &patch.publisher {
            next.publisher = publisher.clone();
        }
        if let Some(genre) = &patch.genre {
            next.genre = genre.clone();
        }
        if let Some(language) = &patch.language {
            next.language = language.clone();
        }
        if let Some(year) = patch.year_published {
            next.year_published = year;
        }
        if let Some(total) = patch.total_copies {
            next.total_copies = total;
        }
        if let Some(available) = patch.available_copies {
            next.available_copies = available;
        }
        if let Some(price) = patch.price {
            next.price = price;
        }
        next
    }
}

/// Request model for creating a new book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_published: Option<i32>,
    pub total_copies: i64,
    /// Defaults to `total_copies` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_copies: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl NewBook {
    /// Available copies the record will be created with.
    pub fn initial_available(&self) -> i64 {
        self.available_copies.unwrap_or(self.total_copies)
    }
}

/// Partial update to a book.
///
/// Nullable fields use a nested option: the outer `None` leaves the field
/// untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub series: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub publisher: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub genre: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub language: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub year_published: Option<Option<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_copies: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_copies: Option<i64>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Option<f64>>,
}

impl BookPatch {
    /// Patch that only moves the copy counters.
    pub fn counts(available: i64, total: Option<i64>) -> Self {
        Self {
            available_copies: Some(available),
            total_copies: total,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `(available, total)` copy counters of one book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyCounts {
    pub available: i64,
    pub total: i64,
}

impl CopyCounts {
    pub const fn new(available: i64, total: i64) -> Self {
        Self { available, total }
    }

    pub fn is_consistent(&self) -> bool {
        0 <= self.available && self.available <= self.total
    }
}

/// Aggregate figures for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    pub total_books: i64,
    pub total_copies: i64,
    pub available_copies: i64,
    pub top_genre: Option<String>,
    pub recent_additions: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Book {
        Book {
            id: Uuid::nil(),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            series: Some("Dune".to_string()),
            publisher: None,
            genre: Some("Science Fiction".to_string()),
            language: None,
            year_published: Some(1965),
            total_copies: 3,
            available_copies: 2,
            price: Some(9.99),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_patch_distinguishes_absent_and_null() {
        let patch: BookPatch =
            serde_json::from_value(json!({"series": null, "availableCopies": 1})).unwrap();

        assert_eq!(patch.series, Some(None));
        assert_eq!(patch.genre, None);
        assert_eq!(patch.available_copies, Some(1));
    }

    #[test]
    fn test_merged_applies_only_present_fields() {
        let book = sample();
        let patch = BookPatch {
            series: Some(None),
            total_copies: Some(5),
            ..BookPatch::default()
        };

        let merged = book.merged(&patch);
        assert_eq!(merged.series, None);
        assert_eq!(merged.total_copies, 5);
        assert_eq!(merged.available_copies, 2);
        assert_eq!(merged.genre, book.genre);
    }

    #[test]
    fn test_book_serializes_camel_case() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["availableCopies"], 2);
        assert_eq!(value["yearPublished"], 1965);
        assert_eq!(value["createdAt"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_new_book_defaults_available_to_total() {
        let new_book: NewBook = serde_json::from_value(json!({
            "title": "Emma",
            "author": "Jane Austen",
            "totalCopies": 4
        }))
        .unwrap();

        assert_eq!(new_book.initial_available(), 4);
    }

    #[test]
    fn test_counts_patch_is_not_empty() {
        assert!(BookPatch::default().is_empty());
        assert!(!BookPatch::counts(1, None).is_empty());
    }
}
