//! Catalog browsing: free-text search, exact-match filters, and paging.

use serde::{Deserialize, Serialize};

use crate::model::Book;

/// Books per page when the caller does not choose.
pub const PAGE_SIZE: usize = 12;

/// Narrowing applied to the book list.
///
/// `search` is a case-insensitive substring match over title, author, genre,
/// and series. The other fields match exactly. Blank values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl BookFilter {
    pub fn is_empty(&self) -> bool {
        non_blank(&self.search).is_none()
            && non_blank(&self.author).is_none()
            && non_blank(&self.genre).is_none()
            && non_blank(&self.series).is_none()
    }

    pub fn matches(&self, book: &Book) -> bool {
        if let Some(term) = non_blank(&self.search) {
            let term = term.to_lowercase();
            let contains = |value: &str| value.to_lowercase().contains(&term);
            let hit = contains(&book.title)
                || contains(&book.author)
                || book.genre.as_deref().is_some_and(contains)
                || book.series.as_deref().is_some_and(contains);
            if !hit {
                return false;
            }
        }
        if let Some(author) = non_blank(&self.author) {
            if book.author != author {
                return false;
            }
        }
        if let Some(genre) = non_blank(&self.genre) {
            if book.genre.as_deref() != Some(genre) {
                return false;
            }
        }
        if let Some(series) = non_blank(&self.series) {
            if book.series.as_deref() != Some(series) {
                return false;
            }
        }
        true
    }

    /// Keep the matching books, preserving order.
    pub fn apply(&self, books: Vec<Book>) -> Vec<Book> {
        if self.is_empty() {
            return books;
        }
        books.into_iter().filter(|book| self.matches(book)).collect()
    }
}

/// One page of a longer list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slice `items` into page `page` (1-based). Page 0 is read as 1 and a zero
/// page size as [`PAGE_SIZE`]; a page past the end is empty.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let per_page = if per_page == 0 { PAGE_SIZE } else { per_page };
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let start = (page - 1).saturating_mul(per_page);
    let items = items.into_iter().skip(start).take(per_page).collect();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn book(title: &str, author: &str, genre: Option<&str>, series: Option<&str>) -> Book {
        Book {
            id: Uuid::now_v7(),
            title: title.to_string(),
            author: author.to_string(),
            series: series.map(str::to_string),
            publisher: None,
            genre: genre.map(str::to_string),
            language: None,
            year_published: None,
            total_copies: 1,
            available_copies: 1,
            price: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn shelf() -> Vec<Book> {
        vec![
            book("A Wizard of Earthsea", "Ursula K. Le Guin", Some("Fantasy"), Some("Earthsea")),
            book("The Dispossessed", "Ursula K. Le Guin", Some("Science Fiction"), None),
            book("Kindred", "Octavia E. Butler", Some("Science Fiction"), None),
            book("Wild Seed", "Octavia E. Butler", None, Some("Patternist")),
        ]
    }

    fn titles(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.title.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_over_four_fields() {
        let filter = BookFilter {
            search: Some("EARTH".to_string()),
            ..BookFilter::default()
        };
        assert_eq!(titles(&filter.apply(shelf())), vec!["A Wizard of Earthsea"]);

        let filter = BookFilter {
            search: Some("butler".to_string()),
            ..BookFilter::default()
        };
        assert_eq!(titles(&filter.apply(shelf())), vec!["Kindred", "Wild Seed"]);

        let filter = BookFilter {
            search: Some("pattern".to_string()),
            ..BookFilter::default()
        };
        assert_eq!(titles(&filter.apply(shelf())), vec!["Wild Seed"]);
    }

    #[test]
    fn test_exact_filters_combine_with_search() {
        let filter = BookFilter {
            search: Some("the".to_string()),
            genre: Some("Science Fiction".to_string()),
            ..BookFilter::default()
        };
        assert_eq!(titles(&filter.apply(shelf())), vec!["The Dispossessed"]);

        let filter = BookFilter {
            author: Some("Octavia E. Butler".to_string()),
            genre: Some("Science Fiction".to_string()),
            ..BookFilter::default()
        };
        assert_eq!(titles(&filter.apply(shelf())), vec!["Kindred"]);

        // Exact means exact: no case folding on filters.
        let filter = BookFilter {
            series: Some("earthsea".to_string()),
            ..BookFilter::default()
        };
        assert!(filter.apply(shelf()).is_empty());
    }

    #[test]
    fn test_blank_values_do_not_filter() {
        let filter = BookFilter {
            search: Some("  ".to_string()),
            author: Some(String::new()),
            ..BookFilter::default()
        };
        assert!(filter.is_empty());
        assert_eq!(filter.apply(shelf()).len(), 4);
    }

    #[test]
    fn test_paginate_twelve_per_page() {
        let items: Vec<usize> = (1..=30).collect();

        let first = paginate(items.clone(), 1, PAGE_SIZE);
        assert_eq!(first.items, (1..=12).collect::<Vec<_>>());
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_items, 30);

        let last = paginate(items.clone(), 3, PAGE_SIZE);
        assert_eq!(last.items, (25..=30).collect::<Vec<_>>());

        assert!(paginate(items.clone(), 4, PAGE_SIZE).items.is_empty());
        assert_eq!(paginate(items.clone(), 0, 0).page, 1);
        assert_eq!(paginate(items, 0, 0).items.len(), PAGE_SIZE);
    }

    #[test]
    fn test_paginate_empty_list() {
        let page = paginate(Vec::<u8>::new(), 1, PAGE_SIZE);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }
}
