//! Row mapping between the `book` table and catalog records.

use libris_catalog::Book;
use rusqlite::Row;
use time::OffsetDateTime;
use uuid::Uuid;

pub(crate) const BOOK_COLUMNS: &str = "id, title, author, series, publisher, genre, language, \
     year_published, total_copies, available_copies, price, created_at, updated_at";

pub(crate) fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|err| conversion_error(0, err))?;

    Ok(Book {
        id,
        title: row.get(1)?,
        author: row.get(2)?,
        series: row.get(3)?,
        publisher: row.get(4)?,
        genre: row.get(5)?,
        language: row.get(6)?,
        year_published: row.get(7)?,
        total_copies: row.get(8)?,
        available_copies: row.get(9)?,
        price: row.get(10)?,
        created_at: timestamp(row, 11)?,
        updated_at: timestamp(row, 12)?,
    })
}

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<OffsetDateTime> {
    let secs: i64 = row.get(idx)?;
    OffsetDateTime::from_unix_timestamp(secs).map_err(|err| conversion_error(idx, err))
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

/// Whole-second UTC now; storage keeps unix seconds.
pub(crate) fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}
