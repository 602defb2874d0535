//! SQL for the `book` table.
//!
//! Every write validates the full record before touching storage; partial
//! updates are merged onto the stored row inside one transaction so the
//! copy-count invariant is checked against what is actually persisted.

use libris_catalog::{
    validation::{validate_book, validate_new_book},
    Book, BookPatch, LibraryStats, NewBook,
};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::models::{book_from_row, BOOK_COLUMNS};
use super::service::BookError;

/// Window counted as "recent" on the statistics cards.
pub const RECENT_WINDOW: Duration = Duration::days(30);

pub(crate) const MIGRATION_001: &str = r#"
CREATE TABLE book (
    id               TEXT PRIMARY KEY NOT NULL,
    title            TEXT NOT NULL CHECK (length(trim(title)) > 0),
    author           TEXT NOT NULL CHECK (length(trim(author)) > 0),
    series           TEXT,
    publisher        TEXT,
    genre            TEXT,
    language         TEXT,
    year_published   INTEGER,
    total_copies     INTEGER NOT NULL
        CHECK (total_copies >= 0 AND total_copies <= 2147483647),
    available_copies INTEGER NOT NULL
        CHECK (available_copies >= 0 AND available_copies <= total_copies),
    price            REAL CHECK (price IS NULL OR price >= 0),
    created_at       INTEGER NOT NULL,
    updated_at       INTEGER NOT NULL
);
CREATE UNIQUE INDEX book_title_author_unique ON book (title, author);
CREATE INDEX book_genre_idx ON book (genre);
"#;

pub(crate) fn insert(
    conn: &Connection,
    book: &NewBook,
    now: OffsetDateTime,
) -> Result<Book, BookError> {
    validate_new_book(book)?;

    let created = Book {
        id: Uuid::now_v7(),
        title: book.title.trim().to_string(),
        author: book.author.trim().to_string(),
        series: book.series.clone(),
        publisher: book.publisher.clone(),
        genre: book.genre.clone(),
        language: book.language.clone(),
        year_published: book.year_published,
        total_copies: book.total_copies,
        available_copies: book.initial_available(),
        price: book.price,
        created_at: now,
        updated_at: now,
    };

    conn.execute(
        &format!(
            "INSERT INTO book ({BOOK_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        ),
        params![
            created.id.to_string(),
            created.title,
            created.author,
            created.series,
            created.publisher,
            created.genre,
            created.language,
            created.year_published,
            created.total_copies,
            created.available_copies,
            created.price,
            created.created_at.unix_timestamp(),
            created.updated_at.unix_timestamp(),
        ],
    )
    .map_err(|err| duplicate_or_db(err, &created.title, &created.author))?;

    Ok(created)
}

pub(crate) fn get(conn: &Connection, id: Uuid) -> Result<Option<Book>, BookError> {
    let book = conn
        .query_row(
            &format!("SELECT {BOOK_COLUMNS} FROM book WHERE id = ?1"),
            params![id.to_string()],
            book_from_row,
        )
        .optional()?;
    Ok(book)
}

pub(crate) fn list(conn: &Connection) -> Result<Vec<Book>, BookError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOK_COLUMNS} FROM book
         ORDER BY title COLLATE NOCASE ASC, author COLLATE NOCASE ASC"
    ))?;
    let books = stmt
        .query_map([], book_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(books)
}

pub(crate) fn update(
    conn: &mut Connection,
    id: Uuid,
    patch: &BookPatch,
    now: OffsetDateTime,
) -> Result<Book, BookError> {
    let tx = conn.transaction()?;

    let current = get(&tx, id)?.ok_or(BookError::NotFound(id))?;
    let mut next = current.merged(patch);
    next.title = next.title.trim().to_string();
    next.author = next.author.trim().to_string();
    validate_book(&next)?;
    next.updated_at = now;

    tx.execute(
        "UPDATE book
         SET title = ?2,
             author = ?3,
             series = ?4,
             publisher = ?5,
             genre = ?6,
             language = ?7,
             year_published = ?8,
             total_copies = ?9,
             available_copies = ?10,
             price = ?11,
             updated_at = ?12
         WHERE id = ?1",
        params![
            id.to_string(),
            next.title,
            next.author,
            next.series,
            next.publisher,
            next.genre,
            next.language,
            next.year_published,
            next.total_copies,
            next.available_copies,
            next.price,
            next.updated_at.unix_timestamp(),
        ],
    )
    .map_err(|err| duplicate_or_db(err, &next.title, &next.author))?;
    tx.commit()?;

    Ok(next)
}

pub(crate) fn delete(conn: &Connection, id: Uuid) -> Result<(), BookError> {
    let removed = conn.execute("DELETE FROM book WHERE id = ?1", params![id.to_string()])?;
    if removed == 0 {
        return Err(BookError::NotFound(id));
    }
    Ok(())
}

pub(crate) fn stats(conn: &Connection, now: OffsetDateTime) -> Result<LibraryStats, BookError> {
    let (total_books, total_copies, available_copies) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(total_copies), 0), COALESCE(SUM(available_copies), 0)
         FROM book",
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        },
    )?;

    let top_genre = conn
        .query_row(
            "SELECT genre FROM book
             WHERE genre IS NOT NULL AND length(trim(genre)) > 0
             GROUP BY genre
             ORDER BY COUNT(*) DESC, genre ASC
             LIMIT 1",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?;

    let since = (now - RECENT_WINDOW).unix_timestamp();
    let recent_additions = conn.query_row(
        "SELECT COUNT(*) FROM book WHERE created_at >= ?1",
        params![since],
        |row| row.get::<_, i64>(0),
    )?;

    Ok(LibraryStats {
        total_books,
        total_copies,
        available_copies,
        top_genre,
        recent_additions,
    })
}

fn duplicate_or_db(err: rusqlite::Error, title: &str, author: &str) -> BookError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.code == ErrorCode::ConstraintViolation
            && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        {
            return BookError::Duplicate {
                title: title.to_string(),
                author: author.to_string(),
            };
        }
    }
    err.into()
}
