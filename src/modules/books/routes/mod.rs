//! HTTP handlers for the Books module.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use libris_catalog::{paginate, Book, BookFilter, BookPatch, LibraryStats, NewBook, PAGE_SIZE};
use libris_http::error::AppError;
use serde::Deserialize;
use uuid::Uuid;

use super::service::BookService;

pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/stats", get(library_stats))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_book).patch(update_book).delete(delete_book),
        )
        .with_state(service)
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::bad_request(format!("invalid book id '{raw}'")))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

/// Query string of `GET /api/books`; without `page` every match is returned.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub search: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub series: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl ListQuery {
    fn filter(&self) -> BookFilter {
        BookFilter {
            search: self.search.clone(),
            author: self.author.clone(),
            genre: self.genre.clone(),
            series: self.series.clone(),
        }
    }
}

async fn list_books(
    State(service): State<BookService>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<([(&'static str, String); 1], Json<Vec<Book>>), AppError> {
    let Query(query) = query.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    let books = query.filter().apply(service.list().await?);
    let total = books.len();
    let books = match query.page {
        Some(page) => paginate(books, page, query.per_page.unwrap_or(PAGE_SIZE)).items,
        None => books,
    };

    Ok(([("x-total-count", total.to_string())], Json(books)))
}

async fn create_book(
    State(service): State<BookService>,
    body: Result<Json<NewBook>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let new_book = json_body(body)?;
    let created = service.create(new_book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(service.get(id).await?))
}

async fn update_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
    body: Result<Json<BookPatch>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let id = parse_id(&id)?;
    let patch = json_body(body)?;
    if patch.is_empty() {
        return Err(AppError::bad_request("update must change at least one field"));
    }
    Ok(Json(service.update(id, patch).await?))
}

async fn delete_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn library_stats(State(service): State<BookService>) -> Result<Json<LibraryStats>, AppError> {
    Ok(Json(service.stats().await?))
}
