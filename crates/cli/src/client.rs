//! `LibraryApi` over the Libris HTTP API.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use libris_catalog::{ApiError, ApiResult, Book, BookPatch, LibraryApi, LibraryStats, NewBook};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

/// HTTP client for `/api/books`
#[derive(Debug, Clone)]
pub struct HttpLibraryApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpLibraryApi {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("libris-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/api/books{}", self.base_url, path);
        tracing::debug!(%method, %url, "sending request");

        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        self.send(builder)
            .await?
            .json::<T>()
            .await
            .map_err(|err| ApiError::Transport(format!("invalid response body: {err}")))
    }
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    let (message, details) = match serde_json::from_str::<ErrorEnvelope>(&text) {
        Ok(envelope) => (envelope.error.message, envelope.error.details),
        Err(_) if text.trim().is_empty() => (status.to_string(), Vec::new()),
        Err(_) => (text, Vec::new()),
    };

    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ApiError::Validation { message, details }
        }
        StatusCode::CONFLICT => ApiError::Conflict(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
        other => ApiError::Server {
            status: other.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl LibraryApi for HttpLibraryApi {
    async fn list_books(&self) -> ApiResult<Vec<Book>> {
        self.send_json(self.request(Method::GET, "")).await
    }

    async fn get_book(&self, id: Uuid) -> ApiResult<Book> {
        self.send_json(self.request(Method::GET, &format!("/{id}")))
            .await
    }

    async fn create_book(&self, book: &NewBook) -> ApiResult<Book> {
        self.send_json(self.request(Method::POST, "").json(book))
            .await
    }

    async fn update_book(&self, id: Uuid, patch: &BookPatch) -> ApiResult<Book> {
        self.send_json(self.request(Method::PATCH, &format!("/{id}")).json(patch))
            .await
    }

    async fn delete_book(&self, id: Uuid) -> ApiResult<()> {
        self.send(self.request(Method::DELETE, &format!("/{id}")))
            .await
            .map(|_| ())
    }

    async fn stats(&self) -> ApiResult<LibraryStats> {
        self.send_json(self.request(Method::GET, "/stats")).await
    }
}
