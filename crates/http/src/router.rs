//! Router builder for the Libris HTTP server

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use libris_authz::TokenGuard;
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use libris_kernel::ModuleRegistry;

use crate::error::AppError;
use crate::MakeRequestUuid;

/// Builder for the service router.
///
/// Routes and modules are collected first; middleware layers are applied in
/// [`RouterBuilder::build`] so they wrap every route regardless of call
/// order. Call [`RouterBuilder::with_auth`] before mounting modules.
pub struct RouterBuilder {
    router: Router,
    guard: TokenGuard,
    tracing: bool,
    cors: bool,
    request_id: bool,
    timeout: Option<Duration>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            guard: TokenGuard::default(),
            tracing: false,
            cors: false,
            request_id: false,
            timeout: None,
        }
    }

    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Require a bearer token on module routes
    pub fn with_auth(mut self, guard: TokenGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Mount a module's router under `/api/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        let api_path = format!("/api/{}", module_name);
        let module_router = if self.guard.is_open() {
            module_router
        } else {
            module_router.layer(middleware::from_fn_with_state(
                self.guard.clone(),
                require_token,
            ))
        };
        self.router = self.router.nest(&api_path, module_router);
        self
    }

    pub fn with_tracing(mut self) -> Self {
        self.tracing = true;
        self
    }

    pub fn with_cors(mut self) -> Self {
        self.cors = true;
        self
    }

    pub fn with_request_id(mut self) -> Self {
        self.request_id = true;
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(Duration::from_millis(timeout_ms));
        self
    }

    /// Serve the merged OpenAPI document and Swagger UI
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let openapi_spec = openapi_document(registry, !self.guard.is_open());

        // SwaggerUI needs a typed document; fall back to a bare one if a
        // module fragment does not deserialize.
        let openapi_obj: utoipa::openapi::OpenApi = serde_json::from_value(openapi_spec.clone())
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "merged OpenAPI document is not valid, serving a stub");
                utoipa::openapi::OpenApiBuilder::new()
                    .info(
                        utoipa::openapi::InfoBuilder::new()
                            .title("Libris API")
                            .version("1.0.0")
                            .build(),
                    )
                    .build()
            });

        self.router = self.router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi_obj),
        );

        // Raw JSON for external consumers
        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(openapi_spec.clone()) }),
        );

        self
    }

    pub fn build(self) -> Router {
        let mut router = self.router;

        if let Some(timeout) = self.timeout {
            router = router.layer(TimeoutLayer::new(timeout));
        }
        if self.cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }
        if self.tracing {
            router = router.layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(true))
                    .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                    .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
            );
        }
        // Outermost, so the trace span already sees the id
        if self.request_id {
            router = router
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        }

        router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn require_token(
    State(guard): State<TokenGuard>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    guard.authorize(header)?;
    Ok(next.run(request).await)
}

/// Merge module OpenAPI fragments into one document
pub fn openapi_document(registry: &ModuleRegistry, bearer_auth: bool) -> serde_json::Value {
    let mut openapi_spec = json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Libris API",
            "version": "1.0.0",
            "description": "Library inventory service"
        },
        "paths": {},
        "components": {
            "schemas": {}
        }
    });

    openapi_spec["components"]["schemas"]["ErrorResponse"] = json!({
        "type": "object",
        "properties": {
            "error": {
                "type": "object",
                "properties": {
                    "code": { "type": "string" },
                    "message": { "type": "string" },
                    "details": {
                        "type": "array",
                        "items": { "type": "object" }
                    },
                    "trace_id": { "type": "string" },
                    "timestamp": { "type": "string" }
                },
                "required": ["code", "message", "trace_id", "timestamp"]
            }
        },
        "required": ["error"]
    });

    openapi_spec["paths"]["/healthz"] = json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": {
                        "text/plain": {
                            "schema": { "type": "string" }
                        }
                    }
                }
            }
        }
    });

    if bearer_auth {
        openapi_spec["components"]["securitySchemes"] = json!({
            "bearer": { "type": "http", "scheme": "bearer" }
        });
        openapi_spec["security"] = json!([{ "bearer": [] }]);
    }

    for module in registry.modules() {
        let Some(module_spec) = module.openapi() else {
            continue;
        };

        if let Some(paths) = module_spec.get("paths").and_then(|p| p.as_object()) {
            for (path, path_item) in paths {
                let prefixed_path = if path == "/" {
                    format!("/api/{}", module.name())
                } else {
                    format!("/api/{}{}", module.name(), path)
                };
                openapi_spec["paths"][prefixed_path] = path_item.clone();
            }
        }

        if let Some(schemas) = module_spec
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(|s| s.as_object())
        {
            for (schema_name, schema_def) in schemas {
                openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
            }
        }
    }

    openapi_spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn module_router() -> Router {
        Router::new().route("/", get(|| async { "module" }))
    }

    #[tokio::test]
    async fn test_module_mounting() {
        let router = RouterBuilder::new()
            .mount_module("test", module_router())
            .build();

        let response = router
            .oneshot(Request::get("/api/test").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_auth_guard_protects_modules_only() {
        let router = RouterBuilder::new()
            .with_auth(TokenGuard::new(["letmein"]))
            .route("/healthz", get(|| async { "ok" }))
            .mount_module("test", module_router())
            .build();

        let response = router
            .clone()
            .oneshot(Request::get("/api/test").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .clone()
            .oneshot(
                Request::get("/api/test")
                    .header(AUTHORIZATION, "Bearer letmein")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_chain_sets_request_id() {
        let router = RouterBuilder::new()
            .with_tracing()
            .with_cors()
            .with_request_id()
            .with_timeout(5000)
            .route("/health", get(|| async { "ok" }))
            .build();

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let request_id = response.headers().get("x-request-id").unwrap();
        let request_id = uuid::Uuid::parse_str(request_id.to_str().unwrap()).unwrap();
        assert_eq!(request_id.get_version_num(), 7);
    }

    #[test]
    fn test_openapi_document_has_base_entries() {
        let registry = ModuleRegistry::new();
        let doc = openapi_document(&registry, true);

        assert!(doc["paths"]["/healthz"]["get"].is_object());
        assert!(doc["components"]["schemas"]["ErrorResponse"].is_object());
        assert_eq!(
            doc["components"]["securitySchemes"]["bearer"]["scheme"],
            "bearer"
        );
    }
}
