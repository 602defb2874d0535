//! OpenAPI fragment for the books routes. Paths are relative to the module mount.

use serde_json::{json, Value};

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": { "schema": schema }
        }
    })
}

fn book_ref() -> Value {
    json!({ "$ref": "#/components/schemas/Book" })
}

fn id_param() -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string", "format": "uuid" }
    })
}

fn query_param(name: &str, kind: &str, description: &str) -> Value {
    json!({
        "name": name,
        "in": "query",
        "required": false,
        "description": description,
        "schema": { "type": kind }
    })
}

fn request_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{schema}") }
            }
        }
    })
}

pub(super) fn fragment() -> Value {
    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books ordered by title",
                    "tags": ["Books"],
                    "parameters": [
                        query_param("search", "string", "Case-insensitive match on title, author, genre, or series"),
                        query_param("author", "string", "Exact author"),
                        query_param("genre", "string", "Exact genre"),
                        query_param("series", "string", "Exact series"),
                        query_param("page", "integer", "1-based page; omit for every match"),
                        query_param("perPage", "integer", "Page size, default 12")
                    ],
                    "responses": {
                        "200": {
                            "description": "Matching books; X-Total-Count holds the match count before paging",
                            "headers": {
                                "X-Total-Count": { "schema": { "type": "integer" } }
                            },
                            "content": {
                                "application/json": {
                                    "schema": { "type": "array", "items": book_ref() }
                                }
                            }
                        },
                        "400": error_response("Malformed query string"),
                        "500": error_response("Internal server error")
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": request_body("NewBook"),
                    "responses": {
                        "201": json_response("Created book", book_ref()),
                        "400": error_response("Malformed request body"),
                        "409": error_response("Title and author already cataloged"),
                        "422": error_response("Field validation failed")
                    }
                }
            },
            "/stats": {
                "get": {
                    "summary": "Library statistics",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response(
                            "Aggregate counts",
                            json!({ "$ref": "#/components/schemas/LibraryStats" })
                        ),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Books health check",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": {
                                "text/plain": { "schema": { "type": "string" } }
                            }
                        }
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Fetch one book",
                    "tags": ["Books"],
                    "parameters": [id_param()],
                    "responses": {
                        "200": json_response("The book", book_ref()),
                        "400": error_response("Invalid id"),
                        "404": error_response("Book not found")
                    }
                },
                "patch": {
                    "summary": "Partially update a book",
                    "tags": ["Books"],
                    "parameters": [id_param()],
                    "requestBody": request_body("BookPatch"),
                    "responses": {
                        "200": json_response("Updated book", book_ref()),
                        "400": error_response("Invalid id or empty update"),
                        "404": error_response("Book not found"),
                        "409": error_response("Title and author already cataloged"),
                        "422": error_response("Merged record failed validation")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [id_param()],
                    "responses": {
                        "204": { "description": "Deleted" },
                        "400": error_response("Invalid id"),
                        "404": error_response("Book not found")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "format": "uuid" },
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "series": { "type": ["string", "null"] },
                        "publisher": { "type": ["string", "null"] },
                        "genre": { "type": ["string", "null"] },
                        "language": { "type": ["string", "null"] },
                        "yearPublished": { "type": ["integer", "null"] },
                        "totalCopies": { "type": "integer", "minimum": 0, "maximum": 2147483647 },
                        "availableCopies": { "type": "integer", "minimum": 0, "maximum": 2147483647 },
                        "price": { "type": ["number", "null"], "minimum": 0 },
                        "createdAt": { "type": "string", "format": "date-time" },
                        "updatedAt": { "type": "string", "format": "date-time" }
                    },
                    "required": [
                        "id", "title", "author", "totalCopies", "availableCopies",
                        "createdAt", "updatedAt"
                    ]
                },
                "NewBook": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "series": { "type": "string" },
                        "publisher": { "type": "string" },
                        "genre": { "type": "string" },
                        "language": { "type": "string" },
                        "yearPublished": { "type": "integer" },
                        "totalCopies": { "type": "integer", "minimum": 0, "maximum": 2147483647 },
                        "availableCopies": {
                            "type": "integer",
                            "minimum": 0,
                            "description": "Defaults to totalCopies"
                        },
                        "price": { "type": "number", "minimum": 0 }
                    },
                    "required": ["title", "author", "totalCopies"]
                },
                "BookPatch": {
                    "type": "object",
                    "description": "Omitted fields are unchanged; null clears an optional field",
                    "properties": {
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "series": { "type": ["string", "null"] },
                        "publisher": { "type": ["string", "null"] },
                        "genre": { "type": ["string", "null"] },
                        "language": { "type": ["string", "null"] },
                        "yearPublished": { "type": ["integer", "null"] },
                        "totalCopies": { "type": "integer", "minimum": 0, "maximum": 2147483647 },
                        "availableCopies": { "type": "integer", "minimum": 0, "maximum": 2147483647 },
                        "price": { "type": ["number", "null"], "minimum": 0 }
                    }
                },
                "LibraryStats": {
                    "type": "object",
                    "properties": {
                        "totalBooks": { "type": "integer" },
                        "totalCopies": { "type": "integer" },
                        "availableCopies": { "type": "integer" },
                        "topGenre": { "type": ["string", "null"] },
                        "recentAdditions": { "type": "integer" }
                    },
                    "required": [
                        "totalBooks", "totalCopies", "availableCopies", "recentAdditions"
                    ]
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_describes_every_route() {
        let doc = fragment();
        for (path, method) in [
            ("/", "get"),
            ("/", "post"),
            ("/stats", "get"),
            ("/health", "get"),
            ("/{id}", "get"),
            ("/{id}", "patch"),
            ("/{id}", "delete"),
        ] {
            assert!(doc["paths"][path][method].is_object(), "{method} {path}");
        }
        for schema in ["Book", "NewBook", "BookPatch", "LibraryStats"] {
            assert!(doc["components"]["schemas"][schema].is_object(), "{schema}");
        }
    }
}
