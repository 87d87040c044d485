//! HTTP handlers for the books module.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use bookshelf_http::{error::AppError, response::ApiResponse};
use serde::Serialize;

use super::error::BookError;
use super::models::{Book, BookFilter, BookPayload, BookSummary, ListQuery};
use super::registry::BookRegistry;

type SharedRegistry = State<Arc<BookRegistry>>;

/// Mutating request, used to pick the wording of its failure messages.
#[derive(Debug, Clone, Copy)]
enum Action {
    Add,
    Update,
    Delete,
}

impl Action {
    fn failure(self) -> &'static str {
        match self {
            Action::Add => "Gagal menambahkan buku",
            Action::Update => "Gagal memperbarui buku",
            Action::Delete => "Buku gagal dihapus",
        }
    }

    fn reject(self, err: BookError) -> AppError {
        match err {
            BookError::MissingField(_) => {
                AppError::validation(format!("{}. Mohon isi nama buku", self.failure()))
            }
            BookError::InvalidRange { .. } => AppError::validation(format!(
                "{}. readPage tidak boleh lebih besar dari pageCount",
                self.failure()
            )),
            BookError::NotFound(_) => {
                AppError::not_found(format!("{}. Id tidak ditemukan", self.failure()))
            }
            BookError::InternalInconsistency(id) => {
                tracing::error!(book_id = %id, "book not visible after insertion");
                AppError::server("Buku gagal ditambahkan")
            }
        }
    }

    fn payload(
        self,
        payload: Result<Json<BookPayload>, JsonRejection>,
    ) -> Result<BookPayload, AppError> {
        payload.map(|Json(payload)| payload).map_err(|rejection| {
            AppError::bad_request(format!("{}. {}", self.failure(), rejection.body_text()))
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Created {
    book_id: String,
}

#[derive(Debug, Serialize)]
struct BookList {
    books: Vec<BookSummary>,
}

#[derive(Debug, Serialize)]
struct BookDetail {
    book: Book,
}

pub fn router(registry: Arc<BookRegistry>) -> Router {
    Router::new()
        .route("/", post(create_book).get(list_books))
        .route("/health", get(health_check))
        .route(
            "/{bookId}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(registry)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn create_book(
    State(registry): SharedRegistry,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<ApiResponse<Created>, AppError> {
    let payload = Action::Add.payload(payload)?;
    let book_id = registry
        .create(payload)
        .map_err(|e| Action::Add.reject(e))?;

    tracing::info!(book_id = %book_id, "book added");
    Ok(ApiResponse::created("Buku berhasil ditambahkan", Created { book_id }))
}

async fn list_books(
    State(registry): SharedRegistry,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResponse<BookList> {
    // A query string that does not parse (e.g. a repeated key) filters nothing
    let query = query.map(|Query(query)| query).unwrap_or_else(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "ignoring unparsable book query");
        ListQuery::default()
    });
    let filter = BookFilter::from(query);
    let books = registry.list(&filter);

    tracing::debug!(?filter, count = books.len(), "listing books");
    ApiResponse::ok(BookList { books })
}

async fn get_book(
    State(registry): SharedRegistry,
    Path(book_id): Path<String>,
) -> Result<ApiResponse<BookDetail>, AppError> {
    let book = registry
        .get(&book_id)
        .map_err(|_| AppError::not_found("Buku tidak ditemukan"))?;

    Ok(ApiResponse::ok(BookDetail { book }))
}

async fn update_book(
    State(registry): SharedRegistry,
    Path(book_id): Path<String>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let payload = Action::Update.payload(payload)?;
    registry
        .update(&book_id, payload)
        .map_err(|e| Action::Update.reject(e))?;

    tracing::info!(book_id = %book_id, "book updated");
    Ok(ApiResponse::message("Buku berhasil diperbarui"))
}

async fn delete_book(
    State(registry): SharedRegistry,
    Path(book_id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    registry
        .delete(&book_id)
        .map_err(|e| Action::Delete.reject(e))?;

    tracing::info!(book_id = %book_id, "book deleted");
    Ok(ApiResponse::message("Buku berhasil dihapus"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::IntoResponse;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn book(name: &str, page_count: u32, read_page: u32, reading: bool) -> Value {
        json!({
            "name": name,
            "year": 2010,
            "author": "John Doe",
            "summary": "Lorem ipsum dolor sit amet",
            "publisher": "Dicoding Indonesia",
            "pageCount": page_count,
            "readPage": read_page,
            "reading": reading
        })
    }

    fn app() -> Router {
        router(Arc::new(BookRegistry::new()))
    }

    fn names(body: &Value) -> Vec<String> {
        body["data"]["books"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn create_then_get_returns_full_record() {
        let app = app();

        let payload = book("Buku A", 100, 100, true);
        let (status, body) = send(&app, Method::POST, "/", Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Buku berhasil ditambahkan");
        let id = body["data"]["bookId"].as_str().unwrap().to_string();

        let (status, body) = send(&app, Method::GET, &format!("/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let stored = &body["data"]["book"];
        assert_eq!(stored["id"], id.as_str());
        assert_eq!(stored["name"], "Buku A");
        assert_eq!(stored["pageCount"], 100);
        assert_eq!(stored["readPage"], 100);
        assert_eq!(stored["finished"], true);
        assert_eq!(stored["reading"], true);
        assert_eq!(stored["insertedAt"], stored["updatedAt"]);
    }

    #[tokio::test]
    async fn create_without_name_fails() {
        let app = app();
        let mut payload = book("", 10, 1, false);
        payload.as_object_mut().unwrap().remove("name");

        let (status, body) = send(&app, Method::POST, "/", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"status": "fail", "message": "Gagal menambahkan buku. Mohon isi nama buku"})
        );
    }

    #[tokio::test]
    async fn create_with_read_page_overflow_fails() {
        let payload = book("Buku A", 10, 11, false);
        let (status, body) = send(&app(), Method::POST, "/", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Gagal menambahkan buku. readPage tidak boleh lebih besar dari pageCount"
        );
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let payload = json!({"name": "A", "pageCount": -1});
        let (status, body) = send(&app(), Method::POST, "/", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "fail");
    }

    #[tokio::test]
    async fn null_fields_are_accepted() {
        let app = app();
        let payload = json!({
            "name": "Buku A",
            "year": null,
            "pageCount": null,
            "readPage": null,
            "reading": null
        });

        let (status, body) = send(&app, Method::POST, "/", Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["data"]["bookId"].as_str().unwrap().to_string();

        let (_, body) = send(&app, Method::GET, &format!("/{id}"), None).await;
        assert_eq!(body["data"]["book"]["pageCount"], 0);
        assert_eq!(body["data"]["book"]["reading"], false);
    }

    #[tokio::test]
    async fn list_applies_filters() {
        let app = app();
        send(&app, Method::POST, "/", Some(book("Dunia", 100, 10, true))).await;
        send(&app, Method::POST, "/", Some(book("Dunia Lain", 100, 100, false))).await;

        let (_, body) = send(&app, Method::GET, "/?reading=1", None).await;
        assert_eq!(names(&body), ["Dunia"]);
        let (_, body) = send(&app, Method::GET, "/?finished=true", None).await;
        assert_eq!(names(&body), ["Dunia Lain"]);
        let (_, body) = send(&app, Method::GET, "/?name=dunia", None).await;
        assert_eq!(names(&body), ["Dunia", "Dunia Lain"]);
        let (status, body) = send(&app, Method::GET, "/?reading=perhaps", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(names(&body).len(), 2);
    }

    #[tokio::test]
    async fn list_with_repeated_key_still_succeeds() {
        let app = app();
        send(&app, Method::POST, "/", Some(book("Dunia", 100, 10, true))).await;
        send(&app, Method::POST, "/", Some(book("Sejarah", 100, 0, false))).await;

        let (status, body) = send(&app, Method::GET, "/?reading=1&reading=0", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(names(&body), ["Dunia", "Sejarah"]);
    }

    #[tokio::test]
    async fn list_shows_summary_fields_only() {
        let app = app();
        send(&app, Method::POST, "/", Some(book("Buku A", 10, 0, false))).await;

        let (status, body) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        let entry = body["data"]["books"][0].as_object().unwrap();
        let mut keys: Vec<_> = entry.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["id", "name", "publisher"]);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_ids() {
        let app = app();

        let payload = book("Buku", 1, 0, false);
        let (status, body) = send(&app, Method::PUT, "/nope", Some(payload)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Gagal memperbarui buku. Id tidak ditemukan");

        let payload = book("", 1, 0, false);
        let (status, body) = send(&app, Method::PUT, "/nope", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Gagal memperbarui buku. Mohon isi nama buku");

        let (status, body) = send(&app, Method::DELETE, "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Buku gagal dihapus. Id tidak ditemukan");

        let (status, body) = send(&app, Method::GET, "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"status": "fail", "message": "Buku tidak ditemukan"})
        );
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        let app = app();
        let payload = book("Buku A", 10, 0, false);
        let (_, body) = send(&app, Method::POST, "/", Some(payload)).await;
        let uri = format!("/{}", body["data"]["bookId"].as_str().unwrap());

        let payload = book("Buku B", 50, 50, true);
        let (status, body) = send(&app, Method::PUT, &uri, Some(payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "success", "message": "Buku berhasil diperbarui"})
        );

        let (_, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(body["data"]["book"]["name"], "Buku B");
        assert_eq!(body["data"]["book"]["readPage"], 50);
        assert_eq!(body["data"]["book"]["finished"], false);
    }

    #[tokio::test]
    async fn delete_reports_success_message() {
        let app = app();
        let payload = book("Buku A", 10, 0, false);
        let (_, body) = send(&app, Method::POST, "/", Some(payload)).await;
        let uri = format!("/{}", body["data"]["bookId"].as_str().unwrap());

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "success", "message": "Buku berhasil dihapus"})
        );
    }

    #[tokio::test]
    async fn inconsistency_renders_server_error() {
        let response = Action::Add
            .reject(BookError::InternalInconsistency("abc".to_string()))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({"status": "error", "message": "Buku gagal ditambahkan"})
        );
    }

    #[tokio::test]
    async fn health_route_is_not_a_book_lookup() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
