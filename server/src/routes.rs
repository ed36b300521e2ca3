use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, Query, Request, State},
    http::StatusCode,
    response::IntoResponse,
    routing, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use status_pages::{axum::ErrorPage, ErrorData, Pages};

#[derive(Clone, FromRef)]
pub struct ServerState {
    pub pages: Arc<Pages>,
}

async fn home() -> impl IntoResponse {
    "Try /status/404 or any unknown path."
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

#[derive(Deserialize)]
struct StatusQuery {
    message: Option<String>,
}

/// Render the error page for any status code.
async fn status_page(
    State(pages): State<Arc<Pages>>,
    Path(code): Path<u16>,
    Query(query): Query<StatusQuery>,
    request: Request,
) -> ErrorPage<ErrorData> {
    let message = query
        .message
        .unwrap_or_else(|| "Something went wrong".to_string());
    let data = ErrorData::new(code, message).with_request(&request);
    ErrorPage::new(pages, data)
}

pub fn create_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", routing::get(home))
        .route("/healthz", routing::get(healthz))
        .route("/status/:code", routing::get(status_page))
        .fallback(status_pages::axum::not_found)
        .with_state(state)
}

#[cfg(test)]
mod test {
    use axum::body::{to_bytes, Body};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        let mut tera = status_pages::tera::Tera::default();
        tera.add_raw_templates([
            ("404", "Missing {{ request.path }}"),
            ("error", "{{ summary }}"),
        ])
        .unwrap();

        create_routes(ServerState {
            pages: Arc::new(Pages::new(tera)),
        })
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(http::Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn unknown_path_renders_404_page() {
        let (status, body) = get(app(), "/no/such/page").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Missing &#x2F;no&#x2F;such&#x2F;page");
    }

    #[tokio::test]
    async fn status_route_uses_generic_template() {
        let (status, body) = get(app(), "/status/503?message=Maintenance").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, "503 Service Unavailable: Maintenance");
    }

    #[tokio::test]
    async fn message_is_escaped() {
        let (status, body) = get(app(), "/status/400?message=%3Cscript%3Ealert(1)%3C%2Fscript%3E").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            "400 Bad Request: &lt;script&gt;alert(1)&lt;&#x2F;script&gt;"
        );
    }

    #[tokio::test]
    async fn healthz_still_works() {
        let (status, body) = get(app(), "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn bundled_templates() {
        let pages = Pages::builder()
            .with_template_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/templates"))
            .build()
            .unwrap();
        let app = create_routes(ServerState {
            pages: Arc::new(pages),
        });

        let (status, body) = get(app.clone(), "/nothing-here").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("<title>404 Not Found: The requested page could not be found</title>"));
        assert!(body.contains("could not be found."));

        let (status, body) = get(app.clone(), "/status/500?message=DB%20connection").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("<h1>Snap!</h1>"));
        assert!(body.contains("Error: DB connection while serving"));

        let (status, body) = get(app, "/status/418").await;
        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert!(body.contains("This is a generic error page"));
        assert!(body.contains("<h1>418 I&#x27;m a teapot</h1>"));
    }
}
