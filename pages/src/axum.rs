//! Serve error pages from axum handlers.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    response::{IntoResponse, Response},
};

use crate::{ErrorData, Pages, Provider, Status};

/// A response that renders an error page.
///
/// Rendering errors are logged, and the client receives the fallback text described in
/// [Pages::render].
pub struct ErrorPage<P> {
    pages: Arc<Pages>,
    data: P,
}

impl<P: Provider> ErrorPage<P> {
    pub fn new(pages: Arc<Pages>, data: P) -> Self {
        Self { pages, data }
    }
}

impl<P: Provider> IntoResponse for ErrorPage<P> {
    fn into_response(self) -> Response {
        let (response, result) = self.pages.render_to_response(&self.data);
        if let Err(e) = result {
            tracing::error!(err = ?e, "Failed to render error page");
        }

        response.map(Body::from)
    }
}

/// A fallback handler that renders the 404 page for requests that matched no route.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use status_pages::{axum::not_found, Pages};
/// let pages = Arc::new(Pages::default());
/// let app: axum::Router = axum::Router::new().fallback(not_found).with_state(pages);
/// ```
pub async fn not_found(State(pages): State<Arc<Pages>>, request: Request) -> ErrorPage<ErrorData> {
    let data = ErrorData::new(Status::NOT_FOUND, "The requested page could not be found")
        .with_request(&request);
    ErrorPage::new(pages, data)
}
