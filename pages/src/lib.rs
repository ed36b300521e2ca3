//! Render HTML error pages using [tera] templates.
//!
//! Whenever a page needs to be served, a template named by the status code (e.g. `"404"`) is
//! looked up. A generic template named `"error"` is used when there is no status-specific
//! template, and a built-in placeholder page is used when neither exists or when no templates
//! were supplied at all.
//!
//! Templates see the values `request`, `status_code`, `status_text`, `message`, `summary` and,
//! for [ErrorData], an optional `data` value.
//!
//! ```
//! use status_pages::{ErrorData, Pages, Status};
//!
//! let mut tera = tera::Tera::default();
//! tera.add_raw_template("error", "<h1>{{ status_code }} {{ status_text }}</h1>").unwrap();
//! let pages = Pages::new(tera);
//!
//! let (response, result) = pages.render_to_response(&ErrorData::new(Status(400), "Missing token"));
//! result.unwrap();
//! assert_eq!(response.status(), 400);
//! assert_eq!(response.body(), b"<h1>400 Bad Request</h1>");
//! ```

use std::sync::Arc;

use error_stack::{Report, ResultExt};
use tracing::instrument;

#[cfg(feature = "axum")]
pub mod axum;
pub mod config;
pub mod data;
pub mod error;
pub mod pool;
pub mod response;
pub mod select;
mod status;
#[cfg(test)]
mod testing;

pub use config::{PagesBuilder, PagesConfig};
pub use data::{ErrorData, Provider, RequestInfo};
pub use error::Error;
use pool::BufferPool;
pub use response::ResponseSink;
pub use select::{select, Template, TemplateSet};
pub use status::Status;
pub use tera;

/// Sent to the client instead of the page when the template fails to render, followed by the
/// summary of the original error. It's not pretty, but it avoids sending a partial response.
pub const RENDER_ERROR_PREFIX: &str = "500 Internal server error. While handling:\n";

/// Renders error pages from a set of templates.
pub struct Pages {
    templates: Option<Arc<dyn TemplateSet + Send + Sync>>,
    pool: BufferPool,
}

impl Pages {
    /// Use these templates, looked up by bare name (`"404"`, `"error"`). Output from every
    /// template is HTML-escaped, whatever its name.
    ///
    /// [tera::Tera::new] registers templates by file name (`404.html`), which will never match.
    /// Use [config::load_template_dir] or [PagesBuilder::with_template_dir] to load a directory
    /// of templates named by file stem instead.
    pub fn new(mut templates: tera::Tera) -> Self {
        templates.autoescape_on(vec![""]);
        Self::with_template_set(templates)
    }

    /// Use a custom template registry. Escaping is up to the registry.
    pub fn with_template_set(templates: impl TemplateSet + Send + Sync + 'static) -> Self {
        Self::from_parts(Some(Arc::new(templates)), BufferPool::default())
    }

    pub fn builder() -> PagesBuilder {
        PagesBuilder::new()
    }

    pub(crate) fn from_parts(
        templates: Option<Arc<dyn TemplateSet + Send + Sync>>,
        pool: BufferPool,
    ) -> Self {
        Self { templates, pool }
    }

    /// The template that will be used for this status code.
    pub fn template(&self, status: Status) -> Template<'_> {
        let templates = self
            .templates
            .as_deref()
            .map(|t| t as &dyn TemplateSet);
        select(templates, status)
    }

    /// Render the page for `data.status()` and write it to `out`.
    ///
    /// The page is rendered into a buffer first, so a failing template never results in a
    /// partial page. In that case a 500 status with [RENDER_ERROR_PREFIX] and the summary of
    /// `data` is written instead, and [Error::RenderTemplate] is returned. A failure writing the
    /// finished page returns [Error::WriteResponse].
    #[instrument(
        name = "status_pages.render",
        skip_all,
        fields(status = data.status().as_u16(), template = tracing::field::Empty)
    )]
    pub fn render(&self, out: &mut dyn ResponseSink, data: &dyn Provider) -> Result<(), Report<Error>> {
        let template = self.template(data.status());
        tracing::Span::current().record("template", template.name());

        let mut buf = self.pool.checkout();
        if let Err(e) = template.render(data, &mut buf) {
            let report = Report::new(e)
                .change_context(Error::RenderTemplate)
                .attach_printable(format!("Template {}", template.name()));

            out.set_status(Status::INTERNAL_SERVER_ERROR);
            let fallback = format!("{RENDER_ERROR_PREFIX}{}", data.summary());
            let report = match out.write_body(fallback.as_bytes()) {
                Ok(()) => report,
                Err(write_err) => {
                    report.attach_printable(format!("Sending fallback page also failed: {write_err}"))
                }
            };

            return Err(report);
        }

        out.set_status(data.status());
        out.write_body(&buf).change_context(Error::WriteResponse)?;
        Ok(())
    }

    /// Render into a new [http::Response] with an HTML content type. The response is usable
    /// even when an error is returned; see [Pages::render].
    pub fn render_to_response(
        &self,
        data: &dyn Provider,
    ) -> (http::Response<Vec<u8>>, Result<(), Report<Error>>) {
        let mut response = http::Response::new(Vec::new());
        let result = self.render(&mut response, data);

        let content_type = if result.is_ok() {
            "text/html; charset=utf-8"
        } else {
            "text/plain; charset=utf-8"
        };
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static(content_type),
        );

        (response, result)
    }
}

impl Default for Pages {
    /// Pages without any templates, which always use the built-in page.
    fn default() -> Self {
        Self::from_parts(None, BufferPool::default())
    }
}

impl std::fmt::Debug for Pages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pages")
            .field("has_templates", &self.templates.is_some())
            .field("pool", &self.pool)
            .finish()
    }
}
