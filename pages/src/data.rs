use std::fmt;

use serde::Serialize;

use crate::Status;

/// The parts of the incoming request that templates can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestInfo {
    pub method: String,
    pub uri: String,
    pub path: String,
    pub query: Option<String>,
    /// The value of the `X-Request-Id` header, if one was sent.
    pub request_id: Option<String>,
}

impl RequestInfo {
    fn build(method: &http::Method, uri: &http::Uri, headers: &http::HeaderMap) -> Self {
        let request_id = headers
            .get("X-Request-Id")
            .and_then(|s| s.to_str().ok())
            .map(|s| s.to_string());

        Self {
            method: method.to_string(),
            uri: uri.to_string(),
            path: uri.path().to_string(),
            query: uri.query().map(|q| q.to_string()),
            request_id,
        }
    }
}

impl<B> From<&http::Request<B>> for RequestInfo {
    fn from(req: &http::Request<B>) -> Self {
        Self::build(req.method(), req.uri(), req.headers())
    }
}

impl From<&http::request::Parts> for RequestInfo {
    fn from(parts: &http::request::Parts) -> Self {
        Self::build(&parts.method, &parts.uri, &parts.headers)
    }
}

/// Data that can be rendered into an error page.
///
/// [ErrorData] covers the common case. Implement this trait on your own type, usually wrapping
/// an [ErrorData], to make extra values available to your templates through
/// [Provider::extend_context].
pub trait Provider {
    fn request(&self) -> Option<&RequestInfo>;
    fn status(&self) -> Status;
    fn message(&self) -> &str;

    /// The status code, status text and message in a single string, e.g.
    /// `400 Bad Request: Parsing form data`.
    fn summary(&self) -> String {
        let status = self.status();
        format!("{} {}: {}", status.as_u16(), status.text(), self.message())
    }

    /// Add more values to the template context.
    fn extend_context(&self, _context: &mut tera::Context) {}
}

/// Build the context passed to a template.
pub fn template_context(data: &dyn Provider) -> tera::Context {
    let status = data.status();

    let mut context = tera::Context::new();
    context.insert("request", &data.request());
    context.insert("status_code", &status.as_u16());
    context.insert("status_text", status.text());
    context.insert("message", data.message());
    context.insert("summary", &data.summary());
    data.extend_context(&mut context);
    context
}

/// The standard error page data.
#[derive(Debug, Clone)]
pub struct ErrorData {
    pub request: Option<RequestInfo>,
    pub status: Status,
    pub message: String,
    /// Optional, additional data for the template. Exposed as `data`.
    pub data: Option<serde_json::Value>,
}

impl ErrorData {
    pub fn new(status: impl Into<Status>, message: impl Into<String>) -> Self {
        Self {
            request: None,
            status: status.into(),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_request(mut self, request: impl Into<RequestInfo>) -> Self {
        self.request = Some(request.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl Provider for ErrorData {
    fn request(&self) -> Option<&RequestInfo> {
        self.request.as_ref()
    }

    fn status(&self) -> Status {
        self.status
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn extend_context(&self, context: &mut tera::Context) {
        if let Some(data) = &self.data {
            context.insert("data", data);
        }
    }
}

impl fmt::Display for ErrorData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn summary_known_code() {
        let data = ErrorData::new(Status(400), "Parsing form data");
        assert_eq!(data.summary(), "400 Bad Request: Parsing form data");
        assert_eq!(data.to_string(), "400 Bad Request: Parsing form data");
    }

    #[test]
    fn summary_unknown_code() {
        assert_eq!(ErrorData::new(Status(900), "Odd").summary(), "900 : Odd");
        assert_eq!(
            ErrorData::new(Status(0), "Something's missing").summary(),
            "0 : Something's missing"
        );
    }

    #[test]
    fn request_info_from_request() {
        let req = http::Request::builder()
            .method("GET")
            .uri("http://example.com/foo?a=1")
            .header("X-Request-Id", "abc")
            .body(())
            .unwrap();

        let info = RequestInfo::from(&req);
        assert_eq!(info.method, "GET");
        assert_eq!(info.path, "/foo");
        assert_eq!(info.query.as_deref(), Some("a=1"));
        assert_eq!(info.request_id.as_deref(), Some("abc"));

        let (parts, _) = req.into_parts();
        assert_eq!(RequestInfo::from(&parts), info);
    }

    #[test]
    fn context_contents() {
        let req = http::Request::get("http://example.com/foo").body(()).unwrap();
        let data = ErrorData::new(Status(404), "Foo bar")
            .with_request(&req)
            .with_data(json!({ "id": 5 }));

        let context = template_context(&data).into_json();
        assert_eq!(context["status_code"], json!(404));
        assert_eq!(context["status_text"], json!("Not Found"));
        assert_eq!(context["message"], json!("Foo bar"));
        assert_eq!(context["summary"], json!("404 Not Found: Foo bar"));
        assert_eq!(context["request"]["path"], json!("/foo"));
        assert_eq!(context["data"]["id"], json!(5));
    }

    #[test]
    fn context_without_request_or_data() {
        let context = template_context(&ErrorData::new(Status(500), "x")).into_json();
        assert_eq!(context["request"], serde_json::Value::Null);
        assert!(context.get("data").is_none());
    }

    struct WithRequestId {
        inner: ErrorData,
        req_id: u32,
    }

    impl Provider for WithRequestId {
        fn request(&self) -> Option<&RequestInfo> {
            self.inner.request()
        }

        fn status(&self) -> Status {
            self.inner.status()
        }

        fn message(&self) -> &str {
            self.inner.message()
        }

        fn extend_context(&self, context: &mut tera::Context) {
            self.inner.extend_context(context);
            context.insert("req_id", &self.req_id);
        }
    }

    #[test]
    fn custom_provider_extends_context() {
        let data = WithRequestId {
            inner: ErrorData::new(Status(500), "DB connection"),
            req_id: 666,
        };

        assert_eq!(data.summary(), "500 Internal Server Error: DB connection");
        let context = template_context(&data).into_json();
        assert_eq!(context["req_id"], json!(666));
    }
}
