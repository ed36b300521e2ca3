use std::io;

use crate::{Pages, Provider, ResponseSink, Status};

/// A sink whose writes always fail, like a client that went away.
#[derive(Debug, Default)]
pub struct FailingSink {
    pub status: Option<Status>,
}

impl ResponseSink for FailingSink {
    fn set_status(&mut self, status: Status) {
        self.status = Some(status);
    }

    fn write_body(&mut self, _body: &[u8]) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }
}

/// Render and return the status code and body, ignoring the result.
pub fn render_string(pages: &Pages, data: &dyn Provider) -> (u16, String) {
    let (response, _) = pages.render_to_response(data);
    let status = response.status().as_u16();
    let body = String::from_utf8(response.into_body()).expect("body should be utf-8");
    (status, body)
}
