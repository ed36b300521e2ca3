use std::io;

use bytes::BytesMut;

use crate::Status;

/// Somewhere to write a rendered page.
pub trait ResponseSink {
    fn set_status(&mut self, status: Status);
    fn write_body(&mut self, body: &[u8]) -> io::Result<()>;
}

impl ResponseSink for http::Response<Vec<u8>> {
    fn set_status(&mut self, status: Status) {
        *self.status_mut() = status.to_http();
    }

    fn write_body(&mut self, body: &[u8]) -> io::Result<()> {
        self.body_mut().extend_from_slice(body);
        Ok(())
    }
}

impl ResponseSink for http::Response<BytesMut> {
    fn set_status(&mut self, status: Status) {
        *self.status_mut() = status.to_http();
    }

    fn write_body(&mut self, body: &[u8]) -> io::Result<()> {
        self.body_mut().extend_from_slice(body);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn http_response_sink() {
        let mut res = http::Response::new(BytesMut::new());
        res.set_status(Status(418));
        res.write_body(b"short and ").unwrap();
        res.write_body(b"stout").unwrap();

        assert_eq!(res.status(), http::StatusCode::IM_A_TEAPOT);
        assert_eq!(&res.body()[..], b"short and stout");
    }
}
