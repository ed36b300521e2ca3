use std::fmt;

use serde::{Deserialize, Serialize};

/// An HTTP status code, as passed to [crate::Pages::render].
///
/// Unlike [http::StatusCode] this accepts any integer, so that a template can still be
/// rendered for codes that `http` would reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(pub u16);

impl Status {
    pub const BAD_REQUEST: Status = Status(400);
    pub const NOT_FOUND: Status = Status(404);
    pub const INTERNAL_SERVER_ERROR: Status = Status(500);

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// The standard reason phrase for this code, or an empty string if the code is unknown.
    pub fn text(&self) -> &'static str {
        http::StatusCode::from_u16(self.0)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
    }

    /// The decimal code, used as the template name.
    pub fn code_string(&self) -> String {
        self.0.to_string()
    }

    /// Convert to an [http::StatusCode]. Codes outside of 100..=999 become 500.
    pub fn to_http(&self) -> http::StatusCode {
        http::StatusCode::from_u16(self.0).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Displays the reason phrase, not the number.
impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl From<u16> for Status {
    fn from(value: u16) -> Self {
        Status(value)
    }
}

impl From<http::StatusCode> for Status {
    fn from(value: http::StatusCode) -> Self {
        Status(value.as_u16())
    }
}
