//! Downloadable export responses

use axum::http::header;
use axum::response::{IntoResponse, Response};

pub const CONTENT_TYPE: &str = "text/vnd.ms-excel; charset=utf-8";

/// A serialized document served as a file attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResponse {
    filename: String,
    body: Vec<u8>,
}

impl DownloadResponse {
    pub fn new(filename: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            body,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn content_disposition(&self) -> String {
        let name: String = self
            .filename
            .chars()
            .filter(|c| *c != '"' && !c.is_control())
            .collect();
        format!("attachment; filename=\"{}\"", name)
    }

    /// Header name/value pairs sent with the body
    pub fn headers(&self) -> [(header::HeaderName, String); 4] {
        [
            (header::CONTENT_TYPE, CONTENT_TYPE.to_string()),
            (header::PRAGMA, "public".to_string()),
            (header::CACHE_CONTROL, "maxage=1".to_string()),
            (header::CONTENT_DISPOSITION, self.content_disposition()),
        ]
    }
}

impl IntoResponse for DownloadResponse {
    fn into_response(self) -> Response {
        (self.headers(), self.body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_attachment_headers() {
        let response = DownloadResponse::new("people.csv", b"a;b\n".to_vec()).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], CONTENT_TYPE);
        assert_eq!(headers[header::PRAGMA], "public");
        assert_eq!(headers[header::CACHE_CONTROL], "maxage=1");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"people.csv\""
        );
    }

    #[test]
    fn test_quotes_are_stripped_from_filename() {
        let response = DownloadResponse::new("a\"b.csv", Vec::new());
        assert_eq!(response.content_disposition(), "attachment; filename=\"ab.csv\"");
    }
}
