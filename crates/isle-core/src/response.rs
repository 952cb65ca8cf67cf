//! Fetched response shape

/// Content type of page and partial responses
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// HTTP response as handed over by the navigation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// 200 response carrying an HTML document
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".to_string(), HTML_CONTENT_TYPE.to_string())],
            body: body.into().into_bytes(),
        }
    }

    /// Get header value (case-insensitive name)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Value of the `Content-Type` header
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Whether the content type is HTML in UTF-8, ignoring case and whitespace
    pub fn is_html(&self) -> bool {
        self.content_type().is_some_and(|value| {
            let normalized: String = value.chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase();
            normalized == "text/html;charset=utf-8"
        })
    }

    /// Get body as text
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }
}
