//! isle HTML
//!
//! HTML5 parsing built on html5ever, plus the serializer and escaping rules
//! shared by the server renderer.

mod parser;
mod serialize;

pub use parser::HtmlParser;
pub use serialize::{
    escape_attr, escape_text, inner_html, is_raw_text_element, is_void_element, outer_html,
};
pub use isle_dom::Document;

/// Parse an HTML string into a `Document`
pub fn parse(html: &str) -> Result<Document, ParseError> {
    HtmlParser::new().parse(html)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("DOM construction failed: {0}")]
    Dom(#[from] isle_dom::DomError),
}
