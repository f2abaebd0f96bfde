//! Error types for the linecut-core library.

use thiserror::Error;

/// Main error type for the linecut library.
#[derive(Error, Debug)]
pub enum LinecutError {
    /// ALTO layout parsing error.
    #[error("ALTO error: {0}")]
    Alto(#[from] AltoError),

    /// Image decoding or encoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while reading an ALTO layout document.
///
/// All of these are fatal to the containing document: the line sequence
/// stops at the first error and the document is abandoned.
#[derive(Error, Debug)]
pub enum AltoError {
    /// The root element carries no namespace.
    #[error("root element has no namespace")]
    MissingNamespace,

    /// A `TextLine` lacks one of its required geometry attributes.
    #[error("TextLine is missing required attribute {0}")]
    MissingAttribute(&'static str),

    /// A geometry attribute holds a non-integer value.
    #[error("invalid value for {name}: {value:?}")]
    InvalidAttribute {
        name: &'static str,
        value: String,
    },

    /// The document ended inside an open `TextLine`.
    #[error("unexpected end of document inside TextLine")]
    UnexpectedEof,

    /// Low-level XML syntax error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute syntax.
    #[error("attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// Invalid character escape in an attribute value.
    #[error("escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
}

/// Result type for the linecut library.
pub type Result<T> = std::result::Result<T, LinecutError>;
