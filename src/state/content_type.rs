/// Content type definitions for visited resources
///
/// The history file stores the content type of each resource as an integer.
use std::fmt;

/// The kind of resource last fetched from a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    /// Nothing known about the resource yet
    #[default]
    None,

    /// HTML document
    Html,

    /// Plain text document
    TextPlain,

    /// CSS stylesheet
    Css,

    /// Raster or vector image
    Image,

    /// Script resource
    JavaScript,

    /// Any other resource type
    Other,

    /// A code written by another version of the file format, kept verbatim
    Unrecognised(i32),
}

impl ContentType {
    /// Converts the content type to its history file code
    pub fn to_file_code(&self) -> i32 {
        match self {
            Self::None => 0,
            Self::Html => 1,
            Self::TextPlain => 2,
            Self::Css => 4,
            Self::Image => 8,
            Self::JavaScript => 16,
            Self::Other => 32,
            Self::Unrecognised(code) => *code,
        }
    }

    /// Parses a content type from its history file code
    ///
    /// Unknown codes are preserved so that a load/save cycle is lossless.
    pub fn from_file_code(code: i32) -> Self {
        Self::all_types()
            .into_iter()
            .find(|ct| ct.to_file_code() == code)
            .unwrap_or(Self::Unrecognised(code))
    }

    /// Maps a MIME type to a content type
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "text/html" | "application/xhtml+xml" => Self::Html,
            "text/plain" => Self::TextPlain,
            "text/css" => Self::Css,
            "application/javascript" | "text/javascript" => Self::JavaScript,
            m if m.starts_with("image/") => Self::Image,
            "" => Self::None,
            _ => Self::Other,
        }
    }

    /// Returns all named content types
    pub fn all_types() -> Vec<Self> {
        vec![
            Self::None,
            Self::Html,
            Self::TextPlain,
            Self::Css,
            Self::Image,
            Self::JavaScript,
            Self::Other,
        ]
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Html => write!(f, "html"),
            Self::TextPlain => write!(f, "text"),
            Self::Css => write!(f, "css"),
            Self::Image => write!(f, "image"),
            Self::JavaScript => write!(f, "javascript"),
            Self::Other => write!(f, "other"),
            Self::Unrecognised(code) => write!(f, "unrecognised({})", code),
        }
    }
}
