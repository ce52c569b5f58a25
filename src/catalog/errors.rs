use std::{error::Error, fmt, io};

#[derive(Debug)]
pub enum CatalogError {
    IoError(io::Error),
    ReqwestError(reqwest::Error),
    HttpForbidden,
    /// A TLE set failed to parse; carries the parser's message.
    TleParse(String),
    EmptyCatalog,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::IoError(e) => write!(f, "I/O error: {}", e),
            CatalogError::ReqwestError(e) => write!(f, "Request error: {}", e),
            CatalogError::HttpForbidden => write!(f, "HTTP 403 Forbidden"),
            CatalogError::TleParse(msg) => write!(f, "TLE parsing error: {}", msg),
            CatalogError::EmptyCatalog => write!(f, "catalog contains no element sets"),
        }
    }
}

impl Error for CatalogError {}

// Implement `From<T>` conversions for automatic error mapping
impl From<io::Error> for CatalogError {
    fn from(err: io::Error) -> Self {
        CatalogError::IoError(err)
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::ReqwestError(err)
    }
}
