use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovHubError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Failure to retrieve a single project's report document.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Report fetch failed for {project}: HTTP {status}")]
    Status { project: String, status: u16 },

    #[error("Report fetch failed for {project}: {source}")]
    Network {
        project: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Report fetch for {project} exceeded {timeout_secs}s deadline")]
    Timeout { project: String, timeout_secs: u64 },

    #[error("Failed to read report for {project} from {path}: {source}")]
    Io {
        project: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid report location for {project}: {location}")]
    InvalidLocation { project: String, location: String },
}

/// A report document that is not well-formed for its declared format.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed JSON summary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed JaCoCo XML: {0}")]
    Xml(String),
}

pub type Result<T> = std::result::Result<T, CovHubError>;
