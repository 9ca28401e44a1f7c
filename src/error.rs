use thiserror::Error;

/// Failures while retrieving forum pages. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned {status}")]
    Status { url: String, status: u16 },
    #[error("invalid URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Failures while writing the table into an existing post body.
#[derive(Debug, Error)]
pub enum SpliceError {
    #[error("no `[table=left,0,0,auto]` ... `[/table]` block found in post")]
    TableNotFound,
}
