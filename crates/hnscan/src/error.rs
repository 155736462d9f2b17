#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        source: reqwest::Error,
    },

    #[error("Unexpected {list} response: {body}")]
    InvalidResponse { list: String, body: String },
}
