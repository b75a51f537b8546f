pub mod client;
pub mod request;
pub mod request_builder;
pub mod response;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Request failed with status {status}: {message}")]
    GenericResponseError { status: u16, message: String },
    #[error("Invalid header {name}")]
    InvalidHeaderError { name: String },
    #[error("Failed to send request")]
    SendRequestError {
        #[source]
        cause: reqwest::Error,
    },
}
