use crate::http::Error;

use serde::de::DeserializeOwned;

#[derive(Debug)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
}

/// A json response, either parsed into `T` or kept as the failure details
pub enum Response<T> {
    Success(T),
    Error(ErrorResponse),
}

impl<T> Response<T> {
    pub fn err(&self) -> Option<&ErrorResponse> {
        match self {
            Response::Success(_) => None,
            Response::Error(inner) => Some(inner),
        }
    }

    pub fn collect(self) -> Result<T, Error> {
        match self {
            Response::Success(payload) => Ok(payload),
            Response::Error(response) => Err(Error::GenericResponseError {
                status: response.status,
                message: response.message,
            }),
        }
    }
}

pub trait AsyncFrom<T>: Sized {
    async fn async_from(value: T) -> Self;
}

impl<T> AsyncFrom<reqwest::Response> for Response<T>
where
    T: DeserializeOwned,
{
    async fn async_from(value: reqwest::Response) -> Self {
        let status = value.status().as_u16();

        let text = match value.text().await {
            Ok(text) => text,
            Err(err) => {
                return Response::Error(ErrorResponse {
                    status,
                    message: format!("Failed to read response text: {}", err),
                });
            }
        };

        if !(200..300).contains(&status) {
            return Response::Error(ErrorResponse {
                status,
                message: text,
            });
        }

        match serde_json::from_str::<T>(&text) {
            Ok(payload) => Response::Success(payload),
            Err(err) => Response::Error(ErrorResponse {
                status,
                message: format!("Failed to parse json: {}", err),
            }),
        }
    }
}
