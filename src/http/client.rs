use super::{request::HttpRequestBuilder, request_builder::RequestBuilder, Error};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    ops::{Deref, DerefMut},
};

#[derive(Clone, Debug)]
pub struct Client(reqwest::Client);

impl Client {
    pub fn new() -> Client {
        Client(reqwest::Client::new())
    }

    pub async fn send(&self, request: HttpRequestBuilder) -> Result<reqwest::Response, Error> {
        let mut builder = self.0.get(&request.url);

        if let Some(headers) = request.headers {
            builder = builder.headers(headers.try_into()?);
        }

        let request = builder
            .build()
            .map_err(|cause| Error::SendRequestError { cause })?;

        self.0
            .execute(request)
            .await
            .map_err(|cause| Error::SendRequestError { cause })
    }
}

pub trait ClientRequestBuilder {
    fn get(self, url: impl Into<String>) -> RequestBuilder;
}

impl ClientRequestBuilder for Client {
    fn get(self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self, url)
    }
}

#[derive(Default, Clone, Debug, Serialize, Deserialize)]
pub struct HeaderMap(pub HashMap<String, String>);

impl Deref for HeaderMap {
    type Target = HashMap<String, String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl DerefMut for HeaderMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl TryFrom<HeaderMap> for reqwest::header::HeaderMap {
    type Error = Error;

    fn try_from(map: HeaderMap) -> Result<Self, Self::Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        for (key, value) in map.0 {
            let name = reqwest::header::HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| Error::InvalidHeaderError { name: key.clone() })?;
            let value = reqwest::header::HeaderValue::from_str(&value)
                .map_err(|_| Error::InvalidHeaderError { name: key.clone() })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}
