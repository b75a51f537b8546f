use super::{
    client::Client,
    request::HttpRequestBuilder,
    response::{AsyncFrom, Response},
};
use anyhow::Result;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;

pub const GITHUB_API_VERSION: &str = "2022-11-28";
pub const USER_AGENT_NAME: &str = "releasepage";

pub struct RequestBuilder {
    client: Client,
    pub builder: HttpRequestBuilder,
}

impl RequestBuilder {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        RequestBuilder {
            client,
            builder: HttpRequestBuilder::new(url),
        }
    }

    pub async fn send<T>(self) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.client.send(self.builder).await?;

        Ok(Response::<T>::async_from(response).await)
    }

    pub fn json_content_headers(mut self) -> Self {
        self.builder
            .header(ACCEPT.as_str(), "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .header(USER_AGENT.as_str(), USER_AGENT_NAME);

        self
    }
}
