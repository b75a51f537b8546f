use super::release::Release;
use crate::http::client::{Client, ClientRequestBuilder};
use anyhow::Result;

pub const GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct GithubClient {
    api_url: String,
    client: Client,
}

impl GithubClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into();

        GithubClient {
            api_url: api_url.trim_end_matches('/').to_owned(),
            client: Client::new(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub(super) async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>> {
        let uri = format!("{}/repos/{}/{}/releases", self.api_url, owner, repo);

        log::debug!("Fetching {}", uri);
        let response = self
            .client
            .clone()
            .get(uri)
            .json_content_headers()
            .send::<Vec<Release>>()
            .await?;

        if let Some(err) = response.err() {
            log::debug!("Release listing failed with status {}: {}", err.status, err.message);
        }

        Ok(response.collect()?)
    }
}

impl Default for GithubClient {
    fn default() -> Self {
        GithubClient::new(GITHUB_API_URL)
    }
}
