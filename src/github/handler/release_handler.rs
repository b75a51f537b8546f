use crate::github::{github_client::GithubClient, release::Release};
use anyhow::Result;

pub struct ReleaseHandler<'a> {
    client: &'a GithubClient,
    owner: String,
    repo: String,
}

impl<'a> ReleaseHandler<'a> {
    pub fn new(
        client: &'a GithubClient,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        ReleaseHandler {
            client,
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Lists the releases of the repository as returned by the API, newest first
    pub async fn list(&self) -> Result<Vec<Release>> {
        self.client.list_releases(&self.owner, &self.repo).await
    }
}
