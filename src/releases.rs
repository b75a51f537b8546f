use crate::{
    github::{github_client::GithubClient, release::Release},
    page::Page,
    render,
};
use anyhow::{bail, Context, Result};

/// Ids of the page elements the release list is rendered around
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementIds {
    pub loading: String,
    pub anchor: String,
}

impl ElementIds {
    pub fn new(loading: impl Into<String>, anchor: impl Into<String>) -> Self {
        ElementIds {
            loading: loading.into(),
            anchor: anchor.into(),
        }
    }
}

impl Default for ElementIds {
    fn default() -> Self {
        ElementIds::new("loading", "latest-releases")
    }
}

/// Fetches the releases of `owner/repo` and renders one block per release after the anchor.
///
/// The page is only modified when both the fetch and the render succeed. Returns the
/// fetched releases in API order.
pub async fn render_releases(
    client: &GithubClient,
    owner: &str,
    repo: &str,
    page: &mut Page,
    ids: &ElementIds,
) -> Result<Vec<Release>> {
    let releases = client
        .repo(owner, repo)
        .releases()
        .list()
        .await
        .with_context(|| format!("Cannot fetch the releases of {}/{}", owner, repo))?;

    log::info!("Found {} releases for {}/{}", releases.len(), owner, repo);

    let inserted = render_into(page, &releases, ids)?;
    log::debug!("Inserted {} release blocks", inserted);

    Ok(releases)
}

/// Removes the loading element, then inserts a block per release right after the anchor.
///
/// Releases are walked in reverse and every block goes directly after the anchor, so the
/// page ends up listing them in API order.
pub fn render_into(page: &mut Page, releases: &[Release], ids: &ElementIds) -> Result<usize> {
    for id in [&ids.loading, &ids.anchor] {
        if !page.contains_element(id) {
            bail!("The page has no element with id \"{}\"", id);
        }
    }

    let hb = render::handlebars()?;
    let mut rendered = page.clone();

    rendered
        .remove_element(&ids.loading)
        .context("Cannot remove the loading element")?;

    let mut inserted = 0;
    for release in releases.iter().rev() {
        let block = render::release_block(&hb, release)?;
        rendered
            .insert_after(&ids.anchor, &block)
            .context("Cannot insert the release block")?;
        inserted += 1;
    }

    *page = rendered;

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const PAGE: &str = r#"<main>
<h2 id="latest-releases">Latest releases</h2>
<p id="loading">Loading...</p>
<footer>end</footer>
</main>"#;

    fn releases(json: &str) -> Vec<Release> {
        serde_json::from_str(json).unwrap()
    }

    fn block_count(page: &Page) -> usize {
        page.html().matches("<div class=\"release\"").count()
    }

    #[test]
    fn should_insert_one_block_per_release_and_remove_loading() {
        let mut page = Page::from(PAGE);
        let releases = releases(
            r#"[
                {"tag_name": "v0.3.0", "published_at": "2020-03-01"},
                {"tag_name": "v0.2.0", "published_at": "2020-02-01"},
                {"tag_name": "v0.1.0", "published_at": "2020-01-01"}
            ]"#,
        );

        let inserted = render_into(&mut page, &releases, &ElementIds::default()).unwrap();

        assert_eq!(inserted, 3);
        assert_eq!(block_count(&page), 3);
        assert!(!page.contains_element("loading"));
        assert!(!page.html().contains("Loading..."));
    }

    #[test]
    fn should_list_blocks_in_api_order_after_the_anchor() {
        let mut page = Page::from(PAGE);
        let releases = releases(
            r#"[
                {"tag_name": "v0.3.0", "published_at": "2020-03-01"},
                {"tag_name": "v0.2.0", "published_at": "2020-02-01"},
                {"tag_name": "v0.1.0", "published_at": "2020-01-01"}
            ]"#,
        );

        render_into(&mut page, &releases, &ElementIds::default()).unwrap();

        let html = page.html();
        let anchor = html.find("</h2>").unwrap();
        let newest = html.find("v0.3.0").unwrap();
        let middle = html.find("v0.2.0").unwrap();
        let oldest = html.find("v0.1.0").unwrap();
        let footer = html.find("<footer>").unwrap();
        assert!(anchor < newest && newest < middle && middle < oldest && oldest < footer);
    }

    #[test]
    fn should_render_the_single_release_example() {
        let mut page = Page::from(PAGE);
        let releases = releases(r#"[{"tag_name": "v1.0", "published_at": "2020-01-01"}]"#);

        render_into(&mut page, &releases, &ElementIds::default()).unwrap();

        assert_eq!(block_count(&page), 1);
        assert!(page.html().contains(">v1.0</h3>"));
        assert!(page.html().contains("Released: 2020-01-01"));
        assert_eq!(page.html().matches("<a href=\"/\"").count(), 4);
    }

    #[test]
    fn should_still_remove_loading_without_releases() {
        let mut page = Page::from(PAGE);

        let inserted = render_into(&mut page, &[], &ElementIds::default()).unwrap();

        assert_eq!(inserted, 0);
        assert_eq!(block_count(&page), 0);
        assert!(!page.contains_element("loading"));
        assert!(page.contains_element("latest-releases"));
    }

    #[test]
    fn should_leave_the_page_untouched_without_an_anchor() {
        let mut page = Page::from(r#"<p id="loading">Loading...</p>"#);
        let releases = releases(r#"[{"tag_name": "v1.0"}]"#);

        let result = render_into(&mut page, &releases, &ElementIds::default());

        assert!(result.is_err());
        assert!(page.contains_element("loading"));
    }

    #[test]
    fn should_name_the_missing_element() {
        let mut page = Page::from(r#"<h2 id="latest-releases"></h2>"#);
        let releases = releases(r#"[{"tag_name": "v1.0"}]"#);

        let err = render_into(&mut page, &releases, &ElementIds::default()).unwrap_err();

        assert_eq!(err.to_string(), "The page has no element with id \"loading\"");
        assert_eq!(page, Page::from(r#"<h2 id="latest-releases"></h2>"#));
    }

    #[test]
    fn should_use_custom_element_ids() {
        let mut page = Page::from(r#"<h2 id="downloads"></h2><div id="spinner"></div>"#);
        let releases = releases(r#"[{"tag_name": "v1.0"}]"#);

        render_into(&mut page, &releases, &ElementIds::new("spinner", "downloads")).unwrap();

        assert!(!page.contains_element("spinner"));
        assert!(page.html().starts_with("<h2 id=\"downloads\"></h2><div class=\"release\""));
    }

    #[tokio::test]
    async fn should_fetch_and_render_releases() -> Result<()> {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/octo/game/releases")
            .with_status(200)
            .with_body(
                r#"[
                    {"name": "Second", "tag_name": "v0.2.0", "published_at": "2020-02-01T00:00:00Z", "body": "notes"},
                    {"name": null, "tag_name": "v0.1.0", "published_at": "2020-01-01T00:00:00Z", "body": null}
                ]"#,
            )
            .create_async()
            .await;

        let client = GithubClient::new(server.url());
        let mut page = Page::from(PAGE);

        let releases =
            render_releases(&client, "octo", "game", &mut page, &ElementIds::default()).await?;

        mock.assert_async().await;
        assert_eq!(releases.len(), 2);
        assert_eq!(block_count(&page), 2);
        assert!(page.html().contains(">Second</h3>"));
        assert!(page.html().contains(">v0.1.0</h3>"));
        assert!(!page.contains_element("loading"));

        Ok(())
    }

    #[tokio::test]
    async fn should_leave_the_page_untouched_when_the_fetch_fails() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/octo/game/releases")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = GithubClient::new(server.url());
        let mut page = Page::from(PAGE);

        let result =
            render_releases(&client, "octo", "game", &mut page, &ElementIds::default()).await;

        assert!(result.is_err());
        assert_eq!(page, Page::from(PAGE));
    }

    #[tokio::test]
    async fn should_leave_the_page_untouched_on_malformed_json() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/octo/game/releases")
            .with_status(200)
            .with_body(r#"{"message": "not an array"}"#)
            .create_async()
            .await;

        let client = GithubClient::new(server.url());
        let mut page = Page::from(PAGE);

        let result =
            render_releases(&client, "octo", "game", &mut page, &ElementIds::default()).await;

        assert!(result.is_err());
        assert!(page.contains_element("loading"));
        assert_eq!(block_count(&page), 0);
    }
}
