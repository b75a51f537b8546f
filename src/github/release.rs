use super::tag::Tag;
use serde::Deserialize;

/// A github release. Does not contain all fields.
///
/// See the github [docs](https://docs.github.com/en/rest/releases/releases?apiVersion=2022-11-28#list-releases)
/// for the full payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub name: Option<String>,
    pub tag_name: String,
    pub published_at: Option<String>,
    /// Release notes. Carried from the API but not rendered.
    #[allow(dead_code)]
    pub body: Option<String>,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
    pub html_url: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// The release name, or the tag name when the release is unnamed
    pub fn heading(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.tag_name)
    }

    pub fn published_at(&self) -> &str {
        self.published_at.as_deref().unwrap_or_default()
    }

    pub fn tag(&self) -> Tag {
        Tag::new(&self.tag_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    pub browser_download_url: String,
}

/// First published, non-prerelease release with a stable tag, in API order
pub fn latest_stable(releases: &[Release]) -> Option<&Release> {
    releases
        .iter()
        .find(|release| !release.draft && !release.prerelease && release.tag().is_stable())
}
