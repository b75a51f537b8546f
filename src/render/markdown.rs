use crate::github::{
    asset::{human_size, AssetKind, Download, Platform},
    release::{latest_stable, Release},
};
use anyhow::{Context as _, Result};
use chrono::DateTime;
use handlebars::{
    no_escape, Context, Handlebars, Helper, Output, RenderContext, RenderError, RenderErrorReason,
};
use serde::Serialize;
use std::{collections::BTreeMap, path::Path};

pub const DOWNLOAD_TABLE_TEMPLATE: &str = "download_table";
pub const DOWNLOAD_ROWS_TEMPLATE: &str = "download_rows";

const DATE_FORMAT: &str = "%B %d, %Y";

/// Latest-release downloads exposed to markdown templates, by placeholder key
const LATEST_DOWNLOADS: [(&str, Platform, AssetKind); 6] = [
    ("WINDOWS_LATEST_EXE", Platform::Windows, AssetKind::Installer),
    ("LINUX_LATEST_EXE", Platform::Linux, AssetKind::AppImage),
    ("MACOS_LATEST_EXE", Platform::MacOS, AssetKind::AppleDiskImage),
    ("WINDOWS_LATEST_ZIP", Platform::Windows, AssetKind::PortableZip),
    ("LINUX_LATEST_ZIP", Platform::Linux, AssetKind::TarArchive),
    ("MACOS_LATEST_ZIP", Platform::MacOS, AssetKind::PortableZip),
];

#[derive(Serialize)]
struct DownloadTable {
    latest: Option<Latest>,
    rows: Vec<Row>,
}

#[derive(Serialize)]
struct Latest {
    version: String,
    date: String,
    downloads: Vec<String>,
}

#[derive(Serialize)]
struct Rows {
    rows: Vec<Row>,
}

#[derive(Serialize)]
struct Row {
    version: String,
    url: Option<String>,
    date: String,
    files: Vec<String>,
}

pub fn handlebars<'hb>() -> Result<Handlebars<'hb>> {
    let mut hb = Handlebars::new();
    hb.register_escape_fn(no_escape);

    let download_table = include_str!("./template/download_table.hbs");
    let download_rows = include_str!("./template/download_rows.hbs");

    hb.register_template_string(DOWNLOAD_TABLE_TEMPLATE, download_table)?;
    hb.register_template_string(DOWNLOAD_ROWS_TEMPLATE, download_rows)?;

    hb.register_helper("join", Box::new(join_helper));

    Ok(hb)
}

/// Renders the markdown download page: the latest stable release followed by
/// a table of every release with its downloadable files
pub fn download_table(hb: &Handlebars, releases: &[Release]) -> Result<String> {
    let latest = match latest_stable(releases) {
        Some(release) => Some(Latest {
            version: release.tag().value().to_owned(),
            date: format_date(release.published_at.as_deref()),
            downloads: LATEST_DOWNLOADS
                .iter()
                .filter_map(|(_, platform, kind)| find_download(release, *platform, *kind))
                .map(|download| download.to_string())
                .collect(),
        }),
        None => {
            log::warn!("Unable to find a stable release");
            None
        }
    };

    let table = hb.render(
        DOWNLOAD_TABLE_TEMPLATE,
        &DownloadTable {
            latest,
            rows: rows(releases),
        },
    )?;

    Ok(table)
}

/// Values substituted into `*.md.in` templates, keyed by placeholder name.
///
/// Without a stable release, or when the latest release lacks one of the
/// expected files, the affected placeholders are left empty.
pub fn placeholders(hb: &Handlebars, releases: &[Release]) -> Result<BTreeMap<String, String>> {
    let mut values = BTreeMap::new();

    let table = hb.render(
        DOWNLOAD_ROWS_TEMPLATE,
        &Rows {
            rows: rows(releases),
        },
    )?;
    values.insert("DOWNLOAD_ALL_TABLE".to_owned(), table);

    let latest = latest_stable(releases);
    if latest.is_none() {
        log::warn!("Unable to find a stable release");
    }

    values.insert(
        "LATEST_VERSION_STR".to_owned(),
        latest
            .map(|release| release.tag().value().to_owned())
            .unwrap_or_default(),
    );
    values.insert(
        "LATEST_VERSION_DATE".to_owned(),
        latest
            .map(|release| format_date(release.published_at.as_deref()))
            .unwrap_or_default(),
    );

    for (key, platform, kind) in LATEST_DOWNLOADS {
        let download = latest.and_then(|release| find_download(release, platform, kind));
        if let (Some(release), None) = (latest, &download) {
            log::warn!("{} has no {} {}", release.tag_name, platform, kind);
        }

        values.insert(
            format!("DOWNLOAD_{}_URL", key),
            download
                .as_ref()
                .map(|download| download.url.to_owned())
                .unwrap_or_default(),
        );
        values.insert(
            format!("DOWNLOAD_{}_SIZE", key),
            download
                .map(|download| human_size(download.size))
                .unwrap_or_default(),
        );
    }

    Ok(values)
}

pub fn fill_template(content: &str, placeholders: &BTreeMap<String, String>) -> String {
    placeholders
        .iter()
        .fold(content.to_owned(), |content, (key, value)| {
            content.replace(key.as_str(), value)
        })
}

/// Fills every `*.md.in` file below `dir`, writing the result next to it without the `.in`
pub async fn fill_templates(
    dir: impl AsRef<Path>,
    placeholders: &BTreeMap<String, String>,
) -> Result<usize> {
    let pattern = format!("{}/**/*.md.in", dir.as_ref().display());
    let mut filled = 0;

    for entry in glob::glob(&pattern).context("Cannot read glob pattern")? {
        let path = entry.context("Cannot get path")?;
        let output = path.with_extension("");

        log::debug!("filling template: {} into {}", path.display(), output.display());
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Cannot read {}", path.display()))?;
        tokio::fs::write(&output, fill_template(&content, placeholders))
            .await
            .with_context(|| format!("Cannot write {}", output.display()))?;

        filled += 1;
    }

    Ok(filled)
}

fn rows(releases: &[Release]) -> Vec<Row> {
    releases
        .iter()
        .map(|release| Row {
            version: release.tag_name.to_owned(),
            url: release.html_url.to_owned(),
            date: format_date(release.published_at.as_deref()),
            files: downloads(release)
                .iter()
                .map(Download::to_string)
                .collect(),
        })
        .collect()
}

fn classified(release: &Release) -> Vec<Download> {
    release
        .assets
        .iter()
        .filter_map(Download::classify)
        .collect()
}

fn downloads(release: &Release) -> Vec<Download> {
    let classified = classified(release);

    Platform::LISTED
        .iter()
        .flat_map(|platform| {
            classified
                .iter()
                .filter(move |download| download.platform == *platform)
        })
        .cloned()
        .collect()
}

fn find_download(release: &Release, platform: Platform, kind: AssetKind) -> Option<Download> {
    classified(release)
        .into_iter()
        .find(|download| download.platform == platform && download.kind == kind)
}

fn format_date(published_at: Option<&str>) -> String {
    match published_at {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|date| date.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|_| value.to_owned()),
        None => String::new(),
    }
}

fn join_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> Result<(), RenderError> {
    let param = h.param(0).and_then(|v| v.value().as_array()).ok_or(
        RenderErrorReason::ParamTypeMismatchForName(
            "join",
            "items".to_owned(),
            "array".to_owned(),
        ),
    )?;
    let separator = h.param(1).and_then(|v| v.value().as_str()).unwrap_or(", ");

    out.write(
        &param
            .iter()
            .map(|v| {
                v.as_str()
                    .ok_or(RenderErrorReason::ParamTypeMismatchForName(
                        "join",
                        "items".to_owned(),
                        "str".to_owned(),
                    ))
            })
            .collect::<Result<Vec<_>, _>>()?
            .join(separator),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn releases(json: &str) -> Vec<Release> {
        serde_json::from_str(json).unwrap()
    }

    const RELEASES: &str = r#"[
        {
            "tag_name": "v1.1.0-dev",
            "published_at": "2021-03-04T10:00:00Z",
            "assets": []
        },
        {
            "tag_name": "v1.0.0",
            "published_at": "2021-02-01T10:00:00Z",
            "html_url": "https://github.com/octo/game/releases/tag/v1.0.0",
            "assets": [
                {"name": "game-v1.0.0-Darwin.dmg", "size": 1536, "browser_download_url": "https://dl/mac.dmg"},
                {"name": "game-v1.0.0-Linux.AppImage", "size": 0, "browser_download_url": "https://dl/linux.AppImage"},
                {"name": "game-v1.0.0-Windows.msi", "size": 1048576, "browser_download_url": "https://dl/win.msi"},
                {"name": "checksums.txt", "size": 12, "browser_download_url": "https://dl/checksums.txt"}
            ]
        }
    ]"#;

    #[test]
    fn should_render_the_latest_stable_release() {
        let table = download_table(&handlebars().unwrap(), &releases(RELEASES)).unwrap();

        assert!(table.contains("_Version: v1.0.0 (February 01, 2021)_"));
    }

    #[test]
    fn should_render_a_row_per_release() {
        let table = download_table(&handlebars().unwrap(), &releases(RELEASES)).unwrap();

        assert!(table.contains("| v1.1.0-dev | March 04, 2021 |  |"));
        assert!(table.contains(
            "| [v1.0.0](https://github.com/octo/game/releases/tag/v1.0.0) | February 01, 2021 | \
             [Windows Installer](https://dl/win.msi) (1.0 MB),<br>\
             [Linux AppImage](https://dl/linux.AppImage) (0B),<br>\
             [MacOS Apple Disk Image](https://dl/mac.dmg) (1.5 KB) |"
        ));
        assert!(!table.contains("checksums.txt"));
    }

    #[test]
    fn should_omit_the_latest_release_without_stable_tags() {
        let table = download_table(
            &handlebars().unwrap(),
            &releases(r#"[{"tag_name": "v0.1.0-dev", "published_at": "not a date"}]"#),
        )
        .unwrap();

        assert!(!table.contains("_Version:"));
        assert!(table.contains("| v0.1.0-dev | not a date |  |"));
    }

    #[test]
    fn should_format_dates() {
        assert_eq!(
            format_date(Some("2020-01-01T12:30:00Z")),
            "January 01, 2020"
        );
        assert_eq!(format_date(Some("2020-01-01")), "2020-01-01");
        assert_eq!(format_date(None), "");
    }

    #[test]
    fn should_list_the_latest_downloads() {
        let table = download_table(&handlebars().unwrap(), &releases(RELEASES)).unwrap();

        assert!(table.contains("- [Windows Installer](https://dl/win.msi) (1.0 MB)\n"));
        assert!(table.contains("- [Linux AppImage](https://dl/linux.AppImage) (0B)\n"));
        assert!(table.contains("- [MacOS Apple Disk Image](https://dl/mac.dmg) (1.5 KB)\n"));
    }

    #[test]
    fn should_build_placeholders_for_the_latest_release() {
        let values = placeholders(&handlebars().unwrap(), &releases(RELEASES)).unwrap();

        assert_eq!(values["LATEST_VERSION_STR"], "v1.0.0");
        assert_eq!(values["LATEST_VERSION_DATE"], "February 01, 2021");
        assert_eq!(values["DOWNLOAD_WINDOWS_LATEST_EXE_URL"], "https://dl/win.msi");
        assert_eq!(values["DOWNLOAD_WINDOWS_LATEST_EXE_SIZE"], "1.0 MB");
        assert_eq!(values["DOWNLOAD_LINUX_LATEST_EXE_URL"], "https://dl/linux.AppImage");
        assert_eq!(values["DOWNLOAD_MACOS_LATEST_EXE_SIZE"], "1.5 KB");
        assert_eq!(values["DOWNLOAD_WINDOWS_LATEST_ZIP_URL"], "");
        assert_eq!(values["DOWNLOAD_LINUX_LATEST_ZIP_SIZE"], "");
        assert_eq!(values.len(), 15);
        assert!(values["DOWNLOAD_ALL_TABLE"].starts_with("| v1.1.0-dev | March 04, 2021 |  |\n"));
        assert!(!values["DOWNLOAD_ALL_TABLE"].contains("## "));
    }

    #[test]
    fn should_leave_placeholders_empty_without_stable_releases() {
        let values = placeholders(
            &handlebars().unwrap(),
            &releases(r#"[{"tag_name": "v0.1.0-dev"}]"#),
        )
        .unwrap();

        assert_eq!(values["LATEST_VERSION_STR"], "");
        assert_eq!(values["DOWNLOAD_MACOS_LATEST_ZIP_URL"], "");
        assert!(values["DOWNLOAD_ALL_TABLE"].contains("| v0.1.0-dev |"));
    }

    #[test]
    fn should_replace_every_placeholder() {
        let values = BTreeMap::from([
            ("LATEST_VERSION_STR".to_owned(), "v1.0.0".to_owned()),
            ("DOWNLOAD_LINUX_LATEST_EXE_URL".to_owned(), "https://dl/a".to_owned()),
        ]);

        let filled = fill_template(
            "Get LATEST_VERSION_STR: [AppImage](DOWNLOAD_LINUX_LATEST_EXE_URL), LATEST_VERSION_STR",
            &values,
        );

        assert_eq!(filled, "Get v1.0.0: [AppImage](https://dl/a), v1.0.0");
    }

    #[tokio::test]
    async fn should_fill_markdown_templates_recursively() -> Result<(), Box<dyn std::error::Error>>
    {
        let dir = TempDir::new("markdown")?;
        let nested = dir.path().join("docs");
        std::fs::create_dir(&nested)?;
        std::fs::write(dir.path().join("index.md.in"), "Latest: LATEST_VERSION_STR")?;
        std::fs::write(nested.join("download.md.in"), "DOWNLOAD_ALL_TABLE")?;
        std::fs::write(nested.join("notes.md"), "LATEST_VERSION_STR")?;

        let values = placeholders(&handlebars()?, &releases(RELEASES))?;
        let filled = fill_templates(dir.path(), &values).await?;

        assert_eq!(filled, 2);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("index.md"))?,
            "Latest: v1.0.0"
        );
        assert_eq!(
            std::fs::read_to_string(nested.join("download.md"))?,
            values["DOWNLOAD_ALL_TABLE"]
        );
        assert_eq!(
            std::fs::read_to_string(nested.join("notes.md"))?,
            "LATEST_VERSION_STR"
        );

        dir.close()?;
        Ok(())
    }
}
