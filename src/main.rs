mod config;
mod github;
mod http;
mod logger;
mod page;
mod releases;
mod render;

use anyhow::{Context, Result};
use config::{Config, DEFAULT_CONFIG_FILE_NAME};
use github::github_client::GithubClient;
use page::Page;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE_NAME.to_owned());
    let config = Config::load(&config_path)
        .await
        .with_context(|| format!("Cannot load config file {}", config_path))?;

    logger::init(config.log_level)?;

    log::info!("Starting");
    let mut page = Page::load(&config.page.input)
        .await
        .context("Cannot read the page template")?;
    log::debug!(
        "Loaded {} bytes from {}",
        page.html().len(),
        config.page.input.display()
    );

    log::info!("Fetching releases of {}/{}", config.owner, config.repo);
    let client = GithubClient::new(&config.api_url);
    log::debug!("Using api {}", client.api_url());
    let releases = releases::render_releases(
        &client,
        &config.owner,
        &config.repo,
        &mut page,
        &config.page.element_ids(),
    )
    .await
    .context("Cannot render the releases")?;

    log::info!("Writing {}", config.page.output.display());
    page.save(&config.page.output)
        .await
        .context("Cannot write the rendered page")?;

    if let Some(markdown) = config.markdown {
        let hb = render::markdown::handlebars()?;

        if let Some(output) = &markdown.output {
            log::info!("Writing download table to {}", output.display());
            let table = render::markdown::download_table(&hb, &releases)
                .context("Cannot render the download table")?;
            tokio::fs::write(output, table)
                .await
                .context("Cannot write the download table")?;
        }

        if let Some(templates) = &markdown.templates {
            let placeholders = render::markdown::placeholders(&hb, &releases)
                .context("Cannot render the markdown placeholders")?;
            let filled = render::markdown::fill_templates(templates, &placeholders)
                .await
                .context("Cannot fill the markdown templates")?;
            log::info!("Filled {} markdown templates in {}", filled, templates.display());
        }
    }

    Ok(())
}
