pub mod markdown;

use crate::github::release::Release;
use anyhow::Result;
use handlebars::Handlebars;
use serde::Serialize;

pub const RELEASE_BLOCK_TEMPLATE: &str = "release_block";

#[derive(Serialize)]
struct ReleaseBlock<'a> {
    heading: &'a str,
    published_at: &'a str,
}

impl<'a> From<&'a Release> for ReleaseBlock<'a> {
    fn from(release: &'a Release) -> Self {
        ReleaseBlock {
            heading: release.heading(),
            published_at: release.published_at(),
        }
    }
}

pub fn handlebars<'hb>() -> Result<Handlebars<'hb>> {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(true);

    let release_block = include_str!("./template/release_block.hbs");

    hb.register_template_string(RELEASE_BLOCK_TEMPLATE, release_block)?;

    Ok(hb)
}

/// Renders the display block of one release: heading, publish date and download links
pub fn release_block(hb: &Handlebars, release: &Release) -> Result<String> {
    let block = hb.render(RELEASE_BLOCK_TEMPLATE, &ReleaseBlock::from(release))?;

    Ok(block)
}
