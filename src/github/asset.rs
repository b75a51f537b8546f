use super::release::ReleaseAsset;
use std::fmt::{self, Display};

const SIZE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOS,
    Other,
}

impl Platform {
    pub const LISTED: [Platform; 3] = [Platform::Windows, Platform::Linux, Platform::MacOS];

    /// Reads the platform from file names shaped like `game-v1.0-Linux.tar.gz`
    pub fn from_file_name(name: &str) -> Platform {
        let key = name
            .rsplit_once('-')
            .and_then(|(_, suffix)| suffix.split_once('.'))
            .map(|(key, _)| key);

        match key {
            Some("Windows") => Platform::Windows,
            Some("Linux") => Platform::Linux,
            Some("MacOS") | Some("Darwin") => Platform::MacOS,
            _ => Platform::Other,
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::MacOS => "MacOS",
            Platform::Other => "Other",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    PortableZip,
    Installer,
    TarArchive,
    AppImage,
    AppleDiskImage,
}

impl AssetKind {
    pub fn from_file_name(name: &str) -> Option<AssetKind> {
        if name.ends_with(".zip") {
            Some(AssetKind::PortableZip)
        } else if name.ends_with(".msi") {
            Some(AssetKind::Installer)
        } else if name.ends_with(".tar.gz") {
            Some(AssetKind::TarArchive)
        } else if name.ends_with(".AppImage") {
            Some(AssetKind::AppImage)
        } else if name.ends_with(".dmg") {
            Some(AssetKind::AppleDiskImage)
        } else {
            None
        }
    }
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::PortableZip => "Portable ZIP",
            AssetKind::Installer => "Installer",
            AssetKind::TarArchive => "TAR Archive",
            AssetKind::AppImage => "AppImage",
            AssetKind::AppleDiskImage => "Apple Disk Image",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone)]
pub struct Download {
    pub platform: Platform,
    pub kind: AssetKind,
    pub url: String,
    pub size: u64,
}

impl Download {
    pub fn classify(asset: &ReleaseAsset) -> Option<Download> {
        let kind = match AssetKind::from_file_name(&asset.name) {
            Some(kind) => kind,
            None => {
                log::warn!("Unknown file type: {}", asset.name);
                return None;
            }
        };

        Some(Download {
            platform: Platform::from_file_name(&asset.name),
            kind,
            url: asset.browser_download_url.to_owned(),
            size: asset.size,
        })
    }
}

impl Display for Download {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {}]({}) ({})",
            self.platform,
            self.kind,
            self.url,
            human_size(self.size)
        )
    }
}

pub fn human_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_owned();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    // `{:?}` keeps the trailing `.0` on whole values: `1.0 KB`
    let rounded = (value * 100.0).round() / 100.0;
    format!("{:?} {}", rounded, SIZE_UNITS[unit])
}
