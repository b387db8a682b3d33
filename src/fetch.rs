//! Download of a remote CSV export into the input directory.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use log::info;
use reqwest::{Url, blocking::Client};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// True for `http(s)` sources that mention `csv` anywhere, case-insensitively.
pub fn is_csv_url(source: &str) -> bool {
    source.starts_with("http") && source.to_ascii_lowercase().contains("csv")
}

/// Local file name for a download: the URL's last path segment when it is a
/// `.csv` file, otherwise `downloaded_{n}.csv` with `n` derived from the URL
/// length.
pub fn download_target_name(url: &str) -> String {
    let basename = Url::parse(url).ok().and_then(|parsed| {
        parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
    });
    match basename {
        Some(name) if name.ends_with(".csv") => name,
        _ => format!("downloaded_{}.csv", url.len() % 1000),
    }
}

pub fn download_csv(url: &str, target_dir: &Path) -> Result<PathBuf> {
    let target = target_dir.join(download_target_name(url));
    info!("Downloading {url} to {}...", target.display());
    let client = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Building HTTP client")?;
    let body = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.bytes())
        .with_context(|| format!("Downloading {url}"))?;
    fs::write(&target, &body).with_context(|| format!("Writing download to {target:?}"))?;
    info!("Successfully downloaded to {}", target.display());
    Ok(target)
}
