//! Screenshot files on local disk. The engine only ever sees the file name.

use std::path::{Path, PathBuf};
use tokio::fs;

/// `<attachment id>.<png|jpeg>` for accepted image types, otherwise `None`.
pub fn screenshot_name(attachment_id: u64, content_type: Option<&str>) -> Option<String> {
    let mime = content_type?.split(';').next()?.trim();
    match mime {
        "image/png" => Some(format!("{attachment_id}.png")),
        "image/jpeg" => Some(format!("{attachment_id}.jpeg")),
        _ => None,
    }
}

pub fn screenshot_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

pub fn screenshot_exists(dir: &Path, name: &str) -> bool {
    screenshot_path(dir, name).is_file()
}

pub async fn save_screenshot(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir).await?;
    let path = screenshot_path(dir, name);
    fs::write(&path, bytes).await?;
    Ok(path)
}
