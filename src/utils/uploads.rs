use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub file_name: String,
    /// Relative URL path under the `/uploads` mount, independent of where
    /// `UPLOAD_DIR` lives on disk.
    pub file_path: String,
    pub disk_path: PathBuf,
}

pub const PUBLIC_UPLOAD_PREFIX: &str = "uploads";

pub fn is_allowed_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/") || content_type == "application/pdf"
}

/// `{field}-{millis}-{random}{ext}`; the extension is taken from the
/// client's file name only when it is plain alphanumeric.
pub fn stored_file_name(field: &str, original_name: Option<&str>) -> String {
    let ext = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    format!(
        "{}-{}-{:08x}{}",
        field,
        Utc::now().timestamp_millis(),
        rand::random::<u32>(),
        ext
    )
}

pub async fn store_file(
    dir: &Path,
    field: &str,
    original_name: Option<&str>,
    bytes: &[u8],
) -> std::io::Result<StoredFile> {
    tokio::fs::create_dir_all(dir).await?;

    let file_name = stored_file_name(field, original_name);
    let disk_path = dir.join(&file_name);
    tokio::fs::write(&disk_path, bytes).await?;

    Ok(StoredFile {
        file_path: format!("{}/{}", PUBLIC_UPLOAD_PREFIX, file_name),
        file_name,
        disk_path,
    })
}

/// Drops a stored file whose record could not be saved.
pub async fn discard_file(stored: &StoredFile) {
    if let Err(e) = tokio::fs::remove_file(&stored.disk_path).await {
        warn!("Failed to remove orphaned upload {}: {:?}", stored.disk_path.display(), e);
    }
}
