//! Temp-file + rename writes so readers never see a half-written document.

use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

const TEMP_SUFFIX: &str = ".tmp";

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

/// Write `data` to `path` atomically.
///
/// 1. write the temp file next to the target
/// 2. fsync it
/// 3. rename over the target (atomic on POSIX)
pub async fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let temp = temp_path(path);
    let mut file = fs::File::create(&temp).await?;
    file.write_all(data).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&temp, path).await?;

    debug!(path = %path.display(), bytes = data.len(), "Atomic write completed");
    Ok(())
}
