use std::path::Path;

use crate::core::error::ScribeError;

/// Writes UTF-8 text to `path`, creating missing parent directories.
pub async fn write_text(path: &Path, text: &str) -> Result<(), ScribeError> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, text).await?;
    Ok(())
}
