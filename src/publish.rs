use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{error::WriteError, logging, report::Snapshot};

/// 本次寫入的兩個檔案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub status_path: PathBuf,
    pub archive_path: PathBuf,
}

/// Writes the snapshot to `status_path`, then to `archive_dir/<YYYY-MM-DD>.md`.
///
/// Both files are overwritten if present. A failure on the status file returns
/// before the archive directory is touched.
pub fn write(
    snapshot: &Snapshot,
    status_path: &Path,
    archive_dir: &Path,
) -> Result<Published, WriteError> {
    let content = snapshot.rendered_markdown.as_bytes();

    fs::write(status_path, content).map_err(|why| WriteError::io(status_path, why))?;
    confirm(format!("{} has been updated.", status_path.display()));

    fs::create_dir_all(archive_dir).map_err(|why| WriteError::io(archive_dir, why))?;

    let archive_path = archive_dir.join(snapshot.archive_file_name());
    fs::write(&archive_path, content).map_err(|why| WriteError::io(&archive_path, why))?;
    confirm(format!("{} has been archived.", archive_path.display()));

    Ok(Published {
        status_path: status_path.to_path_buf(),
        archive_path,
    })
}

fn confirm(msg: String) {
    logging::info_file_async(msg.clone());
    logging::info_console(msg);
}
