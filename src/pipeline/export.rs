use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::Snapshot;

/// Write the snapshot document to `{output_dir}/{YYYYMMDD}.json`.
pub fn write_json(snapshot: &Snapshot, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{}.json", snapshot.key));
    let json_content = serde_json::to_string_pretty(&snapshot.clone().into_document())?;
    fs::write(&path, json_content)?;
    Ok(path)
}
