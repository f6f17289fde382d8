use anyhow::{Context, Result, anyhow, bail};
use std::fs;
use std::io::{self, Write};
use tempfile::NamedTempFile;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::model::MindMapData;

pub const MAP_EXTENSION: &str = "json";

const IGNORED_DIRS: [&str; 3] = ["target", "node_modules", ".git"];

pub fn parse_map(contents: &str) -> Result<MindMapData> {
    if contents.trim().is_empty() {
        bail!("mind map document is empty");
    }
    serde_json::from_str(contents).context("failed to parse mind map JSON")
}

pub fn load_map(path: &Path) -> Result<MindMapData> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path.display()))?;
    parse_map(&contents).with_context(|| format!("invalid mind map '{}'", path.display()))
}

pub fn render_map(data: &MindMapData, pretty: bool) -> Result<String> {
    let mut json = if pretty {
        serde_json::to_string_pretty(data)?
    } else {
        serde_json::to_string(data)?
    };
    json.push('\n');
    Ok(json)
}

/// Replaces `path` with `data`. The map is written to a sibling temp file
/// first and renamed over `path`, so a failed write keeps the old contents.
pub fn save_map(path: &Path, data: &MindMapData, pretty: bool) -> Result<()> {
    let json = render_map(data, pretty)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to stage a write in '{}'", dir.display()))?;
    staged
        .write_all(json.as_bytes())
        .and_then(|()| staged.as_file().sync_all())
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    staged
        .persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to replace '{}'", path.display()))?;
    debug!(path = %path.display(), nodes = data.len(), "saved mind map");
    Ok(())
}

/// Writes `data` to a file that must not exist yet.
pub fn create_map(path: &Path, data: &MindMapData, pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
        }
    }

    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            bail!(
                "mind map '{}' already exists; refusing to overwrite",
                path.display()
            );
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to create '{}'", path.display()));
        }
    };

    file.write_all(render_map(data, pretty)?.as_bytes())?;
    file.flush()?;
    Ok(())
}

/// Expands `path` into map files: a file is returned as is, a directory is
/// searched recursively for `*.json`, skipping build and VCS directories.
pub fn discover_maps(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(anyhow!("path '{}' does not exist", path.display()));
    }

    let mut found = Vec::new();
    let walker = WalkDir::new(path).into_iter().filter_entry(|entry| {
        entry.depth() == 0
            || !entry.file_type().is_dir()
            || !IGNORED_DIRS
                .iter()
                .any(|dir| entry.file_name().to_string_lossy() == *dir)
    });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let is_map = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(MAP_EXTENSION));
        if is_map {
            found.push(entry.into_path());
        }
    }

    found.sort();
    Ok(found)
}
