//! XLSX archive rewriting

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Rebuild an archive in memory, replacing the named parts. Unchanged parts
/// are raw-copied so their compressed bytes stay identical.
pub fn rebuild_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    replacements: &HashMap<String, String>,
) -> Result<Vec<u8>> {
    let mut zip_writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for i in 0..archive.len() {
        let file = archive.by_index_raw(i)?;
        let name = file.name().to_string();

        if let Some(content) = replacements.get(&name) {
            drop(file);
            zip_writer.start_file(name.as_str(), options)?;
            zip_writer.write_all(content.as_bytes())?;
        } else {
            zip_writer.raw_copy_file(file)?;
        }
    }

    Ok(zip_writer.finish()?.into_inner())
}

/// Replace `path` with the archive bytes. The bytes land in a temporary file
/// next to the target, which is renamed over it once fully written.
pub fn save_workbook(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Ok(metadata) = fs::metadata(path) {
        if metadata.permissions().readonly() {
            anyhow::bail!("{} is read-only", path.display());
        }
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }
    temp.persist(path)?;
    Ok(())
}
