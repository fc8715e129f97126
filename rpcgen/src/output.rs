/* Writing generated files to disk */

use crate::codegen::GeneratedFile;
use crate::error::{GenError, GenResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Write `contents` to `path` through a temporary file in the same
/// directory, so a failed write never leaves a truncated file behind.
pub fn write_atomic(path: &Path, contents: &str) -> GenResult<()> {
    let write_err = |source| GenError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Write every file of a bundle under `dir`, returning the paths written.
pub fn write_bundle(dir: &Path, files: &[GeneratedFile]) -> GenResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(&file.name);
        write_atomic(&path, &file.contents)?;
        tracing::debug!(path = %path.display(), bytes = file.contents.len(), "wrote file");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/gl_opcodes.h");
        write_atomic(&path, "#define OP_last 0\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "#define OP_last 0\n");
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.h");
        write_atomic(&path, "old").unwrap();
        write_atomic(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
