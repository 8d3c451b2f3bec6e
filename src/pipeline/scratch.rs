//! Scratch storage: persist uploaded bytes to a uniquely named temp file.
//!
//! pdfium opens documents from a file-system path, so each upload is written
//! to its own [`NamedTempFile`]. The name is generated, never taken from the
//! client, so two concurrent uploads of `report.pdf` get different paths.
//! Only a sanitised extension of the client filename is kept, to make the
//! file recognisable when inspecting the temp directory.
//!
//! The file is removed when the [`ScratchFile`] is dropped, whatever the exit
//! path. [`ScratchFile::remove`] does the same but reports a failed delete.

use crate::error::ExtractError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

const PREFIX: &str = "pdf2text-";
const MAX_EXTENSION_LEN: usize = 8;

/// A per-request temporary copy of an uploaded document.
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    /// Write `bytes` to a fresh temp file in `dir` (or the system temp dir).
    pub fn persist(
        bytes: &[u8],
        filename: &str,
        dir: Option<&Path>,
    ) -> Result<Self, ExtractError> {
        let suffix = format!(".{}", sanitised_extension(filename));
        let mut builder = tempfile::Builder::new();
        builder.prefix(PREFIX).suffix(&suffix);

        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| ExtractError::io("creating scratch file", e))?;

        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|e| ExtractError::io("writing scratch file", e))?;

        debug!(
            "Persisted '{}' ({} bytes) to {}",
            filename,
            bytes.len(),
            file.path().display()
        );
        Ok(Self { file })
    }

    /// Path of the scratch copy; valid until the file is removed.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the scratch file, reporting failure instead of ignoring it.
    pub fn remove(self) -> Result<(), ExtractError> {
        let path = self.file.path().to_path_buf();
        self.file
            .close()
            .map_err(|e| ExtractError::io("removing scratch file", e))?;
        debug!("Removed scratch file {}", path.display());
        Ok(())
    }
}

/// Extension of the client filename, restricted to short ASCII alphanumerics.
fn sanitised_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "pdf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_sanitised() {
        assert_eq!(sanitised_extension("report.PDF"), "pdf");
        assert_eq!(sanitised_extension("no_extension"), "pdf");
        assert_eq!(sanitised_extension("../../etc/passwd"), "pdf");
        assert_eq!(sanitised_extension("weird.p$f"), "pdf");
        assert_eq!(sanitised_extension("archive.verylongext"), "pdf");
        assert_eq!(sanitised_extension(""), "pdf");
    }

    #[test]
    fn same_filename_gets_distinct_paths() {
        let dir = tempfile::tempdir().unwrap();
        let a = ScratchFile::persist(b"%PDF-a", "invoice.pdf", Some(dir.path())).unwrap();
        let b = ScratchFile::persist(b"%PDF-b", "invoice.pdf", Some(dir.path())).unwrap();

        assert_ne!(a.path(), b.path());
        assert_eq!(std::fs::read(a.path()).unwrap(), b"%PDF-a");
        assert_eq!(std::fs::read(b.path()).unwrap(), b"%PDF-b");
    }

    #[test]
    fn name_does_not_contain_client_filename() {
        let dir = tempfile::tempdir().unwrap();
        let scratch =
            ScratchFile::persist(b"%PDF", "../secret name.pdf", Some(dir.path())).unwrap();
        let name = scratch.path().file_name().unwrap().to_string_lossy().to_string();

        assert!(name.starts_with(PREFIX), "got: {name}");
        assert!(name.ends_with(".pdf"), "got: {name}");
        assert!(!name.contains("secret"), "got: {name}");
        assert_eq!(scratch.path().parent(), Some(dir.path()));
    }

    #[test]
    fn remove_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchFile::persist(b"%PDF", "a.pdf", Some(dir.path())).unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.exists());

        scratch.remove().expect("remove should succeed");
        assert!(!path.exists());
    }

    #[test]
    fn drop_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let scratch = ScratchFile::persist(b"%PDF", "a.pdf", Some(dir.path())).unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = ScratchFile::persist(b"%PDF", "a.pdf", Some(&missing)).unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }), "got: {err:?}");
    }
}
