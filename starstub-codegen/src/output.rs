//! Output destinations.

use crate::error::CodegenError;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File written inside an output directory.
pub const OUTPUT_FILE_NAME: &str = "__init__.py";

/// Destination argument that selects standard output.
pub const STDOUT_SENTINEL: &str = "-";

/// Where the generated stub file goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Standard output.
    Stdout,
    /// `__init__.py` inside the given directory.
    Directory(PathBuf),
}

impl Destination {
    /// Parses a destination argument. `-` selects standard output.
    #[must_use]
    pub fn parse(arg: &str) -> Self {
        if arg == STDOUT_SENTINEL {
            Self::Stdout
        } else {
            Self::Directory(PathBuf::from(arg))
        }
    }
}

/// Writes the generated content to the destination.
///
/// An existing output file is truncated. The directory itself is never
/// created.
///
/// # Errors
/// Returns `CodegenError::Output` if the destination cannot be opened or
/// written.
pub fn write_output(destination: &Destination, content: &str) -> Result<(), CodegenError> {
    match destination {
        Destination::Stdout => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(content.as_bytes())
                .and_then(|()| lock.flush())
                .map_err(|e| CodegenError::output(STDOUT_SENTINEL, e))
        }
        Destination::Directory(dir) => {
            let path = dir.join(OUTPUT_FILE_NAME);
            write_file(&path, content).map_err(|e| CodegenError::output(&path, e))?;
            tracing::info!("wrote {} bytes to {}", content.len(), path.display());
            Ok(())
        }
    }
}

fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    let mut file = options.open(path)?;
    file.write_all(content.as_bytes())?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_destination() {
        assert_eq!(Destination::parse("-"), Destination::Stdout);
        assert_eq!(
            Destination::parse("out/api"),
            Destination::Directory(PathBuf::from("out/api"))
        );
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let destination = Destination::Directory(dir.path().to_path_buf());
        write_output(&destination, "print('hi')\n").expect("write");

        let written = std::fs::read_to_string(dir.path().join(OUTPUT_FILE_NAME)).expect("read");
        assert_eq!(written, "print('hi')\n");
    }

    #[test]
    fn test_write_truncates_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(OUTPUT_FILE_NAME);
        std::fs::write(&path, "a much longer previous generation\n").expect("seed");

        let destination = Destination::Directory(dir.path().to_path_buf());
        write_output(&destination, "short\n").expect("write");

        assert_eq!(std::fs::read_to_string(&path).expect("read"), "short\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_keeps_file_writable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let destination = Destination::Directory(dir.path().to_path_buf());
        write_output(&destination, "one\n").expect("first write");
        write_output(&destination, "two\n").expect("second write");

        let path = dir.path().join(OUTPUT_FILE_NAME);
        assert_eq!(std::fs::read_to_string(path).expect("read"), "two\n");
    }

    #[test]
    fn test_write_to_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let destination = Destination::Directory(dir.path().join("missing"));
        let err = write_output(&destination, "x").unwrap_err();

        match err {
            CodegenError::Output { path, .. } => {
                assert!(path.ends_with("missing/__init__.py"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("missing").exists());
    }
}
