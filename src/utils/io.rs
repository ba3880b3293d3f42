//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Read file contents, mapping failures to `internal.io_error`.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        Error::internal_io(
            format!("{}: {}", path.display(), e),
            Some(operation.to_string()),
        )
    })
}

/// Write a shell script and mark it executable (0o755 on unix).
pub fn write_script(path: &Path, content: &str, operation: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| {
        Error::internal_io(
            format!("{}: {}", path.display(), e),
            Some(operation.to_string()),
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("{} (chmod)", operation)))
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn read_file_succeeds_for_existing_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "tasks: []").unwrap();

        let content = read_file(temp.path(), "read pipeline").unwrap();
        assert!(content.contains("tasks"));
    }

    #[test]
    fn read_file_returns_error_for_missing_file() {
        let err = read_file(Path::new("/nonexistent/pipeline.yml"), "read pipeline").unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
        assert_eq!(err.details["context"], "read pipeline");
    }

    #[test]
    fn write_script_writes_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("p.yml.serial.sh");

        write_script(&path, "#!/usr/bin/env bash\n", "write script").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "#!/usr/bin/env bash\n");
    }

    #[cfg(unix)]
    #[test]
    fn write_script_marks_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("run.sh");
        write_script(&path, "true\n", "write script").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn write_script_fails_for_missing_directory() {
        let err = write_script(
            Path::new("/nonexistent/dir/run.sh"),
            "true\n",
            "write script",
        )
        .unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
    }
}
