use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};

// Captured payloads are single API pages; anything larger is not a fixture
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Reject files larger than [`MAX_FILE_SIZE_BYTES`]
pub fn validate_file_size(file: &File, path: &Path) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > MAX_FILE_SIZE_BYTES {
        bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            file_size,
            MAX_FILE_SIZE_BYTES
        );
    }

    Ok(())
}

/// Read a whole text file after checking its size
pub fn read_to_string_bounded(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    validate_file_size(&file, path)?;

    let mut text = String::new();
    file.read_to_string(&mut text)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_read_small_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{\"data\": []}}").unwrap();
        assert_eq!(read_to_string_bounded(file.path()).unwrap(), "{\"data\": []}");
    }

    #[test]
    fn test_oversized_file_rejected() {
        let file = NamedTempFile::new().unwrap();
        file.as_file().set_len(MAX_FILE_SIZE_BYTES + 1).unwrap();
        let err = read_to_string_bounded(file.path()).unwrap_err();
        assert!(err.to_string().contains("File too large"));
    }

    #[test]
    fn test_missing_file() {
        let err = read_to_string_bounded(Path::new("/nonexistent/fixture.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open file"));
    }
}
