// 💾 Output Files
// Reports become visible only once fully written: temp file first, then rename

use crate::error::Result;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Run `write` against a uniquely named staging file, then move it over `path`
///
/// The staging file lives next to `path` so the final rename stays on one
/// filesystem. On any failure it is deleted and `path` keeps whatever it
/// held before.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let mut staged = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    staged.as_file().sync_all()?;

    debug!(staging = %staged.path().display(), "staged report");
    staged.persist(path).map_err(|err| err.error)?;
    debug!(path = %path.display(), "report committed");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeeError;
    use tempfile::tempdir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fees.csv");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, |w| {
            w.write_all(b"new")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(entries(dir.path()), vec!["fees.csv"]);
    }

    #[test]
    fn test_failed_write_leaves_previous_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fees.csv");
        fs::write(&path, "old").unwrap();

        let result = write_atomic(&path, |w| {
            w.write_all(b"partial")?;
            Err(FeeError::data_format(3, "due_date", "boom"))
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert_eq!(entries(dir.path()), vec!["fees.csv"]);
    }

    #[test]
    fn test_unrelated_sibling_tmp_file_survives() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fees.csv");
        let sibling = dir.path().join("fees.csv.tmp");
        fs::write(&sibling, "keep me").unwrap();

        write_atomic(&path, |w| {
            w.write_all(b"patron_id,total_fees\n")?;
            Ok(())
        })
        .unwrap();

        let failed = write_atomic(&path, |_| Err(FeeError::data_format(2, "due_date", "bad")));
        assert!(failed.is_err());

        assert_eq!(fs::read_to_string(&sibling).unwrap(), "keep me");
        assert_eq!(entries(dir.path()), vec!["fees.csv", "fees.csv.tmp"]);
    }

    #[test]
    fn test_creates_missing_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports").join("fees.csv");

        write_atomic(&path, |w| {
            w.write_all(b"patron_id,total_fees\n")?;
            Ok(())
        })
        .unwrap();

        assert!(path.exists());
    }
}
