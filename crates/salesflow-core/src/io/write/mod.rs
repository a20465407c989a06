pub mod csv;

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{IoError, SalesflowResult};

pub use csv::write_csv_file;

/// Writes `output_path` through a temporary sibling that is renamed into
/// place once fully flushed. A crash mid-write leaves no file at the
/// checkpoint path.
pub fn write_atomic<F>(output_path: &Path, write: F) -> SalesflowResult<PathBuf>
where
    F: FnOnce(&mut File) -> SalesflowResult<()>,
{
    let file_name = output_path.file_name().ok_or_else(|| {
        Box::new(IoError(format!(
            "output path has no file name: {}",
            output_path.display()
        ))) as Box<dyn std::error::Error + Send + Sync>
    })?;
    let parent = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let tmp_path = parent.join(format!(
        "{}.tmp-{}",
        file_name.to_string_lossy(),
        unique_suffix()
    ));
    let result = File::create(&tmp_path)
        .map_err(|err| Box::new(err) as Box<dyn std::error::Error + Send + Sync>)
        .and_then(|mut file| {
            write(&mut file)?;
            file.flush()?;
            file.sync_all()?;
            Ok(())
        })
        .and_then(|()| std::fs::rename(&tmp_path, output_path).map_err(Into::into));
    if let Err(err) = result {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(err);
    }
    Ok(output_path.to_path_buf())
}

pub fn write_text_file(output_path: &Path, contents: &str) -> SalesflowResult<PathBuf> {
    write_atomic(output_path, |file| {
        file.write_all(contents.as_bytes())?;
        Ok(())
    })
}

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos())
        .unwrap_or(0);
    format!("{}-{}", std::process::id(), nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn creates_parent_dirs_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/out/report.txt");
        write_text_file(&path, "hello").expect("write");

        assert_eq!(fs::read_to_string(&path).expect("read"), "hello");
        let entries = fs::read_dir(path.parent().expect("parent"))
            .expect("list")
            .count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn failed_write_leaves_no_output() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("report.txt");
        let result = write_atomic(&path, |_| Err(Box::new(IoError("boom".to_string()))));

        assert!(result.is_err());
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).expect("list").count(), 0);
    }
}
