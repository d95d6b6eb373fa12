use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// 本機檔案存取；設定 base_path 時，相對路徑以其為根
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    base_path: Option<PathBuf>,
}

impl LocalStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: Some(base_path.as_ref().to_path_buf()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.base_path {
            Some(base) => base.join(path),
            None => PathBuf::from(path),
        }
    }
}

impl Storage for LocalStorage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = fs::read(self.resolve(path))?;
        Ok(data)
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write_file("nested/out/scored.csv", b"id\n").unwrap();
        assert_eq!(storage.read_file("nested/out/scored.csv").unwrap(), b"id\n");
        assert!(dir.path().join("nested/out/scored.csv").exists());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert!(matches!(
            storage.read_file("missing.csv"),
            Err(crate::utils::error::ScoreError::IoError(_))
        ));
    }
}
