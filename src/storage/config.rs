use std::path::{Path, PathBuf};

use crate::types::{
    PAGE_SIZE,
    error::{DatabaseError, Result},
};

/// Configuration for the on-disk page store.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding one `<name>.heap` file per heap file.
    pub data_dir: PathBuf,
    /// Size in bytes of every page.
    pub page_size: usize,
    /// Sync file contents to disk after every page write.
    pub fsync: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            page_size: PAGE_SIZE,
            fsync: true,
        }
    }
}

impl StorageConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(DatabaseError::ConfigError(
                "page_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
