use std::{
    collections::HashMap,
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::PathBuf,
    sync::Arc,
};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::{
    storage::config::StorageConfig,
    types::{
        PageIndex,
        error::{DatabaseError, Result},
    },
};

/// Page-granular storage addressed by file name and zero-based page index.
///
/// Writing at `index == num_pages(file)` appends a page; writing further
/// out is rejected so files never have gaps.
pub trait PageStore {
    fn page_size(&self) -> usize;
    fn num_pages(&self, file: &str) -> Result<usize>;
    fn read_page(&self, file: &str, index: PageIndex) -> Result<Vec<u8>>;
    fn write_page(&self, file: &str, index: PageIndex, data: &[u8]) -> Result<()>;
}

impl<T: PageStore + ?Sized> PageStore for &T {
    fn page_size(&self) -> usize {
        (**self).page_size()
    }

    fn num_pages(&self, file: &str) -> Result<usize> {
        (**self).num_pages(file)
    }

    fn read_page(&self, file: &str, index: PageIndex) -> Result<Vec<u8>> {
        (**self).read_page(file, index)
    }

    fn write_page(&self, file: &str, index: PageIndex, data: &[u8]) -> Result<()> {
        (**self).write_page(file, index, data)
    }
}

impl<T: PageStore + ?Sized> PageStore for Arc<T> {
    fn page_size(&self) -> usize {
        (**self).page_size()
    }

    fn num_pages(&self, file: &str) -> Result<usize> {
        (**self).num_pages(file)
    }

    fn read_page(&self, file: &str, index: PageIndex) -> Result<Vec<u8>> {
        (**self).read_page(file, index)
    }

    fn write_page(&self, file: &str, index: PageIndex, data: &[u8]) -> Result<()> {
        (**self).write_page(file, index, data)
    }
}

fn check_write(page_size: usize, index: PageIndex, num_pages: usize, data: &[u8]) -> Result<()> {
    if data.len() != page_size {
        return Err(DatabaseError::InvalidPageSize {
            expected: page_size,
            actual: data.len(),
        });
    }
    if index > num_pages {
        return Err(DatabaseError::PageOutOfRange {
            page: index,
            num_pages,
        });
    }
    Ok(())
}

/// Keeps every page in memory.
pub struct MemPageStore {
    page_size: usize,
    files: Mutex<HashMap<String, Vec<Vec<u8>>>>,
}

impl MemPageStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            files: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemPageStore {
    fn default() -> Self {
        Self::new(crate::types::PAGE_SIZE)
    }
}

impl PageStore for MemPageStore {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn num_pages(&self, file: &str) -> Result<usize> {
        Ok(self.files.lock().get(file).map_or(0, Vec::len))
    }

    fn read_page(&self, file: &str, index: PageIndex) -> Result<Vec<u8>> {
        let files = self.files.lock();
        let pages = files.get(file).map(Vec::as_slice).unwrap_or_default();
        pages
            .get(index)
            .cloned()
            .ok_or(DatabaseError::PageOutOfRange {
                page: index,
                num_pages: pages.len(),
            })
    }

    fn write_page(&self, file: &str, index: PageIndex, data: &[u8]) -> Result<()> {
        let mut files = self.files.lock();
        let pages = files.entry(file.to_string()).or_default();
        check_write(self.page_size, index, pages.len(), data)?;
        if index == pages.len() {
            pages.push(data.to_vec());
        } else {
            pages[index].copy_from_slice(data);
        }
        Ok(())
    }
}

/// Handle for an open heap file on disk.
struct FileHandle {
    file: File,
    num_pages: usize,
}

/// Stores each named file as `<data_dir>/<name>.heap`, page `i` at byte
/// offset `i * page_size`. The file is created by the first `write_page`;
/// until then it has zero pages.
pub struct FilePageStore {
    config: StorageConfig,
    files: Mutex<HashMap<String, FileHandle>>,
}

impl FilePageStore {
    pub fn new(config: StorageConfig) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.data_dir)?;
        Ok(Self {
            config,
            files: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn file_path(&self, file: &str) -> PathBuf {
        self.config.data_dir.join(format!("{}.heap", file))
    }

    /// Returns the handle for `file`, opening it on first use. A missing
    /// file is only created when `create` is set; otherwise `None`.
    fn handle<'a>(
        &self,
        files: &'a mut HashMap<String, FileHandle>,
        file: &str,
        create: bool,
    ) -> Result<Option<&'a mut FileHandle>> {
        if !files.contains_key(file) {
            if !create && !self.file_path(file).exists() {
                return Ok(None);
            }
            let handle = self.open_file(file)?;
            files.insert(file.to_string(), handle);
        }
        Ok(files.get_mut(file))
    }

    fn open_file(&self, file: &str) -> Result<FileHandle> {
        let path = self.file_path(file);
        if path.exists() {
            info!("Opening heap file at path: {}", path.display());
        } else {
            info!("Creating heap file at path: {}", path.display());
        }
        let handle = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        let file_size = handle.metadata()?.len() as usize;
        if file_size % self.config.page_size != 0 {
            return Err(DatabaseError::CorruptedFile {
                path: path.display().to_string(),
                reason: format!(
                    "size {} is not a multiple of the {} byte page size",
                    file_size, self.config.page_size
                ),
            });
        }
        Ok(FileHandle {
            file: handle,
            num_pages: file_size / self.config.page_size,
        })
    }

    fn page_offset(&self, index: PageIndex) -> u64 {
        (index * self.config.page_size) as u64
    }

    fn write_at(&self, handle: &mut FileHandle, offset: u64, data: &[u8]) -> Result<()> {
        handle.file.seek(SeekFrom::Start(offset))?;
        handle.file.write_all(data)?;
        handle.file.flush()?;
        if self.config.fsync {
            handle.file.sync_data()?;
        }
        Ok(())
    }

    /// Cuts the file back to its last whole page, dropping whatever a failed
    /// append left behind.
    fn discard_partial_append(&self, handle: &mut FileHandle) -> Result<()> {
        let len = self.page_offset(handle.num_pages);
        handle.file.set_len(len)?;
        Ok(())
    }
}

impl PageStore for FilePageStore {
    fn page_size(&self) -> usize {
        self.config.page_size
    }

    fn num_pages(&self, file: &str) -> Result<usize> {
        let mut files = self.files.lock();
        Ok(self
            .handle(&mut files, file, false)?
            .map_or(0, |handle| handle.num_pages))
    }

    fn read_page(&self, file: &str, index: PageIndex) -> Result<Vec<u8>> {
        let mut files = self.files.lock();
        let handle = match self.handle(&mut files, file, false)? {
            Some(handle) if index < handle.num_pages => handle,
            other => {
                return Err(DatabaseError::PageOutOfRange {
                    page: index,
                    num_pages: other.map_or(0, |handle| handle.num_pages),
                });
            }
        };
        let mut buffer = vec![0u8; self.config.page_size];
        handle.file.seek(SeekFrom::Start(self.page_offset(index)))?;
        handle.file.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    fn write_page(&self, file: &str, index: PageIndex, data: &[u8]) -> Result<()> {
        let mut files = self.files.lock();
        // A rejected write must not create the file
        let num_pages = self
            .handle(&mut files, file, false)?
            .map_or(0, |handle| handle.num_pages);
        check_write(self.config.page_size, index, num_pages, data)?;

        let handle = self
            .handle(&mut files, file, true)?
            .ok_or_else(|| DatabaseError::Internal(format!("file '{}' not open", file)))?;
        let appending = index == handle.num_pages;
        if let Err(e) = self.write_at(handle, self.page_offset(index), data) {
            if appending {
                if let Err(truncate_err) = self.discard_partial_append(handle) {
                    warn!(
                        "Failed to discard partial page {} of '{}': {}",
                        index, file, truncate_err
                    );
                }
            }
            return Err(e);
        }
        if appending {
            handle.num_pages += 1;
        }
        Ok(())
    }
}
