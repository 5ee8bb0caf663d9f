use std::{path::Path, sync::Arc};

use tempfile::{Builder, TempDir};

use crate::{
    storage::{
        config::StorageConfig, heap_file::HeapFile, page_store::FilePageStore,
        schema::TupleDesc,
    },
    types::{
        error::Result,
        tuple::Tuple,
        value::{Field, Type},
    },
};

/// A temporary data directory with an on-disk page store. The directory is
/// removed when this value is dropped.
pub struct TempStore {
    pub dir: TempDir,
    pub store: Arc<FilePageStore>,
}

impl TempStore {
    pub fn new() -> Result<Self> {
        Self::with_prefix("heapstore_test")
    }

    pub fn with_prefix(prefix: &str) -> Result<Self> {
        let dir = Builder::new().prefix(prefix).tempdir()?;
        let config = StorageConfig::new(dir.path()).with_fsync(false);
        let store = Arc::new(FilePageStore::new(config)?);
        Ok(Self { dir, store })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn open_heap_file(
        &self,
        name: &str,
        td: Arc<TupleDesc>,
    ) -> Result<HeapFile<Arc<FilePageStore>>> {
        HeapFile::new(name, td, Arc::clone(&self.store))
    }
}

/// `(id INT, score DOUBLE, name CHAR)`
pub fn sample_tuple_desc() -> Arc<TupleDesc> {
    let td = TupleDesc::from_fields([
        (Type::Int, "id"),
        (Type::Double, "score"),
        (Type::Char, "name"),
    ])
    .expect("sample schema has unique field names");
    Arc::new(td)
}

pub fn sample_tuple(id: i32) -> Tuple {
    Tuple::new(vec![
        Field::Int(id),
        Field::Double(id as f64 * 1.5),
        Field::Char(format!("name_{:04}", id)),
    ])
}
