use std::{fmt, sync::Arc};

use tracing::{debug, trace};

use crate::{
    storage::{
        page::{HeapPage, slot_capacity},
        page_store::PageStore,
        schema::TupleDesc,
    },
    types::{
        PageIndex, SlotIndex,
        error::{DatabaseError, Result},
        tuple::Tuple,
    },
};

/// Locates one potential tuple inside a heap file. Ordering is page-major,
/// slot-minor. The end position of a file is `(num_pages, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub page: PageIndex,
    pub slot: SlotIndex,
}

impl Position {
    pub fn new(page: PageIndex, slot: SlotIndex) -> Self {
        Self { page, slot }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.page, self.slot)
    }
}

/// An unordered collection of fixed-width tuples spread over the pages of
/// one named file in a [`PageStore`].
///
/// Every operation re-reads the pages it needs from the store and writes
/// back the ones it changes; nothing is cached between calls.
pub struct HeapFile<S: PageStore> {
    name: String,
    td: Arc<TupleDesc>,
    store: S,
}

impl<S: PageStore> HeapFile<S> {
    pub fn new(name: impl Into<String>, td: Arc<TupleDesc>, store: S) -> Result<Self> {
        if td.length() == 0 {
            return Err(DatabaseError::UnsupportedSchema {
                details: "schema has zero width".to_string(),
            });
        }
        if slot_capacity(store.page_size(), td.length()) == 0 {
            return Err(DatabaseError::UnsupportedSchema {
                details: format!(
                    "record of {} bytes does not fit in a {} byte page",
                    td.length(),
                    store.page_size()
                ),
            });
        }
        Ok(Self {
            name: name.into(),
            td,
            store,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tuple_desc(&self) -> &Arc<TupleDesc> {
        &self.td
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn num_pages(&self) -> Result<usize> {
        self.store.num_pages(&self.name)
    }

    pub fn slots_per_page(&self) -> usize {
        slot_capacity(self.store.page_size(), self.td.length())
    }

    fn read_page(&self, index: PageIndex) -> Result<HeapPage<'_>> {
        let data = self.store.read_page(&self.name, index)?;
        Ok(HeapPage::new(data, &self.td))
    }

    fn write_page(&self, index: PageIndex, page: HeapPage<'_>) -> Result<()> {
        self.store.write_page(&self.name, index, &page.into_bytes())
    }

    fn check_page(&self, page: PageIndex) -> Result<()> {
        let num_pages = self.num_pages()?;
        if page >= num_pages {
            return Err(DatabaseError::PageOutOfRange { page, num_pages });
        }
        Ok(())
    }

    /// Inserts into the last page, or appends a new page when the last page
    /// is full or the file is empty. Earlier pages are never reused.
    pub fn insert_tuple(&self, tuple: &Tuple) -> Result<()> {
        if !self.td.compatible(tuple) {
            return Err(DatabaseError::IncompatibleTuple {
                details: format!("tuple {} does not match schema {}", tuple, self.td),
            });
        }

        let num_pages = self.num_pages()?;
        if num_pages > 0 {
            let last = num_pages - 1;
            let mut page = self.read_page(last)?;
            if page.insert(tuple)? {
                trace!(file = %self.name, page = last, "inserted tuple");
                return self.write_page(last, page);
            }
        }

        let mut page = HeapPage::empty(self.store.page_size(), &self.td);
        if !page.insert(tuple)? {
            return Err(DatabaseError::Internal(
                "tuple did not fit in an empty page".to_string(),
            ));
        }
        debug!(file = %self.name, page = num_pages, "appending heap page");
        self.write_page(num_pages, page)
    }

    pub fn delete_tuple(&self, position: Position) -> Result<()> {
        self.check_page(position.page)?;
        let mut page = self.read_page(position.page)?;
        page.delete(position.slot)?;
        trace!(file = %self.name, %position, "deleted tuple");
        self.write_page(position.page, page)
    }

    pub fn get_tuple(&self, position: Position) -> Result<Tuple> {
        self.check_page(position.page)?;
        self.read_page(position.page)?.get(position.slot)
    }

    /// First occupied position, or `end()` if the file holds no tuples.
    pub fn begin(&self) -> Result<Position> {
        let num_pages = self.num_pages()?;
        self.first_occupied_from(0, num_pages)
    }

    pub fn end(&self) -> Result<Position> {
        Ok(Position::new(self.num_pages()?, 0))
    }

    /// Advances `position` to the next occupied slot, or to `end()`.
    pub fn next(&self, position: &mut Position) -> Result<()> {
        let num_pages = self.num_pages()?;
        if position.page >= num_pages {
            *position = Position::new(num_pages, 0);
            return Ok(());
        }

        let page = self.read_page(position.page)?;
        let slot = page.next(position.slot);
        if slot != page.end() {
            position.slot = slot;
            return Ok(());
        }

        *position = self.first_occupied_from(position.page + 1, num_pages)?;
        Ok(())
    }

    fn first_occupied_from(&self, start: PageIndex, num_pages: usize) -> Result<Position> {
        for index in start..num_pages {
            let page = self.read_page(index)?;
            let slot = page.begin();
            if slot != page.end() {
                return Ok(Position::new(index, slot));
            }
        }
        Ok(Position::new(num_pages, 0))
    }

    pub fn iter(&self) -> HeapFileIterator<'_, S> {
        HeapFileIterator {
            file: self,
            position: None,
            done: false,
        }
    }

    /// Every tuple in page-major, slot-minor order.
    pub fn scan(&self) -> Result<Vec<Tuple>> {
        self.iter()
            .map(|item| item.map(|(_, tuple)| tuple))
            .collect()
    }
}

/// Forward-only cursor over a heap file. It remembers only the last
/// position it yielded and advances from there on the next step, so tuples
/// inserted or deleted through the same file in between are observed.
pub struct HeapFileIterator<'a, S: PageStore> {
    file: &'a HeapFile<S>,
    position: Option<Position>,
    done: bool,
}

impl<S: PageStore> HeapFileIterator<'_, S> {
    /// Position of the last yielded tuple; `None` before the first step.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    fn step(&mut self) -> Result<Option<(Position, Tuple)>> {
        let position = match self.position {
            Some(mut position) => {
                self.file.next(&mut position)?;
                position
            }
            None => self.file.begin()?,
        };
        if position.page >= self.file.num_pages()? {
            return Ok(None);
        }
        let tuple = self.file.get_tuple(position)?;
        self.position = Some(position);
        Ok(Some((position, tuple)))
    }
}

impl<S: PageStore> Iterator for HeapFileIterator<'_, S> {
    type Item = Result<(Position, Tuple)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
