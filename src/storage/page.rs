use crate::{
    storage::schema::TupleDesc,
    types::{
        SlotIndex,
        error::{DatabaseError, Result},
        tuple::Tuple,
    },
};

/*
 * Heap Page Layout (fixed-width slots)
 * ┌─────────────────────────────────────────────────────────────────┐
 * │                OCCUPANCY BITMAP (ceil(slots / 8) bytes)         │
 * │  slot i -> byte i / 8, bit i % 8 (LSB first), 1 = occupied      │
 * ├─────────────────────────────────────────────────────────────────┤
 * │  [slot 0: td.length() bytes] [slot 1] ... [slot N-1]            │
 * ├─────────────────────────────────────────────────────────────────┤
 * │                    UNUSED TAIL (zeroed)                         │
 * └─────────────────────────────────────────────────────────────────┘
 */

/// Number of slots a page of `page_size` bytes holds for records of
/// `record_width` bytes, counting one bitmap bit per slot.
pub fn slot_capacity(page_size: usize, record_width: usize) -> usize {
    (page_size * 8) / (record_width * 8 + 1)
}

/// Size of the occupancy bitmap for `capacity` slots.
pub fn bitmap_len(capacity: usize) -> usize {
    capacity.div_ceil(8)
}

/// A heap page over an owned page buffer. The caller reads the buffer from
/// the page store, mutates it through the page, and takes it back with
/// [`HeapPage::into_bytes`] for writing.
pub struct HeapPage<'a> {
    data: Vec<u8>,
    td: &'a TupleDesc,
    capacity: usize,
    header_len: usize,
}

impl<'a> HeapPage<'a> {
    pub fn new(data: Vec<u8>, td: &'a TupleDesc) -> Self {
        let capacity = slot_capacity(data.len(), td.length());
        Self {
            data,
            td,
            capacity,
            header_len: bitmap_len(capacity),
        }
    }

    /// An all-zero page: every slot empty.
    pub fn empty(page_size: usize, td: &'a TupleDesc) -> Self {
        Self::new(vec![0; page_size], td)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn is_occupied(&self, slot: SlotIndex) -> bool {
        slot < self.capacity && self.data[slot / 8] & (1 << (slot % 8)) != 0
    }

    pub fn occupied_count(&self) -> usize {
        (0..self.capacity).filter(|&s| self.is_occupied(s)).count()
    }

    /// Stores `tuple` in the first empty slot. Returns `Ok(false)` when the
    /// page is full.
    pub fn insert(&mut self, tuple: &Tuple) -> Result<bool> {
        let Some(slot) = (0..self.capacity).find(|&s| !self.is_occupied(s)) else {
            return Ok(false);
        };
        let range = self.slot_range(slot);
        self.td.serialize(&mut self.data[range], tuple)?;
        self.set_occupied(slot, true);
        Ok(true)
    }

    /// Clears the slot's occupancy bit. The slot bytes are left as they are.
    pub fn delete(&mut self, slot: SlotIndex) -> Result<()> {
        self.check_occupied(slot)?;
        self.set_occupied(slot, false);
        Ok(())
    }

    pub fn get(&self, slot: SlotIndex) -> Result<Tuple> {
        self.check_occupied(slot)?;
        self.td.deserialize(&self.data[self.slot_range(slot)])
    }

    /// First occupied slot, or `end()` if the page is empty.
    pub fn begin(&self) -> SlotIndex {
        self.first_occupied_from(0)
    }

    /// One past the last slot.
    pub fn end(&self) -> SlotIndex {
        self.capacity
    }

    /// Next occupied slot strictly after `slot`, or `end()`.
    pub fn next(&self, slot: SlotIndex) -> SlotIndex {
        self.first_occupied_from(slot.saturating_add(1))
    }

    fn first_occupied_from(&self, start: SlotIndex) -> SlotIndex {
        (start..self.capacity)
            .find(|&s| self.is_occupied(s))
            .unwrap_or(self.capacity)
    }

    fn check_occupied(&self, slot: SlotIndex) -> Result<()> {
        if slot >= self.capacity {
            return Err(DatabaseError::InvalidSlotIndex {
                index: slot,
                max: self.capacity,
            });
        }
        if !self.is_occupied(slot) {
            return Err(DatabaseError::EmptySlot { index: slot });
        }
        Ok(())
    }

    fn set_occupied(&mut self, slot: SlotIndex, occupied: bool) {
        let mask = 1 << (slot % 8);
        if occupied {
            self.data[slot / 8] |= mask;
        } else {
            self.data[slot / 8] &= !mask;
        }
    }

    fn slot_range(&self, slot: SlotIndex) -> std::ops::Range<usize> {
        let start = self.header_len + slot * self.td.length();
        start..start + self.td.length()
    }
}
