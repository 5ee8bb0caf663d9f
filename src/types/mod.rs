pub mod error;
pub mod tuple;
pub mod value;

// Common type aliases
pub type PageIndex = usize;
pub type SlotIndex = usize;

// Default page size of a heap file
pub const PAGE_SIZE: usize = 4096;

// Serialized field widths
pub const INT_SIZE: usize = 4; // i32
pub const DOUBLE_SIZE: usize = 8; // f64
pub const CHAR_SIZE: usize = 64; // fixed capacity, zero padded
