use thiserror::Error;

use crate::types::{PageIndex, SlotIndex};

/// Broad classification of a [`DatabaseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A tuple's shape does not match a schema.
    Schema,
    /// An index or position is out of bounds, or names an empty slot.
    Range,
    /// An invariant the storage layer should guarantee was broken.
    Internal,
    /// The page store failed, is misconfigured, or found a corrupt file.
    Io,
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema has {types} types but {names} names")]
    FieldCountMismatch { types: usize, names: usize },

    #[error("Duplicate field name '{name}'")]
    DuplicateField { name: String },

    #[error("Tuple is not compatible with schema: {details}")]
    IncompatibleTuple { details: String },

    #[error("Unsupported schema for heap file: {details}")]
    UnsupportedSchema { details: String },

    #[error("Field index {index} out of bounds (fields: {size})")]
    FieldIndexOutOfBounds { index: usize, size: usize },

    #[error("Field '{name}' not found")]
    FieldNotFound { name: String },

    #[error("Invalid slot index {index} (max: {max})")]
    InvalidSlotIndex { index: SlotIndex, max: usize },

    #[error("Slot {index} is empty")]
    EmptySlot { index: SlotIndex },

    #[error("Page {page} out of range (pages: {num_pages})")]
    PageOutOfRange { page: PageIndex, num_pages: usize },

    #[error("Buffer too small: need {expected} bytes, got {actual} bytes")]
    BufferTooSmall { expected: usize, actual: usize },

    #[error("Invalid page size: {expected} bytes, got {actual} bytes")]
    InvalidPageSize { expected: usize, actual: usize },

    #[error("Invalid value '{value}' for {field_type} field")]
    InvalidValue { value: String, field_type: String },

    #[error("Corrupted heap file '{path}': {reason}")]
    CorruptedFile { path: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DatabaseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DatabaseError::Io(_)
            | DatabaseError::CorruptedFile { .. }
            | DatabaseError::ConfigError(_) => ErrorKind::Io,
            DatabaseError::FieldCountMismatch { .. }
            | DatabaseError::DuplicateField { .. }
            | DatabaseError::IncompatibleTuple { .. }
            | DatabaseError::UnsupportedSchema { .. }
            | DatabaseError::InvalidValue { .. } => ErrorKind::Schema,
            DatabaseError::FieldIndexOutOfBounds { .. }
            | DatabaseError::FieldNotFound { .. }
            | DatabaseError::InvalidSlotIndex { .. }
            | DatabaseError::EmptySlot { .. }
            | DatabaseError::PageOutOfRange { .. }
            | DatabaseError::BufferTooSmall { .. }
            | DatabaseError::InvalidPageSize { .. } => ErrorKind::Range,
            DatabaseError::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
