pub mod config;
pub mod heap_file;
pub mod page;
pub mod page_store;
pub mod schema;
