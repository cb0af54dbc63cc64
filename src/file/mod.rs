//! File I/O for row and schema documents.

pub mod loader;
