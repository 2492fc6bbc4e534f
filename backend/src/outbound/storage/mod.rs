//! Filesystem adapters for uploaded design files.

mod fs_blob_store;

pub use fs_blob_store::FsBlobStore;
