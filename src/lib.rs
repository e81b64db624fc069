//! Adapter exposing a flat object-storage bucket as the hierarchical
//! virtual file system a content-management host consumes.

pub mod adapters;
pub mod delete;
pub mod fs;
pub mod model;
pub mod pages;
pub mod paths;
pub mod util;

pub use fs::{BucketFS, FileSystem};
pub use model::fs::{BucketConfig, FSError, FSResult};
