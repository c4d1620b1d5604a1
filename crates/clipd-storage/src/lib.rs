//! Durable state on disk: the batch sequence store and the file catalog.

pub mod batch;
pub mod catalog;
pub mod error;

pub use batch::BatchStore;
pub use catalog::{ClipFile, FileCatalog};
pub use error::{StorageError, StorageResult};
