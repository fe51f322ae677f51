//! Infrastructure adapters for external services (object storage)

pub mod storage;
