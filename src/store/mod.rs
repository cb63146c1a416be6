//! Durable storage for the record book

pub mod records;

pub use records::{persist_retirements, Record, RecordStore, RecordsError};
