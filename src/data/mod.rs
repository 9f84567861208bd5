//! Data module - Recorded test timings

mod records;

pub use records::{RecordError, TestTimingRecord, TimingTable};
