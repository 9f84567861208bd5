//! Stats module - Aggregates for the chart annotations

mod summary;

pub use summary::TimingSummary;
