//! Core data structures: the time-indexed series container.

mod time_series;

pub use time_series::TimeSeries;
