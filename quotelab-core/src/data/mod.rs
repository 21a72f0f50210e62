//! Market-data boundary: CSV ingestion and synthetic series generation.

pub mod csv_io;
pub mod synthetic;

pub use csv_io::{read_bars, read_bars_from_path};
pub use synthetic::{synthetic_series, SyntheticConfig};
