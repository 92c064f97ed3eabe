//! File-facing side of record matching: CSV in, CSV out, TOML profiles.

pub mod csv_table;
pub mod profile;
pub mod sink;

pub use csv_table::{read_csv_from, read_csv_table};
pub use profile::{default_profile_path, load_profile, save_profile};
pub use sink::CsvSink;
