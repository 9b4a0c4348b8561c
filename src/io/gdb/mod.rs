//! Esri File Geodatabase catalog support.

pub mod catalog;
pub mod gdb_reader;
pub mod gdb_reader_configuration;
pub mod table_readers;

pub use gdb_reader::GdbReader;
pub use gdb_reader_configuration::GdbReaderConfiguration;
pub use table_readers::{Record, TableReader};
