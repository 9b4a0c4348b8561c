//! I/O module for reading Esri File Geodatabase directories

pub mod gdb;

pub use gdb::{GdbReader, GdbReaderConfiguration};
