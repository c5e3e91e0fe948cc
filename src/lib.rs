//! Raw Accelerometer Conversion Library
//!
//! This library provides the core functionality for the `rawcsv2rawbin` CLI
//! tool. It includes modules for parsing raw CSV exports from a wearable
//! accelerometer, reading and writing the compact binary format, and
//! converting between the two.

pub mod binary;
pub mod cli;
pub mod converter;
pub mod csv_handler;
pub mod error;
pub mod ident;
pub mod util;
