//! AAS submodel table extractor.
//!
//! This crate flattens the submodels of Asset Administration Shell
//! environments (`.aasx` packages, XML or JSON) into row-oriented tables.
//! Each row's ancestor groups are reconstructed as `SMC` columns and leaf
//! rows are enriched with concept description definitions.
//!
//! The binary `aastable` exports every selected submodel as a DOCX, XLSX or
//! JSON file.

pub mod config;
pub mod export;
pub mod extract;
pub mod generator;
pub mod model;
pub mod parser;
pub mod schema;
pub mod tree;
