//! eudalens - EUDA spreadsheet inspection
//!
//! Extracts a structured snapshot from an Excel workbook (sheets, formulas,
//! VBA modules, data connections) and runs pure heuristics over it:
//! complexity and migration-difficulty scoring, formula classification,
//! data-source extraction and a data-model recommendation. Optional AI
//! features (summary, code generation, chat, similarity search) sit on top.

pub mod ai;
pub mod cli;
pub mod config;
pub mod datamodel;
pub mod formulas;
pub mod inspector;
pub mod models;
pub mod pipeline;
pub mod reporters;
pub mod scoring;
pub mod store;
pub mod vba;
