//! Flowchart layout on a spreadsheet-style cell grid.
//!
//! A run goes `compile -> place -> route`: node specs are validated into nodes and
//! edges, every node is assigned a cell, and every edge gets orthogonal connector
//! geometry. [`render::Renderer`] is the seam to a drawing surface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod flow;
pub mod render;
pub mod request;

pub use flow::{FlowError, layout, layout_compiled};
