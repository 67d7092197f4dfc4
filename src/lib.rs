//! Expansion engine for Verilog AUTO meta-comments.
//!
//! Authors write placeholders such as `/*AUTOARG*/`, `/*AUTOINST*/`,
//! `/*AUTOINPUT*/`, `/*AUTOOUTPUT*/`, `/*AUTOINOUT*/`, `/*AUTOWIRE*/` and
//! `/*AUTOREG*/`; [`expand`] returns the text edits that replace the region
//! after each marker with the materialised port lists, instance connections
//! and declarations derived from the buffer and a project-wide module index.
//!
//! The engine is pure and synchronous: the result is a function of the
//! buffer text and the project file contents only, and every failure
//! (unresolved module, malformed template, marker in the wrong place)
//! degrades to a no-op for the affected placeholder.

pub mod connect;
pub mod declare;
pub mod driver;
pub mod edit;
pub mod index;
pub mod model;
pub mod scanner;
pub mod template;

pub use edit::{apply_edits, Position, Range, TextEdit};

use driver::ExpansionDriver;
use sv_parser::VerilogParser;

/// Code action title for whole-file expansion.
pub const EXPAND_ALL_ACTION: &str = "Expand all AUTOs in file";

/// Code action title for expansion limited to the cursor selection.
pub const EXPAND_RANGE_ACTION: &str = "Expand all AUTOs in selected range";

#[derive(Debug, Clone)]
pub struct ProjectFile {
    pub uri: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ExpandRequest {
    pub buffer_uri: String,
    pub buffer_text: String,
    /// When present, only placeholders whose region intersects these lines
    /// are expanded.
    pub cursor_range: Option<Range>,
    pub project_files: Vec<ProjectFile>,
}

/// Expands every AUTO placeholder in the buffer. Returns edits sorted from
/// the last one in the buffer to the first, so they can be applied in order;
/// no two edits overlap. A buffer that does not parse yields no edits, as
/// does a project file that does not parse contribute no modules.
pub fn expand(request: &ExpandRequest) -> Vec<TextEdit> {
    let parser = VerilogParser::new();
    let buffer_unit = match parser.parse_content(&request.buffer_text) {
        Ok(unit) => unit,
        Err(_) => return Vec::new(),
    };

    let project_units: Vec<_> = request
        .project_files
        .iter()
        .filter_map(|file| parser.parse_content(&file.text).ok())
        .collect();

    ExpansionDriver::new(
        &request.buffer_text,
        &buffer_unit,
        &project_units,
        request.cursor_range,
    )
    .run()
}
