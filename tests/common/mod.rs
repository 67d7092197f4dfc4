use sv_autoexpand::{apply_edits, expand, ExpandRequest, Position, ProjectFile, Range, TextEdit};

#[allow(dead_code)]
pub fn expansion_edits(buffer: &str, project: &[&str]) -> Vec<TextEdit> {
    expand(&request(buffer, project, None))
}

#[allow(dead_code)]
pub fn expand_text(buffer: &str) -> String {
    expand_text_with_project(buffer, &[])
}

#[allow(dead_code)]
pub fn expand_text_with_project(buffer: &str, project: &[&str]) -> String {
    apply_edits(buffer, &expansion_edits(buffer, project))
}

#[allow(dead_code)]
pub fn expand_text_in_lines(buffer: &str, start_line: u32, end_line: u32) -> String {
    let range = Range {
        start: Position {
            line: start_line,
            character: 0,
        },
        end: Position {
            line: end_line,
            character: 0,
        },
    };
    let edits = expand(&request(buffer, &[], Some(range)));
    apply_edits(buffer, &edits)
}

fn request(buffer: &str, project: &[&str], cursor_range: Option<Range>) -> ExpandRequest {
    ExpandRequest {
        buffer_uri: "file:///tested.sv".to_string(),
        buffer_text: buffer.to_string(),
        cursor_range,
        project_files: project
            .iter()
            .enumerate()
            .map(|(i, text)| ProjectFile {
                uri: format!("file:///project-{}.sv", i),
                text: text.to_string(),
            })
            .collect(),
    }
}

/// Applies the expansion, compares against the expected text, then expands
/// the result once more to check it is a fixed point.
#[allow(dead_code)]
pub fn assert_expansion(before: &str, golden: &str) {
    assert_expansion_with_project(before, &[], golden);
}

#[allow(dead_code)]
pub fn assert_expansion_with_project(before: &str, project: &[&str], golden: &str) {
    let after = expand_text_with_project(before, project);
    assert_eq!(golden, after, "expansion did not produce the expected text");

    let again = expand_text_with_project(golden, project);
    assert_eq!(golden, again, "expansion is not idempotent");
}
