//! Code action assembly. Kept free of the LSP client so it can be tested
//! without a transport.

use std::collections::HashMap;

use sv_autoexpand::{expand, ExpandRequest, ProjectFile, EXPAND_ALL_ACTION, EXPAND_RANGE_ACTION};
use tower_lsp::lsp_types::{
    CodeAction, CodeActionKind, Position, Range, TextEdit, Url, WorkspaceEdit,
};

/// Builds the AUTO expansion actions for a document: one covering the whole
/// file and one scoped to the selection. Actions that would change nothing
/// are omitted.
pub fn expand_actions(
    uri: &Url,
    text: &str,
    selection: Range,
    project_files: &[(String, String)],
) -> Vec<CodeAction> {
    let mut actions = Vec::new();

    let full = run_expansion(uri, text, None, project_files);
    if !full.is_empty() {
        actions.push(make_action(EXPAND_ALL_ACTION, uri, full));
    }

    let scoped = run_expansion(uri, text, Some(selection), project_files);
    if !scoped.is_empty() {
        actions.push(make_action(EXPAND_RANGE_ACTION, uri, scoped));
    }

    actions
}

fn run_expansion(
    uri: &Url,
    text: &str,
    selection: Option<Range>,
    project_files: &[(String, String)],
) -> Vec<TextEdit> {
    let request = ExpandRequest {
        buffer_uri: uri.to_string(),
        buffer_text: text.to_string(),
        cursor_range: selection.map(engine_range),
        project_files: project_files
            .iter()
            .map(|(uri, text)| ProjectFile {
                uri: uri.clone(),
                text: text.clone(),
            })
            .collect(),
    };

    expand(&request).into_iter().map(lsp_edit).collect()
}

fn make_action(title: &str, uri: &Url, edits: Vec<TextEdit>) -> CodeAction {
    let mut changes = HashMap::new();
    changes.insert(uri.clone(), edits);
    CodeAction {
        title: title.to_string(),
        kind: Some(CodeActionKind::REFACTOR_REWRITE),
        edit: Some(WorkspaceEdit {
            changes: Some(changes),
            ..WorkspaceEdit::default()
        }),
        ..CodeAction::default()
    }
}

fn engine_range(range: Range) -> sv_autoexpand::Range {
    sv_autoexpand::Range {
        start: sv_autoexpand::Position {
            line: range.start.line,
            character: range.start.character,
        },
        end: sv_autoexpand::Position {
            line: range.end.line,
            character: range.end.character,
        },
    }
}

fn lsp_edit(edit: sv_autoexpand::TextEdit) -> TextEdit {
    TextEdit {
        range: Range {
            start: Position {
                line: edit.range.start.line,
                character: edit.range.start.character,
            },
            end: Position {
                line: edit.range.end.line,
                character: edit.range.end.character,
            },
        },
        new_text: edit.new_text,
    }
}
