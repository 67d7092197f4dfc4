//! Code action assembly tests, run without a transport.

use sv_autoexpand::{EXPAND_ALL_ACTION, EXPAND_RANGE_ACTION};
use sv_language_server::actions::expand_actions;
use sv_language_server::parse_diagnostics;
use tower_lsp::lsp_types::{Position, Range, Url};

fn test_uri() -> Url {
    Url::parse("file:///work/top.sv").unwrap()
}

fn whole_file() -> Range {
    Range {
        start: Position::new(0, 0),
        end: Position::new(1000, 0),
    }
}

const BUFFER: &str = r#"
module bar (
    input  i1,
    output o1
);
endmodule

module foo;
  bar b (  /*AUTOINST*/);
endmodule
"#;

#[test]
fn offers_both_actions_when_edits_exist() {
    let actions = expand_actions(&test_uri(), BUFFER, whole_file(), &[]);
    let titles: Vec<&str> = actions.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec![EXPAND_ALL_ACTION, EXPAND_RANGE_ACTION]);
}

#[test]
fn actions_carry_workspace_edits_for_the_document() {
    let uri = test_uri();
    let actions = expand_actions(&uri, BUFFER, whole_file(), &[]);
    let action = &actions[0];

    let changes = action
        .edit
        .as_ref()
        .and_then(|edit| edit.changes.as_ref())
        .expect("expansion actions carry changes");
    let edits = changes.get(&uri).expect("edits target the document");
    assert!(!edits.is_empty());
    assert!(edits.iter().any(|e| e.new_text.contains(".i1(i1)")));
}

#[test]
fn no_actions_without_any_markers() {
    let actions = expand_actions(
        &test_uri(),
        "module empty;\nendmodule\n",
        whole_file(),
        &[],
    );
    assert!(actions.is_empty());
}

#[test]
fn selection_outside_all_markers_omits_the_range_action() {
    let range = Range {
        start: Position::new(0, 0),
        end: Position::new(1, 0),
    };
    let actions = expand_actions(&test_uri(), BUFFER, range, &[]);
    let titles: Vec<&str> = actions.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec![EXPAND_ALL_ACTION]);
}

#[test]
fn project_files_resolve_modules() {
    let buffer = "module foo;\n  bar b (  /*AUTOINST*/);\nendmodule\n";
    let project = vec![(
        "file:///work/bar.sv".to_string(),
        "module bar (\n    input  i1,\n    output o1\n);\nendmodule\n".to_string(),
    )];

    let without = expand_actions(&test_uri(), buffer, whole_file(), &[]);
    assert!(without.is_empty());

    let with = expand_actions(&test_uri(), buffer, whole_file(), &project);
    assert!(!with.is_empty());
}

#[test]
fn parse_errors_become_diagnostics() {
    let diagnostics = parse_diagnostics("module broken (\n");
    assert!(!diagnostics.is_empty());

    let clean = parse_diagnostics("module fine;\nendmodule\n");
    assert!(clean.is_empty());
}
