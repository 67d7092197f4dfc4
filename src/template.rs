//! AUTO_TEMPLATE block comments: parsing and per-instance rule lookup.
//!
//! A block comment may stack several clauses:
//!
//! ```text
//! /* qux AUTO_TEMPLATE
//!    bar AUTO_TEMPLATE "pattern" (
//!        .i1(in_a[]),
//!        .o2(out_b)
//!    ); */
//! ```
//!
//! A clause without its own parenthesised body shares the body of the next
//! clause that has one. The pattern string is accepted but never
//! interpreted: every rule whose module name matches applies.

use sv_parser::Span;

#[derive(Debug, Clone)]
pub struct TemplateRule {
    pub module_names: Vec<String>,
    pub pattern: Option<String>,
    /// formal name -> actual template, in source order. An actual ending in
    /// `[]` takes the port's width decoration; anything else is verbatim.
    pub mappings: Vec<(String, String)>,
}

impl TemplateRule {
    pub fn mapping(&self, formal: &str) -> Option<&str> {
        self.mappings
            .iter()
            .rev()
            .find(|(name, _)| name == formal)
            .map(|(_, actual)| actual.as_str())
    }
}

#[derive(Debug, Clone)]
struct TemplateBlock {
    offset: usize,
    rules: Vec<TemplateRule>,
}

/// The ordered template rules of one module. Lookup walks blocks that
/// textually precede the instance; the nearest preceding definition for a
/// module name wins.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    blocks: Vec<TemplateBlock>,
}

impl TemplateStore {
    pub fn scan(text: &str, module_span: Span) -> Self {
        let mut blocks = Vec::new();
        for (offset, body) in block_comments(&text[module_span.0..module_span.1]) {
            if !body.contains("AUTO_TEMPLATE") {
                continue;
            }
            if let Some(rules) = parse_template_comment(body) {
                if !rules.is_empty() {
                    blocks.push(TemplateBlock {
                        offset: module_span.0 + offset,
                        rules,
                    });
                }
            }
        }
        Self { blocks }
    }

    pub fn rule_for(&self, instance_offset: usize, module_name: &str) -> Option<&TemplateRule> {
        let mut found = None;
        for block in &self.blocks {
            if block.offset >= instance_offset {
                break;
            }
            for rule in &block.rules {
                if rule.module_names.iter().any(|name| name == module_name) {
                    found = Some(rule);
                }
            }
        }
        found
    }
}

/// Yields `(offset_of_open_delimiter, body)` for every `/* ... */` comment,
/// skipping `//` line comments so a slash-star inside one cannot open a
/// phantom block.
fn block_comments(text: &str) -> Vec<(usize, &str)> {
    let bytes = text.as_bytes();
    let mut comments = Vec::new();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'/' && bytes[i + 1] == b'/' {
            i = match text[i..].find('\n') {
                Some(nl) => i + nl + 1,
                None => break,
            };
        } else if bytes[i] == b'/' && bytes[i + 1] == b'*' {
            let body_start = i + 2;
            match text[body_start..].find("*/") {
                Some(close) => {
                    comments.push((i, &text[body_start..body_start + close]));
                    i = body_start + close + 2;
                }
                None => break,
            }
        } else {
            i += 1;
        }
    }
    comments
}

fn parse_template_comment(body: &str) -> Option<Vec<TemplateRule>> {
    let mut cursor = Cursor::new(body);
    let mut rules = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    loop {
        cursor.skip_whitespace();
        if cursor.at_end() {
            break;
        }

        let module_name = cursor.identifier()?;
        cursor.skip_whitespace();
        let keyword = cursor.identifier()?;
        if keyword != "AUTO_TEMPLATE" {
            return None;
        }

        cursor.skip_whitespace();
        let pattern = cursor.quoted_string();

        cursor.skip_whitespace();
        if cursor.peek() == Some('(') {
            cursor.advance();
            let mappings = parse_mappings(&mut cursor)?;
            cursor.skip_whitespace();
            if cursor.peek() == Some(';') {
                cursor.advance();
            }

            let mut module_names = std::mem::take(&mut pending);
            module_names.push(module_name);
            rules.push(TemplateRule {
                module_names,
                pattern,
                mappings,
            });
        } else {
            // Headerless clause: inherits the next body
            pending.push(module_name);
        }
    }

    Some(rules)
}

/// Parses `.formal(actual)` pairs up to the closing parenthesis, separated
/// by commas or semicolons.
fn parse_mappings(cursor: &mut Cursor) -> Option<Vec<(String, String)>> {
    let mut mappings = Vec::new();
    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            Some(')') => {
                cursor.advance();
                return Some(mappings);
            }
            Some('.') => {
                cursor.advance();
                cursor.skip_whitespace();
                let formal = cursor.identifier()?;
                cursor.skip_whitespace();
                if cursor.peek() != Some('(') {
                    return None;
                }
                cursor.advance();
                let actual = cursor.balanced_until_close()?;
                mappings.push((formal, actual.trim().to_string()));
                cursor.skip_whitespace();
                if matches!(cursor.peek(), Some(',') | Some(';')) {
                    cursor.advance();
                }
            }
            _ => return None,
        }
    }
}

pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn identifier(&mut self) -> Option<String> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.advance(),
            _ => return None,
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        Some(self.text[start..self.pos].to_string())
    }

    fn quoted_string(&mut self) -> Option<String> {
        if self.peek() != Some('"') {
            return None;
        }
        self.advance();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '"' {
                let value = self.text[start..self.pos].to_string();
                self.advance();
                return Some(value);
            }
            self.advance();
        }
        None
    }

    /// Consumes balanced text up to (and including) the parenthesis closing
    /// the one already consumed.
    fn balanced_until_close(&mut self) -> Option<String> {
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(c) = self.peek() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        let value = self.text[start..self.pos].to_string();
                        self.advance();
                        return Some(value);
                    }
                }
                _ => {}
            }
            self.advance();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(source: &str) -> TemplateStore {
        TemplateStore::scan(source, (0, source.len()))
    }

    #[test]
    fn parses_single_rule() {
        let source = r#"
/* bar AUTO_TEMPLATE "some_regex" (
       .i1(in_a[]),
       .o2(out_b)
   ); */
"#;
        let templates = store(source);
        let rule = templates.rule_for(source.len(), "bar").unwrap();
        assert_eq!(rule.pattern.as_deref(), Some("some_regex"));
        assert_eq!(rule.mapping("i1"), Some("in_a[]"));
        assert_eq!(rule.mapping("o2"), Some("out_b"));
        assert_eq!(rule.mapping("io"), None);
    }

    #[test]
    fn headerless_clause_shares_next_body() {
        let source = r#"
/* qux AUTO_TEMPLATE
   quux AUTO_TEMPLATE
   bar AUTO_TEMPLATE "re" (
       .i1(in_a),
       .o2(out_b[])); */
"#;
        let templates = store(source);
        for name in ["qux", "quux", "bar"] {
            let rule = templates.rule_for(source.len(), name).unwrap();
            assert_eq!(rule.mapping("i1"), Some("in_a"));
            assert_eq!(rule.mapping("o2"), Some("out_b[]"));
        }
        assert!(templates.rule_for(source.len(), "corge").is_none());
    }

    #[test]
    fn nearest_preceding_block_wins() {
        let source = r#"
/* bar AUTO_TEMPLATE (.i1(first[])); */
middle
/* bar AUTO_TEMPLATE (.i1(second[])); */
"#;
        let templates = store(source);
        let early = source.find("middle").unwrap();
        assert_eq!(
            templates.rule_for(early, "bar").unwrap().mapping("i1"),
            Some("first[]")
        );
        assert_eq!(
            templates.rule_for(source.len(), "bar").unwrap().mapping("i1"),
            Some("second[]")
        );
    }

    #[test]
    fn rules_do_not_apply_before_their_block() {
        let source = "text /* bar AUTO_TEMPLATE (.a(b)); */";
        let templates = store(source);
        assert!(templates.rule_for(0, "bar").is_none());
    }

    #[test]
    fn malformed_template_is_ignored() {
        let source = "/* bar AUTO_TEMPLATE ( .i1 no parens ); */";
        let templates = store(source);
        assert!(templates.rule_for(source.len(), "bar").is_none());
    }

    #[test]
    fn identifier_check() {
        assert!(is_identifier("in_a"));
        assert!(is_identifier("_x0"));
        assert!(!is_identifier("2'b00"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("{a, b}"));
    }
}
