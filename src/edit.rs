//! Text edits in LSP convention (0-indexed lines, UTF-16 columns) and the
//! byte-offset line index used to produce them.

/// A line/character position. `character` counts UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

/// Maps byte offsets to line/character positions and back.
///
/// Built once per buffer. Lines are split on `\n`; `\r` counts as a regular
/// character.
pub struct LineIndex<'a> {
    text: &'a str,
    /// Byte offset of the start of each line. First entry is always 0.
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { text, line_starts }
    }

    /// Convert a byte offset to a position. Offsets beyond the end of the
    /// text are clamped.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            - 1;
        let character: usize = self.text[self.line_starts[line]..offset]
            .chars()
            .map(char::len_utf16)
            .sum();
        Position {
            line: line as u32,
            character: character as u32,
        }
    }

    /// Convert a position back to a byte offset. Out-of-range lines clamp to
    /// the end of the text, out-of-range characters to the end of the line.
    pub fn offset(&self, position: Position) -> usize {
        let line = position.line as usize;
        if line >= self.line_starts.len() {
            return self.text.len();
        }
        let line_start = self.line_starts[line];
        let line_end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.text.len());
        let mut units = 0usize;
        for (i, c) in self.text[line_start..line_end].char_indices() {
            if units >= position.character as usize {
                return line_start + i;
            }
            units += c.len_utf16();
        }
        line_end
    }
}

/// Collects byte-span replacements and converts them into a non-overlapping
/// edit set, sorted last-to-first so they can be applied in order.
pub struct EditEmitter {
    edits: Vec<(usize, usize, String)>,
}

impl EditEmitter {
    pub fn new() -> Self {
        Self { edits: Vec::new() }
    }

    pub fn push(&mut self, span: (usize, usize), new_text: String) {
        self.edits.push((span.0, span.1, new_text));
    }

    pub fn finish(mut self, index: &LineIndex) -> Vec<TextEdit> {
        self.edits.sort_by_key(|(start, end, _)| (*start, *end));

        let mut out: Vec<TextEdit> = Vec::new();
        let mut last_end = 0usize;
        for (start, end, new_text) in self.edits {
            if !out.is_empty() && start < last_end {
                continue;
            }
            last_end = end;
            out.push(TextEdit {
                range: Range {
                    start: index.position(start),
                    end: index.position(end),
                },
                new_text,
            });
        }

        out.reverse();
        out
    }
}

impl Default for EditEmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply an edit set to a buffer. Edits are applied from the last one in the
/// buffer to the first, so earlier ranges stay valid as later text moves.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let index = LineIndex::new(text);
    let mut resolved: Vec<(usize, usize, &str)> = edits
        .iter()
        .map(|edit| {
            (
                index.offset(edit.range.start),
                index.offset(edit.range.end),
                edit.new_text.as_str(),
            )
        })
        .collect();
    resolved.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    let mut result = text.to_string();
    for (start, end, new_text) in resolved {
        result.replace_range(start..end, new_text);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_counts_utf16_units() {
        let text = "ab\ncd\u{1F600}e\n";
        let index = LineIndex::new(text);
        assert_eq!(index.position(0), Position { line: 0, character: 0 });
        assert_eq!(index.position(4), Position { line: 1, character: 1 });
        // the emoji is 4 bytes and 2 UTF-16 units
        let e_offset = text.find('e').unwrap();
        assert_eq!(index.position(e_offset), Position { line: 1, character: 4 });
    }

    #[test]
    fn offset_round_trips() {
        let text = "one\ntwo\nthree";
        let index = LineIndex::new(text);
        for offset in [0, 3, 4, 7, 8, 13] {
            assert_eq!(index.offset(index.position(offset)), offset);
        }
    }

    #[test]
    fn emitter_drops_overlapping_edits() {
        let text = "0123456789";
        let index = LineIndex::new(text);
        let mut emitter = EditEmitter::new();
        emitter.push((2, 6), "x".to_string());
        emitter.push((4, 8), "y".to_string());
        emitter.push((8, 9), "z".to_string());
        let edits = emitter.finish(&index);
        assert_eq!(edits.len(), 2);
        // sorted last-to-first
        assert!(edits[0].range.start > edits[1].range.start);
    }

    #[test]
    fn apply_edits_applies_in_reverse_order() {
        let text = "aaa bbb ccc";
        let index = LineIndex::new(text);
        let mut emitter = EditEmitter::new();
        emitter.push((0, 3), "X".to_string());
        emitter.push((8, 11), "Y".to_string());
        let edits = emitter.finish(&index);
        assert_eq!(apply_edits(text, &edits), "X bbb Y");
    }
}
