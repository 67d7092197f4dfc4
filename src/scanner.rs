//! Locates AUTO markers in a module and computes the replace region each one
//! owns, including previously generated content picked up for re-expansion.

use sv_parser::Span;

use crate::model::ModuleModel;

pub const END_OF_AUTOMATICS: &str = "// End of automatics";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MarkerKind {
    Autoarg,
    Autoinst,
    Autoinput,
    Autooutput,
    Autoinout,
    Autowire,
    Autoreg,
}

impl MarkerKind {
    pub const ALL: [MarkerKind; 7] = [
        MarkerKind::Autoarg,
        MarkerKind::Autoinst,
        MarkerKind::Autoinput,
        MarkerKind::Autooutput,
        MarkerKind::Autoinout,
        MarkerKind::Autowire,
        MarkerKind::Autoreg,
    ];

    /// The exact marker comment. No whitespace inside the delimiters is
    /// accepted.
    pub fn marker_text(self) -> &'static str {
        match self {
            MarkerKind::Autoarg => "/*AUTOARG*/",
            MarkerKind::Autoinst => "/*AUTOINST*/",
            MarkerKind::Autoinput => "/*AUTOINPUT*/",
            MarkerKind::Autooutput => "/*AUTOOUTPUT*/",
            MarkerKind::Autoinout => "/*AUTOINOUT*/",
            MarkerKind::Autowire => "/*AUTOWIRE*/",
            MarkerKind::Autoreg => "/*AUTOREG*/",
        }
    }

    /// First line of the generated block for declaration-producing kinds.
    pub fn banner(self) -> Option<&'static str> {
        match self {
            MarkerKind::Autoinput => {
                Some("// Beginning of automatic inputs (from autoinst inputs)")
            }
            MarkerKind::Autooutput => {
                Some("// Beginning of automatic outputs (from autoinst outputs)")
            }
            MarkerKind::Autoinout => {
                Some("// Beginning of automatic inouts (from autoinst inouts)")
            }
            MarkerKind::Autowire => Some(
                "// Beginning of automatic wires (for undeclared instantiated-module outputs)",
            ),
            MarkerKind::Autoreg => {
                Some("// Beginning of automatic regs (for this module's undeclared outputs)")
            }
            MarkerKind::Autoarg | MarkerKind::Autoinst => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerContext {
    /// Inside the module header parenthesis.
    Header,
    /// Inside an instance connection list; the index is into the module's
    /// instance list.
    Connections(usize),
    Body,
}

#[derive(Debug, Clone)]
pub struct Placeholder {
    pub kind: MarkerKind,
    pub marker_span: Span,
    /// Marker comment plus any previously generated block; this is what an
    /// expansion replaces.
    pub region: Span,
    pub context: MarkerContext,
}

/// Scans a module's text for markers and keeps the ones that are meaningful
/// in their context. Markers elsewhere are left untouched by returning no
/// placeholder for them.
pub fn scan_module(text: &str, module: &ModuleModel) -> Vec<Placeholder> {
    let slice = &text[module.span.0..module.span.1];
    let mut found: Vec<(usize, MarkerKind)> = Vec::new();
    for kind in MarkerKind::ALL {
        for (pos, _) in slice.match_indices(kind.marker_text()) {
            found.push((module.span.0 + pos, kind));
        }
    }
    found.sort();

    let mut placeholders = Vec::new();
    let mut seen_autoarg = false;
    for (start, kind) in found {
        let marker_span = (start, start + kind.marker_text().len());
        let context = classify(module, start);
        match kind {
            MarkerKind::Autoarg => {
                // Only the first AUTOARG inside the header is meaningful
                if context != MarkerContext::Header || seen_autoarg {
                    continue;
                }
                seen_autoarg = true;
                let header = module.header_span.expect("header context implies a header");
                placeholders.push(Placeholder {
                    kind,
                    marker_span,
                    region: (start, header.1 - 1),
                    context,
                });
            }
            MarkerKind::Autoinst => {
                let MarkerContext::Connections(instance) = context else {
                    continue;
                };
                let connection_span = module.instances[instance].connection_span;
                placeholders.push(Placeholder {
                    kind,
                    marker_span,
                    region: (start, connection_span.1 - 1),
                    context,
                });
            }
            MarkerKind::Autoinput | MarkerKind::Autooutput | MarkerKind::Autoinout => {
                if matches!(context, MarkerContext::Connections(_)) {
                    continue;
                }
                placeholders.push(Placeholder {
                    kind,
                    marker_span,
                    region: generated_block_region(text, marker_span, kind),
                    context,
                });
            }
            MarkerKind::Autowire | MarkerKind::Autoreg => {
                if context != MarkerContext::Body {
                    continue;
                }
                placeholders.push(Placeholder {
                    kind,
                    marker_span,
                    region: generated_block_region(text, marker_span, kind),
                    context,
                });
            }
        }
    }
    placeholders
}

fn classify(module: &ModuleModel, offset: usize) -> MarkerContext {
    if let Some(header) = module.header_span {
        if offset > header.0 && offset < header.1 {
            return MarkerContext::Header;
        }
    }
    for (i, instance) in module.instances.iter().enumerate() {
        if offset > instance.connection_span.0 && offset < instance.connection_span.1 {
            return MarkerContext::Connections(i);
        }
    }
    MarkerContext::Body
}

/// Extends a declaration marker's region through an existing generated block
/// when its banner immediately follows, up to the end of the closing
/// `// End of automatics` line.
fn generated_block_region(text: &str, marker_span: Span, kind: MarkerKind) -> Span {
    let banner = kind.banner().expect("declaration kinds carry a banner");
    let rest = &text[marker_span.1..];
    let skipped = rest.len() - rest.trim_start().len();
    let block_start = marker_span.1 + skipped;
    if text[block_start..].starts_with(banner) {
        if let Some(end) = text[block_start..].find(END_OF_AUTOMATICS) {
            return (
                marker_span.0,
                block_start + end + END_OF_AUTOMATICS.len(),
            );
        }
    }
    (marker_span.0, marker_span.1)
}

/// Identifier tokens of a text slice, comments stripped. Used to find the
/// manually authored names of a header port list.
pub fn identifier_tokens(text: &str) -> std::collections::HashSet<String> {
    let mut tokens = std::collections::HashSet::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'/' {
            i = match text[i..].find('\n') {
                Some(nl) => i + nl + 1,
                None => bytes.len(),
            };
        } else if bytes[i] == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'*' {
            i = match text[i + 2..].find("*/") {
                Some(close) => i + 2 + close + 2,
                None => bytes.len(),
            };
        } else if bytes[i].is_ascii_alphabetic() || bytes[i] == b'_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.insert(text[start..i].to_string());
        } else {
            i += 1;
        }
    }
    tokens
}
