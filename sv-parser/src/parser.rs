use chumsky::prelude::*;
use std::fs;
use std::path::Path;

use crate::{
    Declarator, HeaderPort, Instance, Module, ModuleItem, NamedConnection, NetStorage, PackedRange,
    ParseError, PortDirection, SingleParseError, SourceLocation, SourceUnit, UnpackedDim,
};

/// Parser for the Verilog module surface: module headers, port and net
/// declarations, and instantiations. Comments are treated as whitespace;
/// marker comments are located by offset-based scanners downstream, so the
/// grammar only needs to record byte spans for the regions they anchor to.
pub struct VerilogParser;

impl VerilogParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_file(&self, file_path: &Path) -> Result<SourceUnit, ParseError> {
        let content = fs::read_to_string(file_path).map_err(|e| {
            ParseError::new(SingleParseError::new(format!(
                "Failed to read file {}: {}",
                file_path.display(),
                e
            )))
        })?;

        self.parse_content(&content)
    }

    pub fn parse_content(&self, content: &str) -> Result<SourceUnit, ParseError> {
        let parser = self.source_unit_parser();

        parser.parse(content).map_err(|chumsky_errors| {
            let mut parse_errors = Vec::new();

            for error in chumsky_errors {
                let message = self.describe_error(&error);
                let mut single_error = SingleParseError::new(message);
                if let Some(location) = self.span_to_location(error.span(), content) {
                    single_error = single_error.with_location(location);
                }
                parse_errors.push(single_error);
            }

            // Report in buffer order; errors without a location go last
            parse_errors.sort_by_key(|error| {
                error
                    .location
                    .as_ref()
                    .map_or((usize::MAX, usize::MAX), |loc| (loc.line, loc.column))
            });

            if parse_errors.is_empty() {
                ParseError::new(SingleParseError::new("Unknown parse error".to_string()))
            } else {
                ParseError::multiple(parse_errors)
            }
        })
    }

    fn describe_error(&self, error: &Simple<char>) -> String {
        match error.reason() {
            chumsky::error::SimpleReason::Unexpected => {
                let found = error
                    .found()
                    .map(|c| format!("'{}'", c))
                    .unwrap_or_else(|| "end of input".to_string());

                let expected: Vec<String> = error
                    .expected()
                    .map(|exp| match exp {
                        Some(c) => format!("'{}'", c),
                        None => "end of input".to_string(),
                    })
                    .collect();

                if expected.is_empty() {
                    format!("Unexpected {}", found)
                } else if expected.len() <= 3 {
                    format!("Unexpected {}, expected {}", found, expected.join(" or "))
                } else {
                    format!("Unexpected {}", found)
                }
            }
            chumsky::error::SimpleReason::Unclosed { span: _, delimiter } => {
                format!("Unclosed delimiter '{}'", delimiter)
            }
            chumsky::error::SimpleReason::Custom(msg) => msg.clone(),
        }
    }

    fn span_to_location(
        &self,
        span: std::ops::Range<usize>,
        content: &str,
    ) -> Option<SourceLocation> {
        if span.start > content.len() {
            return None;
        }

        let mut line = 0;
        let mut line_start = 0;
        for (i, byte) in content.bytes().take(span.start).enumerate() {
            if byte == b'\n' {
                line += 1;
                line_start = i + 1;
            }
        }

        Some(SourceLocation {
            line,
            column: span.start - line_start,
            span: Some((span.start, span.end)),
        })
    }

    fn source_unit_parser(&self) -> impl Parser<char, SourceUnit, Error = Simple<char>> + Clone {
        // Comments
        let line_comment = just("//").then(filter(|c| *c != '\n').repeated()).ignored();

        let block_comment = just("/*")
            .then(just("*/").not().rewind().then(any()).repeated())
            .then(just("*/"))
            .ignored();

        let comment = choice((line_comment, block_comment));

        let whitespace =
            choice((one_of(" \t\r\n").repeated().at_least(1).ignored(), comment)).repeated();

        // Basic tokens
        let ident_char = filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_');

        let identifier_inner = filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
            .then(ident_char.clone().repeated())
            .map(|(first, rest): (char, Vec<char>)| {
                let mut result = String::new();
                result.push(first);
                result.extend(rest);
                result
            });

        let identifier_with_span = identifier_inner
            .clone()
            .map_with_span(|name, span: std::ops::Range<usize>| (name, (span.start, span.end)))
            .padded_by(whitespace.clone());

        // Keywords must not swallow the prefix of a longer identifier
        let kw_end = choice((
            end(),
            filter(|c: &char| !(c.is_ascii_alphanumeric() || *c == '_'))
                .ignored()
                .rewind(),
        ));

        // Port direction
        let port_direction = choice((
            just("input").to(PortDirection::Input),
            just("output").to(PortDirection::Output),
            just("inout").to(PortDirection::Inout),
        ))
        .then_ignore(kw_end.clone())
        .padded_by(whitespace.clone());

        // Optional data type after a direction: input logic clk, output reg o
        let datatype = choice((
            just("wire"),
            just("logic"),
            just("reg"),
            just("integer"),
            just("shortint"),
            just("longint"),
            just("int"),
            just("byte"),
            just("bit"),
            just("time"),
        ))
        .then_ignore(kw_end.clone())
        .map(|s: &str| s.to_string())
        .padded_by(whitespace.clone());

        let net_storage = choice((
            just("wire").to(NetStorage::Wire),
            just("reg").to(NetStorage::Reg),
            just("logic").to(NetStorage::Logic),
        ))
        .then_ignore(kw_end.clone())
        .padded_by(whitespace.clone());

        // Dimension bounds stay textual: widths may be named constants
        let dim_text = filter(|c: &char| *c != ':' && *c != '[' && *c != ']')
            .repeated()
            .at_least(1)
            .collect::<String>()
            .map(|s| s.trim().to_string());

        // Packed range [msb:lsb], e.g. [7:0] or [WIDTH-1:0]
        let packed_dim = just('[')
            .ignore_then(dim_text.clone())
            .then_ignore(just(':'))
            .then(dim_text.clone())
            .then_ignore(just(']'))
            .map(|(msb, lsb)| PackedRange { msb, lsb })
            .padded_by(whitespace.clone());

        // Unpacked dimension [N] or [msb:lsb]
        let unpacked_dim = just('[')
            .ignore_then(dim_text.clone())
            .then(just(':').ignore_then(dim_text.clone()).or_not())
            .then_ignore(just(']'))
            .map(|(first, second)| match second {
                Some(lsb) => UnpackedDim::Range(first, lsb),
                None => UnpackedDim::Size(first),
            })
            .padded_by(whitespace.clone());

        // Header port entry, either a full ANSI declaration or a bare name:
        // - input clk
        // - input logic [3:0] a
        // - output [31:0] o2[8]
        // - clk
        let ansi_header_port = port_direction
            .clone()
            .then(datatype.clone().or_not())
            .then(packed_dim.clone().repeated())
            .then(identifier_with_span.clone())
            .then(unpacked_dim.clone().repeated())
            .map_with_span(
                |((((direction, datatype), packed_dims), (name, name_span)), unpacked_dims),
                 span: std::ops::Range<usize>| {
                    HeaderPort {
                        direction: Some(direction),
                        datatype,
                        packed_dims,
                        name,
                        name_span,
                        unpacked_dims,
                        span: (span.start, span.end),
                    }
                },
            );

        let bare_header_port = identifier_with_span
            .clone()
            .then(unpacked_dim.clone().repeated())
            .map_with_span(
                |((name, name_span), unpacked_dims), span: std::ops::Range<usize>| HeaderPort {
                    direction: None,
                    datatype: None,
                    packed_dims: Vec::new(),
                    name,
                    name_span,
                    unpacked_dims,
                    span: (span.start, span.end),
                },
            );

        let header_port = choice((ansi_header_port, bare_header_port));

        // Header port list with its parenthesis span. Marker comments inside
        // the parens are plain whitespace here; a trailing comma is tolerated
        // because previously expanded lists may carry one.
        let header = header_port
            .separated_by(just(',').padded_by(whitespace.clone()))
            .allow_trailing()
            .padded_by(whitespace.clone())
            .delimited_by(just('('), just(')'))
            .map_with_span(|ports, span: std::ops::Range<usize>| {
                (ports, (span.start, span.end))
            });

        // Declarator with optional unpacked dimensions and initializer:
        //   o2[8]
        //   addr = 4'b0000
        let declarator = identifier_with_span
            .clone()
            .then(unpacked_dim.clone().repeated())
            .then(
                just('=')
                    .padded_by(whitespace.clone())
                    .ignore_then(
                        filter(|c: &char| *c != ',' && *c != ';')
                            .repeated()
                            .at_least(1)
                            .collect::<String>()
                            .map(|s| s.trim().to_string()),
                    )
                    .or_not(),
            )
            .map_with_span(
                |(((name, name_span), unpacked_dims), init), span: std::ops::Range<usize>| {
                    Declarator {
                        name,
                        name_span,
                        unpacked_dims,
                        init,
                        span: (span.start, span.end),
                    }
                },
            );

        let declarator_list = declarator
            .separated_by(just(',').padded_by(whitespace.clone()))
            .at_least(1);

        // Non-ANSI port declaration in the module body
        let port_declaration = port_direction
            .clone()
            .then(datatype.clone().or_not())
            .then(packed_dim.clone().repeated())
            .then(declarator_list.clone())
            .then_ignore(just(';').padded_by(whitespace.clone()))
            .map_with_span(
                |(((direction, datatype), packed_dims), declarators),
                 span: std::ops::Range<usize>| {
                    ModuleItem::PortDeclaration {
                        direction,
                        datatype,
                        packed_dims,
                        declarators,
                        span: (span.start, span.end),
                    }
                },
            );

        // Net or variable declaration
        let net_declaration = net_storage
            .then(packed_dim.clone().repeated())
            .then(declarator_list)
            .then_ignore(just(';').padded_by(whitespace.clone()))
            .map_with_span(
                |((storage, packed_dims), declarators), span: std::ops::Range<usize>| {
                    ModuleItem::NetDeclaration {
                        storage,
                        packed_dims,
                        declarators,
                        span: (span.start, span.end),
                    }
                },
            );

        // Continuous assigns are consumed whole; the expansion engine never
        // needs the expression
        let continuous_assign = just("assign")
            .then_ignore(kw_end.clone())
            .padded_by(whitespace.clone())
            .then(filter(|c: &char| *c != ';').repeated())
            .then_ignore(just(';').padded_by(whitespace.clone()))
            .map_with_span(|_, span: std::ops::Range<usize>| ModuleItem::ContinuousAssign {
                span: (span.start, span.end),
            });

        // Connection actual: balanced raw text between the parentheses
        let actual_text = recursive(|actual| {
            choice((
                filter(|c: &char| *c != '(' && *c != ')').map(|c: char| c.to_string()),
                actual
                    .delimited_by(just('('), just(')'))
                    .map(|inner: String| format!("({})", inner)),
            ))
            .repeated()
            .map(|pieces: Vec<String>| pieces.concat())
        });

        let named_connection = just('.')
            .ignore_then(identifier_with_span.clone())
            .then(actual_text.delimited_by(just('('), just(')')))
            .map_with_span(
                |((formal, formal_span), actual), span: std::ops::Range<usize>| NamedConnection {
                    formal,
                    formal_span,
                    actual: actual.trim().to_string(),
                    span: (span.start, span.end),
                },
            )
            .padded_by(whitespace.clone());

        let connection_list = named_connection
            .separated_by(just(',').padded_by(whitespace.clone()))
            .allow_trailing()
            .padded_by(whitespace.clone())
            .delimited_by(just('('), just(')'))
            .map_with_span(|connections, span: std::ops::Range<usize>| {
                (connections, (span.start, span.end))
            });

        // Module instantiation: bar b ( .i1(i1), ... );
        let instance = identifier_with_span
            .clone()
            .then(identifier_with_span.clone())
            .then(connection_list)
            .then_ignore(just(';').padded_by(whitespace.clone()))
            .map_with_span(
                |(
                    ((module_name, module_name_span), (instance_name, instance_name_span)),
                    (connections, connection_span),
                ),
                 span: std::ops::Range<usize>| {
                    ModuleItem::Instance(Instance {
                        module_name,
                        module_name_span,
                        instance_name,
                        instance_name_span,
                        connections,
                        connection_span,
                        span: (span.start, span.end),
                    })
                },
            );

        // Module item. Order matters: declaration keywords before the
        // two-identifier instance form.
        let module_item = choice((
            port_declaration,
            net_declaration,
            continuous_assign,
            instance,
        ));

        // Module declaration. The span runs from the `module` keyword to the
        // end of `endmodule` so that offset containment is exact.
        let module_declaration = just("module")
            .map_with_span(|_, span: std::ops::Range<usize>| span.start)
            .then_ignore(kw_end.clone())
            .then(identifier_with_span.clone())
            .then(header.or_not())
            .then_ignore(just(';').padded_by(whitespace.clone()))
            .then(module_item.repeated())
            .then(
                just("endmodule")
                    .map_with_span(|_, span: std::ops::Range<usize>| span.end)
                    .then_ignore(kw_end)
                    .padded_by(whitespace.clone()),
            )
            .map(|((((start, (name, name_span)), header), items), end)| {
                let (header_ports, header_span) = match header {
                    Some((ports, span)) => (ports, Some(span)),
                    None => (Vec::new(), None),
                };
                Module {
                    name,
                    name_span,
                    header_ports,
                    header_span,
                    items,
                    span: (start, end),
                }
            })
            .padded_by(whitespace.clone());

        // Top-level source unit
        module_declaration
            .repeated()
            .then_ignore(end())
            .map(|modules| SourceUnit { modules })
            .padded_by(whitespace)
    }
}

impl Default for VerilogParser {
    fn default() -> Self {
        Self::new()
    }
}
