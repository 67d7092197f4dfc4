pub mod parser;

pub use parser::VerilogParser;

/// Span represents a byte range in the source code (start, end)
pub type Span = (usize, usize);

#[derive(Debug, Clone)]
pub struct ParseError {
    pub errors: Vec<SingleParseError>,
}

#[derive(Debug, Clone)]
pub struct SingleParseError {
    pub message: String,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone)]
pub struct SourceLocation {
    pub line: usize,                  // 0-based line number
    pub column: usize,                // 0-based column number
    pub span: Option<(usize, usize)>, // character start/end positions
}

impl ParseError {
    pub fn new(error: SingleParseError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    pub fn multiple(errors: Vec<SingleParseError>) -> Self {
        Self { errors }
    }

    pub fn primary_error(&self) -> &SingleParseError {
        &self.errors[0]
    }
}

impl SingleParseError {
    pub fn new(message: String) -> Self {
        Self {
            message,
            location: None,
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.errors.len() == 1 {
            write!(f, "{}", self.errors[0])
        } else {
            writeln!(f, "Multiple parse errors:")?;
            for (i, error) in self.errors.iter().enumerate() {
                write!(f, "  {}: {}", i + 1, error)?;
                if i < self.errors.len() - 1 {
                    writeln!(f)?;
                }
            }
            Ok(())
        }
    }
}

impl std::fmt::Display for SingleParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(location) = &self.location {
            write!(
                f,
                "Error at line {}, column {}: {}",
                location.line + 1,
                location.column + 1,
                self.message
            )
        } else {
            write!(f, "Parse error: {}", self.message)
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub modules: Vec<Module>,
}

/// A module declaration. `header_ports` are the entries of the ANSI-style
/// header parenthesis; non-ANSI port declarations live in `items`.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub name_span: Span,
    pub header_ports: Vec<HeaderPort>,
    /// Byte span of the header port list including both parentheses.
    pub header_span: Option<Span>,
    pub items: Vec<ModuleItem>,
    pub span: Span,
}

/// One entry of the header port list. A bare `name` entry has no direction;
/// its declaration is expected among the module items.
#[derive(Debug, Clone)]
pub struct HeaderPort {
    pub direction: Option<PortDirection>,
    pub datatype: Option<String>,
    pub packed_dims: Vec<PackedRange>,
    pub name: String,
    pub name_span: Span,
    pub unpacked_dims: Vec<UnpackedDim>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ModuleItem {
    PortDeclaration {
        direction: PortDirection,
        datatype: Option<String>,
        packed_dims: Vec<PackedRange>,
        declarators: Vec<Declarator>,
        span: Span,
    },
    NetDeclaration {
        storage: NetStorage,
        packed_dims: Vec<PackedRange>,
        declarators: Vec<Declarator>,
        span: Span,
    },
    /// Consumed and skipped; nothing downstream looks inside.
    ContinuousAssign { span: Span },
    Instance(Instance),
}

#[derive(Debug, Clone)]
pub struct Instance {
    pub module_name: String,
    pub module_name_span: Span,
    pub instance_name: String,
    pub instance_name_span: Span,
    pub connections: Vec<NamedConnection>,
    /// Byte span of the connection list including both parentheses.
    pub connection_span: Span,
    pub span: Span,
}

/// A named port connection `.formal(actual)`. The actual expression is kept
/// as raw balanced text; it is re-emitted verbatim at most.
#[derive(Debug, Clone)]
pub struct NamedConnection {
    pub formal: String,
    pub formal_span: Span,
    pub actual: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Declarator {
    pub name: String,
    pub name_span: Span,
    pub unpacked_dims: Vec<UnpackedDim>,
    pub init: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
    Inout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetStorage {
    Wire,
    Reg,
    Logic,
}

/// A packed range `[msb:lsb]`. Bounds are kept textual since they may be
/// named constants or macros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedRange {
    pub msb: String,
    pub lsb: String,
}

/// An unpacked array dimension, `[N]` or `[msb:lsb]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnpackedDim {
    Size(String),
    Range(String, String),
}
