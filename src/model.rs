//! Normalised per-module view of the syntax tree: the effective port list
//! (ANSI header entries merged with body declarations by name), body nets,
//! and instantiations.

use sv_parser::{
    Module as AstModule, ModuleItem, NetStorage, PackedRange, PortDirection, Span, UnpackedDim,
};

#[derive(Debug, Clone)]
pub struct PortModel {
    pub name: String,
    pub direction: Option<PortDirection>,
    pub datatype: Option<String>,
    pub packed_dims: Vec<PackedRange>,
    pub unpacked_dims: Vec<UnpackedDim>,
    pub declared_at: usize,
    /// True when the declaration sits inside a placeholder's replace region,
    /// i.e. it was produced by a previous expansion. Generated entries stay
    /// in the effective port list but do not count as manual declarations.
    pub generated: bool,
}

#[derive(Debug, Clone)]
pub struct VarModel {
    pub name: String,
    pub storage: NetStorage,
    pub packed_dims: Vec<PackedRange>,
    pub unpacked_dims: Vec<UnpackedDim>,
    pub declared_at: usize,
    pub generated: bool,
}

#[derive(Debug, Clone)]
pub struct ConnectionModel {
    pub formal: String,
    pub start: usize,
}

#[derive(Debug, Clone)]
pub struct InstanceModel {
    pub module_name: String,
    pub instance_name: String,
    pub connections: Vec<ConnectionModel>,
    pub connection_span: Span,
    pub start: usize,
}

#[derive(Debug, Clone)]
pub struct ModuleModel {
    pub name: String,
    pub ports: Vec<PortModel>,
    pub vars: Vec<VarModel>,
    pub instances: Vec<InstanceModel>,
    pub header_span: Option<Span>,
    pub span: Span,
}

impl ModuleModel {
    pub fn from_ast(module: &AstModule) -> Self {
        let mut model = Self {
            name: module.name.clone(),
            ports: Vec::new(),
            vars: Vec::new(),
            instances: Vec::new(),
            header_span: module.header_span,
            span: module.span,
        };

        for port in &module.header_ports {
            model.ports.push(PortModel {
                name: port.name.clone(),
                direction: port.direction,
                datatype: port.datatype.clone(),
                packed_dims: port.packed_dims.clone(),
                unpacked_dims: port.unpacked_dims.clone(),
                declared_at: port.name_span.0,
                generated: false,
            });
        }

        for item in &module.items {
            match item {
                ModuleItem::PortDeclaration {
                    direction,
                    datatype,
                    packed_dims,
                    declarators,
                    ..
                } => {
                    for declarator in declarators {
                        model.merge_port(PortModel {
                            name: declarator.name.clone(),
                            direction: Some(*direction),
                            datatype: datatype.clone(),
                            packed_dims: packed_dims.clone(),
                            unpacked_dims: declarator.unpacked_dims.clone(),
                            declared_at: declarator.name_span.0,
                            generated: false,
                        });
                    }
                }
                ModuleItem::NetDeclaration {
                    storage,
                    packed_dims,
                    declarators,
                    ..
                } => {
                    for declarator in declarators {
                        model.vars.push(VarModel {
                            name: declarator.name.clone(),
                            storage: *storage,
                            packed_dims: packed_dims.clone(),
                            unpacked_dims: declarator.unpacked_dims.clone(),
                            declared_at: declarator.name_span.0,
                            generated: false,
                        });
                    }
                }
                ModuleItem::Instance(instance) => {
                    model.instances.push(InstanceModel {
                        module_name: instance.module_name.clone(),
                        instance_name: instance.instance_name.clone(),
                        connections: instance
                            .connections
                            .iter()
                            .map(|conn| ConnectionModel {
                                formal: conn.formal.clone(),
                                start: conn.span.0,
                            })
                            .collect(),
                        connection_span: instance.connection_span,
                        // Anchor on the module-name token: the item span can
                        // reach back over leading comments, and a template
                        // block must count as preceding this instance
                        start: instance.module_name_span.0,
                    });
                }
                ModuleItem::ContinuousAssign { .. } => {}
            }
        }

        model
    }

    /// A body declaration for a name already listed in the header completes
    /// that entry (non-ANSI style); otherwise it appends a new port.
    fn merge_port(&mut self, port: PortModel) {
        if let Some(existing) = self.ports.iter_mut().find(|p| p.name == port.name) {
            if existing.direction.is_none() {
                existing.direction = port.direction;
            }
            if existing.datatype.is_none() {
                existing.datatype = port.datatype;
            }
            if existing.packed_dims.is_empty() {
                existing.packed_dims = port.packed_dims;
            }
            if existing.unpacked_dims.is_empty() {
                existing.unpacked_dims = port.unpacked_dims;
            }
        } else {
            self.ports.push(port);
        }
    }

    /// Flag every port and var declared inside one of the given regions as
    /// previously generated.
    pub fn mark_generated(&mut self, regions: &[Span]) {
        let inside = |offset: usize| regions.iter().any(|r| offset >= r.0 && offset < r.1);
        for port in &mut self.ports {
            if inside(port.declared_at) {
                port.generated = true;
            }
        }
        for var in &mut self.vars {
            if inside(var.declared_at) {
                var.generated = true;
            }
        }
    }

    /// Names declared outside any generated region. These are the names the
    /// declaration synthesisers must not shadow.
    pub fn manual_names(&self) -> std::collections::HashSet<&str> {
        self.ports
            .iter()
            .filter(|p| !p.generated)
            .map(|p| p.name.as_str())
            .chain(
                self.vars
                    .iter()
                    .filter(|v| !v.generated)
                    .map(|v| v.name.as_str()),
            )
            .collect()
    }

    /// Install a freshly synthesised port in the working copy: a same-named
    /// entry is replaced in place, anything else appends.
    pub fn upsert_port(&mut self, port: PortModel) {
        if let Some(existing) = self.ports.iter_mut().find(|p| p.name == port.name) {
            *existing = port;
        } else {
            self.ports.push(port);
        }
    }

    pub fn upsert_var(&mut self, var: VarModel) {
        if let Some(existing) = self.vars.iter_mut().find(|v| v.name == var.name) {
            *existing = var;
        } else {
            self.vars.push(var);
        }
    }
}

/// Serialise packed ranges back to source form, e.g. `[7:0][7:0]`.
pub fn packed_text(dims: &[PackedRange]) -> String {
    dims.iter()
        .map(|d| format!("[{}:{}]", d.msb, d.lsb))
        .collect()
}

/// Serialise unpacked dimensions back to source form, e.g. `[4][8]`.
pub fn unpacked_text(dims: &[UnpackedDim]) -> String {
    dims.iter()
        .map(|d| match d {
            UnpackedDim::Size(n) => format!("[{}]", n),
            UnpackedDim::Range(msb, lsb) => format!("[{}:{}]", msb, lsb),
        })
        .collect()
}

/// Declaration text without terminator: `output [15:0] o1`, `wire io`,
/// `reg [3:0][3:0] o3[16]`.
pub fn declaration_text(
    keyword: &str,
    packed_dims: &[PackedRange],
    name: &str,
    unpacked_dims: &[UnpackedDim],
) -> String {
    let mut out = String::from(keyword);
    if !packed_dims.is_empty() {
        out.push(' ');
        out.push_str(&packed_text(packed_dims));
    }
    out.push(' ');
    out.push_str(name);
    out.push_str(&unpacked_text(unpacked_dims));
    out
}
