//! Declaration synthesis for AUTOINPUT/AUTOOUTPUT/AUTOINOUT, AUTOWIRE,
//! AUTOREG and the AUTOARG name list.

use std::collections::HashSet;

use sv_parser::{NetStorage, PortDirection};

use crate::connect::render_groups;
use crate::model::{declaration_text, ModuleModel, PortModel, VarModel};
use crate::template::{is_identifier, TemplateRule, TemplateStore};

/// One generated declaration line, terminator and indent still to be added
/// by the caller (they depend on header vs body context).
#[derive(Debug, Clone)]
pub struct DeclLine {
    pub decl: String,
    pub trailer: Option<String>,
}

/// Synthesised declarations plus the port/var models to install in the
/// module's working copy.
#[derive(Debug, Default)]
pub struct SynthesizedDecls {
    pub lines: Vec<DeclLine>,
    pub ports: Vec<PortModel>,
    pub vars: Vec<VarModel>,
}

/// AUTOINPUT/AUTOOUTPUT/AUTOINOUT: one declaration per port of the matching
/// direction across all instantiated modules, deduplicated first-wins, with
/// the instance named in a trailer comment. Ports already declared manually
/// in the enclosing module are skipped.
pub fn synthesize_port_decls(
    module: &ModuleModel,
    targets: &[Option<&ModuleModel>],
    templates: &TemplateStore,
    direction: PortDirection,
    marker_offset: usize,
) -> SynthesizedDecls {
    let keyword = direction_keyword(direction);
    let declared = module.manual_names();
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = SynthesizedDecls::default();

    for (instance, target) in module.instances.iter().zip(targets) {
        let Some(target) = target else {
            continue;
        };
        let rule = templates.rule_for(instance.start, &instance.module_name);
        for port in &target.ports {
            if port.direction != Some(direction) {
                continue;
            }
            let Some(name) = declared_name(rule, &port.name) else {
                continue;
            };
            if declared.contains(name.as_str()) || !seen.insert(name.clone()) {
                continue;
            }
            out.lines.push(DeclLine {
                decl: declaration_text(keyword, &port.packed_dims, &name, &port.unpacked_dims),
                trailer: Some(format!(
                    "// {} {} of {}",
                    direction_trailer(direction),
                    instance.instance_name,
                    instance.module_name
                )),
            });
            out.ports.push(PortModel {
                name,
                direction: Some(direction),
                datatype: None,
                packed_dims: port.packed_dims.clone(),
                unpacked_dims: port.unpacked_dims.clone(),
                declared_at: marker_offset,
                generated: true,
            });
        }
    }

    out
}

/// AUTOWIRE: a wire for every output and inout of every instantiated module
/// that is not declared in the enclosing module, in port-declaration order.
pub fn synthesize_wires(
    module: &ModuleModel,
    targets: &[Option<&ModuleModel>],
    templates: &TemplateStore,
    marker_offset: usize,
) -> SynthesizedDecls {
    let declared = module.manual_names();
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = SynthesizedDecls::default();

    for (instance, target) in module.instances.iter().zip(targets) {
        let Some(target) = target else {
            continue;
        };
        let rule = templates.rule_for(instance.start, &instance.module_name);
        for port in &target.ports {
            let direction = match port.direction {
                Some(d @ (PortDirection::Output | PortDirection::Inout)) => d,
                _ => continue,
            };
            let Some(name) = declared_name(rule, &port.name) else {
                continue;
            };
            if declared.contains(name.as_str()) || !seen.insert(name.clone()) {
                continue;
            }
            out.lines.push(DeclLine {
                decl: declaration_text("wire", &port.packed_dims, &name, &port.unpacked_dims),
                trailer: Some(format!(
                    "// {} {} of {}",
                    direction_trailer(direction),
                    instance.instance_name,
                    instance.module_name
                )),
            });
            out.vars.push(VarModel {
                name,
                storage: NetStorage::Wire,
                packed_dims: port.packed_dims.clone(),
                unpacked_dims: port.unpacked_dims.clone(),
                declared_at: marker_offset,
                generated: true,
            });
        }
    }

    out
}

/// AUTOREG: a reg for every output of the module itself that has no
/// net/variable declaration and is not driven by an instantiated child
/// (its name does not match a child output or inout).
pub fn synthesize_regs(
    module: &ModuleModel,
    targets: &[Option<&ModuleModel>],
    templates: &TemplateStore,
    marker_offset: usize,
) -> SynthesizedDecls {
    let mut driven: HashSet<String> = HashSet::new();
    for (instance, target) in module.instances.iter().zip(targets) {
        let Some(target) = target else {
            continue;
        };
        let rule = templates.rule_for(instance.start, &instance.module_name);
        for port in &target.ports {
            if matches!(
                port.direction,
                Some(PortDirection::Output | PortDirection::Inout)
            ) {
                if let Some(name) = declared_name(rule, &port.name) {
                    driven.insert(name);
                }
            }
        }
    }

    let declared_vars: HashSet<&str> = module
        .vars
        .iter()
        .filter(|v| !v.generated)
        .map(|v| v.name.as_str())
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = SynthesizedDecls::default();
    for port in &module.ports {
        if port.direction != Some(PortDirection::Output) {
            continue;
        }
        if driven.contains(&port.name)
            || declared_vars.contains(port.name.as_str())
            || !seen.insert(port.name.as_str())
        {
            continue;
        }
        out.lines.push(DeclLine {
            decl: declaration_text("reg", &port.packed_dims, &port.name, &port.unpacked_dims),
            trailer: None,
        });
        out.vars.push(VarModel {
            name: port.name.clone(),
            storage: NetStorage::Reg,
            packed_dims: port.packed_dims.clone(),
            unpacked_dims: port.unpacked_dims.clone(),
            declared_at: marker_offset,
            generated: true,
        });
    }

    out
}

/// AUTOARG: the module's effective port names grouped by direction, minus
/// names already written out manually in the header.
pub fn synthesize_arg_names(
    module: &ModuleModel,
    excluded: &HashSet<String>,
    indent: &str,
) -> Vec<String> {
    let mut groups: [(&str, Vec<String>); 3] = [
        ("Inputs", Vec::new()),
        ("Inouts", Vec::new()),
        ("Outputs", Vec::new()),
    ];

    for port in &module.ports {
        let Some(direction) = port.direction else {
            continue;
        };
        if excluded.contains(&port.name) {
            continue;
        }
        let slot = match direction {
            PortDirection::Input => 0,
            PortDirection::Inout => 1,
            PortDirection::Output => 2,
        };
        groups[slot].1.push(port.name.clone());
    }

    render_groups(&groups, indent, ",")
}

/// Declared name for a formal once templates apply: the mapping's base
/// identifier if one exists, the formal itself if there is no mapping, and
/// nothing when the mapped actual is not declarable.
fn declared_name(rule: Option<&TemplateRule>, formal: &str) -> Option<String> {
    match rule.and_then(|r| r.mapping(formal)) {
        None => Some(formal.to_string()),
        Some(template) => {
            let base = template.strip_suffix("[]").unwrap_or(template);
            if is_identifier(base) {
                Some(base.to_string())
            } else {
                None
            }
        }
    }
}

fn direction_keyword(direction: PortDirection) -> &'static str {
    match direction {
        PortDirection::Input => "input",
        PortDirection::Output => "output",
        PortDirection::Inout => "inout",
    }
}

fn direction_trailer(direction: PortDirection) -> &'static str {
    match direction {
        PortDirection::Input => "To",
        PortDirection::Output => "From",
        PortDirection::Inout => "To/From",
    }
}
