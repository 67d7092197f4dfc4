//! AUTOINST connection synthesis.

use std::collections::HashSet;

use sv_parser::PortDirection;

use crate::model::{packed_text, unpacked_text, ModuleModel, PortModel};
use crate::template::TemplateRule;

/// Produces the generated connection lines for one AUTOINST site: direction
/// groups in port-declaration order, pre-connected formals skipped, template
/// mappings applied. Lines carry their indent; commas follow every
/// connection except the last.
pub fn synthesize_connections(
    target: &ModuleModel,
    preconnected: &HashSet<String>,
    rule: Option<&TemplateRule>,
    indent: &str,
) -> Vec<String> {
    let mut groups: [(&str, Vec<String>); 3] = [
        ("Inputs", Vec::new()),
        ("Inouts", Vec::new()),
        ("Outputs", Vec::new()),
    ];

    for port in &target.ports {
        let Some(direction) = port.direction else {
            continue;
        };
        if preconnected.contains(&port.name) {
            continue;
        }
        let slot = match direction {
            PortDirection::Input => 0,
            PortDirection::Inout => 1,
            PortDirection::Output => 2,
        };
        groups[slot]
            .1
            .push(format!(".{}({})", port.name, actual_for(port, rule)));
    }

    render_groups(&groups, indent, ",")
}

fn actual_for(port: &PortModel, rule: Option<&TemplateRule>) -> String {
    if let Some(template) = rule.and_then(|r| r.mapping(&port.name)) {
        return match template.strip_suffix("[]") {
            Some(base) => decorate(base, port),
            // A literal actual is emitted verbatim, without width decoration
            None => template.to_string(),
        };
    }
    decorate(&port.name, port)
}

/// Appends the port's shape to the actual:
/// - one packed range: a plain bit select, `o1[15:0]`
/// - several packed ranges: a width hint comment, `io  /*[7:0][7:0]*/`
/// - unpacked only: `i2  /*.[4][8]*/`
/// - packed and unpacked: `o2  /*[31:0].[8]*/`
pub fn decorate(base: &str, port: &PortModel) -> String {
    let packed = &port.packed_dims;
    let unpacked = &port.unpacked_dims;
    if unpacked.is_empty() {
        match packed.len() {
            0 => base.to_string(),
            1 => format!("{}{}", base, packed_text(packed)),
            _ => format!("{}  /*{}*/", base, packed_text(packed)),
        }
    } else if packed.is_empty() {
        format!("{}  /*.{}*/", base, unpacked_text(unpacked))
    } else {
        format!(
            "{}  /*{}.{}*/",
            base,
            packed_text(packed),
            unpacked_text(unpacked)
        )
    }
}

/// Shared group renderer for AUTOINST connections and AUTOARG names. Group
/// labels are emitted only before non-empty groups; `separator` follows
/// every entry except the last one overall.
pub fn render_groups(
    groups: &[(&str, Vec<String>)],
    indent: &str,
    separator: &str,
) -> Vec<String> {
    let total: usize = groups.iter().map(|(_, entries)| entries.len()).sum();
    let mut lines = Vec::new();
    let mut emitted = 0;
    for (label, entries) in groups {
        if entries.is_empty() {
            continue;
        }
        lines.push(format!("{}// {}", indent, label));
        for entry in entries {
            emitted += 1;
            let trailing = if emitted < total { separator } else { "" };
            lines.push(format!("{}{}{}", indent, entry, trailing));
        }
    }
    lines
}
