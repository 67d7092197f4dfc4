//! Dependency-ordered expansion across the modules of a buffer.
//!
//! AUTOINPUT/AUTOOUTPUT/AUTOINOUT of a parent depend on the port lists of
//! its children, which may in turn grow from their own expansions. Modules
//! are therefore visited children-first along instantiation edges; a
//! back-edge in a cyclic design is expanded once with the port list known at
//! the time of the visit.

use std::collections::HashSet;

use sv_parser::{PortDirection, SourceUnit, Span};

use crate::connect::synthesize_connections;
use crate::declare::{self, DeclLine};
use crate::edit::{EditEmitter, LineIndex, Range, TextEdit};
use crate::index::{ModuleIndex, ModuleRef};
use crate::model::ModuleModel;
use crate::scanner::{self, MarkerContext, MarkerKind, Placeholder, END_OF_AUTOMATICS};
use crate::template::TemplateStore;

struct BufferModule {
    model: ModuleModel,
    placeholders: Vec<Placeholder>,
    templates: TemplateStore,
}

pub struct ExpansionDriver<'a> {
    text: &'a str,
    line_index: LineIndex<'a>,
    modules: Vec<BufferModule>,
    project: Vec<ModuleModel>,
    index: ModuleIndex,
    /// Line range of the cursor selection; placeholders outside it are left
    /// alone entirely.
    scope: Option<(u32, u32)>,
    emitter: EditEmitter,
}

impl<'a> ExpansionDriver<'a> {
    pub fn new(
        text: &'a str,
        buffer: &SourceUnit,
        project_units: &[SourceUnit],
        cursor_range: Option<Range>,
    ) -> Self {
        let mut modules = Vec::new();
        for ast in &buffer.modules {
            let mut model = ModuleModel::from_ast(ast);
            let placeholders = scanner::scan_module(text, &model);
            let regions: Vec<Span> = placeholders.iter().map(|p| p.region).collect();
            model.mark_generated(&regions);
            let templates = TemplateStore::scan(text, model.span);
            modules.push(BufferModule {
                model,
                placeholders,
                templates,
            });
        }

        let project: Vec<ModuleModel> = project_units
            .iter()
            .flat_map(|unit| unit.modules.iter().map(ModuleModel::from_ast))
            .collect();

        let index = ModuleIndex::build(modules.iter().map(|m| &m.model), project.iter());

        Self {
            text,
            line_index: LineIndex::new(text),
            modules,
            project,
            index,
            scope: cursor_range.map(|r| (r.start.line, r.end.line)),
            emitter: EditEmitter::new(),
        }
    }

    pub fn run(mut self) -> Vec<TextEdit> {
        for idx in self.expansion_order() {
            self.expand_module(idx);
        }
        let Self {
            emitter,
            line_index,
            ..
        } = self;
        emitter.finish(&line_index)
    }

    /// Children-first over instantiation edges between buffer modules.
    /// A child already on the visiting stack is a cycle back-edge and is
    /// simply not followed.
    fn expansion_order(&self) -> Vec<usize> {
        let n = self.modules.len();
        let mut state = vec![0u8; n]; // 0 = new, 1 = visiting, 2 = done
        let mut order = Vec::with_capacity(n);
        for root in 0..n {
            if state[root] != 0 {
                continue;
            }
            state[root] = 1;
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            while let Some((module, progress)) = stack.pop() {
                let children = self.buffer_children(module);
                if progress < children.len() {
                    stack.push((module, progress + 1));
                    let child = children[progress];
                    if state[child] == 0 {
                        state[child] = 1;
                        stack.push((child, 0));
                    }
                } else {
                    state[module] = 2;
                    order.push(module);
                }
            }
        }
        order
    }

    fn buffer_children(&self, module: usize) -> Vec<usize> {
        let mut children = Vec::new();
        for instance in &self.modules[module].model.instances {
            if let Some(ModuleRef::Buffer(child)) = self.index.resolve(&instance.module_name) {
                if child != module && !children.contains(&child) {
                    children.push(child);
                }
            }
        }
        children
    }

    fn expand_module(&mut self, idx: usize) {
        let placeholders = self.modules[idx].placeholders.clone();

        // Instance connection lists first: they only need the children
        for placeholder in &placeholders {
            if placeholder.kind == MarkerKind::Autoinst {
                self.expand_autoinst(idx, placeholder);
            }
        }

        // Declaration markers next: they grow this module's port list
        for placeholder in &placeholders {
            if matches!(
                placeholder.kind,
                MarkerKind::Autoinput
                    | MarkerKind::Autooutput
                    | MarkerKind::Autoinout
                    | MarkerKind::Autowire
                    | MarkerKind::Autoreg
            ) {
                self.expand_declarations(idx, placeholder);
            }
        }

        // AUTOARG last so it sees the final port list
        if let Some(placeholder) = placeholders
            .iter()
            .find(|p| p.kind == MarkerKind::Autoarg)
        {
            self.expand_autoarg(idx, placeholder);
        }
    }

    fn expand_autoinst(&mut self, idx: usize, placeholder: &Placeholder) {
        if !self.in_scope(placeholder.region) {
            return;
        }
        let MarkerContext::Connections(instance_idx) = placeholder.context else {
            return;
        };
        let new_text = {
            let module = &self.modules[idx].model;
            let instance = &module.instances[instance_idx];
            let Some(target) = self.resolve_model(&instance.module_name) else {
                // Unresolved instance: leave the marker untouched
                return;
            };
            let rule = self.modules[idx]
                .templates
                .rule_for(instance.start, &instance.module_name);
            let preconnected: HashSet<String> = instance
                .connections
                .iter()
                .filter(|conn| conn.start < placeholder.marker_span.0)
                .map(|conn| conn.formal.clone())
                .collect();
            let indent = self.line_indent(instance.connection_span.0);
            let entry_indent = format!("{}    ", indent);
            let lines = synthesize_connections(target, &preconnected, rule, &entry_indent);
            if lines.is_empty() {
                self.region_text(placeholder.region)
            } else {
                format!(
                    "{}\n{}\n{}",
                    placeholder.kind.marker_text(),
                    lines.join("\n"),
                    indent
                )
            }
        };
        self.emitter.push(placeholder.region, new_text);
    }

    fn expand_declarations(&mut self, idx: usize, placeholder: &Placeholder) {
        if !self.in_scope(placeholder.region) {
            return;
        }
        let (new_text, synth) = {
            let module = &self.modules[idx].model;
            let templates = &self.modules[idx].templates;
            let targets: Vec<Option<&ModuleModel>> = module
                .instances
                .iter()
                .map(|instance| self.resolve_model(&instance.module_name))
                .collect();
            let marker_offset = placeholder.marker_span.0;
            let synth = match placeholder.kind {
                MarkerKind::Autoinput => declare::synthesize_port_decls(
                    module,
                    &targets,
                    templates,
                    PortDirection::Input,
                    marker_offset,
                ),
                MarkerKind::Autooutput => declare::synthesize_port_decls(
                    module,
                    &targets,
                    templates,
                    PortDirection::Output,
                    marker_offset,
                ),
                MarkerKind::Autoinout => declare::synthesize_port_decls(
                    module,
                    &targets,
                    templates,
                    PortDirection::Inout,
                    marker_offset,
                ),
                MarkerKind::Autowire => {
                    declare::synthesize_wires(module, &targets, templates, marker_offset)
                }
                MarkerKind::Autoreg => {
                    declare::synthesize_regs(module, &targets, templates, marker_offset)
                }
                MarkerKind::Autoarg | MarkerKind::Autoinst => return,
            };
            let new_text = if synth.lines.is_empty() {
                // An empty block emits no banner; the marker stays as-is
                self.region_text(placeholder.region)
            } else {
                self.declaration_block_text(placeholder, &synth.lines)
            };
            (new_text, synth)
        };
        self.emitter.push(placeholder.region, new_text);

        let model = &mut self.modules[idx].model;
        for port in synth.ports {
            model.upsert_port(port);
        }
        for var in synth.vars {
            model.upsert_var(var);
        }
    }

    fn expand_autoarg(&mut self, idx: usize, placeholder: &Placeholder) {
        if !self.in_scope(placeholder.region) {
            return;
        }
        let new_text = {
            let module = &self.modules[idx].model;
            let header = module
                .header_span
                .expect("AUTOARG context implies a header");
            // Names already written out by hand, before the marker, stay
            // manual and must not be re-emitted
            let manual =
                scanner::identifier_tokens(&self.text[header.0 + 1..placeholder.marker_span.0]);
            let indent = self.line_indent(header.0);
            let entry_indent = format!("{}    ", indent);
            let lines = declare::synthesize_arg_names(module, &manual, &entry_indent);
            if lines.is_empty() {
                self.region_text(placeholder.region)
            } else {
                format!(
                    "{}\n{}\n{}",
                    placeholder.kind.marker_text(),
                    lines.join("\n"),
                    indent
                )
            }
        };
        self.emitter.push(placeholder.region, new_text);
    }

    fn declaration_block_text(&self, placeholder: &Placeholder, lines: &[DeclLine]) -> String {
        let indent = self.line_indent(placeholder.marker_span.0);
        let banner = placeholder
            .kind
            .banner()
            .expect("declaration kinds carry a banner");
        let header_context = placeholder.context == MarkerContext::Header;
        // In the header, the last declaration before the closing paren must
        // not carry a comma
        let closes_header = header_context && self.next_is_close_paren(placeholder.region.1);

        let mut out = String::from(placeholder.kind.marker_text());
        out.push('\n');
        out.push_str(&indent);
        out.push_str(banner);
        for (i, line) in lines.iter().enumerate() {
            out.push('\n');
            out.push_str(&indent);
            out.push_str(&line.decl);
            if header_context {
                if !(closes_header && i == lines.len() - 1) {
                    out.push(',');
                }
            } else {
                out.push(';');
            }
            if let Some(trailer) = &line.trailer {
                out.push_str("  ");
                out.push_str(trailer);
            }
        }
        out.push('\n');
        out.push_str(&indent);
        out.push_str(END_OF_AUTOMATICS);
        out
    }

    fn resolve_model(&self, name: &str) -> Option<&ModuleModel> {
        match self.index.resolve(name)? {
            ModuleRef::Buffer(i) => Some(&self.modules[i].model),
            ModuleRef::Project(i) => Some(&self.project[i]),
        }
    }

    fn in_scope(&self, region: Span) -> bool {
        let Some((start_line, end_line)) = self.scope else {
            return true;
        };
        let first = self.line_index.position(region.0).line;
        let last = self.line_index.position(region.1).line;
        first <= end_line && start_line <= last
    }

    fn region_text(&self, span: Span) -> String {
        self.text[span.0..span.1].to_string()
    }

    fn line_indent(&self, offset: usize) -> String {
        let line_start = self.text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
        self.text[line_start..]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }

    fn next_is_close_paren(&self, offset: usize) -> bool {
        self.text[offset..].trim_start().starts_with(')')
    }
}
