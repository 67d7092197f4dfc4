//! Project-wide module lookup.

use std::collections::HashMap;

use crate::model::ModuleModel;

/// Where a module definition lives: in the edited buffer or in a project
/// file. Buffer modules are the only ones that get expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleRef {
    Buffer(usize),
    Project(usize),
}

/// Name to definition map over the edited buffer and every project file.
/// The buffer is indexed first and the first definition of a name wins;
/// later duplicates are shadowed, never an error.
pub struct ModuleIndex {
    map: HashMap<String, ModuleRef>,
}

impl ModuleIndex {
    pub fn build<'m>(
        buffer: impl IntoIterator<Item = &'m ModuleModel>,
        project: impl IntoIterator<Item = &'m ModuleModel>,
    ) -> Self {
        let mut map = HashMap::new();
        for (i, module) in buffer.into_iter().enumerate() {
            map.entry(module.name.clone()).or_insert(ModuleRef::Buffer(i));
        }
        for (i, module) in project.into_iter().enumerate() {
            map.entry(module.name.clone())
                .or_insert(ModuleRef::Project(i));
        }
        Self { map }
    }

    pub fn resolve(&self, name: &str) -> Option<ModuleRef> {
        self.map.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> ModuleModel {
        ModuleModel {
            name: name.to_string(),
            ports: Vec::new(),
            vars: Vec::new(),
            instances: Vec::new(),
            header_span: None,
            span: (0, 0),
        }
    }

    #[test]
    fn first_definition_wins() {
        let buffer = vec![named("a"), named("a"), named("b")];
        let project = vec![named("b"), named("c")];
        let index = ModuleIndex::build(&buffer, &project);

        assert_eq!(index.resolve("a"), Some(ModuleRef::Buffer(0)));
        assert_eq!(index.resolve("b"), Some(ModuleRef::Buffer(2)));
        assert_eq!(index.resolve("c"), Some(ModuleRef::Project(1)));
        assert_eq!(index.resolve("d"), None);
    }
}
