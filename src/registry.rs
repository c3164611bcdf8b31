use crate::command::BuiltinCommand;
use std::collections::HashMap;

/// Name to handler mapping for built-in commands.
///
/// Populated once when the interpreter is built. Registering a name a second
/// time replaces the earlier command.
#[derive(Default)]
pub struct Registry {
    commands: HashMap<String, Box<dyn BuiltinCommand>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `command` under its own name, overwriting any previous entry.
    pub fn register(&mut self, command: Box<dyn BuiltinCommand>) {
        let name = command.name().to_string();
        if self.contains(&name) {
            log::debug!("built-in `{}' re-registered, previous handler dropped", name);
        }
        self.commands.insert(name, command);
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn BuiltinCommand> {
        self.commands.get(name).map(|cmd| cmd.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// All registered commands, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &dyn BuiltinCommand> {
        let mut commands: Vec<&dyn BuiltinCommand> =
            self.commands.values().map(|cmd| cmd.as_ref()).collect();
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        commands.into_iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
