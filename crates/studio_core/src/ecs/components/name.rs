//! Name component

use crate::ecs::Component;
use std::fmt;

/// Display name of an entity. Names need not be unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NameComponent {
    /// UTF-8 name
    pub name: String,
}

impl Component for NameComponent {
    const TYPE_NAME: &'static str = "Name";
}

impl NameComponent {
    /// Create a name component
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Borrow the name
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
