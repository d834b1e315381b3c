//! Scene statistics snapshot

use std::fmt;

/// Point-in-time counts for a scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneStatistics {
    /// Living entities
    pub entity_count: usize,
    /// Size of the entity pool
    pub max_entities: u32,
    /// Registered component types
    pub component_types: usize,
    /// Registered systems
    pub system_count: usize,
    /// Entities carrying a Name
    pub named_entities: usize,
    /// Entities carrying a Hierarchy with no parent
    pub root_entities: usize,
    /// Per system, in registration order: name and matching entity count
    pub systems: Vec<(&'static str, usize)>,
}

impl SceneStatistics {
    /// Matching entity count of the system registered under `name`
    pub fn entities_in(&self, name: &str) -> Option<usize> {
        self.systems
            .iter()
            .find(|(system, _)| *system == name)
            .map(|&(_, count)| count)
    }
}

impl fmt::Display for SceneStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Scene Statistics ===")?;
        writeln!(f, "Entities: {} / {}", self.entity_count, self.max_entities)?;
        writeln!(f, "Component types: {}", self.component_types)?;
        writeln!(f, "Named entities: {}", self.named_entities)?;
        writeln!(f, "Hierarchy roots: {}", self.root_entities)?;
        writeln!(f, "Systems: {}", self.system_count)?;
        for (name, count) in &self.systems {
            writeln!(f, "  {name}: {count} entities")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_systems() {
        let stats = SceneStatistics {
            entity_count: 3,
            max_entities: 5000,
            component_types: 9,
            system_count: 2,
            named_entities: 3,
            root_entities: 1,
            systems: vec![("HierarchySystem", 1), ("RenderSystem", 2)],
        };
        let text = stats.to_string();
        assert!(text.contains("Entities: 3 / 5000"));
        assert!(text.contains("  RenderSystem: 2 entities"));
        assert_eq!(stats.entities_in("HierarchySystem"), Some(1));
        assert_eq!(stats.entities_in("CameraSystem"), None);
    }
}
