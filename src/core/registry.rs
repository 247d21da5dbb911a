use crate::core::error::{BenchError, Result};
use crate::core::outcome::{Category, Workload};

/// A display name bound to a benchmark body. Immutable once registered.
pub struct RegisteredUnit {
    name: String,
    unit: Box<dyn Workload>,
}

impl RegisteredUnit {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &dyn Workload {
        self.unit.as_ref()
    }
}

/// Ordered, duplicate-free collection of units for one category. Execution
/// order is registration order, always.
pub struct SuiteRegistry {
    category: Category,
    units: Vec<RegisteredUnit>,
}

impl SuiteRegistry {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            units: Vec::new(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Registers a unit under a display name. Rejects duplicate names and
    /// leaves the registry untouched when it does.
    pub fn register<W>(&mut self, name: impl Into<String>, unit: W) -> Result<()>
    where
        W: Workload + 'static,
    {
        let name = name.into();
        if self.units.iter().any(|u| u.name == name) {
            return Err(BenchError::DuplicateName(name));
        }
        self.units.push(RegisteredUnit {
            name,
            unit: Box::new(unit),
        });
        Ok(())
    }

    pub fn units(&self) -> &[RegisteredUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::BenchConfig;
    use crate::core::outcome::Measurement;
    use std::time::Duration;

    fn noop(_cfg: &BenchConfig) -> Result<Measurement> {
        Ok(Measurement::new(Duration::from_millis(1), "noop"))
    }

    #[test]
    fn test_registration_preserves_order() {
        let mut registry = SuiteRegistry::new(Category::Cpu);
        registry.register("first", noop).unwrap();
        registry.register("second", noop).unwrap();
        registry.register("third", noop).unwrap();

        let names: Vec<&str> = registry.units().iter().map(|u| u.name()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut registry = SuiteRegistry::new(Category::Memory);
        registry.register("bandwidth", noop).unwrap();

        let err = registry.register("bandwidth", noop).unwrap_err();
        assert!(matches!(err, BenchError::DuplicateName(ref n) if n == "bandwidth"));
    }

    #[test]
    fn test_failed_registration_leaves_registry_unchanged() {
        let mut registry = SuiteRegistry::new(Category::Storage);
        registry.register("iops", noop).unwrap();
        let before = registry.len();

        assert!(registry.register("iops", noop).is_err());

        assert_eq!(registry.len(), before);
        assert_eq!(registry.units()[0].name(), "iops");
    }

    #[test]
    fn test_empty_registry() {
        let registry = SuiteRegistry::new(Category::Ml);
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }
}
