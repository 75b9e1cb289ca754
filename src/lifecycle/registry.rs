//! Component Registry
//!
//! Holds component descriptors in registration order and resolves the
//! dependency graph into startup batches.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::component::ComponentDescriptor;
use super::error::LifecycleError;

#[derive(Default)]
struct Inner {
    ordered: Vec<Arc<ComponentDescriptor>>,
    by_name: HashMap<String, Arc<ComponentDescriptor>>,
}

#[derive(Default)]
pub struct ComponentRegistry {
    inner: RwLock<Inner>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor. Returns `Ok(false)` when the name is already
    /// taken; the first registration wins.
    pub fn register(&self, descriptor: ComponentDescriptor) -> Result<bool, LifecycleError> {
        if descriptor.name.trim().is_empty() {
            return Err(LifecycleError::EmptyName);
        }

        let mut inner = self.inner.write();
        if inner.by_name.contains_key(&descriptor.name) {
            warn!(name = %descriptor.name, "duplicate component registration, skipping");
            return Ok(false);
        }

        debug!(
            name = %descriptor.name,
            priority = descriptor.priority.0,
            depends_on = ?descriptor.depends_on,
            "component registered"
        );
        let descriptor = Arc::new(descriptor);
        inner.by_name.insert(descriptor.name.clone(), descriptor.clone());
        inner.ordered.push(descriptor);
        Ok(true)
    }

    pub fn get(&self, name: &str) -> Option<Arc<ComponentDescriptor>> {
        self.inner.read().by_name.get(name).cloned()
    }

    pub fn all(&self) -> Vec<Arc<ComponentDescriptor>> {
        self.inner.read().ordered.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Descriptors ordered by (priority, name)
    pub fn sorted_by_priority(&self) -> Vec<Arc<ComponentDescriptor>> {
        let mut all = self.all();
        all.sort_by(|a, b| (a.priority, &a.name).cmp(&(b.priority, &b.name)));
        all
    }

    /// Every dependency must be registered and the graph must be acyclic
    pub fn validate_dependencies(&self) -> Result<(), LifecycleError> {
        let inner = self.inner.read();

        for descriptor in &inner.ordered {
            for dep in &descriptor.depends_on {
                if !inner.by_name.contains_key(dep) {
                    let mut available: Vec<String> = inner.by_name.keys().cloned().collect();
                    available.sort();
                    return Err(LifecycleError::MissingDependency {
                        component: descriptor.name.clone(),
                        dependency: dep.clone(),
                        available,
                    });
                }
            }
        }

        check_cycles(&inner.ordered)?;

        info!(total_components = inner.ordered.len(), "dependency validation passed");
        Ok(())
    }

    /// Startup batches for every registered component
    pub fn dependency_batches(&self) -> Result<Vec<Vec<Arc<ComponentDescriptor>>>, LifecycleError> {
        dependency_batches(&self.all())
    }

    /// Remove every descriptor (tests only)
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.ordered.clear();
        inner.by_name.clear();
    }
}

/// Depth-first search with a recursion stack. Reports the first cycle found
/// with its full path, e.g. `A -> B -> A`.
fn check_cycles(descriptors: &[Arc<ComponentDescriptor>]) -> Result<(), LifecycleError> {
    let graph: HashMap<&str, &[String]> = descriptors
        .iter()
        .map(|d| (d.name.as_str(), d.depends_on.as_slice()))
        .collect();

    fn visit<'a>(
        node: &'a str,
        graph: &HashMap<&'a str, &'a [String]>,
        visited: &mut HashSet<&'a str>,
        stack: &mut Vec<&'a str>,
    ) -> Result<(), LifecycleError> {
        visited.insert(node);
        stack.push(node);

        for dep in graph.get(node).copied().unwrap_or_default() {
            let dep = dep.as_str();
            if let Some(start) = stack.iter().position(|n| *n == dep) {
                let mut path: Vec<&str> = stack[start..].to_vec();
                path.push(dep);
                return Err(LifecycleError::CircularDependency {
                    path: path.join(" -> "),
                });
            }
            if !visited.contains(dep) {
                visit(dep, graph, visited, stack)?;
            }
        }

        stack.pop();
        Ok(())
    }

    let mut visited = HashSet::new();
    for descriptor in descriptors {
        let name = descriptor.name.as_str();
        if !visited.contains(name) {
            visit(name, &graph, &mut visited, &mut Vec::new())?;
        }
    }
    Ok(())
}

/// Group components into batches whose dependencies are all satisfied by
/// earlier batches. Each batch is ordered by (priority, name).
///
/// Dependencies on components outside `components` are treated as satisfied.
pub fn dependency_batches(
    components: &[Arc<ComponentDescriptor>],
) -> Result<Vec<Vec<Arc<ComponentDescriptor>>>, LifecycleError> {
    let known: HashSet<&str> = components.iter().map(|c| c.name.as_str()).collect();
    let mut scheduled: HashSet<String> = HashSet::new();
    let mut remaining: Vec<Arc<ComponentDescriptor>> = components.to_vec();
    let mut batches = Vec::new();

    while !remaining.is_empty() {
        let (mut ready, blocked): (Vec<_>, Vec<_>) = remaining.into_iter().partition(|c| {
            c.depends_on
                .iter()
                .all(|dep| scheduled.contains(dep) || !known.contains(dep.as_str()))
        });

        if ready.is_empty() {
            let mut stuck: Vec<String> = blocked.iter().map(|c| c.name.clone()).collect();
            stuck.sort();
            return Err(LifecycleError::UnresolvableDependencies(stuck));
        }

        ready.sort_by(|a, b| (a.priority, &a.name).cmp(&(b.priority, &b.name)));
        scheduled.extend(ready.iter().map(|c| c.name.clone()));
        batches.push(ready);
        remaining = blocked;
    }

    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::component::{Component, ComponentPriority};

    struct Noop;

    #[async_trait::async_trait]
    impl Component for Noop {
        async fn startup(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn shutdown(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn descriptor(name: &str, priority: ComponentPriority, deps: &[&str]) -> ComponentDescriptor {
        ComponentDescriptor::from_instance(name, Arc::new(Noop))
            .priority(priority)
            .depends_on(deps.iter().copied())
    }

    fn names(batches: &[Vec<Arc<ComponentDescriptor>>]) -> Vec<Vec<String>> {
        batches
            .iter()
            .map(|b| b.iter().map(|d| d.name.clone()).collect())
            .collect()
    }

    #[test]
    fn test_duplicate_registration_is_skipped() {
        let registry = ComponentRegistry::new();
        assert!(registry.register(descriptor("A", ComponentPriority::HIGH, &[])).unwrap());
        assert!(!registry.register(descriptor("A", ComponentPriority::LOW, &[])).unwrap());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("A").unwrap().priority, ComponentPriority::HIGH);
    }

    #[test]
    fn test_empty_name_rejected() {
        let registry = ComponentRegistry::new();
        let err = registry
            .register(descriptor("  ", ComponentPriority::NORMAL, &[]))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::EmptyName));
    }

    #[test]
    fn test_batches_follow_dependencies() {
        let registry = ComponentRegistry::new();
        registry.register(descriptor("B", ComponentPriority::HIGH, &["A"])).unwrap();
        registry.register(descriptor("C", ComponentPriority::NORMAL, &["A"])).unwrap();
        registry.register(descriptor("A", ComponentPriority::HIGH, &[])).unwrap();

        registry.validate_dependencies().unwrap();
        let batches = registry.dependency_batches().unwrap();
        assert_eq!(
            names(&batches),
            vec![vec!["A".to_string()], vec!["B".to_string(), "C".to_string()]]
        );
    }

    #[test]
    fn test_batch_order_is_priority_then_name() {
        let registry = ComponentRegistry::new();
        registry.register(descriptor("zeta", ComponentPriority::CRITICAL, &[])).unwrap();
        registry.register(descriptor("beta", ComponentPriority::HIGH, &[])).unwrap();
        registry.register(descriptor("alpha", ComponentPriority::HIGH, &[])).unwrap();

        let batches = registry.dependency_batches().unwrap();
        assert_eq!(names(&batches), vec![vec!["zeta", "alpha", "beta"]]);

        let sorted: Vec<String> = registry
            .sorted_by_priority()
            .iter()
            .map(|d| d.name.clone())
            .collect();
        assert_eq!(sorted, vec!["zeta", "alpha", "beta"]);
    }

    #[test]
    fn test_cycle_reports_path() {
        let registry = ComponentRegistry::new();
        registry.register(descriptor("A", ComponentPriority::NORMAL, &["B"])).unwrap();
        registry.register(descriptor("B", ComponentPriority::NORMAL, &["A"])).unwrap();

        let err = registry.validate_dependencies().unwrap_err();
        match err {
            LifecycleError::CircularDependency { path } => assert_eq!(path, "A -> B -> A"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_dependency() {
        let registry = ComponentRegistry::new();
        registry.register(descriptor("GrpcServer", ComponentPriority::NORMAL, &["Model"])).unwrap();

        let err = registry.validate_dependencies().unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("'Model'"));
    }

    #[test]
    fn test_unresolvable_batches_name_stuck_components() {
        let a = Arc::new(descriptor("A", ComponentPriority::NORMAL, &["B"]));
        let b = Arc::new(descriptor("B", ComponentPriority::NORMAL, &["A"]));
        let c = Arc::new(descriptor("C", ComponentPriority::NORMAL, &[]));

        let err = dependency_batches(&[a, b, c]).unwrap_err();
        match err {
            LifecycleError::UnresolvableDependencies(stuck) => assert_eq!(stuck, vec!["A", "B"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
