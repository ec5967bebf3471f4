//! Build-time validation: local descriptor checks, cycle detection,
//! lifetime-conflict detection, and missing-dependency detection.

use std::collections::HashSet;

use crate::error::{DiError, DiResult};
use crate::graph::DependencyGraph;
use crate::lifetime::Lifetime;
use crate::registration::{Node, Registry};

/// Runs every `build()`-time check described in the validator component.
///
/// Local descriptor checks (non-nil type, valid constructor, recognized
/// lifetime) are enforced by the type system at registration time in this
/// implementation, so the remaining runtime checks are: no graph cycle, no
/// missing non-optional dependency, and no Singleton transitively depending
/// on a Scoped descriptor.
pub(crate) fn validate(registry: &Registry, graph: &DependencyGraph) -> DiResult<()> {
    graph.detect_cycles()?;
    check_missing_dependencies(registry)?;
    check_lifetime_conflicts(registry, graph)?;
    Ok(())
}

fn check_missing_dependencies(registry: &Registry) -> DiResult<()> {
    for node in &registry.order {
        let Some(reg) = registry.node_registration(node) else {
            continue;
        };
        for dep in &reg.dependencies {
            if dep.optional {
                continue;
            }
            if dep.key.is_group() {
                // Empty groups are not an error.
                continue;
            }
            if !registry.contains_key(&dep.key) {
                return Err(DiError::Validation(format!(
                    "{} depends on unregistered {}",
                    node.display_name(),
                    dep.key.display_name()
                )));
            }
        }
    }
    Ok(())
}

fn check_lifetime_conflicts(registry: &Registry, graph: &DependencyGraph) -> DiResult<()> {
    for node in &registry.order {
        let Some(reg) = registry.node_registration(node) else {
            continue;
        };
        if reg.lifetime != Lifetime::Singleton {
            continue;
        }

        let mut visited = HashSet::new();
        let mut stack = graph.edges_of(node).to_vec();
        while let Some(dep) = stack.pop() {
            if !visited.insert(dep.clone()) {
                continue;
            }
            if let Some(dep_reg) = registry.node_registration(&dep) {
                if dep_reg.lifetime == Lifetime::Scoped {
                    return Err(DiError::Validation(format!(
                        "singleton {} transitively depends on scoped {}",
                        node.display_name(),
                        dep.display_name()
                    )));
                }
            }
            stack.extend(graph.edges_of(&dep).iter().cloned());
        }
    }
    Ok(())
}
