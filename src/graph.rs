//! Static dependency graph: cycle detection and topological ordering.

use std::collections::HashMap;

use crate::error::{DiError, DiResult};
use crate::registration::{Node, Registry};

/// Dependency graph over registered nodes. Edges run consumer -> provider.
///
/// Built once from a frozen `Registry` at `build()`. Group consumers fan out
/// an edge to every provider currently registered for that group.
pub(crate) struct DependencyGraph {
    order: Vec<Node>,
    edges: HashMap<Node, Vec<Node>>,
}

impl DependencyGraph {
    pub(crate) fn build(registry: &Registry) -> Self {
        let mut edges = HashMap::with_capacity(registry.order.len());

        for node in &registry.order {
            let Some(reg) = registry.node_registration(node) else {
                continue;
            };

            let mut deps = Vec::new();
            for dep in &reg.dependencies {
                if dep.optional {
                    continue;
                }
                if dep.key.is_group() {
                    if let Some(members) = registry.get_group(&dep.key) {
                        for index in 0..members.len() {
                            deps.push(Node::GroupMember(dep.key.clone(), index));
                        }
                    }
                } else if registry.contains_key(&dep.key) {
                    deps.push(Node::Single(dep.key.clone()));
                }
            }
            edges.insert(node.clone(), deps);
        }

        Self {
            order: registry.order.clone(),
            edges,
        }
    }

    /// Color-marking DFS cycle check; returns the minimal cycle chain on failure.
    pub(crate) fn detect_cycles(&self) -> DiResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        let mut colors: HashMap<Node, Color> =
            self.order.iter().cloned().map(|n| (n, Color::White)).collect();
        let mut path: Vec<Node> = Vec::new();

        fn visit(
            node: &Node,
            edges: &HashMap<Node, Vec<Node>>,
            colors: &mut HashMap<Node, Color>,
            path: &mut Vec<Node>,
        ) -> DiResult<()> {
            match colors.get(node) {
                Some(Color::Black) => return Ok(()),
                Some(Color::Gray) => {
                    let mut chain: Vec<&'static str> =
                        path.iter().map(Node::display_name).collect();
                    chain.push(node.display_name());
                    return Err(DiError::Validation(format!(
                        "circular dependency: {}",
                        chain.join(" -> ")
                    )));
                }
                _ => {}
            }

            colors.insert(node.clone(), Color::Gray);
            path.push(node.clone());
            if let Some(deps) = edges.get(node) {
                for dep in deps {
                    visit(dep, edges, colors, path)?;
                }
            }
            path.pop();
            colors.insert(node.clone(), Color::Black);
            Ok(())
        }

        for node in &self.order {
            visit(node, &self.edges, &mut colors, &mut path)?;
        }
        Ok(())
    }

    /// Returns nodes in dependency order (providers before consumers).
    /// Ties are broken by registration order via a depth-first postorder walk.
    pub(crate) fn topological_sort(&self) -> DiResult<Vec<Node>> {
        self.detect_cycles()?;

        let mut visited = std::collections::HashSet::new();
        let mut sorted = Vec::with_capacity(self.order.len());

        fn visit(
            node: &Node,
            edges: &HashMap<Node, Vec<Node>>,
            visited: &mut std::collections::HashSet<Node>,
            sorted: &mut Vec<Node>,
        ) {
            if !visited.insert(node.clone()) {
                return;
            }
            if let Some(deps) = edges.get(node) {
                for dep in deps {
                    visit(dep, edges, visited, sorted);
                }
            }
            sorted.push(node.clone());
        }

        for node in &self.order {
            visit(node, &self.edges, &mut visited, &mut sorted);
        }
        Ok(sorted)
    }

    pub(crate) fn edges_of(&self, node: &Node) -> &[Node] {
        self.edges.get(node).map(Vec::as_slice).unwrap_or(&[])
    }
}
