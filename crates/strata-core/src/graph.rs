//! Stack dependency graph and topological ordering

use crate::error::{Result, SynthError};
use std::collections::{BTreeSet, HashMap};

/// Directed graph of stack dependencies
///
/// Edges point consumer → producer. Ordering is a stable topological sort:
/// among stacks whose producers are all emitted, declaration order wins, so
/// the same graph always yields the same sequence.
#[derive(Debug, Default)]
pub struct StackGraph {
    nodes: Vec<String>,
    edges: BTreeSet<(String, String)>,
}

impl StackGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stack node; declaration order is the tie-break order
    pub fn add_node(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.nodes.contains(&name) {
            return Err(SynthError::DuplicateStack(name));
        }
        self.nodes.push(name);
        Ok(())
    }

    /// Register an edge: `consumer` needs `producer` synthesized first
    pub fn add_dependency(&mut self, consumer: &str, producer: &str) -> Result<()> {
        for name in [consumer, producer] {
            if !self.nodes.iter().any(|n| n == name) {
                return Err(SynthError::UnknownStack(name.to_string()));
            }
        }
        self.edges
            .insert((consumer.to_string(), producer.to_string()));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n == name)
    }

    /// Every producer precedes its consumers; fails with a cycle report when
    /// no such order exists
    pub fn topological_order(&self) -> Result<Vec<String>> {
        let n = self.nodes.len();
        let index: HashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut producers: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (consumer, producer) in &self.edges {
            producers[index[consumer.as_str()]].push(index[producer.as_str()]);
        }

        let mut emitted = vec![false; n];
        let mut order = Vec::with_capacity(n);
        while order.len() < n {
            let ready = (0..n)
                .find(|&i| !emitted[i] && producers[i].iter().all(|&p| emitted[p]));
            match ready {
                Some(i) => {
                    emitted[i] = true;
                    order.push(self.nodes[i].clone());
                }
                None => return Err(SynthError::Cycle(self.find_cycle(&emitted, &producers))),
            }
        }

        tracing::debug!("stack order: {}", order.join(" -> "));
        Ok(order)
    }

    /// Walk producer edges from an unemitted node until one repeats
    fn find_cycle(&self, emitted: &[bool], producers: &[Vec<usize>]) -> String {
        let start = (0..self.nodes.len())
            .find(|&i| !emitted[i])
            .unwrap_or(0);

        let mut path = vec![start];
        let mut current = start;
        loop {
            // Among remaining nodes, some unemitted producer must exist or
            // `current` would have been ready.
            let next = producers[current]
                .iter()
                .copied()
                .find(|&p| !emitted[p])
                .unwrap_or(start);
            if let Some(pos) = path.iter().position(|&i| i == next) {
                let mut names: Vec<&str> =
                    path[pos..].iter().map(|&i| self.nodes[i].as_str()).collect();
                names.push(&self.nodes[next]);
                return names.join(" -> ");
            }
            path.push(next);
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> StackGraph {
        let mut g = StackGraph::new();
        for n in nodes {
            g.add_node(*n).unwrap();
        }
        for (c, p) in edges {
            g.add_dependency(c, p).unwrap();
        }
        g
    }

    #[test]
    fn producer_precedes_consumer() {
        let g = graph(&["server", "network"], &[("server", "network")]);
        let order = g.topological_order().unwrap();
        assert_eq!(order, vec!["network", "server"]);
    }

    #[test]
    fn declaration_order_is_stable_tie_break() {
        let g = graph(
            &["a", "b", "c", "d"],
            &[("d", "a"), ("d", "b"), ("d", "c")],
        );
        assert_eq!(g.topological_order().unwrap(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn diamond_dependencies() {
        let g = graph(
            &["app", "db", "net"],
            &[("app", "db"), ("app", "net"), ("db", "net")],
        );
        assert_eq!(g.topological_order().unwrap(), vec!["net", "db", "app"]);
    }

    #[test]
    fn two_node_cycle_is_fatal() {
        let g = graph(
            &["network", "server"],
            &[("server", "network"), ("network", "server")],
        );
        let err = g.topological_order().unwrap_err();
        match err {
            SynthError::Cycle(path) => {
                assert!(path.contains("network"));
                assert!(path.contains("server"));
            }
            other => panic!("expected cycle error, got {other}"),
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let g = graph(&["server"], &[("server", "server")]);
        assert!(matches!(
            g.topological_order(),
            Err(SynthError::Cycle(_))
        ));
    }

    #[test]
    fn edge_to_unknown_stack_rejected() {
        let mut g = StackGraph::new();
        g.add_node("server").unwrap();
        assert!(matches!(
            g.add_dependency("server", "network"),
            Err(SynthError::UnknownStack(name)) if name == "network"
        ));
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut g = StackGraph::new();
        g.add_node("network").unwrap();
        assert!(matches!(
            g.add_node("network"),
            Err(SynthError::DuplicateStack(_))
        ));
    }
}
