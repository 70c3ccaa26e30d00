//! State diagram projection of a transition table.

use crate::table::TransitionTable;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;

/// A state in the diagram.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
}

/// A directed edge for one rule. Parallel edges between the same pair of states are kept
/// apart so each keeps its own label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub label: String,
    pub rule_index: usize,
}

impl Edge {
    /// Stable element id, `from-to-ruleIndex`.
    pub fn id(&self) -> String {
        format!("{}-{}-{}", self.from, self.to, self.rule_index)
    }
}

/// Nodes in order of first appearance and one edge per rule in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Returns true if a node named `state` exists.
    pub fn contains(&self, state: &str) -> bool {
        self.nodes.iter().any(|node| node.id == state)
    }

    /// Edges leaving `state`.
    pub fn edges_from<'a>(&'a self, state: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |edge| edge.from == state)
    }

    /// Graph elements in the node/edge `data` layout understood by graph widgets.
    pub fn to_elements_json(&self) -> Value {
        let nodes = self.nodes.iter().map(|node| {
            json!({
                "data": { "id": node.id }
            })
        });

        let edges = self.edges.iter().map(|edge| {
            json!({
                "data": {
                    "id": edge.id(),
                    "source": edge.from,
                    "target": edge.to,
                    "label": edge.label,
                    "ruleIndex": edge.rule_index,
                }
            })
        });

        Value::Array(nodes.chain(edges).collect())
    }
}

/// Derives the diagram graph from a table.
///
/// Every source and target state becomes a node, including `ha` and `hr` when referenced.
pub fn project(table: &TransitionTable) -> Graph {
    let mut seen = HashSet::new();
    let mut nodes = Vec::new();
    let mut edges = Vec::with_capacity(table.len());

    for (rule_index, rule) in table.rules().iter().enumerate() {
        for state in [&rule.from, &rule.to] {
            if seen.insert(state.as_str()) {
                nodes.push(Node { id: state.clone() });
            }
        }

        edges.push(Edge {
            from: rule.from.clone(),
            to: rule.to.clone(),
            label: rule.label(),
            rule_index,
        });
    }

    Graph { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::compile;

    #[test]
    fn test_nodes_are_deduplicated_in_first_seen_order() {
        let program = compile("q0 a/a,R q1\nq1 a/a,R q0\nq1 _/_,S ha").unwrap();
        let ids: Vec<_> = program.graph.nodes.iter().map(|n| n.id.as_str()).collect();

        assert_eq!(ids, vec!["q0", "q1", "ha"]);
    }

    #[test]
    fn test_parallel_edges_stay_distinct() {
        let program = compile("q0 _/_,R q1\nq1 a/a,R q2\nq1 b/x,R q2").unwrap();
        let parallel: Vec<_> = program
            .graph
            .edges
            .iter()
            .filter(|e| e.from == "q1" && e.to == "q2")
            .collect();

        assert_eq!(parallel.len(), 2);
        assert_eq!(parallel[0].rule_index, 1);
        assert_eq!(parallel[0].label, "a/a,R");
        assert_eq!(parallel[1].rule_index, 2);
        assert_eq!(parallel[1].label, "b/x,R");
    }

    #[test]
    fn test_reserved_and_undeclared_targets_are_nodes() {
        let program = compile("q0 a/a,S hr\nq0 b/b,R ha\nq0 c/c,R nowhere").unwrap();
        let graph = &program.graph;

        assert!(graph.contains("ha"));
        assert!(graph.contains("hr"));
        assert!(graph.contains("nowhere"));
        assert_eq!(graph.edges_from("q0").count(), 3);
        assert_eq!(graph.edges_from("ha").count(), 0);
    }

    #[test]
    fn test_self_loop() {
        let program = compile("q0 a/a,R q0").unwrap();

        assert_eq!(program.graph.nodes.len(), 1);
        assert_eq!(program.graph.edges[0].from, program.graph.edges[0].to);
    }

    #[test]
    fn test_elements_json() {
        let program = compile("q0 a/b,R ha").unwrap();
        let elements = program.graph.to_elements_json();

        assert_eq!(
            elements,
            json!([
                { "data": { "id": "q0" } },
                { "data": { "id": "ha" } },
                { "data": {
                    "id": "q0-ha-0",
                    "source": "q0",
                    "target": "ha",
                    "label": "a/b,R",
                    "ruleIndex": 0
                } }
            ])
        );
    }

    #[test]
    fn test_graph_serializes_rule_index_in_camel_case() {
        let program = compile("q0 a/b,R ha").unwrap();
        let json = serde_json::to_value(&program.graph).unwrap();

        assert_eq!(json["edges"][0]["ruleIndex"], 0);
        assert_eq!(json["nodes"][1]["id"], "ha");
    }
}
