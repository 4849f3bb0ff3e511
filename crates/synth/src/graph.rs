use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterNode {
    pub id: String,
    pub name: String,
}

/// Directed interaction. Several edges between the same pair are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEdge {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookGraph {
    pub nodes: Vec<CharacterNode>,
    pub edges: Vec<InteractionEdge>,
}

impl BookGraph {
    /// Nodes get ids "1".."n" in the order the names are given
    pub fn with_characters<S: AsRef<str>>(names: &[S]) -> Self {
        let nodes = names
            .iter()
            .enumerate()
            .map(|(idx, name)| CharacterNode {
                id: (idx + 1).to_string(),
                name: name.as_ref().to_string(),
            })
            .collect();

        Self {
            nodes,
            edges: Vec::new(),
        }
    }

    /// Add an edge between two nodes by index
    pub fn connect(&mut self, source: usize, target: usize, weight: u32) {
        let edge = InteractionEdge {
            source: self.nodes[source].id.clone(),
            target: self.nodes[target].id.clone(),
            weight,
        };
        self.edges.push(edge);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&CharacterNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|edge| edge.source == id).count()
    }

    /// Edges whose endpoints are not node ids
    pub fn dangling_edges(&self) -> Vec<&InteractionEdge> {
        let ids: HashSet<&str> = self.nodes.iter().map(|node| node.id.as_str()).collect();
        self.edges
            .iter()
            .filter(|edge| !ids.contains(edge.source.as_str()) || !ids.contains(edge.target.as_str()))
            .collect()
    }
}
