//! Trainable skills for managed livestock.
//!
//! Skills form a prerequisite graph: a skill can only be trained once every
//! prerequisite is trained. Enabling a skill therefore enables everything it
//! depends on, and disabling one disables everything that depends on it.
//! Nodes live in an arena and refer to prerequisites by index; a node may
//! only name prerequisites added before it, so the graph is acyclic by
//! construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrainingError {
    #[error("unknown trainable: {0}")]
    Unknown(String),

    #[error("trainable already defined: {0}")]
    Duplicate(String),

    #[error("trainable {trainable} lists prerequisite #{index}, which is not defined before it")]
    BadPrerequisite { trainable: String, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trainable {
    pub name: String,
    /// Indices of earlier nodes.
    pub prerequisites: Vec<usize>,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Trainable>", into = "Vec<Trainable>")]
pub struct TrainingGraph {
    nodes: Vec<Trainable>,
}

impl TrainingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Obedience gates everything else.
    pub fn standard() -> Self {
        let node = |name: &str, prerequisites: Vec<usize>| Trainable {
            name: name.to_string(),
            prerequisites,
            enabled: false,
        };
        Self {
            nodes: vec![
                node("obedience", vec![]),
                node("release", vec![0]),
                node("rescue", vec![0]),
                node("haul", vec![0]),
            ],
        }
    }

    /// Append a trainable. Prerequisites must already exist.
    pub fn add(&mut self, name: &str, prerequisites: &[&str]) -> Result<usize, TrainingError> {
        if self.index_of(name).is_ok() {
            return Err(TrainingError::Duplicate(name.to_string()));
        }
        let prerequisites = prerequisites
            .iter()
            .map(|p| self.index_of(p))
            .collect::<Result<Vec<_>, _>>()?;
        self.nodes.push(Trainable {
            name: name.to_string(),
            prerequisites,
            enabled: false,
        });
        Ok(self.nodes.len() - 1)
    }

    pub fn index_of(&self, name: &str) -> Result<usize, TrainingError> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .ok_or_else(|| TrainingError::Unknown(name.to_string()))
    }

    pub fn is_enabled(&self, name: &str) -> Result<bool, TrainingError> {
        Ok(self.nodes[self.index_of(name)?].enabled)
    }

    /// Names of enabled trainables in definition order.
    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter(|n| n.enabled).map(|n| n.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Enable or disable `name`, propagating through the graph. Returns the
    /// names whose state changed, `name` included.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<Vec<String>, TrainingError> {
        let start = self.index_of(name)?;
        let mut changed = Vec::new();
        let mut stack = vec![start];

        while let Some(index) = stack.pop() {
            if self.nodes[index].enabled == enabled {
                continue;
            }
            self.nodes[index].enabled = enabled;
            changed.push(self.nodes[index].name.clone());

            if enabled {
                stack.extend(self.nodes[index].prerequisites.iter().copied());
            } else {
                stack.extend(
                    self.nodes
                        .iter()
                        .enumerate()
                        .filter(|(_, n)| n.prerequisites.contains(&index))
                        .map(|(i, _)| i),
                );
            }
        }

        Ok(changed)
    }
}

impl TryFrom<Vec<Trainable>> for TrainingGraph {
    type Error = TrainingError;

    fn try_from(nodes: Vec<Trainable>) -> Result<Self, Self::Error> {
        for (position, node) in nodes.iter().enumerate() {
            if nodes[..position].iter().any(|n| n.name == node.name) {
                return Err(TrainingError::Duplicate(node.name.clone()));
            }
            if let Some(&index) = node.prerequisites.iter().find(|&&p| p >= position) {
                return Err(TrainingError::BadPrerequisite {
                    trainable: node.name.clone(),
                    index,
                });
            }
        }
        Ok(Self { nodes })
    }
}

impl From<TrainingGraph> for Vec<Trainable> {
    fn from(graph: TrainingGraph) -> Self {
        graph.nodes
    }
}
