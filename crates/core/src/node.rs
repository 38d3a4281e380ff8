//! Learning node model - static catalog content.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::{CheckpointId, NodeId, PhaseId};

/// A unit of learning content in the roadmap DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningNode {
    /// Unique identifier
    pub id: NodeId,

    /// Display title
    pub label: String,

    /// Node kind
    #[serde(default)]
    pub node_type: NodeType,

    /// Owning phase
    pub phase_id: PhaseId,

    /// Difficulty (informational)
    #[serde(default)]
    pub difficulty: Difficulty,

    /// Estimated effort in hours
    #[serde(default)]
    pub estimated_hours: f64,

    /// Nodes that must be completed before this one unlocks
    #[serde(default)]
    pub prerequisite_ids: Vec<NodeId>,

    /// Hierarchical children (display grouping only)
    #[serde(default)]
    pub children_ids: Vec<NodeId>,

    /// Skills gained on completion
    #[serde(default)]
    pub skills: Vec<String>,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Descriptive fields the engine never inspects (description, resources, urls...)
    #[serde(flatten, default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl LearningNode {
    /// Create a node with no prerequisites.
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>, phase_id: impl Into<PhaseId>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type: NodeType::default(),
            phase_id: phase_id.into(),
            difficulty: Difficulty::default(),
            estimated_hours: 0.0,
            prerequisite_ids: Vec::new(),
            children_ids: Vec::new(),
            skills: Vec::new(),
            tags: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Add a prerequisite.
    pub fn requires(mut self, prerequisite: impl Into<NodeId>) -> Self {
        self.prerequisite_ids.push(prerequisite.into());
        self
    }

    /// Set estimated hours.
    pub fn with_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = hours;
        self
    }

    /// Attach a skill.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.push(skill.into());
        self
    }

    /// Whether the node can start out available.
    pub fn has_prerequisites(&self) -> bool {
        !self.prerequisite_ids.is_empty()
    }
}

/// Node kind. No behavioral difference in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    /// Grouping node, usually a phase header
    Category,
    /// Regular topic
    #[default]
    Topic,
    /// Topic nested under another topic
    SubTopic,
    /// Hands-on project suggestion
    ProjectIdea,
    /// External reading or course
    Resource,
}

/// Difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    /// No prior knowledge assumed
    #[default]
    Beginner,
    /// Builds on the basics
    Intermediate,
    /// Expects solid experience
    Advanced,
}

/// A roadmap phase. Nodes join a phase through `LearningNode::phase_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    /// Phase id
    pub id: PhaseId,

    /// Display title
    #[serde(default)]
    pub title: String,
}

/// A milestone reached once every required node is completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    /// Checkpoint id
    pub id: CheckpointId,

    /// Display title
    #[serde(default)]
    pub title: String,

    /// Owning phase
    pub phase_id: PhaseId,

    /// Nodes that must all be completed
    #[serde(default)]
    pub required_node_ids: Vec<NodeId>,
}
