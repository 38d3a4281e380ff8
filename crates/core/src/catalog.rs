//! Catalog - the static node graph a learner works through.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::id::{NodeId, PhaseId};
use crate::node::{Checkpoint, LearningNode, Phase};

/// The static content of a roadmap: nodes, phases and checkpoints.
///
/// Lookup and reverse-dependency indexes are built once on construction;
/// the catalog is immutable afterwards and shared between snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "CatalogFile", into = "CatalogFile")]
pub struct Catalog {
    nodes: Vec<LearningNode>,
    phases: Vec<Phase>,
    checkpoints: Vec<Checkpoint>,
    /// node id -> position in `nodes`
    index: HashMap<NodeId, usize>,
    /// prerequisite -> [nodes that list it]
    dependents: HashMap<NodeId, Vec<NodeId>>,
}

/// On-disk shape of a catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFile {
    #[serde(default)]
    nodes: Vec<LearningNode>,
    #[serde(default)]
    phases: Vec<Phase>,
    #[serde(default)]
    checkpoints: Vec<Checkpoint>,
}

impl From<CatalogFile> for Catalog {
    fn from(file: CatalogFile) -> Self {
        Catalog::with_parts(file.nodes, file.phases, file.checkpoints)
    }
}

impl From<Catalog> for CatalogFile {
    fn from(catalog: Catalog) -> Self {
        CatalogFile {
            nodes: catalog.nodes,
            phases: catalog.phases,
            checkpoints: catalog.checkpoints,
        }
    }
}

impl Catalog {
    /// Build a catalog from nodes alone.
    pub fn new(nodes: Vec<LearningNode>) -> Self {
        Self::with_parts(nodes, Vec::new(), Vec::new())
    }

    /// Build a catalog with explicit phases and checkpoints.
    pub fn with_parts(
        nodes: Vec<LearningNode>,
        phases: Vec<Phase>,
        checkpoints: Vec<Checkpoint>,
    ) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        let mut dependents: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

        for (pos, node) in nodes.iter().enumerate() {
            // First definition wins; duplicates are reported by `validate`.
            index.entry(node.id.clone()).or_insert(pos);
            for prereq in &node.prerequisite_ids {
                let list = dependents.entry(prereq.clone()).or_default();
                if !list.contains(&node.id) {
                    list.push(node.id.clone());
                }
            }
        }

        Self {
            nodes,
            phases,
            checkpoints,
            index,
            dependents,
        }
    }

    /// All nodes in catalog order.
    pub fn nodes(&self) -> &[LearningNode] {
        &self.nodes
    }

    /// Declared phases.
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Declared checkpoints.
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Look up a node.
    pub fn get(&self, id: &NodeId) -> Option<&LearningNode> {
        self.index.get(id).map(|&pos| &self.nodes[pos])
    }

    /// Whether a node id exists.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the catalog has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes that list `id` as a direct prerequisite.
    pub fn dependents_of(&self, id: &NodeId) -> &[NodeId] {
        self.dependents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every phase id known to the catalog: declared phases first, then any
    /// phase referenced only by nodes, in order of first appearance.
    pub fn phase_ids(&self) -> Vec<PhaseId> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let declared = self.phases.iter().map(|p| &p.id);
        let referenced = self.nodes.iter().map(|n| &n.phase_id);
        for id in declared.chain(referenced) {
            if seen.insert(id.clone()) {
                ids.push(id.clone());
            }
        }
        ids
    }

    /// Nodes belonging to a phase. A node whose id equals the phase id is the
    /// phase header itself and is not counted as a child.
    pub fn phase_members<'a>(&'a self, phase_id: &'a PhaseId) -> impl Iterator<Item = &'a LearningNode> + 'a {
        self.nodes
            .iter()
            .filter(move |n| &n.phase_id == phase_id && n.id.as_str() != phase_id.as_str())
    }

    /// Check structural soundness of the content.
    ///
    /// Reports the first problem found: duplicate ids, prerequisites that name
    /// no node, or a prerequisite cycle (which would leave every member locked
    /// forever).
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(&node.id) {
                return Err(CatalogError::DuplicateNode(node.id.clone()));
            }
        }

        for node in &self.nodes {
            for prereq in &node.prerequisite_ids {
                if !self.contains(prereq) {
                    return Err(CatalogError::UnknownPrerequisite {
                        node_id: node.id.clone(),
                        prerequisite: prereq.clone(),
                    });
                }
            }
        }

        if let Some(cycle) = self.find_cycle() {
            return Err(CatalogError::Cycle(cycle));
        }

        Ok(())
    }

    /// Find a prerequisite cycle, if any, using DFS.
    fn find_cycle(&self) -> Option<Vec<NodeId>> {
        let mut visited: HashSet<&NodeId> = HashSet::new();
        let mut stack: HashSet<&NodeId> = HashSet::new();

        for node in &self.nodes {
            if !visited.contains(&node.id) {
                let mut path = Vec::new();
                if let Some(cycle) = self.visit(&node.id, &mut visited, &mut stack, &mut path) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    fn visit<'a>(
        &'a self,
        id: &'a NodeId,
        visited: &mut HashSet<&'a NodeId>,
        stack: &mut HashSet<&'a NodeId>,
        path: &mut Vec<&'a NodeId>,
    ) -> Option<Vec<NodeId>> {
        visited.insert(id);
        stack.insert(id);
        path.push(id);

        if let Some(node) = self.get(id) {
            for prereq in &node.prerequisite_ids {
                if !visited.contains(prereq) {
                    if let Some(cycle) = self.visit(prereq, visited, stack, path) {
                        return Some(cycle);
                    }
                } else if stack.contains(prereq) {
                    if let Some(start) = path.iter().position(|p| *p == prereq) {
                        return Some(path[start..].iter().map(|p| (*p).clone()).collect());
                    }
                }
            }
        }

        path.pop();
        stack.remove(id);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Catalog {
        Catalog::new(vec![
            LearningNode::new("a", "A", "phase1"),
            LearningNode::new("b", "B", "phase1").requires("a"),
            LearningNode::new("c", "C", "phase2").requires("a").requires("b"),
        ])
    }

    #[test]
    fn test_dependents_index() {
        let catalog = chain();
        let a = NodeId::new("a");
        assert_eq!(catalog.dependents_of(&a), &[NodeId::new("b"), NodeId::new("c")]);
        assert_eq!(catalog.dependents_of(&NodeId::new("b")), &[NodeId::new("c")]);
        assert!(catalog.dependents_of(&NodeId::new("c")).is_empty());
    }

    #[test]
    fn test_validate_accepts_dag() {
        assert!(chain().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_cycle() {
        let catalog = Catalog::new(vec![
            LearningNode::new("a", "A", "p").requires("c"),
            LearningNode::new("b", "B", "p").requires("a"),
            LearningNode::new("c", "C", "p").requires("b"),
        ]);
        match catalog.validate() {
            Err(CatalogError::Cycle(cycle)) => assert_eq!(cycle.len(), 3),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_and_dangling() {
        let dup = Catalog::new(vec![
            LearningNode::new("a", "A", "p"),
            LearningNode::new("a", "A again", "p"),
        ]);
        assert_eq!(dup.validate(), Err(CatalogError::DuplicateNode(NodeId::new("a"))));

        let dangling = Catalog::new(vec![LearningNode::new("a", "A", "p").requires("ghost")]);
        assert!(matches!(
            dangling.validate(),
            Err(CatalogError::UnknownPrerequisite { .. })
        ));
    }

    #[test]
    fn test_phase_ids_and_members() {
        let catalog = Catalog::with_parts(
            vec![
                LearningNode::new("phase1", "Phase 1", "phase1"),
                LearningNode::new("a", "A", "phase1"),
                LearningNode::new("b", "B", "phase2"),
            ],
            vec![
                Phase { id: PhaseId::new("phase0"), title: "Empty".into() },
                Phase { id: PhaseId::new("phase1"), title: "One".into() },
            ],
            Vec::new(),
        );
        let ids: Vec<_> = catalog.phase_ids().into_iter().map(|p| p.to_string()).collect();
        assert_eq!(ids, vec!["phase0", "phase1", "phase2"]);

        let phase1 = PhaseId::new("phase1");
        let members: Vec<_> = catalog.phase_members(&phase1).map(|n| n.id.as_str()).collect();
        assert_eq!(members, vec!["a"]);
    }

    #[test]
    fn test_json_shape_keeps_passthrough_fields() {
        let json = r#"{
            "nodes": [
                {"id": "a", "label": "A", "phaseId": "phase1", "nodeType": "subTopic",
                 "estimatedHours": 4, "description": "opaque", "resources": [1, 2]},
                {"id": "b", "label": "B", "phaseId": "phase1", "prerequisiteIds": ["a"]}
            ]
        }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.len(), 2);
        let a = catalog.get(&NodeId::new("a")).unwrap();
        assert_eq!(a.estimated_hours, 4.0);
        assert_eq!(a.extra.get("description").and_then(|v| v.as_str()), Some("opaque"));
        assert_eq!(catalog.dependents_of(&NodeId::new("a")), &[NodeId::new("b")]);

        let back = serde_json::to_value(&catalog).unwrap();
        assert_eq!(back["nodes"][0]["description"], "opaque");
    }

    #[test]
    fn test_demo_catalog_is_valid() {
        let catalog: Catalog = serde_json::from_str(include_str!("../../../demos/catalog.json")).unwrap();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.phases().len(), 2);
        assert_eq!(catalog.checkpoints().len(), 1);
        assert_eq!(
            catalog.dependents_of(&NodeId::new("python_mastery")),
            &[NodeId::new("oop_patterns"), NodeId::new("math_foundations")]
        );
    }
}
