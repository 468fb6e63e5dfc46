//! Directed BFS leveling from the Start node

use std::collections::{HashMap, HashSet, VecDeque};

use crate::types::{NodeId, Workflow};

/// Column assignment for every node of a workflow
///
/// Level 0 holds Start; level n holds the nodes whose shortest directed path
/// from Start has n edges. Nodes Start cannot reach share one extra level
/// after the deepest reachable one.
#[derive(Debug, Clone, PartialEq)]
pub struct Levels {
    by_node: HashMap<NodeId, usize>,
    columns: Vec<Vec<NodeId>>,
    orphan_level: Option<usize>,
}

impl Levels {
    /// Level every node of the workflow
    pub fn compute(workflow: &Workflow) -> Self {
        let mut by_node: HashMap<NodeId, usize> = HashMap::new();
        let mut columns: Vec<Vec<NodeId>> = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();

        let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
        queue.push_back((workflow.start_node().id.as_str(), 0));

        while let Some((node_id, level)) = queue.pop_front() {
            if !visited.insert(node_id) {
                continue;
            }
            if columns.len() <= level {
                columns.resize_with(level + 1, Vec::new);
            }
            columns[level].push(node_id.to_string());
            by_node.insert(node_id.to_string(), level);

            for edge in workflow.outgoing_edges(node_id) {
                if !visited.contains(edge.target.as_str()) {
                    queue.push_back((edge.target.as_str(), level + 1));
                }
            }
        }

        let orphans: Vec<NodeId> = workflow
            .nodes()
            .filter(|n| !visited.contains(n.id.as_str()))
            .map(|n| n.id.clone())
            .collect();

        let orphan_level = if orphans.is_empty() {
            None
        } else {
            let level = columns.len();
            for id in &orphans {
                by_node.insert(id.clone(), level);
            }
            columns.push(orphans);
            Some(level)
        };

        Self {
            by_node,
            columns,
            orphan_level,
        }
    }

    /// Level of a node, if it belongs to the leveled workflow
    pub fn level_of(&self, node_id: &str) -> Option<usize> {
        self.by_node.get(node_id).copied()
    }

    /// Node IDs per level, in discovery order
    pub fn columns(&self) -> &[Vec<NodeId>] {
        &self.columns
    }

    /// Whether Start cannot reach the node
    pub fn is_orphan(&self, node_id: &str) -> bool {
        self.orphan_level.is_some() && self.level_of(node_id) == self.orphan_level
    }

    /// Level shared by unreachable nodes, if there are any
    pub fn orphan_level(&self) -> Option<usize> {
        self.orphan_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::WorkflowBuilder;
    use crate::types::EventData;

    #[test]
    fn test_levels_follow_edge_direction() {
        let wf = WorkflowBuilder::new("Levels")
            .add_event("e1", EventData::default())
            .add_status("s1", "Open")
            .add_status("s2", "Closed")
            .add_event("e2", EventData::default())
            .add_edge("start", "e1")
            .add_edge("e1", "s1")
            .add_edge("e1", "s2")
            // e2 sits one level past its only parent
            .add_edge("s1", "e2")
            .build()
            .unwrap();

        let levels = Levels::compute(&wf);
        assert_eq!(levels.level_of("start"), Some(0));
        assert_eq!(levels.level_of("e1"), Some(1));
        assert_eq!(levels.level_of("s1"), Some(2));
        assert_eq!(levels.level_of("s2"), Some(2));
        assert_eq!(levels.level_of("e2"), Some(3));
        assert_eq!(levels.columns()[2], vec!["s1".to_string(), "s2".to_string()]);
        assert_eq!(levels.orphan_level(), None);
    }

    #[test]
    fn test_orphans_share_last_level() {
        let wf = WorkflowBuilder::new("Orphans")
            .add_event("e1", EventData::default())
            .add_status("lonely", "Lonely")
            .add_event("stray", EventData::default())
            .add_edge("start", "e1")
            // an edge from another orphan does not make "lonely" reachable
            .add_edge("stray", "lonely")
            .build()
            .unwrap();

        let levels = Levels::compute(&wf);
        assert_eq!(levels.orphan_level(), Some(2));
        assert!(levels.is_orphan("lonely"));
        assert!(levels.is_orphan("stray"));
        assert!(!levels.is_orphan("e1"));
        assert_eq!(levels.columns().len(), 3);
    }
}
