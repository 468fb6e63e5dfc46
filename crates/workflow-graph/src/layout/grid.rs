//! Even per-level stacking

use std::collections::HashMap;

use super::{LayoutConfig, LayoutStrategy, Levels};
use crate::types::{NodeId, Position, Workflow};

/// Stacks each column top to bottom, centered on the Start row
///
/// Parents are ignored: a node's place depends only on its index within its
/// level.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridLayout;

impl LayoutStrategy for GridLayout {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn place(
        &self,
        workflow: &Workflow,
        levels: &Levels,
        columns: &[f64],
        config: &LayoutConfig,
    ) -> HashMap<NodeId, Position> {
        let mut positions = HashMap::new();
        let start_height = config.node_size(workflow.start_node()).height;
        let center_y = config.start_anchor.y + start_height / 2.0;

        for (level, ids) in levels.columns().iter().enumerate() {
            let nodes: Vec<_> = ids.iter().filter_map(|id| workflow.find_node(id)).collect();
            if nodes.is_empty() {
                continue;
            }
            let x = columns.get(level).copied().unwrap_or(config.start_anchor.x);
            let heights: Vec<f64> = nodes.iter().map(|n| config.node_size(n).height).collect();
            let total =
                heights.iter().sum::<f64>() + (nodes.len() - 1) as f64 * config.vertical_gap;

            let mut y = center_y - total / 2.0;
            for (node, height) in nodes.iter().zip(heights) {
                positions.insert(node.id.clone(), Position::new(x, y));
                y += height + config.vertical_gap;
            }
        }

        positions
    }
}
