//! Parent-relative compact layout

use std::collections::{HashMap, HashSet, VecDeque};

use super::{ColumnBands, LayoutConfig, LayoutStrategy, Levels};
use crate::types::{NodeId, Position, Workflow};

/// Places children beside their parent
///
/// A single child takes its parent's y, shifted down only if that space is
/// taken. Several children form one cluster centered on the parent's vertical
/// center. Unreachable nodes stack from the top padding of the last column.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactLayout;

impl LayoutStrategy for CompactLayout {
    fn name(&self) -> &'static str {
        "compact"
    }

    fn place(
        &self,
        workflow: &Workflow,
        levels: &Levels,
        columns: &[f64],
        config: &LayoutConfig,
    ) -> HashMap<NodeId, Position> {
        let mut positions: HashMap<NodeId, Position> = HashMap::new();
        let mut bands = ColumnBands::default();
        let column_x = |level: usize| columns.get(level).copied().unwrap_or(config.start_anchor.x);

        let start = workflow.start_node();
        let start_size = config.node_size(start);
        positions.insert(start.id.clone(), config.start_anchor);
        bands.occupy(
            0,
            config.start_anchor.y,
            config.start_anchor.y + start_size.height,
        );

        let mut placed: HashSet<&str> = HashSet::new();
        placed.insert(start.id.as_str());
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(start.id.as_str());

        while let Some(parent_id) = queue.pop_front() {
            let (Some(parent), Some(parent_pos), Some(parent_level)) = (
                workflow.find_node(parent_id),
                positions.get(parent_id).copied(),
                levels.level_of(parent_id),
            ) else {
                continue;
            };
            let child_level = parent_level + 1;

            // A child belongs to the first parent one level above it
            let children: Vec<_> = workflow
                .outgoing_edges(parent_id)
                .map(|edge| edge.target.as_str())
                .filter(|id| !placed.contains(id) && levels.level_of(id) == Some(child_level))
                .filter_map(|id| workflow.find_node(id))
                .collect();
            if children.is_empty() {
                continue;
            }

            let x = column_x(child_level);
            let sizes: Vec<_> = children.iter().map(|c| config.node_size(c)).collect();

            let mut y = if children.len() == 1 {
                bands.find_available_y(
                    child_level,
                    parent_pos.y,
                    sizes[0].height,
                    config.vertical_gap,
                )
            } else {
                let cluster_height = sizes.iter().map(|s| s.height).sum::<f64>()
                    + (children.len() - 1) as f64 * config.vertical_gap;
                let parent_center = parent_pos.y + config.node_size(parent).height / 2.0;
                bands.find_available_y(
                    child_level,
                    parent_center - cluster_height / 2.0,
                    cluster_height,
                    config.vertical_gap,
                )
            };

            for (child, size) in children.iter().zip(&sizes) {
                positions.insert(child.id.clone(), Position::new(x, y));
                bands.occupy(child_level, y, y + size.height);
                y += size.height + config.vertical_gap;
                placed.insert(child.id.as_str());
                queue.push_back(child.id.as_str());
            }
        }

        for node in workflow.nodes() {
            if placed.contains(node.id.as_str()) {
                continue;
            }
            let level = levels.level_of(&node.id).unwrap_or(columns.len());
            let height = config.node_size(node).height;
            let y = bands.find_available_y(level, config.min_padding, height, config.vertical_gap);
            positions.insert(node.id.clone(), Position::new(column_x(level), y));
            bands.occupy(level, y, y + height);
        }

        positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::WorkflowBuilder;
    use crate::layout::{column_positions, recompute_layout};
    use crate::types::EventData;

    #[test]
    fn test_single_child_keeps_parent_row() {
        let wf = WorkflowBuilder::new("Line")
            .add_event("e1", EventData::default())
            .add_status("s1", "Done")
            .add_edge("start", "e1")
            .add_edge("e1", "s1")
            .build()
            .unwrap();

        let laid_out = recompute_layout(&wf);
        assert_eq!(laid_out.find_node("e1").unwrap().position.y, 200.0);
        assert_eq!(laid_out.find_node("s1").unwrap().position.y, 200.0);
    }

    #[test]
    fn test_children_cluster_around_parent_center() {
        let wf = WorkflowBuilder::new("Fan out")
            .add_event("e1", EventData::default())
            .add_status("s1", "Approved")
            .add_status("s2", "Rejected")
            .add_edge("start", "e1")
            .add_edge("e1", "s1")
            .add_edge("e1", "s2")
            .build()
            .unwrap();

        let laid_out = recompute_layout(&wf);
        // e1 is 100 high at y=200, so its center is 250.
        // Cluster: 120 + 80 + 120 = 320 high, top at 250 - 160 = 90.
        assert_eq!(laid_out.find_node("s1").unwrap().position.y, 90.0);
        assert_eq!(laid_out.find_node("s2").unwrap().position.y, 290.0);
    }

    #[test]
    fn test_second_parent_shifts_below_first_cluster() {
        let wf = WorkflowBuilder::new("Two parents")
            .add_event("e1", EventData::default())
            .add_event("e2", EventData::default())
            .add_status("s1", "One")
            .add_status("s2", "Two")
            .add_edge("start", "e1")
            .add_edge("start", "e2")
            .add_edge("e1", "s1")
            .add_edge("e2", "s2")
            .build()
            .unwrap();

        let config = LayoutConfig::default();
        let levels = Levels::compute(&wf);
        let columns = column_positions(&wf, &levels, &config);
        let positions = CompactLayout.place(&wf, &levels, &columns, &config);

        // start center 230, events cluster 280 high -> top 90
        assert_eq!(positions["e1"].y, 90.0);
        assert_eq!(positions["e2"].y, 270.0);
        assert_eq!(positions["s1"].y, 90.0);
        // s2 wants 270 but s1 occupies 90..210; 270 is free
        assert_eq!(positions["s2"].y, 270.0);
    }

    #[test]
    fn test_orphans_start_at_padding() {
        let wf = WorkflowBuilder::new("Orphans")
            .add_event("e1", EventData::default())
            .add_status("o1", "Loose")
            .add_status("o2", "Looser")
            .add_edge("start", "e1")
            .build()
            .unwrap();

        let laid_out = recompute_layout(&wf);
        let o1 = laid_out.find_node("o1").unwrap().position;
        let o2 = laid_out.find_node("o2").unwrap().position;
        assert_eq!(o1.y, 100.0);
        assert_eq!(o2.y, 100.0 + 120.0 + 80.0);
        assert_eq!(o1.x, o2.x);
    }
}
