//! Auto-layout engine
//!
//! Positions are a pure function of topology and node sizes: the graph is
//! leveled by directed BFS from Start, each level becomes a column, and a
//! `LayoutStrategy` decides the vertical placement inside the columns. The
//! incoming positions are ignored, so re-running a layout is a no-op.
//!
//! Two strategies are provided:
//! - `CompactLayout` (default): children sit next to their parent, clusters
//!   are centered on the parent and shifted down past occupied space
//! - `GridLayout`: each column is stacked evenly around the Start row

mod compact;
mod grid;
mod levels;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{dimensions, placement, spacing};
use crate::types::{NodeId, NodeType, Position, Size, Workflow, WorkflowNode};

pub use compact::CompactLayout;
pub use grid::GridLayout;
pub use levels::Levels;

/// Smallest downward step of a collision search
const MIN_SEARCH_STEP: f64 = 1.0;

/// Spacing, anchor and fallback sizes used by layout and node placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Gap between layout columns
    pub horizontal_gap: f64,
    /// Gap between vertically stacked nodes
    pub vertical_gap: f64,
    /// Preferred top of unreachable nodes
    pub min_padding: f64,
    /// Pinned position of the Start node
    pub start_anchor: Position,
    pub start_size: Size,
    pub status_size: Size,
    pub event_size: Size,
    /// Column width used when a column has nothing to measure
    pub unknown_size: Size,
    /// Distance of a new node from its source or from the rightmost node
    pub horizontal_offset: f64,
    /// Distance of a new node from an Event source
    pub event_horizontal_offset: f64,
    /// Vertical step between siblings created from one parent
    pub sibling_vertical_step: f64,
    /// Vertical jitter of palette drops
    pub drop_jitter: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let size = |(width, height): (f64, f64)| Size::new(width, height);
        Self {
            horizontal_gap: spacing::HORIZONTAL_GAP,
            vertical_gap: spacing::VERTICAL_GAP,
            min_padding: spacing::MIN_PADDING,
            start_anchor: spacing::START_ANCHOR.into(),
            start_size: size(dimensions::START),
            status_size: size(dimensions::STATUS),
            event_size: size(dimensions::EVENT),
            unknown_size: size(dimensions::UNKNOWN),
            horizontal_offset: placement::HORIZONTAL_OFFSET,
            event_horizontal_offset: placement::EVENT_HORIZONTAL_OFFSET,
            sibling_vertical_step: placement::SIBLING_VERTICAL_STEP,
            drop_jitter: placement::DROP_JITTER,
        }
    }
}

impl LayoutConfig {
    /// Fallback size of a node type
    pub fn fallback_size(&self, node_type: NodeType) -> Size {
        match node_type {
            NodeType::Start => self.start_size,
            NodeType::Status => self.status_size,
            NodeType::Event => self.event_size,
        }
    }

    /// Measured size of a node, or its type's fallback when unmeasured
    ///
    /// Measured sizes are capped at `dimensions::MAX_MEASURED`.
    pub fn node_size(&self, node: &WorkflowNode) -> Size {
        node.measured
            .and_then(|size| size.clamped(dimensions::MAX_MEASURED))
            .unwrap_or_else(|| self.fallback_size(node.node_type()))
    }
}

/// Selects one of the built-in strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    #[default]
    Compact,
    Grid,
}

impl LayoutKind {
    pub fn strategy(&self) -> &'static dyn LayoutStrategy {
        match self {
            Self::Compact => &CompactLayout,
            Self::Grid => &GridLayout,
        }
    }
}

impl std::str::FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "grid" => Ok(Self::Grid),
            other => Err(format!("unknown layout strategy '{}'", other)),
        }
    }
}

/// Vertical placement policy applied on top of the shared leveling
pub trait LayoutStrategy {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Compute a position for every node of the workflow
    ///
    /// `columns` holds the x coordinate of each level.
    fn place(
        &self,
        workflow: &Workflow,
        levels: &Levels,
        columns: &[f64],
        config: &LayoutConfig,
    ) -> HashMap<NodeId, Position>;
}

/// Recompute every node position with the default strategy and spacing
pub fn recompute_layout(workflow: &Workflow) -> Workflow {
    recompute_layout_with(workflow, &CompactLayout, &LayoutConfig::default())
}

/// Recompute every node position with the given strategy
///
/// Only positions change; the Start node always lands on the anchor.
pub fn recompute_layout_with(
    workflow: &Workflow,
    strategy: &dyn LayoutStrategy,
    config: &LayoutConfig,
) -> Workflow {
    let levels = Levels::compute(workflow);
    let columns = column_positions(workflow, &levels, config);
    let mut positions = strategy.place(workflow, &levels, &columns, config);
    positions.insert(workflow.start_node().id.clone(), config.start_anchor);

    log::debug!(
        "{} layout: {} nodes in {} columns",
        strategy.name(),
        workflow.node_count(),
        columns.len()
    );

    let mut laid_out = workflow.clone();
    for node in laid_out.nodes_mut() {
        if let Some(position) = positions.get(&node.id) {
            node.position = *position;
        }
    }
    laid_out
}

/// X coordinate of each level's column
///
/// Columns start at the anchor and advance by the widest node of the
/// previous column plus the horizontal gap.
pub fn column_positions(workflow: &Workflow, levels: &Levels, config: &LayoutConfig) -> Vec<f64> {
    let mut xs = Vec::with_capacity(levels.columns().len());
    let mut x = config.start_anchor.x;
    for column in levels.columns() {
        xs.push(x);
        let widest = column
            .iter()
            .filter_map(|id| workflow.find_node(id))
            .map(|node| config.node_size(node).width)
            .fold(None, |acc: Option<f64>, w| Some(acc.map_or(w, |a| a.max(w))))
            .unwrap_or(config.unknown_size.width);
        x += widest + config.horizontal_gap;
    }
    xs
}

/// Occupied vertical spans per column
#[derive(Debug, Default)]
pub(crate) struct ColumnBands {
    bands: HashMap<usize, Vec<(f64, f64)>>,
}

impl ColumnBands {
    pub(crate) fn occupy(&mut self, column: usize, top: f64, bottom: f64) {
        self.bands.entry(column).or_default().push((top, bottom));
    }

    /// Lowest top at or below `preferred` where a band of `height` fits
    ///
    /// Touching bands count as overlapping. Each pass moves strictly past at
    /// least one conflicting band; when `f64` can no longer advance the
    /// candidate the search stops where it is.
    pub(crate) fn find_available_y(
        &self,
        column: usize,
        preferred: f64,
        height: f64,
        gap: f64,
    ) -> f64 {
        let Some(bands) = self.bands.get(&column) else {
            return preferred;
        };
        let step = gap.max(MIN_SEARCH_STEP);
        let mut candidate = preferred;
        loop {
            let bottom = candidate + height;
            let conflict = bands
                .iter()
                .filter(|(top, end)| candidate <= *end && bottom >= *top)
                .map(|(_, end)| *end)
                .fold(None, |acc: Option<f64>, end| Some(acc.map_or(end, |a| a.max(end))));
            match conflict {
                Some(end) => {
                    let next = end + step;
                    if next <= candidate {
                        log::warn!("Column {} search stalled at y={}", column, candidate);
                        return candidate;
                    }
                    candidate = next;
                }
                None => return candidate,
            }
        }
    }
}

/// Shift a candidate position down until a node of `size` overlaps no existing node
///
/// A blocker's bottom always lies below the candidate, so every step advances.
pub fn avoid_collisions(
    workflow: &Workflow,
    config: &LayoutConfig,
    candidate: Position,
    size: Size,
) -> Position {
    let step = config.vertical_gap.max(MIN_SEARCH_STEP);
    let mut position = candidate;
    loop {
        let blocker = workflow
            .nodes()
            .filter(|node| {
                let other = config.node_size(node);
                position.x < node.position.x + other.width
                    && position.x + size.width > node.position.x
                    && position.y < node.position.y + other.height
                    && position.y + size.height > node.position.y
            })
            .map(|node| node.position.y + config.node_size(node).height)
            .fold(None, |acc: Option<f64>, end| Some(acc.map_or(end, |a| a.max(end))));
        match blocker {
            Some(bottom) => {
                log::debug!("Placement collides at y={}, moving below {}", position.y, bottom);
                position.y = bottom + step;
            }
            None => return position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::WorkflowBuilder;
    use crate::types::EventData;

    fn branching() -> Workflow {
        WorkflowBuilder::new("Branching")
            .add_event("e1", EventData::default())
            .add_status("s1", "Approved")
            .add_status("s2", "Rejected")
            .add_status("s3", "Escalated")
            .add_event("e2", EventData::default())
            .add_event("e3", EventData::default())
            .add_status("orphan", "Orphan")
            .add_edge("start", "e1")
            .add_edge("e1", "s1")
            .add_edge("e1", "s2")
            .add_edge("e1", "s3")
            .add_edge("s1", "e2")
            .add_edge("s2", "e3")
            .build()
            .unwrap()
    }

    fn assert_no_overlap(workflow: &Workflow, config: &LayoutConfig) {
        let levels = Levels::compute(workflow);
        for column in levels.columns() {
            let nodes: Vec<_> = column
                .iter()
                .map(|id| workflow.find_node(id).unwrap())
                .collect();
            for (i, a) in nodes.iter().enumerate() {
                for b in &nodes[i + 1..] {
                    let (sa, sb) = (config.node_size(a), config.node_size(b));
                    let overlap = a.position.y < b.position.y + sb.height
                        && b.position.y < a.position.y + sa.height;
                    assert!(!overlap, "{} overlaps {}", a.id, b.id);
                }
            }
        }
    }

    #[test]
    fn test_layout_is_idempotent() {
        let config = LayoutConfig::default();
        for kind in [LayoutKind::Compact, LayoutKind::Grid] {
            let once = recompute_layout_with(&branching(), kind.strategy(), &config);
            let twice = recompute_layout_with(&once, kind.strategy(), &config);
            assert_eq!(once, twice, "{:?} layout is not idempotent", kind);
        }
    }

    #[test]
    fn test_layout_has_no_overlap() {
        let config = LayoutConfig::default();
        for kind in [LayoutKind::Compact, LayoutKind::Grid] {
            let laid_out = recompute_layout_with(&branching(), kind.strategy(), &config);
            assert_no_overlap(&laid_out, &config);
            assert_eq!(laid_out.start_node().position, Position::new(150.0, 200.0));
        }
    }

    #[test]
    fn test_columns_never_overlap() {
        let config = LayoutConfig::default();
        let wf = recompute_layout(&branching());
        let levels = Levels::compute(&wf);
        let xs = column_positions(&wf, &levels, &config);
        assert_eq!(xs[0], 150.0);
        // Start is 120 wide, Events are 200 wide
        assert_eq!(xs[1], 150.0 + 120.0 + 160.0);
        assert_eq!(xs[2], xs[1] + 200.0 + 160.0);
        for node in wf.nodes() {
            let level = levels.level_of(&node.id).unwrap();
            assert_eq!(node.position.x, xs[level]);
        }
    }

    #[test]
    fn test_measured_size_wins() {
        let config = LayoutConfig::default();
        let wf = WorkflowBuilder::new("Sizes")
            .add_event("wide", EventData::default())
            .measured(400.0, 90.0)
            .add_event("zero", EventData::default())
            .measured(0.0, 0.0)
            .build()
            .unwrap();
        assert_eq!(config.node_size(wf.find_node("wide").unwrap()).width, 400.0);
        assert_eq!(config.node_size(wf.find_node("zero").unwrap()), config.event_size);
    }

    #[test]
    fn test_find_available_y_terminates_with_zero_gap() {
        let mut bands = ColumnBands::default();
        bands.occupy(1, 0.0, 100.0);
        bands.occupy(1, 100.0, 200.0);
        let y = bands.find_available_y(1, 0.0, 50.0, 0.0);
        assert!(y > 200.0);
        assert_eq!(bands.find_available_y(2, 10.0, 50.0, 80.0), 10.0);
    }

    #[test]
    fn test_find_available_y_stops_when_f64_cannot_advance() {
        let mut bands = ColumnBands::default();
        bands.occupy(0, 0.0, 1e20);
        let y = bands.find_available_y(0, 10.0, 120.0, 80.0);
        assert_eq!(y, 1e20);
    }

    #[test]
    fn test_oversized_measurements_are_capped() {
        let config = LayoutConfig::default();
        let wf = WorkflowBuilder::new("Huge")
            .add_event("e1", EventData::default())
            .add_status("tall", "Tall")
            .measured(180.0, 1e20)
            .add_status("wide", "Wide")
            .measured(f64::INFINITY, 120.0)
            .add_status("nan", "Nan")
            .measured(f64::NAN, 120.0)
            .add_status("sibling", "Sibling")
            .add_edge("start", "e1")
            .add_edge("e1", "tall")
            .add_edge("e1", "wide")
            .add_edge("e1", "nan")
            .add_edge("e1", "sibling")
            .build()
            .unwrap();

        let cap = dimensions::MAX_MEASURED;
        assert_eq!(config.node_size(wf.find_node("tall").unwrap()), Size::new(180.0, cap));
        assert_eq!(config.node_size(wf.find_node("wide").unwrap()), Size::new(cap, 120.0));
        assert_eq!(config.node_size(wf.find_node("nan").unwrap()), config.status_size);

        for kind in [LayoutKind::Compact, LayoutKind::Grid] {
            let laid_out = recompute_layout_with(&wf, kind.strategy(), &config);
            assert_no_overlap(&laid_out, &config);
        }
    }

    #[test]
    fn test_avoid_collisions_moves_down() {
        let config = LayoutConfig::default();
        let wf = WorkflowBuilder::new("Crowded")
            .add_status("s1", "Open")
            .at(400.0, 200.0)
            .build()
            .unwrap();
        let placed =
            avoid_collisions(&wf, &config, Position::new(420.0, 220.0), config.status_size);
        assert_eq!(placed, Position::new(420.0, 200.0 + 120.0 + 80.0));

        let clear = avoid_collisions(&wf, &config, Position::new(900.0, 220.0), config.status_size);
        assert_eq!(clear, Position::new(900.0, 220.0));
    }

    #[test]
    fn test_layout_kind_parse() {
        assert_eq!("grid".parse::<LayoutKind>(), Ok(LayoutKind::Grid));
        assert_eq!("Compact".parse::<LayoutKind>(), Ok(LayoutKind::Compact));
        assert!("radial".parse::<LayoutKind>().is_err());
    }
}
