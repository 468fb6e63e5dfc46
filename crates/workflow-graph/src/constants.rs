//! Engine-wide constants
//!
//! Single source of truth for default labels, placement offsets and layout
//! spacing. `LayoutConfig::default()` reads its values from here.

/// Default labels and text shown for freshly created nodes
pub mod labels {
    /// Label of the Start node
    pub const START: &str = "Start";
    /// Base label for new Status nodes; duplicates become "Stage1", "Stage2", ...
    pub const STATUS_BASE: &str = "Stage";
    /// Guidance text rendered while an Event node has no label yet
    pub const EVENT_PLACEHOLDER: &str = "Add business event or subworkflow using the action panel.";
    /// Fallback display name for a Status node without label or state name
    pub const UNNAMED_STATUS: &str = "Unnamed State";
    /// Fallback display name for an Event node without label or event name
    pub const UNNAMED_EVENT: &str = "Unnamed Transition Block";
}

/// Workflow-level defaults
pub mod workflow {
    /// Name given to a workflow created without one
    pub const DEFAULT_NAME: &str = "Untitled Workflow";
    /// Maximum length of the workflow description, in characters
    pub const MAX_DESCRIPTION_CHARS: usize = 240;
}

/// Layout spacing (canvas units)
pub mod spacing {
    /// Gap between layout columns
    pub const HORIZONTAL_GAP: f64 = 160.0;
    /// Gap between vertically stacked nodes in one column
    pub const VERTICAL_GAP: f64 = 80.0;
    /// Padding from the top-left edge of the canvas
    pub const MIN_PADDING: f64 = 100.0;
    /// Pinned position of the Start node
    pub const START_ANCHOR: (f64, f64) = (150.0, 200.0);
}

/// Offsets used when placing a single new node without a full layout pass
pub mod placement {
    /// Horizontal distance from the source/rightmost node
    pub const HORIZONTAL_OFFSET: f64 = 250.0;
    /// Horizontal distance when the source is an Event node (they render wider)
    pub const EVENT_HORIZONTAL_OFFSET: f64 = 300.0;
    /// Vertical step between siblings created from the same parent
    pub const SIBLING_VERTICAL_STEP: f64 = 150.0;
    /// Vertical jitter applied to palette drops
    pub const DROP_JITTER: f64 = 40.0;
}

/// Fallback node dimensions (width, height) when the canvas has not measured a node
pub mod dimensions {
    pub const START: (f64, f64) = (120.0, 60.0);
    pub const STATUS: (f64, f64) = (180.0, 120.0);
    pub const EVENT: (f64, f64) = (200.0, 100.0);
    /// Footprint assumed for a column with nothing to measure
    pub const UNKNOWN: (f64, f64) = (150.0, 80.0);
    /// Largest measured width or height taken at face value
    pub const MAX_MEASURED: f64 = 10_000.0;
}

/// Default visual style stamped on engine-created edges
pub mod edge_style {
    pub const STROKE: &str = "#94a3b8";
    pub const STROKE_WIDTH: u32 = 2;
    pub const MARKER: &str = "arrowclosed";
}

/// Focus viewport bounds
pub mod viewport {
    /// Screen padding around the focused nodes
    pub const FOCUS_PADDING: f64 = 50.0;
    pub const MIN_ZOOM: f64 = 0.5;
    pub const MAX_ZOOM: f64 = 1.5;
}
