//! Save and publish payloads
//!
//! A workflow crosses the process boundary as a `WorkflowPayload`:
//!
//! ```text
//! { "name", "description",
//!   "nodes": [{ "id", "type", "position": {x, y}, "data": {...} }],
//!   "edges": [{ "id", "source", "target", "style"? }],
//!   "status"?: "published", "autoPositioning"?: bool }
//! ```
//!
//! Loading goes through the same invariant checks as building, so a payload
//! with two Start nodes or a dangling edge is refused instead of producing a
//! broken workflow.

use serde::{Deserialize, Serialize};

use crate::constants::dimensions;
use crate::error::Result;
use crate::types::{Workflow, WorkflowEdge, WorkflowNode};

/// Status stamped on published payloads
pub const PUBLISHED_STATUS: &str = "published";

/// Why a payload is being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveIntent {
    /// Draft save; records the auto-positioning flag
    #[default]
    Draft,
    /// Publish; stamps `status: "published"`
    Publish,
}

/// Serialized form of a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowPayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub edges: Vec<WorkflowEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_positioning: Option<bool>,
}

impl WorkflowPayload {
    /// Whether the payload was produced by a publish
    pub fn is_published(&self) -> bool {
        self.status.as_deref() == Some(PUBLISHED_STATUS)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Produce the payload for a save or publish
pub fn serialize(workflow: &Workflow, intent: SaveIntent) -> WorkflowPayload {
    let (status, auto_positioning) = match intent {
        SaveIntent::Draft => (None, Some(workflow.auto_positioning_enabled)),
        SaveIntent::Publish => (Some(PUBLISHED_STATUS.to_string()), None),
    };
    WorkflowPayload {
        name: workflow.name.clone(),
        description: workflow.description().to_string(),
        nodes: workflow.nodes().cloned().collect(),
        edges: workflow.edges().to_vec(),
        status,
        auto_positioning,
    }
}

/// Rebuild a workflow from a payload, checking every structural invariant
///
/// The ghost-edge flag on Start is re-derived rather than trusted. A payload
/// without an auto-positioning flag loads with auto-positioning on. Measured
/// sizes that are not positive are dropped and oversized ones are capped at
/// `dimensions::MAX_MEASURED`.
pub fn deserialize(payload: WorkflowPayload) -> Result<Workflow> {
    let nodes = payload
        .nodes
        .into_iter()
        .map(|mut node| {
            node.measured = node
                .measured
                .and_then(|size| size.clamped(dimensions::MAX_MEASURED));
            node
        })
        .collect();

    Workflow::from_parts(
        payload.name,
        payload.description,
        nodes,
        payload.edges,
        payload.auto_positioning.unwrap_or(true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::WorkflowBuilder;
    use crate::error::GraphError;
    use crate::types::{EventData, NodeData, NodeType, Position, Size};

    fn sample() -> Workflow {
        WorkflowBuilder::new("Claims")
            .description("Handles insurance claims")
            .auto_positioning(false)
            .add_event(
                "event-1",
                EventData {
                    label: "Submit".to_string(),
                    business_event: Some("CLAIM_SUBMITTED".to_string()),
                    automatic_trigger: true,
                    created_entities: vec!["Claim".to_string()],
                    ..EventData::default()
                },
            )
            .at(400.0, 200.0)
            .add_status("status-1", "Submitted")
            .at(700.0, 200.0)
            .add_edge("start", "event-1")
            .add_edge("event-1", "status-1")
            .build()
            .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let wf = sample();
        let json = serialize(&wf, SaveIntent::Draft).to_json_pretty().unwrap();
        let restored = deserialize(WorkflowPayload::from_json(&json).unwrap()).unwrap();
        assert_eq!(restored, wf);
        assert_eq!(restored.nodes().count(), 3);
        assert_eq!(restored.edges(), wf.edges());
        assert_eq!(restored.description(), "Handles insurance claims");
        assert!(!restored.auto_positioning_enabled);
    }

    #[test]
    fn test_round_trip_keeps_fractional_geometry_exact() {
        let wf = WorkflowBuilder::new("Fractions")
            .auto_positioning(false)
            .add_status("s1", "Open")
            .at(10502.637857142856, 11552.901642857145)
            .measured(183.33333333333334, 121.7)
            .add_status("s2", "Closed")
            .at(0.1 + 0.2, -7013.123456789012)
            .build()
            .unwrap();

        let json = serialize(&wf, SaveIntent::Draft).to_json_pretty().unwrap();
        let restored = deserialize(WorkflowPayload::from_json(&json).unwrap()).unwrap();

        for id in ["s1", "s2"] {
            let before = wf.find_node(id).unwrap();
            let after = restored.find_node(id).unwrap();
            assert_eq!(after.position.x.to_bits(), before.position.x.to_bits());
            assert_eq!(after.position.y.to_bits(), before.position.y.to_bits());
            assert_eq!(after.measured, before.measured);
        }
        assert_eq!(
            restored.find_node("s1").unwrap().position,
            Position::new(10502.637857142856, 11552.901642857145)
        );
    }

    #[test]
    fn test_load_caps_measured_sizes() {
        let mut payload = serialize(&sample(), SaveIntent::Draft);
        payload.nodes[1].measured = Some(Size::new(220.0, 1e20));
        payload.nodes[2].measured = Some(Size::new(-5.0, 120.0));

        let wf = deserialize(payload).unwrap();
        assert_eq!(
            wf.find_node("event-1").unwrap().measured,
            Some(Size::new(220.0, dimensions::MAX_MEASURED))
        );
        assert_eq!(wf.find_node("status-1").unwrap().measured, None);
    }

    #[test]
    fn test_publish_stamps_status() {
        let payload = serialize(&sample(), SaveIntent::Publish);
        assert!(payload.is_published());
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["status"], "published");
        assert!(json.get("autoPositioning").is_none());

        let draft = serde_json::to_value(serialize(&sample(), SaveIntent::Draft)).unwrap();
        assert!(draft.get("status").is_none());
        assert_eq!(draft["autoPositioning"], false);
    }

    #[test]
    fn test_payload_shape() {
        let json = serde_json::to_value(serialize(&sample(), SaveIntent::Draft)).unwrap();
        let event = &json["nodes"][1];
        assert_eq!(event["type"], "event");
        assert_eq!(event["data"]["businessEvent"], "CLAIM_SUBMITTED");
        assert_eq!(event["data"]["createdEntities"][0], "Claim");
        assert_eq!(json["nodes"][0]["data"]["showGhostEdge"], false);
        assert_eq!(json["edges"][0]["source"], "start");
        assert_eq!(json["edges"][0]["style"]["stroke"], "#94a3b8");
    }

    #[test]
    fn test_load_minimal_payload() {
        let json = r#"{
            "name": "Imported",
            "nodes": [
                {"id": "s", "type": "start", "position": {"x": 0, "y": 0}, "data": {"label": "Start", "showGhostEdge": false}},
                {"id": "e", "type": "event", "position": {"x": 250, "y": 0}, "data": {"label": ""}}
            ]
        }"#;
        let wf = deserialize(WorkflowPayload::from_json(json).unwrap()).unwrap();
        assert_eq!(wf.find_node("e").unwrap().node_type(), NodeType::Event);
        assert!(wf.auto_positioning_enabled);
        match &wf.start_node().data {
            NodeData::Start(data) => assert!(data.show_ghost_edge),
            other => panic!("Expected Start data, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_broken_payload() {
        let mut payload = serialize(&sample(), SaveIntent::Draft);
        payload.edges.push(WorkflowEdge::new("status-1", "nowhere"));
        assert!(matches!(
            deserialize(payload),
            Err(GraphError::DanglingEdge { .. })
        ));

        let mut payload = serialize(&sample(), SaveIntent::Draft);
        payload.nodes.retain(|n| !n.is_start());
        payload.edges.clear();
        assert_eq!(deserialize(payload).unwrap_err(), GraphError::StartNodeCount(0));
    }
}
