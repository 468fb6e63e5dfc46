//! Editor session
//!
//! An `EditorSession` owns one workflow together with its interaction state
//! and applies `EditorCommand`s to them. Graph changes go through the pure
//! operations in `workflow_graph`; the session swaps in the returned
//! workflow, re-runs layout when auto-positioning is on, prunes stale
//! selection and reports what happened to its `EventSink`.

use std::path::Path;
use std::sync::Arc;

use workflow_graph::operations;
use workflow_graph::{
    deserialize, recompute_layout_with, serialize, validate_workflow, ConnectOutcome,
    ConnectionRejection, EdgeId, HandleState, InteractionState, NodeDataPatch, NodeId, NodeType,
    Position, SaveIntent, ValidationFeedback, ValidationMode, ValidationResult, Workflow,
    WorkflowPayload,
};

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::events::{EditorCommand, EditorEvent, EventSink};

/// What a save or publish produced
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Validation passed; the payload is ready to be stored
    Saved(WorkflowPayload),
    /// Validation found errors; nothing was produced
    Blocked(ValidationResult),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

/// Result of dispatching a single command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Done,
    NodeAdded(NodeId),
    Connected(EdgeId),
    Rejected(ConnectionRejection),
    /// Whether a node ended up selected
    Selected(bool),
    Validated(ValidationResult),
    Save(SaveOutcome),
}

/// One open workflow and everything the editor knows about it
pub struct EditorSession {
    workflow: Workflow,
    interaction: InteractionState,
    feedback: Option<ValidationFeedback>,
    config: EditorConfig,
    event_sink: Arc<dyn EventSink>,
}

impl EditorSession {
    /// Start a session on a fresh single-Start workflow
    pub fn new(config: EditorConfig, event_sink: Arc<dyn EventSink>) -> Self {
        let mut workflow = Workflow::new(config.default_workflow_name.clone());
        workflow.auto_positioning_enabled = config.auto_positioning;
        Self::open(workflow, config, event_sink)
    }

    /// Start a session on an existing workflow
    ///
    /// Positions are kept as loaded; layout only runs after the first change.
    pub fn open(workflow: Workflow, config: EditorConfig, event_sink: Arc<dyn EventSink>) -> Self {
        Self {
            workflow,
            interaction: InteractionState::new(),
            feedback: None,
            config,
            event_sink,
        }
    }

    /// Start a fresh session with settings read from a JSON config file
    pub fn from_config_file(path: &Path, event_sink: Arc<dyn EventSink>) -> Result<Self> {
        let config = EditorConfig::load(path)?;
        Ok(Self::new(config, event_sink))
    }

    /// Start a session on a workflow read from a saved payload's JSON
    pub fn open_json(
        json: &str,
        config: EditorConfig,
        event_sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let payload = WorkflowPayload::from_json(json)?;
        let workflow = deserialize(payload)?;
        Ok(Self::open(workflow, config, event_sink))
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Issues from the most recent validation, save or publish
    pub fn feedback(&self) -> Option<&ValidationFeedback> {
        self.feedback.as_ref()
    }

    /// Connector state of a node given the current connection drag
    pub fn handle_state(&self, node_id: &str) -> HandleState {
        self.interaction.handle_state(&self.workflow, node_id)
    }

    /// Apply one command
    pub fn dispatch(&mut self, command: EditorCommand) -> Result<CommandOutcome> {
        let outcome = match command {
            EditorCommand::AddNode {
                node_type,
                position,
            } => CommandOutcome::NodeAdded(self.add_node(node_type, position)?),
            EditorCommand::AddConnectedNode {
                source_id,
                node_type,
            } => CommandOutcome::NodeAdded(self.add_connected_node(&source_id, node_type)?),
            EditorCommand::DeleteSelected => {
                self.delete_selected()?;
                CommandOutcome::Done
            }
            EditorCommand::DeleteNode { node_id } => {
                self.delete_node(&node_id)?;
                CommandOutcome::Done
            }
            EditorCommand::DeleteEdge { edge_id } => {
                self.delete_edge(&edge_id)?;
                CommandOutcome::Done
            }
            EditorCommand::Connect { source, target } => match self.connect(&source, &target)? {
                Ok(edge_id) => CommandOutcome::Connected(edge_id),
                Err(reason) => CommandOutcome::Rejected(reason),
            },
            EditorCommand::UpdateSelected { patch } => {
                self.update_selected(&patch)?;
                CommandOutcome::Done
            }
            EditorCommand::SelectNode { node_id } => {
                CommandOutcome::Selected(self.select_node(&node_id)?)
            }
            EditorCommand::SelectEdge { edge_id } => {
                self.select_edge(&edge_id)?;
                CommandOutcome::Done
            }
            EditorCommand::ClearSelection => {
                self.clear_selection()?;
                CommandOutcome::Done
            }
            EditorCommand::BeginConnection { source_id } => {
                self.begin_connection(&source_id)?;
                CommandOutcome::Done
            }
            EditorCommand::EndConnection => {
                self.end_connection()?;
                CommandOutcome::Done
            }
            EditorCommand::SetName { name } => {
                self.set_name(name)?;
                CommandOutcome::Done
            }
            EditorCommand::SetDescription { description } => {
                self.set_description(description)?;
                CommandOutcome::Done
            }
            EditorCommand::SetAutoPositioning { enabled } => {
                self.set_auto_positioning(enabled)?;
                CommandOutcome::Done
            }
            EditorCommand::RecomputeLayout => {
                self.recompute_layout()?;
                CommandOutcome::Done
            }
            EditorCommand::Validate { mode } => CommandOutcome::Validated(self.validate(mode)?),
            EditorCommand::SaveDraft => CommandOutcome::Save(self.save_draft()?),
            EditorCommand::Publish => CommandOutcome::Save(self.publish()?),
        };
        Ok(outcome)
    }

    /// Drop a node from the palette and select it
    pub fn add_node(&mut self, node_type: NodeType, position: Option<Position>) -> Result<NodeId> {
        let added = operations::add_node_with_config(
            &self.workflow,
            node_type,
            position,
            &self.config.layout,
        )?;
        self.commit(added.workflow);
        self.emit(EditorEvent::NodeAdded {
            node_id: added.node_id.clone(),
            node_type,
            edge_id: added.edge_id,
        })?;
        self.select_node(&added.node_id)?;
        Ok(added.node_id)
    }

    /// Add a node through the "+" connector of `source_id`, select it and
    /// ask the host to focus on it
    pub fn add_connected_node(&mut self, source_id: &str, node_type: NodeType) -> Result<NodeId> {
        let was_auto = self.workflow.auto_positioning_enabled;
        let added = operations::add_connected_node_with_config(
            &self.workflow,
            source_id,
            node_type,
            &self.config.layout,
        )?;
        self.commit(added.workflow);

        if !was_auto {
            self.emit(EditorEvent::AutoPositioningChanged { enabled: true })?;
        }
        self.emit(EditorEvent::NodeAdded {
            node_id: added.node_id.clone(),
            node_type,
            edge_id: added.edge_id,
        })?;
        self.select_node(&added.node_id)?;
        self.emit(EditorEvent::FocusRequested {
            node_id: added.node_id.clone(),
        })?;
        Ok(added.node_id)
    }

    /// Delete the selected node
    pub fn delete_selected(&mut self) -> Result<()> {
        let node_id = self
            .interaction
            .selected_node()
            .map(str::to_string)
            .ok_or(EditorError::NothingSelected)?;
        self.delete_node(&node_id)
    }

    pub fn delete_node(&mut self, node_id: &str) -> Result<()> {
        let reset = self.workflow.steps().len() == 1;
        let next = operations::delete_node(&self.workflow, node_id)?;
        self.commit_and_report_selection(next, |session| {
            session.emit(EditorEvent::NodeDeleted {
                node_id: node_id.to_string(),
                reset,
            })
        })
    }

    pub fn delete_edge(&mut self, edge_id: &str) -> Result<()> {
        let next = operations::delete_edge(&self.workflow, edge_id)?;
        self.commit_and_report_selection(next, |session| {
            session.emit(EditorEvent::EdgeDeleted {
                edge_id: edge_id.to_string(),
            })
        })
    }

    /// Finish a user-drawn connection
    ///
    /// Any connection drag in progress ends either way. The inner result is
    /// the new edge or the reason no edge was drawn.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
    ) -> Result<std::result::Result<EdgeId, ConnectionRejection>> {
        let outcome = operations::connect(&self.workflow, source, target);
        self.end_connection()?;
        let outcome = outcome?;

        match outcome {
            ConnectOutcome::Connected { workflow, edge_id } => {
                self.commit(workflow);
                self.emit(EditorEvent::EdgeAdded {
                    edge_id: edge_id.clone(),
                    source: source.to_string(),
                    target: target.to_string(),
                })?;
                Ok(Ok(edge_id))
            }
            ConnectOutcome::Rejected(reason) => {
                self.emit(EditorEvent::ConnectionRejected {
                    source: source.to_string(),
                    target: target.to_string(),
                    reason: reason.clone(),
                })?;
                Ok(Err(reason))
            }
        }
    }

    /// Apply a side-panel edit to the selected node
    pub fn update_selected(&mut self, patch: &NodeDataPatch) -> Result<()> {
        let node_id = self
            .interaction
            .selected_node()
            .map(str::to_string)
            .ok_or(EditorError::NothingSelected)?;
        self.update_node(&node_id, patch)
    }

    pub fn update_node(&mut self, node_id: &str, patch: &NodeDataPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let next = operations::update_node_data(&self.workflow, node_id, patch)?;
        self.commit(next);
        self.emit(EditorEvent::NodeUpdated {
            node_id: node_id.to_string(),
        })?;
        Ok(())
    }

    /// Select a node; returns `false` when the node cannot be selected
    pub fn select_node(&mut self, node_id: &str) -> Result<bool> {
        let selected = self.interaction.select_node(&self.workflow, node_id)?;
        self.emit_selection()?;
        Ok(selected)
    }

    pub fn select_edge(&mut self, edge_id: &str) -> Result<()> {
        self.interaction.select_edge(&self.workflow, edge_id)?;
        self.emit_selection()
    }

    pub fn clear_selection(&mut self) -> Result<()> {
        self.interaction.clear_selection();
        self.emit_selection()
    }

    pub fn begin_connection(&mut self, source_id: &str) -> Result<()> {
        self.interaction.begin_connection(&self.workflow, source_id)?;
        self.emit(EditorEvent::ConnectionDragChanged {
            source: Some(source_id.to_string()),
        })?;
        Ok(())
    }

    /// End the connection drag; quiet when none is in progress
    pub fn end_connection(&mut self) -> Result<()> {
        if self.interaction.connection_source().is_none() {
            return Ok(());
        }
        self.interaction.end_connection();
        self.emit(EditorEvent::ConnectionDragChanged { source: None })?;
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.workflow.name = name.into();
        self.emit_metadata()
    }

    /// Set the description, truncated to the length cap
    pub fn set_description(&mut self, description: impl Into<String>) -> Result<()> {
        self.workflow.set_description(description);
        self.emit_metadata()
    }

    /// Toggle auto-positioning; turning it on lays the graph out immediately
    pub fn set_auto_positioning(&mut self, enabled: bool) -> Result<()> {
        if self.workflow.auto_positioning_enabled == enabled {
            return Ok(());
        }
        let mut next = self.workflow.clone();
        next.auto_positioning_enabled = enabled;
        self.commit(next);
        self.emit(EditorEvent::AutoPositioningChanged { enabled })?;
        if enabled {
            self.emit(EditorEvent::LayoutApplied {
                strategy: self.config.layout_strategy,
            })?;
        }
        Ok(())
    }

    /// Lay the graph out now, whether or not auto-positioning is on
    pub fn recompute_layout(&mut self) -> Result<()> {
        self.workflow = self.laid_out(&self.workflow);
        self.emit(EditorEvent::LayoutApplied {
            strategy: self.config.layout_strategy,
        })?;
        Ok(())
    }

    /// Validate the workflow and keep the grouped issues for navigation
    pub fn validate(&mut self, mode: ValidationMode) -> Result<ValidationResult> {
        let result = validate_workflow(&self.workflow, mode);
        self.feedback = Some(ValidationFeedback::new(&result));
        self.emit(EditorEvent::Validated {
            mode,
            result: result.clone(),
        })?;
        Ok(result)
    }

    /// Validate in save mode and produce a draft payload
    pub fn save_draft(&mut self) -> Result<SaveOutcome> {
        self.save(SaveIntent::Draft)
    }

    /// Validate in publish mode and produce a published payload
    pub fn publish(&mut self) -> Result<SaveOutcome> {
        self.save(SaveIntent::Publish)
    }

    fn save(&mut self, intent: SaveIntent) -> Result<SaveOutcome> {
        let mode = match intent {
            SaveIntent::Draft => ValidationMode::Save,
            SaveIntent::Publish => ValidationMode::Publish,
        };
        let result = validate_workflow(&self.workflow, mode);
        self.feedback = Some(ValidationFeedback::new(&result));

        if !result.is_valid {
            log::warn!(
                "{:?} of '{}' blocked by {} validation errors",
                intent,
                self.workflow.name,
                result.errors.len()
            );
            self.emit(EditorEvent::SaveBlocked {
                intent,
                result: result.clone(),
            })?;
            return Ok(SaveOutcome::Blocked(result));
        }

        let payload = serialize(&self.workflow, intent);
        log::info!(
            "{:?} of '{}' ready: {} nodes, {} edges",
            intent,
            self.workflow.name,
            payload.nodes.len(),
            payload.edges.len()
        );
        self.emit(EditorEvent::Saved {
            intent,
            payload: payload.clone(),
        })?;
        Ok(SaveOutcome::Saved(payload))
    }

    fn laid_out(&self, workflow: &Workflow) -> Workflow {
        recompute_layout_with(
            workflow,
            self.config.layout_strategy.strategy(),
            &self.config.layout,
        )
    }

    /// Install a mutated workflow
    fn commit(&mut self, next: Workflow) {
        self.workflow = if next.auto_positioning_enabled {
            self.laid_out(&next)
        } else {
            next
        };
        self.interaction.retain_existing(&self.workflow);
    }

    /// Commit, report the change, then report the selection if pruning changed it
    fn commit_and_report_selection(
        &mut self,
        next: Workflow,
        report: impl FnOnce(&Self) -> Result<()>,
    ) -> Result<()> {
        let before = self.interaction.clone();
        self.commit(next);
        report(&*self)?;
        if self.interaction.selected_node() != before.selected_node()
            || self.interaction.highlight() != before.highlight()
        {
            self.emit_selection()?;
        }
        if before.connection_source().is_some() && self.interaction.connection_source().is_none() {
            self.emit(EditorEvent::ConnectionDragChanged { source: None })?;
        }
        Ok(())
    }

    fn emit_selection(&self) -> Result<()> {
        self.emit(EditorEvent::SelectionChanged {
            selected_node: self.interaction.selected_node().map(str::to_string),
            highlight: self.interaction.highlight().clone(),
        })
    }

    fn emit_metadata(&self) -> Result<()> {
        self.emit(EditorEvent::MetadataChanged {
            name: self.workflow.name.clone(),
            description: self.workflow.description().to_string(),
        })
    }

    fn emit(&self, event: EditorEvent) -> Result<()> {
        self.event_sink.send(event)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NullEventSink, VecEventSink};
    use workflow_graph::{
        EventData, GraphError, LayoutKind, ValidationErrorType, WorkflowBuilder, START_NODE_ID,
    };

    fn session() -> (EditorSession, Arc<VecEventSink>) {
        let sink = Arc::new(VecEventSink::new());
        (EditorSession::new(EditorConfig::default(), sink.clone()), sink)
    }

    fn complete_event() -> EventData {
        EventData {
            label: "Place Order".to_string(),
            business_event: Some("ORDER_PLACED".to_string()),
            business_event_name: Some("Place Order".to_string()),
            condition: Some("total > 0".to_string()),
            description: None,
            automatic_trigger: true,
            external_trigger: false,
            focal_entity: Some("Order".to_string()),
            created_entities: vec!["Invoice".to_string()],
            modified_entities: vec!["Order".to_string()],
        }
    }

    fn order_flow() -> Workflow {
        WorkflowBuilder::new("Order Flow")
            .add_event("e1", complete_event())
            .add_status("s1", "Placed")
            .add_edge("start", "e1")
            .add_edge("e1", "s1")
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_session_uses_config() {
        let sink = Arc::new(VecEventSink::new());
        let config = EditorConfig {
            default_workflow_name: "Claims".to_string(),
            auto_positioning: false,
            ..EditorConfig::default()
        };
        let session = EditorSession::new(config, sink);
        assert_eq!(session.workflow().name, "Claims");
        assert!(!session.workflow().auto_positioning_enabled);
        assert!(session.workflow().is_empty());
        assert!(session.feedback().is_none());
    }

    #[test]
    fn test_add_connected_node_selects_and_focuses() {
        let (mut session, sink) = session();
        let node_id = session
            .add_connected_node(START_NODE_ID, NodeType::Event)
            .unwrap();

        assert_eq!(session.interaction().selected_node(), Some(node_id.as_str()));
        assert_eq!(session.workflow().edges().len(), 1);

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            &events[0],
            EditorEvent::NodeAdded { node_type: NodeType::Event, edge_id: Some(_), .. }
        ));
        assert!(matches!(
            &events[1],
            EditorEvent::SelectionChanged { selected_node: Some(id), .. } if *id == node_id
        ));
        assert_eq!(events[2], EditorEvent::FocusRequested { node_id });
    }

    #[test]
    fn test_connected_node_turns_auto_positioning_on() {
        let sink = Arc::new(VecEventSink::new());
        let mut workflow = order_flow();
        workflow.auto_positioning_enabled = false;
        let mut session = EditorSession::open(workflow, EditorConfig::default(), sink.clone());

        session.add_connected_node("s1", NodeType::Event).unwrap();
        assert!(session.workflow().auto_positioning_enabled);
        assert_eq!(
            sink.events()[0],
            EditorEvent::AutoPositioningChanged { enabled: true }
        );
    }

    #[test]
    fn test_auto_layout_runs_after_mutation() {
        let (mut session, _sink) = session();
        let event_id = session
            .add_connected_node(START_NODE_ID, NodeType::Event)
            .unwrap();
        let status_id = session.add_connected_node(&event_id, NodeType::Status).unwrap();

        let workflow = session.workflow();
        let start = workflow.start_node().position;
        let event = workflow.find_node(&event_id).unwrap().position;
        let status = workflow.find_node(&status_id).unwrap().position;
        assert_eq!(start, Position::new(150.0, 200.0));
        assert!(event.x > start.x);
        assert!(status.x > event.x);
    }

    #[test]
    fn test_invalid_connected_type_is_an_error() {
        let (mut session, sink) = session();
        let err = session
            .add_connected_node(START_NODE_ID, NodeType::Status)
            .unwrap_err();
        assert!(matches!(
            err,
            EditorError::Graph(GraphError::InvalidConnectedNodeType { .. })
        ));
        assert!(session.workflow().is_empty());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_delete_selected() {
        let (mut session, sink) = session();
        assert!(matches!(
            session.delete_selected(),
            Err(EditorError::NothingSelected)
        ));

        let node_id = session
            .add_connected_node(START_NODE_ID, NodeType::Event)
            .unwrap();
        sink.clear();
        session.delete_selected().unwrap();

        assert!(session.workflow().is_empty());
        assert_eq!(session.interaction().selected_node(), None);
        let events = sink.events();
        assert_eq!(
            events[0],
            EditorEvent::NodeDeleted {
                node_id,
                reset: true
            }
        );
        assert!(matches!(
            &events[1],
            EditorEvent::SelectionChanged { selected_node: None, .. }
        ));
    }

    #[test]
    fn test_connect_rejected_and_accepted() {
        let sink = Arc::new(VecEventSink::new());
        let workflow = WorkflowBuilder::new("Connect")
            .add_event("e1", EventData::default())
            .add_status("s1", "Open")
            .add_status("s2", "Closed")
            .add_edge("start", "e1")
            .build()
            .unwrap();
        let mut session = EditorSession::open(workflow, EditorConfig::default(), sink.clone());

        session.begin_connection("s1").unwrap();
        let rejected = session.connect("s1", "s2").unwrap();
        assert!(matches!(rejected, Err(ConnectionRejection::DisallowedPair { .. })));
        assert_eq!(session.interaction().connection_source(), None);
        assert_eq!(session.workflow().edges().len(), 1);

        let edge_id = session.connect("e1", "s1").unwrap().unwrap();
        assert_eq!(edge_id, "edge-e1-s1");
        assert!(sink.events().contains(&EditorEvent::EdgeAdded {
            edge_id,
            source: "e1".to_string(),
            target: "s1".to_string(),
        }));

        session.begin_connection("e1").unwrap();
        assert!(matches!(
            session.connect("e1", "missing"),
            Err(EditorError::Graph(GraphError::NodeNotFound(_)))
        ));
        assert_eq!(session.interaction().connection_source(), None);
        assert_eq!(
            sink.events().last(),
            Some(&EditorEvent::ConnectionDragChanged { source: None })
        );
    }

    #[test]
    fn test_open_json() {
        let open = |json: &str| {
            EditorSession::open_json(json, EditorConfig::default(), Arc::new(NullEventSink))
        };

        let payload = serialize(&order_flow(), SaveIntent::Draft);
        let session = open(&payload.to_json_pretty().unwrap()).unwrap();
        assert_eq!(session.workflow(), &order_flow());

        assert!(matches!(open("{"), Err(EditorError::Serialization(_))));

        let mut broken = payload;
        broken.nodes.retain(|n| !n.is_start());
        broken.edges.clear();
        assert!(matches!(
            open(&broken.to_json_pretty().unwrap()),
            Err(EditorError::Graph(GraphError::StartNodeCount(0)))
        ));
    }

    #[test]
    fn test_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.json");
        std::fs::write(&path, r#"{"defaultWorkflowName": "Claims"}"#).unwrap();

        let session = EditorSession::from_config_file(&path, Arc::new(NullEventSink)).unwrap();
        assert_eq!(session.workflow().name, "Claims");

        std::fs::write(&path, "not json").unwrap();
        let err = EditorSession::from_config_file(&path, Arc::new(NullEventSink));
        assert!(matches!(err, Err(EditorError::Config(_))));
    }

    #[test]
    fn test_update_selected() {
        let (mut session, sink) = session();
        assert!(matches!(
            session.update_selected(&NodeDataPatch::default().label("x")),
            Err(EditorError::NothingSelected)
        ));

        let node_id = session
            .add_connected_node(START_NODE_ID, NodeType::Event)
            .unwrap();
        session
            .update_selected(&NodeDataPatch::default().condition("amount > 100"))
            .unwrap();
        assert_eq!(
            sink.events().last(),
            Some(&EditorEvent::NodeUpdated { node_id })
        );
    }

    #[test]
    fn test_save_draft_and_publish() {
        let sink = Arc::new(VecEventSink::new());
        let mut session = EditorSession::open(order_flow(), EditorConfig::default(), sink.clone());

        match session.save_draft().unwrap() {
            SaveOutcome::Saved(payload) => {
                assert_eq!(payload.nodes.len(), 3);
                assert_eq!(payload.auto_positioning, Some(true));
                assert!(!payload.is_published());
            }
            other => panic!("Expected Saved, got {:?}", other),
        }

        match session.publish().unwrap() {
            SaveOutcome::Blocked(result) => {
                assert!(result.has_error(ValidationErrorType::MissingDescription));
            }
            other => panic!("Expected Blocked, got {:?}", other),
        }
        let feedback = session.feedback().unwrap();
        assert!(feedback.has_errors());
        assert!(feedback.has_node_errors("e1"));
        assert!(matches!(
            sink.events().last(),
            Some(EditorEvent::SaveBlocked { intent: SaveIntent::Publish, .. })
        ));
    }

    #[test]
    fn test_empty_workflow_cannot_be_saved() {
        let (mut session, _sink) = session();
        let outcome = session.save_draft().unwrap();
        assert!(!outcome.is_saved());
    }

    #[test]
    fn test_description_is_capped() {
        let (mut session, sink) = session();
        session.set_description("x".repeat(300)).unwrap();
        assert_eq!(session.workflow().description().chars().count(), 240);
        assert!(matches!(
            sink.events().last(),
            Some(EditorEvent::MetadataChanged { description, .. }) if description.len() == 240
        ));
    }

    #[test]
    fn test_enabling_auto_positioning_lays_out() {
        let sink = Arc::new(VecEventSink::new());
        let mut workflow = order_flow();
        workflow.auto_positioning_enabled = false;
        let mut session = EditorSession::open(workflow, EditorConfig::default(), sink.clone());

        session.set_auto_positioning(true).unwrap();
        assert_eq!(
            sink.events(),
            vec![
                EditorEvent::AutoPositioningChanged { enabled: true },
                EditorEvent::LayoutApplied {
                    strategy: LayoutKind::Compact
                },
            ]
        );

        sink.clear();
        session.set_auto_positioning(true).unwrap();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_dispatch_round_trip() {
        let (mut session, _sink) = session();
        let command: EditorCommand = serde_json::from_str(
            r#"{"command": "addConnectedNode", "sourceId": "start", "nodeType": "event"}"#,
        )
        .unwrap();
        let outcome = session.dispatch(command).unwrap();
        assert!(matches!(outcome, CommandOutcome::NodeAdded(_)));

        let outcome = session
            .dispatch(EditorCommand::Validate {
                mode: ValidationMode::Save,
            })
            .unwrap();
        match outcome {
            CommandOutcome::Validated(result) => assert!(!result.is_valid),
            other => panic!("Expected Validated, got {:?}", other),
        }

        let outcome = session
            .dispatch(EditorCommand::SelectNode {
                node_id: START_NODE_ID.to_string(),
            })
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Selected(false));
    }
}
