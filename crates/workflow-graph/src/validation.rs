//! Workflow validation
//!
//! Inspects workflow metadata, per-node fields and graph connectivity and
//! returns every problem found as data. Nothing here fails: issues are split
//! into errors, which block saving, and warnings, which do not.
//!
//! Publish mode is stricter than Save mode: a missing Event description,
//! empty entity lists and dead-end nodes are warnings when saving a draft and
//! errors when publishing.
//!
//! Issues come out in a fixed order: workflow-level checks, per-node field
//! checks in node order, connectivity, reachability, then at most one cycle
//! warning.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{EventData, NodeData, StatusData, Workflow, WorkflowNode};

/// Kind of validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorType {
    EmptyWorkflowName,
    EmptyWorkflow,
    MissingBusinessEvent,
    MissingCondition,
    MissingTrigger,
    MissingBusinessEventName,
    MissingFocalEntity,
    MissingDescription,
    EmptyCreatedEntities,
    EmptyModifiedEntities,
    MissingStateName,
    DeadEndNode,
    UnconnectedNode,
    StartNotConnected,
    CircularReference,
    UnreachableNode,
}

impl ValidationErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyWorkflowName => "EMPTY_WORKFLOW_NAME",
            Self::EmptyWorkflow => "EMPTY_WORKFLOW",
            Self::MissingBusinessEvent => "MISSING_BUSINESS_EVENT",
            Self::MissingCondition => "MISSING_CONDITION",
            Self::MissingTrigger => "MISSING_TRIGGER",
            Self::MissingBusinessEventName => "MISSING_BUSINESS_EVENT_NAME",
            Self::MissingFocalEntity => "MISSING_FOCAL_ENTITY",
            Self::MissingDescription => "MISSING_DESCRIPTION",
            Self::EmptyCreatedEntities => "EMPTY_CREATED_ENTITIES",
            Self::EmptyModifiedEntities => "EMPTY_MODIFIED_ENTITIES",
            Self::MissingStateName => "MISSING_STATE_NAME",
            Self::DeadEndNode => "DEAD_END_NODE",
            Self::UnconnectedNode => "UNCONNECTED_NODE",
            Self::StartNotConnected => "START_NOT_CONNECTED",
            Self::CircularReference => "CIRCULAR_REFERENCE",
            Self::UnreachableNode => "UNREACHABLE_NODE",
        }
    }
}

impl fmt::Display for ValidationErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an issue blocks saving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationSeverity {
    Error,
    Warning,
}

/// Strictness of a validation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Saving a draft
    #[default]
    Save,
    /// Publishing
    Publish,
}

impl ValidationMode {
    fn is_publish(&self) -> bool {
        matches!(self, Self::Publish)
    }

    /// Error when publishing, warning when saving
    fn escalated(&self) -> ValidationSeverity {
        if self.is_publish() {
            ValidationSeverity::Error
        } else {
            ValidationSeverity::Warning
        }
    }
}

impl std::str::FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "save" => Ok(Self::Save),
            "publish" => Ok(Self::Publish),
            other => Err(format!("unknown validation mode '{}'", other)),
        }
    }
}

/// One problem found by the validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub issue_type: ValidationErrorType,
    pub severity: ValidationSeverity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
}

impl ValidationIssue {
    fn workflow(issue_type: ValidationErrorType, message: impl Into<String>) -> Self {
        Self {
            issue_type,
            severity: ValidationSeverity::Error,
            message: message.into(),
            node_id: None,
            node_name: None,
            field_name: None,
        }
    }

    fn node(issue_type: ValidationErrorType, node: &WorkflowNode, detail: &str) -> Self {
        let name = node.data.display_name();
        Self {
            issue_type,
            severity: ValidationSeverity::Error,
            message: format!("{}: {}", name, detail),
            node_id: Some(node.id.clone()),
            node_name: Some(name.to_string()),
            field_name: None,
        }
    }

    fn severity(mut self, severity: ValidationSeverity) -> Self {
        self.severity = severity;
        self
    }

    fn field(mut self, field: &str) -> Self {
        self.field_name = Some(field.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == ValidationSeverity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.issue_type, self.message)
    }
}

/// Outcome of a validation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True when there are no errors; warnings never block
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = issues.into_iter().partition(|i| i.is_error());
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Errors followed by warnings
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Number of issues of a kind, errors and warnings together
    pub fn count(&self, issue_type: ValidationErrorType) -> usize {
        self.issues().filter(|i| i.issue_type == issue_type).count()
    }

    pub fn has_error(&self, issue_type: ValidationErrorType) -> bool {
        self.errors.iter().any(|i| i.issue_type == issue_type)
    }

    pub fn has_warning(&self, issue_type: ValidationErrorType) -> bool {
        self.warnings.iter().any(|i| i.issue_type == issue_type)
    }
}

/// Validate a workflow
///
/// Returns all issues found, not just the first.
pub fn validate_workflow(workflow: &Workflow, mode: ValidationMode) -> ValidationResult {
    let mut issues = Vec::new();

    validate_metadata(workflow, &mut issues);
    validate_not_empty(workflow, &mut issues);

    if workflow.node_count() > 1 {
        for node in workflow.nodes() {
            match &node.data {
                NodeData::Event(data) => validate_event_node(node, data, mode, &mut issues),
                NodeData::Status(data) => validate_status_node(node, data, &mut issues),
                NodeData::Start(_) => {}
            }
        }
        validate_connectivity(workflow, mode, &mut issues);
        validate_reachability(workflow, &mut issues);
        detect_cycles(workflow, &mut issues);
    }

    let result = ValidationResult::from_issues(issues);
    log::debug!(
        "Validated '{}' ({:?}): {} errors, {} warnings",
        workflow.name,
        mode,
        result.errors.len(),
        result.warnings.len()
    );
    result
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn validate_metadata(workflow: &Workflow, issues: &mut Vec<ValidationIssue>) {
    if workflow.name.trim().is_empty() {
        issues.push(ValidationIssue::workflow(
            ValidationErrorType::EmptyWorkflowName,
            "Workflow name is required",
        ));
    }
}

fn validate_not_empty(workflow: &Workflow, issues: &mut Vec<ValidationIssue>) {
    if workflow.is_empty() {
        issues.push(ValidationIssue::workflow(
            ValidationErrorType::EmptyWorkflow,
            "Workflow is empty. Add at least one node to create a meaningful workflow.",
        ));
    }
}

fn validate_event_node(
    node: &WorkflowNode,
    data: &EventData,
    mode: ValidationMode,
    issues: &mut Vec<ValidationIssue>,
) {
    use ValidationErrorType as T;

    if is_blank(&data.business_event) {
        issues.push(
            ValidationIssue::node(T::MissingBusinessEvent, node, "Business Event is required")
                .field("businessEvent"),
        );
    }
    if is_blank(&data.condition) {
        issues.push(
            ValidationIssue::node(T::MissingCondition, node, "Condition is required")
                .field("condition"),
        );
    }
    if !data.automatic_trigger && !data.external_trigger {
        issues.push(
            ValidationIssue::node(
                T::MissingTrigger,
                node,
                "At least one trigger (Automatic or External) must be selected",
            )
            .field("trigger"),
        );
    }
    if is_blank(&data.business_event_name) {
        issues.push(
            ValidationIssue::node(
                T::MissingBusinessEventName,
                node,
                "Business Event Name is required",
            )
            .field("businessEventName"),
        );
    }
    if is_blank(&data.focal_entity) {
        issues.push(
            ValidationIssue::node(T::MissingFocalEntity, node, "Focal Entity is required")
                .field("focalEntity"),
        );
    }

    let publish = mode.is_publish();
    if is_blank(&data.description) {
        let detail = if publish {
            "Description is required for publishing"
        } else {
            "Description is recommended for better documentation"
        };
        issues.push(
            ValidationIssue::node(T::MissingDescription, node, detail)
                .severity(mode.escalated())
                .field("description"),
        );
    }
    if data.created_entities.is_empty() {
        let detail = if publish {
            "Created Entities are required for publishing"
        } else {
            "Consider adding Created Entities for clarity"
        };
        issues.push(
            ValidationIssue::node(T::EmptyCreatedEntities, node, detail)
                .severity(mode.escalated())
                .field("createdEntities"),
        );
    }
    if data.modified_entities.is_empty() {
        let detail = if publish {
            "Modified Entities are required for publishing"
        } else {
            "Consider adding Modified Entities for clarity"
        };
        issues.push(
            ValidationIssue::node(T::EmptyModifiedEntities, node, detail)
                .severity(mode.escalated())
                .field("modifiedEntities"),
        );
    }
}

fn validate_status_node(node: &WorkflowNode, data: &StatusData, issues: &mut Vec<ValidationIssue>) {
    if is_blank(&data.business_event_name) {
        issues.push(
            ValidationIssue::node(
                ValidationErrorType::MissingStateName,
                node,
                "State Name is required",
            )
            .field("businessEventName"),
        );
    }
}

fn validate_connectivity(
    workflow: &Workflow,
    mode: ValidationMode,
    issues: &mut Vec<ValidationIssue>,
) {
    let start = workflow.start_node();
    if workflow.outgoing_edges(&start.id).next().is_none() {
        issues.push(ValidationIssue {
            node_id: Some(start.id.clone()),
            node_name: Some(start.data.display_name().to_string()),
            ..ValidationIssue::workflow(
                ValidationErrorType::StartNotConnected,
                "Start node has no outgoing connections. Connect it to begin your workflow.",
            )
        });
    }

    for node in workflow.steps() {
        if workflow.incoming_edges(&node.id).next().is_none() {
            issues.push(ValidationIssue::node(
                ValidationErrorType::UnconnectedNode,
                node,
                "Node has no incoming connections",
            ));
        }
        if workflow.outgoing_edges(&node.id).next().is_none() {
            let detail = if mode.is_publish() {
                "Node has no outgoing connections. All nodes must have exit paths for publishing."
            } else {
                "Node has no outgoing connections (dead end)"
            };
            issues.push(
                ValidationIssue::node(ValidationErrorType::DeadEndNode, node, detail)
                    .severity(mode.escalated()),
            );
        }
    }
}

/// IDs of every node reachable from Start along edge direction, Start included
pub fn reachable_from_start(workflow: &Workflow) -> HashSet<&str> {
    let mut reachable: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(workflow.start_node().id.as_str());

    while let Some(node_id) = queue.pop_front() {
        if !reachable.insert(node_id) {
            continue;
        }
        queue.extend(workflow.children(node_id));
    }
    reachable
}

fn validate_reachability(workflow: &Workflow, issues: &mut Vec<ValidationIssue>) {
    let reachable = reachable_from_start(workflow);
    for node in workflow.steps() {
        if !reachable.contains(node.id.as_str()) {
            issues.push(ValidationIssue::node(
                ValidationErrorType::UnreachableNode,
                node,
                "Node is not reachable from Start",
            ));
        }
    }
}

/// Detect cycles using Kahn's algorithm (topological sort)
///
/// Reports a single warning however many cycles exist.
fn detect_cycles(workflow: &Workflow, issues: &mut Vec<ValidationIssue>) {
    let mut in_degree: HashMap<&str, usize> =
        workflow.nodes().map(|n| (n.id.as_str(), 0)).collect();
    for edge in workflow.edges() {
        *in_degree.entry(edge.target.as_str()).or_insert(0) += 1;
    }

    let mut queue: VecDeque<&str> = workflow
        .nodes()
        .map(|n| n.id.as_str())
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();

    let mut visited = 0;
    while let Some(node_id) = queue.pop_front() {
        visited += 1;
        for edge in workflow.outgoing_edges(node_id) {
            if let Some(deg) = in_degree.get_mut(edge.target.as_str()) {
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(edge.target.as_str());
                }
            }
        }
    }

    if visited < workflow.node_count() {
        issues.push(
            ValidationIssue::workflow(
                ValidationErrorType::CircularReference,
                "Workflow contains circular references (loops). This may cause infinite execution.",
            )
            .severity(ValidationSeverity::Warning),
        );
    }
}
