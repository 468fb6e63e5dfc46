//! Navigation over validation results
//!
//! Groups issues by the node they point at so a host can step through the
//! offending nodes one at a time, tint them on the canvas and show the first
//! error of the current one.

use serde::Serialize;

use crate::validation::{ValidationIssue, ValidationResult, ValidationSeverity};

/// Name of the group holding workflow-level issues
pub const WORKFLOW_GROUP_NAME: &str = "Workflow";

/// Issues attached to one node, or to the workflow as a whole
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeValidationGroup {
    /// `None` for workflow-level issues
    pub node_id: Option<String>,
    pub node_name: String,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// Grouped issues plus a wrapping cursor over the groups that have errors
#[derive(Debug, Clone, Default)]
pub struct ValidationFeedback {
    groups: Vec<NodeValidationGroup>,
    /// Indices into `groups` of the groups with at least one error
    error_groups: Vec<usize>,
    cursor: usize,
}

impl ValidationFeedback {
    pub fn new(result: &ValidationResult) -> Self {
        let mut groups: Vec<NodeValidationGroup> = Vec::new();

        for issue in result.issues() {
            let index = match groups.iter().position(|g| g.node_id == issue.node_id) {
                Some(index) => index,
                None => {
                    groups.push(NodeValidationGroup {
                        node_id: issue.node_id.clone(),
                        node_name: issue
                            .node_name
                            .clone()
                            .unwrap_or_else(|| WORKFLOW_GROUP_NAME.to_string()),
                        errors: Vec::new(),
                        warnings: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            match issue.severity {
                ValidationSeverity::Error => groups[index].errors.push(issue.clone()),
                ValidationSeverity::Warning => groups[index].warnings.push(issue.clone()),
            }
        }

        // Workflow-level group first, then nodes by name
        groups.sort_by(|a, b| match (&a.node_id, &b.node_id) {
            (None, None) => std::cmp::Ordering::Equal,
            (None, _) => std::cmp::Ordering::Less,
            (_, None) => std::cmp::Ordering::Greater,
            _ => a
                .node_name
                .to_lowercase()
                .cmp(&b.node_name.to_lowercase())
                .then_with(|| a.node_name.cmp(&b.node_name)),
        });

        let error_groups = groups
            .iter()
            .enumerate()
            .filter(|(_, g)| !g.errors.is_empty())
            .map(|(i, _)| i)
            .collect();

        Self {
            groups,
            error_groups,
            cursor: 0,
        }
    }

    /// All groups, workflow-level first
    pub fn groups(&self) -> &[NodeValidationGroup] {
        &self.groups
    }

    /// Groups with at least one error, in display order
    pub fn error_groups(&self) -> impl Iterator<Item = &NodeValidationGroup> {
        self.error_groups.iter().map(|&i| &self.groups[i])
    }

    /// Number of groups with errors
    pub fn total_errors(&self) -> usize {
        self.error_groups.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.error_groups.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        self.groups.iter().any(|g| !g.warnings.is_empty())
    }

    /// Position of the cursor among the error groups
    pub fn current_index(&self) -> usize {
        self.cursor
    }

    /// The error group under the cursor
    pub fn current_group(&self) -> Option<&NodeValidationGroup> {
        let last = self.error_groups.len().checked_sub(1)?;
        self.error_groups
            .get(self.cursor.min(last))
            .map(|&i| &self.groups[i])
    }

    /// First error message of the current group
    pub fn current_error_message(&self) -> Option<&str> {
        self.current_group()
            .and_then(|g| g.errors.first())
            .map(|issue| issue.message.as_str())
    }

    /// Advance to the next error group, wrapping at the end
    pub fn next_group(&mut self) -> Option<&NodeValidationGroup> {
        let total = self.error_groups.len();
        if total == 0 {
            return None;
        }
        self.cursor = (self.cursor + 1) % total;
        self.current_group()
    }

    /// Step back to the previous error group, wrapping at the start
    pub fn previous_group(&mut self) -> Option<&NodeValidationGroup> {
        let total = self.error_groups.len();
        if total == 0 {
            return None;
        }
        self.cursor = (self.cursor + total - 1) % total;
        self.current_group()
    }

    /// Jump to an error group; out-of-range indices are ignored
    pub fn go_to(&mut self, index: usize) -> Option<&NodeValidationGroup> {
        if index < self.error_groups.len() {
            self.cursor = index;
        }
        self.current_group()
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Whether the node has at least one error
    pub fn has_node_errors(&self, node_id: &str) -> bool {
        self.group_for(node_id).is_some_and(|g| !g.errors.is_empty())
    }

    /// Whether the node has at least one warning
    pub fn has_node_warnings(&self, node_id: &str) -> bool {
        self.group_for(node_id).is_some_and(|g| !g.warnings.is_empty())
    }

    fn group_for(&self, node_id: &str) -> Option<&NodeValidationGroup> {
        self.groups
            .iter()
            .find(|g| g.node_id.as_deref() == Some(node_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::WorkflowBuilder;
    use crate::types::EventData;
    use crate::validation::{validate_workflow, ValidationMode};

    fn feedback() -> ValidationFeedback {
        let wf = WorkflowBuilder::new("")
            .add_event("e1", EventData::default())
            .add_status("s1", "Zulu")
            .add_status("s2", "alpha")
            .add_edge("start", "e1")
            .add_edge("e1", "s1")
            .build()
            .unwrap();
        ValidationFeedback::new(&validate_workflow(&wf, ValidationMode::Save))
    }

    #[test]
    fn test_groups_are_ordered() {
        let feedback = feedback();
        let names: Vec<_> = feedback.groups().iter().map(|g| g.node_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Workflow", "alpha", "Unnamed Transition Block", "Zulu"]
        );
        assert_eq!(feedback.groups()[0].node_id, None);
    }

    #[test]
    fn test_error_groups_skip_warning_only_nodes() {
        let feedback = feedback();
        // Zulu is only a dead end, which is a warning in Save mode
        let names: Vec<_> = feedback.error_groups().map(|g| g.node_name.as_str()).collect();
        assert_eq!(names, vec!["Workflow", "alpha", "Unnamed Transition Block"]);
        assert!(feedback.has_node_warnings("s1"));
        assert!(!feedback.has_node_errors("s1"));
        assert!(feedback.has_node_errors("e1"));
        assert!(feedback.has_warnings());
    }

    #[test]
    fn test_cursor_wraps() {
        let mut feedback = feedback();
        assert_eq!(feedback.total_errors(), 3);
        assert_eq!(feedback.current_error_message(), Some("Workflow name is required"));

        assert_eq!(feedback.next_group().map(|g| g.node_name.as_str()), Some("alpha"));
        feedback.next_group();
        assert_eq!(feedback.next_group().map(|g| g.node_name.as_str()), Some("Workflow"));
        assert_eq!(
            feedback.previous_group().map(|g| g.node_name.as_str()),
            Some("Unnamed Transition Block")
        );
        assert_eq!(
            feedback.current_error_message(),
            Some("Unnamed Transition Block: Business Event is required")
        );

        feedback.go_to(10);
        assert_eq!(feedback.current_index(), 2);
        feedback.go_to(1);
        assert_eq!(feedback.current_index(), 1);
        feedback.reset();
        assert_eq!(feedback.current_index(), 0);
    }

    #[test]
    fn test_empty_result() {
        let mut feedback = ValidationFeedback::default();
        assert!(!feedback.has_errors());
        assert!(feedback.current_group().is_none());
        assert!(feedback.next_group().is_none());
        assert!(feedback.current_error_message().is_none());
    }
}
