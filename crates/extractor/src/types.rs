use crate::dedup::FoundSet;
use crate::json::{array_field, has_key, string_field};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tfplan_protocol::ActionKind;

/// One entry of a plan's `resource_changes`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChange {
    /// Recognized actions from `change.actions`, in plan order
    pub actions: Vec<ActionKind>,

    pub address: Option<String>,

    pub module_address: Option<String>,

    /// Resource type, e.g. `aws_instance`
    #[serde(rename = "type")]
    pub resource_type: Option<String>,

    pub name: Option<String>,

    pub provider_name: Option<String>,

    /// `change.before`, `change.after`, `change.after_unknown` and
    /// `change.replace_paths`, passed through untouched
    pub before: Option<Value>,

    pub after: Option<Value>,

    pub after_unknown: Option<Value>,

    pub replace_paths: Option<Value>,
}

impl ResourceChange {
    /// Build from a raw `resource_changes` entry. Unknown action strings are
    /// dropped; non-object entries produce an empty change.
    #[must_use]
    pub fn from_entry(entry: &Value) -> Self {
        let change = entry.get("change");
        let change_field = |key: &str| {
            change
                .and_then(|change| change.get(key))
                .filter(|value| !value.is_null())
                .cloned()
        };
        let actions = change
            .and_then(|change| change.get("actions"))
            .and_then(Value::as_array)
            .map(|actions| {
                actions
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(ActionKind::from_canonical)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            actions,
            address: string_field(entry, "address"),
            module_address: string_field(entry, "module_address"),
            resource_type: string_field(entry, "type"),
            name: string_field(entry, "name"),
            provider_name: string_field(entry, "provider_name"),
            before: change_field("before"),
            after: change_field("after"),
            after_unknown: change_field("after_unknown"),
            replace_paths: change_field("replace_paths"),
        }
    }

    /// Single action describing the change: a delete+create pair is a replace.
    #[must_use]
    pub fn effective_action(&self) -> ActionKind {
        let has = |kind| self.actions.contains(&kind);
        if has(ActionKind::Replace) || (has(ActionKind::Delete) && has(ActionKind::Create)) {
            return ActionKind::Replace;
        }
        self.actions.first().copied().unwrap_or(ActionKind::NoOp)
    }

    /// Explicit provider name, or the type prefix before the first `_`.
    #[must_use]
    pub fn provider(&self) -> Option<String> {
        if let Some(provider) = &self.provider_name {
            return Some(provider.clone());
        }
        let resource_type = self.resource_type.as_deref()?;
        resource_type
            .split('_')
            .next()
            .filter(|prefix| !prefix.is_empty())
            .map(str::to_string)
    }
}

/// Outcome of classifying one text buffer
#[derive(Debug, Clone, PartialEq)]
pub enum PlanClassification {
    /// A plan object carrying `resource_changes`
    FullPlan {
        terraform_version: Option<String>,
        resource_changes: Vec<ResourceChange>,
        diagnostics: Vec<Value>,
    },

    /// Structured log lines that look like diagnostics
    Diagnostics { entries: Vec<Value> },

    /// A plan-shaped object without `resource_changes`
    PartialPlan { raw: Value },

    /// JSON was found but nothing Terraform-specific
    UnclassifiedObjects { objects: FoundSet, message: String },

    /// Nothing usable at all
    NotFound {
        objects_scanned: usize,
        diagnostics_scanned: usize,
    },
}

impl PlanClassification {
    /// Classify a single object that carries a plan signal.
    ///
    /// A plan with `resource_changes` is a full plan even when it also has a
    /// `diagnostics` array; those entries are carried on the full plan rather
    /// than turning the result into a diagnostics report.
    #[must_use]
    pub fn from_plan_object(plan: Value) -> Self {
        if !has_key(&plan, "resource_changes") {
            return Self::PartialPlan { raw: plan };
        }

        let resource_changes = array_field(&plan, "resource_changes")
            .iter()
            .map(ResourceChange::from_entry)
            .collect();

        Self::FullPlan {
            terraform_version: string_field(&plan, "terraform_version"),
            resource_changes,
            diagnostics: array_field(&plan, "diagnostics"),
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::FullPlan { .. } => "full plan",
            Self::Diagnostics { .. } => "diagnostics",
            Self::PartialPlan { .. } => "partial plan",
            Self::UnclassifiedObjects { .. } => "unclassified objects",
            Self::NotFound { .. } => "nothing",
        }
    }
}

/// Normalized view of one resource change, for listing and filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub address: Option<String>,
    pub module_address: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub name: Option<String>,
    pub provider: Option<String>,
    pub action: ActionKind,
    pub actions: Vec<ActionKind>,
    pub before: Option<Value>,
    pub after: Option<Value>,
    pub after_unknown: Option<Value>,
    pub replace_paths: Option<Value>,
}

impl From<&ResourceChange> for ResourceSummary {
    fn from(change: &ResourceChange) -> Self {
        Self {
            address: change.address.clone(),
            module_address: change.module_address.clone(),
            resource_type: change.resource_type.clone(),
            name: change.name.clone(),
            provider: change.provider(),
            action: change.effective_action(),
            actions: change.actions.clone(),
            before: change.before.clone(),
            after: change.after.clone(),
            after_unknown: change.after_unknown.clone(),
            replace_paths: change.replace_paths.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn delete_create_pair_is_replace() {
        let change = ResourceChange::from_entry(&json!({
            "address": "aws_instance.web",
            "type": "aws_instance",
            "change": {"actions": ["delete", "create"]}
        }));
        assert_eq!(change.actions, vec![ActionKind::Delete, ActionKind::Create]);
        assert_eq!(change.effective_action(), ActionKind::Replace);
        assert_eq!(change.provider().as_deref(), Some("aws"));
    }

    #[test]
    fn change_values_pass_through() {
        let change = ResourceChange::from_entry(&json!({
            "address": "aws_instance.web",
            "change": {
                "actions": ["update"],
                "before": {"ami": "ami-1"},
                "after": {"ami": "ami-2"},
                "after_unknown": {"id": true},
                "replace_paths": null
            }
        }));
        assert_eq!(change.before, Some(json!({"ami": "ami-1"})));
        assert_eq!(change.after, Some(json!({"ami": "ami-2"})));
        assert_eq!(change.after_unknown, Some(json!({"id": true})));
        assert_eq!(change.replace_paths, None);

        let row = ResourceSummary::from(&change);
        assert_eq!(row.after, change.after);
        assert_eq!(
            serde_json::to_value(&row).unwrap()["replace_paths"],
            Value::Null
        );
    }

    #[test]
    fn unknown_actions_are_dropped() {
        let change = ResourceChange::from_entry(&json!({
            "change": {"actions": ["read", "update", 7]}
        }));
        assert_eq!(change.actions, vec![ActionKind::Update]);
    }

    #[test]
    fn change_without_actions_is_no_op() {
        let change = ResourceChange::from_entry(&json!({"provider_name": "registry/x"}));
        assert_eq!(change.effective_action(), ActionKind::NoOp);
        assert_eq!(change.provider().as_deref(), Some("registry/x"));
    }

    #[test]
    fn plan_without_resource_changes_is_partial() {
        let plan = json!({"planned_values": {}});
        assert!(matches!(
            PlanClassification::from_plan_object(plan),
            PlanClassification::PartialPlan { .. }
        ));
    }
}
