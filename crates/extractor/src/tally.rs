//! Action counting over loosely shaped JSON.
//!
//! Objects are inspected through three structural tiers (`change.actions`,
//! `action`, `type`) followed by a keyword scan over the serialized object.
//! In legacy mode the keyword scan runs for every object, so one object can
//! be counted twice; `strict_tally` limits it to objects the structural tiers
//! did not count.

use crate::types::ResourceChange;
use serde_json::Value;
use tfplan_protocol::{ActionKind, ActionTally};

/// Keyword groups for the stringified fallback, checked in this order.
const KEYWORD_FALLBACK: [(ActionKind, &[&str]); 4] = [
    (ActionKind::Create, &["create", "new"]),
    (ActionKind::Update, &["update", "modify"]),
    (ActionKind::Delete, &["delete", "remove"]),
    (ActionKind::Replace, &["replace"]),
];

/// Tally a sequence of loose values. Non-objects are ignored.
#[must_use]
pub fn tally_values<'a>(values: impl IntoIterator<Item = &'a Value>, strict: bool) -> ActionTally {
    let mut tally = ActionTally::default();
    for value in values {
        if value.is_object() {
            tally_object(value, strict, &mut tally);
        }
    }
    tally
}

/// Tally the actions of a plan's resource changes.
#[must_use]
pub fn tally_resource_changes(changes: &[ResourceChange]) -> ActionTally {
    let mut tally = ActionTally::default();
    for kind in changes.iter().flat_map(|change| change.actions.iter()) {
        tally.increment(*kind);
    }
    tally
}

fn tally_object(obj: &Value, strict: bool, tally: &mut ActionTally) {
    let structural = structural_actions(obj);
    let matched = !structural.is_empty();
    for kind in structural {
        tally.increment(kind);
    }

    if strict && matched {
        return;
    }
    if let Some(kind) = keyword_action(obj) {
        tally.increment(kind);
    }
}

/// Actions recognized from the first structural tier present on the object.
fn structural_actions(obj: &Value) -> Vec<ActionKind> {
    if let Some(actions) = obj
        .get("change")
        .filter(|change| change.is_object())
        .and_then(|change| change.get("actions"))
    {
        return actions
            .as_array()
            .map(|actions| {
                actions
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(ActionKind::from_canonical)
                    .collect()
            })
            .unwrap_or_default();
    }

    if let Some(action) = obj.get("action") {
        return action
            .as_str()
            .and_then(ActionKind::from_canonical)
            .into_iter()
            .collect();
    }

    if let Some(change_type) = obj.get("type") {
        return change_type
            .as_str()
            .and_then(action_from_type)
            .into_iter()
            .collect();
    }

    Vec::new()
}

fn action_from_type(raw: &str) -> Option<ActionKind> {
    match raw.to_lowercase().as_str() {
        "create" | "new" => Some(ActionKind::Create),
        "update" | "modify" => Some(ActionKind::Update),
        "delete" | "remove" => Some(ActionKind::Delete),
        "replace" => Some(ActionKind::Replace),
        "no-op" | "noop" => Some(ActionKind::NoOp),
        _ => None,
    }
}

fn keyword_action(obj: &Value) -> Option<ActionKind> {
    let text = obj.to_string().to_lowercase();
    KEYWORD_FALLBACK
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|(kind, _)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tally(values: &[Value], strict: bool) -> ActionTally {
        tally_values(values, strict)
    }

    #[test]
    fn change_actions_count_every_entry_and_keyword_pass_adds_one() {
        let values = [json!({"change": {"actions": ["delete", "create"]}})];
        // structural: delete + create; keyword pass: "create" wins first
        assert_eq!(
            tally(&values, false),
            ActionTally {
                create: 2,
                delete: 1,
                ..Default::default()
            }
        );
        assert_eq!(
            tally(&values, true),
            ActionTally {
                create: 1,
                delete: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn action_field_only_counts_canonical_spelling() {
        let values = [json!({"action": "no-op"}), json!({"action": "NOOP"})];
        let result = tally(&values, true);
        assert_eq!(result.no_op, 1);
        assert_eq!(result.total(), 1);
    }

    #[test]
    fn type_field_maps_synonyms() {
        let values = [
            json!({"type": "New"}),
            json!({"type": "modify"}),
            json!({"type": "Remove"}),
            json!({"type": "replace"}),
            json!({"type": "noop"}),
            json!({"type": 3}),
        ];
        assert_eq!(
            tally(&values, true),
            ActionTally {
                create: 1,
                update: 1,
                delete: 1,
                replace: 1,
                no_op: 1,
            }
        );
    }

    #[test]
    fn earlier_tier_shadows_later_ones() {
        // `action` is present, so `type` is never consulted even though the
        // action value is not canonical
        let values = [json!({"action": "destroy", "type": "create"})];
        let result = tally(&values, true);
        // strict mode falls through to keywords because nothing matched
        assert_eq!(result.create, 1);
        assert_eq!(result.total(), 1);
    }

    #[test]
    fn keyword_pass_is_first_match_wins() {
        let values = [json!({"note": "we will update then delete"})];
        assert_eq!(
            tally(&values, false),
            ActionTally {
                update: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn keyword_pass_never_yields_no_op() {
        let values = [json!({"msg": "nothing to see"})];
        assert!(tally(&values, false).is_empty());
    }

    #[test]
    fn non_objects_are_ignored() {
        let values = [json!(["create"]), json!("create"), json!(1)];
        assert!(tally(&values, false).is_empty());
    }

    #[test]
    fn resource_changes_count_actions_only() {
        let changes = [
            ResourceChange::from_entry(&json!({"change": {"actions": ["create"]}})),
            ResourceChange::from_entry(&json!({"change": {"actions": ["delete", "create"]}})),
        ];
        assert_eq!(
            tally_resource_changes(&changes),
            ActionTally {
                create: 2,
                delete: 1,
                ..Default::default()
            }
        );
    }
}
