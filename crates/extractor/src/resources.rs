use crate::types::{ResourceChange, ResourceSummary};
use serde::{Deserialize, Serialize};
use tfplan_protocol::{ActionKind, ActionTally};

/// Row filter for resource listings. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    pub action: Option<ActionKind>,
    pub provider: Option<String>,
    pub resource_type: Option<String>,
    /// Case-insensitive substring of the resource address
    pub query: Option<String>,
}

impl ResourceFilter {
    #[must_use]
    pub fn matches(&self, row: &ResourceSummary) -> bool {
        if self.action.is_some_and(|action| action != row.action) {
            return false;
        }
        if let Some(provider) = &self.provider {
            if row.provider.as_deref() != Some(provider.as_str()) {
                return false;
            }
        }
        if let Some(resource_type) = &self.resource_type {
            if row.resource_type.as_deref() != Some(resource_type.as_str()) {
                return false;
            }
        }
        if let Some(query) = self.query.as_deref().filter(|q| !q.is_empty()) {
            let address = row.address.as_deref().unwrap_or_default().to_lowercase();
            if !address.contains(&query.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// Resource rows of a plan plus a per-action count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceListing {
    /// Resources per effective action, over the whole plan before filtering
    pub summary: ActionTally,
    pub resources: Vec<ResourceSummary>,
}

/// Normalize and filter resource changes, keeping plan order.
#[must_use]
pub fn list_resources(changes: &[ResourceChange], filter: &ResourceFilter) -> ResourceListing {
    let mut summary = ActionTally::default();
    let mut resources = Vec::new();
    for row in changes.iter().map(ResourceSummary::from) {
        summary.increment(row.action);
        if filter.matches(&row) {
            resources.push(row);
        }
    }
    ResourceListing { summary, resources }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn changes() -> Vec<ResourceChange> {
        [
            json!({
                "address": "aws_instance.web",
                "type": "aws_instance",
                "name": "web",
                "change": {"actions": ["delete", "create"], "replace_paths": [["ami"]]}
            }),
            json!({
                "address": "module.net.google_compute_network.main",
                "module_address": "module.net",
                "type": "google_compute_network",
                "provider_name": "registry.terraform.io/hashicorp/google",
                "change": {"actions": ["update"], "before": {"mtu": 1460}, "after": {"mtu": 1500}}
            }),
            json!({"address": "aws_s3_bucket.logs", "type": "aws_s3_bucket",
                   "change": {"actions": ["no-op"]}}),
        ]
        .iter()
        .map(ResourceChange::from_entry)
        .collect()
    }

    #[test]
    fn empty_filter_lists_everything_in_order() {
        let rows = list_resources(&changes(), &ResourceFilter::default()).resources;
        let actions: Vec<_> = rows.iter().map(|r| r.action).collect();
        assert_eq!(
            actions,
            vec![ActionKind::Replace, ActionKind::Update, ActionKind::NoOp]
        );
        assert_eq!(rows[0].provider.as_deref(), Some("aws"));
        assert_eq!(
            rows[1].provider.as_deref(),
            Some("registry.terraform.io/hashicorp/google")
        );
    }

    #[test]
    fn filters_combine() {
        let filter = ResourceFilter {
            provider: Some("aws".to_string()),
            query: Some("S3".to_string()),
            ..Default::default()
        };
        let rows = list_resources(&changes(), &filter).resources;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].address.as_deref(), Some("aws_s3_bucket.logs"));
    }

    #[test]
    fn action_filter_uses_effective_action() {
        let filter = ResourceFilter {
            action: Some(ActionKind::Replace),
            ..Default::default()
        };
        let rows = list_resources(&changes(), &filter).resources;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name.as_deref(), Some("web"));
        assert_eq!(rows[0].replace_paths, Some(json!([["ami"]])));
    }

    #[test]
    fn summary_counts_effective_actions_before_filtering() {
        let filter = ResourceFilter {
            provider: Some("aws".to_string()),
            ..Default::default()
        };
        let listing = list_resources(&changes(), &filter);

        assert_eq!(listing.resources.len(), 2);
        assert_eq!(listing.summary.replace, 1);
        assert_eq!(listing.summary.update, 1);
        assert_eq!(listing.summary.no_op, 1);
        assert_eq!(listing.summary.create, 0);
        assert_eq!(listing.summary.delete, 0);
    }

    #[test]
    fn rows_carry_before_and_after() {
        let listing = list_resources(&changes(), &ResourceFilter::default());
        let network = &listing.resources[1];
        assert_eq!(network.before, Some(json!({"mtu": 1460})));
        assert_eq!(network.after, Some(json!({"mtu": 1500})));
        assert_eq!(network.after_unknown, None);

        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value["summary"]["no-op"], json!(1));
        assert_eq!(value["resources"][0]["replace_paths"], json!([["ami"]]));
    }
}
