use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five action kinds Terraform reports for a resource change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Create,
    Update,
    Delete,
    Replace,
    NoOp,
}

impl ActionKind {
    pub const ALL: [Self; 5] = [
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Replace,
        Self::NoOp,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Replace => "replace",
            Self::NoOp => "no-op",
        }
    }

    /// Exact, case-sensitive match against the canonical spelling.
    #[must_use]
    pub fn from_canonical(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-kind counters. Every key is always serialized, even at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ActionTally {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub replace: usize,
    #[serde(rename = "no-op")]
    pub no_op: usize,
}

impl ActionTally {
    pub fn increment(&mut self, kind: ActionKind) {
        *self.slot_mut(kind) += 1;
    }

    #[must_use]
    pub const fn get(&self, kind: ActionKind) -> usize {
        match kind {
            ActionKind::Create => self.create,
            ActionKind::Update => self.update,
            ActionKind::Delete => self.delete,
            ActionKind::Replace => self.replace,
            ActionKind::NoOp => self.no_op,
        }
    }

    /// Sum of all counters.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.create + self.update + self.delete + self.replace + self.no_op
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn slot_mut(&mut self, kind: ActionKind) -> &mut usize {
        match kind {
            ActionKind::Create => &mut self.create,
            ActionKind::Update => &mut self.update,
            ActionKind::Delete => &mut self.delete,
            ActionKind::Replace => &mut self.replace,
            ActionKind::NoOp => &mut self.no_op,
        }
    }
}
