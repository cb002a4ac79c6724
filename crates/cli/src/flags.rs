use clap::ValueEnum;
use tfplan_extractor::ActionKind;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum ActionFlag {
    Create,
    Update,
    Delete,
    Replace,
    #[value(name = "no-op")]
    NoOp,
}

impl ActionFlag {
    pub(crate) const fn as_domain(self) -> ActionKind {
        match self {
            ActionFlag::Create => ActionKind::Create,
            ActionFlag::Update => ActionKind::Update,
            ActionFlag::Delete => ActionKind::Delete,
            ActionFlag::Replace => ActionKind::Replace,
            ActionFlag::NoOp => ActionKind::NoOp,
        }
    }
}
