//! Arguments for `scalrctl list`

use clap::{Args, ValueEnum};
use scalr_core::UserStatus;

/// Collections reachable through `list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    #[value(alias = "ws")]
    Workspaces,
    #[value(alias = "env")]
    Environments,
    Teams,
    Users,
    PolicyGroups,
    AccountUsers,
}

impl ResourceKind {
    /// Collection name as it appears in the API path
    pub fn collection(self) -> &'static str {
        match self {
            ResourceKind::Workspaces => "workspaces",
            ResourceKind::Environments => "environments",
            ResourceKind::Teams => "teams",
            ResourceKind::Users => "users",
            ResourceKind::PolicyGroups => "policy-groups",
            ResourceKind::AccountUsers => "account-users",
        }
    }
}

/// Status filter accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Active,
    Inactive,
    Pending,
}

impl From<StatusArg> for UserStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Active => UserStatus::Active,
            StatusArg::Inactive => UserStatus::Inactive,
            StatusArg::Pending => UserStatus::Pending,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Collection to list
    #[arg(value_enum)]
    pub resource: ResourceKind,

    /// Page number to fetch (1-based)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: Option<u32>,

    /// Items per page; the service applies its own default and maximum
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    /// Follow every page instead of returning one
    #[arg(long, conflicts_with = "page")]
    pub all: bool,

    /// Filter by account ID
    #[arg(long)]
    pub account: Option<String>,

    /// Filter by user ID (account-users)
    #[arg(long)]
    pub user: Option<String>,

    /// Filter by environment ID (workspaces, policy-groups)
    #[arg(long)]
    pub environment: Option<String>,

    /// Filter by name
    #[arg(long)]
    pub name: Option<String>,

    /// Filter by email (users)
    #[arg(long)]
    pub email: Option<String>,

    /// Filter by status (users)
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    /// Related resources to embed, comma separated
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,
}
