//! Example workflow commands

use clap::Subcommand;

use super::list::StatusArg;

#[derive(Subcommand, Debug, Clone)]
pub enum ExampleCommands {
    /// Create, read, update and delete a workspace
    #[command(visible_alias = "ws")]
    #[command(after_help = "EXAMPLES:
    # Run the full lifecycle in env-1
    scalrctl example workspace --environment env-1

    # Keep the workspace afterwards
    scalrctl example workspace --environment env-1 --name demo --keep
")]
    Workspace {
        /// Environment that owns the workspace
        #[arg(long)]
        environment: String,

        /// Workspace name
        #[arg(long, default_value = "example-ws")]
        name: String,

        /// Terraform version pinned by the update step
        #[arg(long, default_value = "0.12.28")]
        terraform_version: String,

        /// Skip the final delete
        #[arg(long)]
        keep: bool,
    },

    /// Create a policy group, link it to an environment, rename and delete it
    #[command(visible_alias = "pg")]
    PolicyGroup {
        /// Account that owns the policy group
        #[arg(long)]
        account: String,

        /// VCS provider ID
        #[arg(long)]
        vcs_provider: String,

        /// Repository identifier, e.g. org/policies
        #[arg(long)]
        repo: String,

        /// Repository branch
        #[arg(long)]
        branch: Option<String>,

        /// Path to the policies inside the repository
        #[arg(long)]
        path: Option<String>,

        /// OPA version
        #[arg(long)]
        opa_version: Option<String>,

        /// Environment to link while the group exists
        #[arg(long)]
        environment: Option<String>,

        /// Policy group name
        #[arg(long, default_value = "example-policy-group")]
        name: String,

        /// Skip the final delete
        #[arg(long)]
        keep: bool,
    },

    /// Create a team with members, update it and delete it
    Team {
        /// Account that owns the team
        #[arg(long)]
        account: String,

        /// Team name
        #[arg(long, default_value = "example-team")]
        name: String,

        /// Team description
        #[arg(long)]
        description: Option<String>,

        /// Initial member user ID (repeatable)
        #[arg(long = "user")]
        users: Vec<String>,

        /// Skip the final delete
        #[arg(long)]
        keep: bool,
    },

    /// Create an environment, enable cost estimation, find it and delete it
    #[command(visible_alias = "env")]
    Environment {
        /// Account that owns the environment
        #[arg(long)]
        account: String,

        /// Environment name
        #[arg(long, default_value = "example-env")]
        name: String,

        /// Skip the final delete
        #[arg(long)]
        keep: bool,
    },

    /// List one page of users
    Users {
        /// Page number to fetch
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,

        /// Items per page
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
        page_size: u32,

        /// Filter by email
        #[arg(long)]
        email: Option<String>,

        /// Filter by status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    /// List one page of account-user relations
    AccountUsers {
        /// Filter by account ID
        #[arg(long)]
        account: Option<String>,

        /// Filter by user ID
        #[arg(long)]
        user: Option<String>,

        /// Related resources to embed, comma separated
        #[arg(long, value_delimiter = ',', default_value = "user")]
        include: Vec<String>,

        /// Page number to fetch
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,

        /// Items per page
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
        page_size: u32,
    },
}
