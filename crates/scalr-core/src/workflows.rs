//! Example workflows - fixed multi-step sequences over the resource handlers
//!
//! Each workflow builds options, calls create or list, inspects the result
//! and then updates or deletes using the id it got back. The first failing
//! call stops the workflow; the error names the step that failed. Nothing
//! is retried and nothing already created is rolled back.
//!
//! ```rust,ignore
//! use scalr_core::workflows::{WorkspaceExample, workspace_lifecycle};
//!
//! let ctx = Context::background().with_timeout(Duration::from_secs(30));
//! let report = workspace_lifecycle(&client, &ctx, &WorkspaceExample::new("example-ws", "env-1")).await?;
//! for step in &report.steps {
//!     println!("{}: {}", step.step, step.detail);
//! }
//! ```

use crate::client::ScalrClient;
use crate::context::Context;
use crate::error::{Result, ScalrError};
use crate::pagination::Page;
use crate::resources::{
    AccountUser, AccountUserListOptions, EnvironmentCreateOptions, EnvironmentListOptions,
    EnvironmentUpdateOptions, PolicyGroupCreateOptions, PolicyGroupUpdateOptions, TeamCreateOptions,
    TeamUpdateOptions, User, UserListOptions, VcsRepo, WorkspaceCreateOptions,
    WorkspaceUpdateOptions,
};
use serde::Serialize;
use std::future::Future;
use thiserror::Error;
use tracing::{debug, info};

/// A workflow call failed; `step` names which one
#[derive(Error, Debug)]
#[error("{step} failed: {source}")]
pub struct WorkflowError {
    pub step: &'static str,
    #[source]
    pub source: ScalrError,
}

pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;

/// One completed step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub detail: String,
}

/// What a lifecycle workflow did, in order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowReport {
    pub workflow: &'static str,
    pub steps: Vec<StepRecord>,
}

impl WorkflowReport {
    fn new(workflow: &'static str) -> Self {
        Self {
            workflow,
            steps: Vec::new(),
        }
    }

    fn record(&mut self, step: &'static str, id: Option<&str>, detail: String) {
        info!(workflow = self.workflow, step, id = id.unwrap_or("-"), "{}", detail);
        self.steps.push(StepRecord {
            step,
            id: id.map(str::to_string),
            detail,
        });
    }

    /// Names of the completed steps
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.step).collect()
    }

    async fn run<T>(
        &self,
        step: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> WorkflowResult<T> {
        debug!(workflow = self.workflow, step, "Running step");
        call.await.map_err(|source| {
            debug!(workflow = self.workflow, step, error = %source, "Step failed");
            WorkflowError { step, source }
        })
    }
}

async fn single_step<T>(
    workflow: &'static str,
    step: &'static str,
    call: impl Future<Output = Result<T>>,
) -> WorkflowResult<T> {
    WorkflowReport::new(workflow).run(step, call).await
}

/// Inputs for [`workspace_lifecycle`]
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceExample {
    pub name: String,
    pub environment: String,
    /// Terraform version set by the update step
    pub terraform_version: String,
    /// Skip the final delete
    pub keep: bool,
}

impl WorkspaceExample {
    pub fn new(name: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            environment: environment.into(),
            terraform_version: "0.12.28".to_string(),
            keep: false,
        }
    }

    #[must_use]
    pub fn with_terraform_version(mut self, version: impl Into<String>) -> Self {
        self.terraform_version = version.into();
        self
    }

    #[must_use]
    pub fn with_keep(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }
}

/// Create a workspace, read it back, turn off auto-apply and pin the
/// Terraform version, read it again, then delete it
pub async fn workspace_lifecycle(
    client: &ScalrClient,
    ctx: &Context,
    example: &WorkspaceExample,
) -> WorkflowResult<WorkflowReport> {
    let handler = client.workspaces();
    let mut report = WorkflowReport::new("workspace");

    let options = WorkspaceCreateOptions::new(&example.name, &example.environment);
    let created = report
        .run("create workspace", handler.create(ctx, &options))
        .await?;
    report.record(
        "create workspace",
        Some(created.id.as_str()),
        format!("created '{}' in {}", created.name, example.environment),
    );

    let read = report
        .run("read workspace", handler.read(ctx, &created.id))
        .await?;
    report.record(
        "read workspace",
        Some(read.id.as_str()),
        format!("name={} auto_apply={}", read.name, read.auto_apply),
    );

    let update = WorkspaceUpdateOptions::new()
        .with_auto_apply(false)
        .with_terraform_version(&example.terraform_version);
    let updated = report
        .run("update workspace", handler.update(ctx, &created.id, &update))
        .await?;
    report.record(
        "update workspace",
        Some(updated.id.as_str()),
        format!(
            "auto_apply={} terraform_version={}",
            updated.auto_apply,
            updated.terraform_version.as_deref().unwrap_or("-")
        ),
    );

    let reread = report
        .run("read updated workspace", handler.read(ctx, &created.id))
        .await?;
    report.record(
        "read updated workspace",
        Some(reread.id.as_str()),
        format!(
            "auto_apply={} terraform_version={} environment={}",
            reread.auto_apply,
            reread.terraform_version.as_deref().unwrap_or("-"),
            reread
                .environment
                .as_ref()
                .map(|e| e.id.as_str())
                .unwrap_or("-")
        ),
    );

    if !example.keep {
        report
            .run("delete workspace", handler.delete(ctx, &created.id))
            .await?;
        report.record("delete workspace", Some(created.id.as_str()), "deleted".to_string());
    }

    Ok(report)
}

/// Inputs for [`policy_group_lifecycle`]
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyGroupExample {
    pub name: String,
    pub account: String,
    pub vcs_provider: String,
    pub vcs_repo: VcsRepo,
    pub opa_version: Option<String>,
    /// Environment to link the group to while it exists
    pub environment: Option<String>,
    pub keep: bool,
}

impl PolicyGroupExample {
    pub fn new(
        name: impl Into<String>,
        account: impl Into<String>,
        vcs_provider: impl Into<String>,
        vcs_repo: VcsRepo,
    ) -> Self {
        Self {
            name: name.into(),
            account: account.into(),
            vcs_provider: vcs_provider.into(),
            vcs_repo,
            opa_version: None,
            environment: None,
            keep: false,
        }
    }

    #[must_use]
    pub fn with_opa_version(mut self, version: impl Into<String>) -> Self {
        self.opa_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    #[must_use]
    pub fn with_keep(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }
}

/// Create a policy group, optionally link it to an environment, rename it,
/// then unlink and delete it
pub async fn policy_group_lifecycle(
    client: &ScalrClient,
    ctx: &Context,
    example: &PolicyGroupExample,
) -> WorkflowResult<WorkflowReport> {
    let groups = client.policy_groups();
    let environments = client.environments();
    let mut report = WorkflowReport::new("policy-group");

    let mut options = PolicyGroupCreateOptions::new(
        &example.name,
        &example.account,
        &example.vcs_provider,
        example.vcs_repo.clone(),
    );
    if let Some(version) = &example.opa_version {
        options = options.with_opa_version(version);
    }
    let group = report
        .run("create policy group", groups.create(ctx, &options))
        .await?;
    report.record(
        "create policy group",
        Some(group.id.as_str()),
        format!(
            "created '{}' from {} (status {})",
            group.name,
            example.vcs_repo.identifier,
            group.status.as_deref().unwrap_or("unknown")
        ),
    );

    // Ids linked before this workflow touched the environment
    let mut previous_links = None;
    if let Some(environment_id) = &example.environment {
        let environment = report
            .run("read environment", environments.read(ctx, environment_id))
            .await?;
        let existing: Vec<String> = environment
            .policy_groups
            .iter()
            .map(|g| g.id.clone())
            .collect();
        report.record(
            "read environment",
            Some(environment.id.as_str()),
            format!("{} policy group(s) linked", existing.len()),
        );

        let mut linked = existing.clone();
        linked.push(group.id.clone());
        let update = EnvironmentUpdateOptions::new().with_policy_groups(linked);
        let environment = report
            .run(
                "link policy group",
                environments.update(ctx, environment_id, &update),
            )
            .await?;
        report.record(
            "link policy group",
            Some(environment.id.as_str()),
            format!("linked {} to {}", group.id, environment.name),
        );
        previous_links = Some(existing);
    }

    let update = PolicyGroupUpdateOptions::new().with_name(format!("{}-renamed", example.name));
    let renamed = report
        .run("update policy group", groups.update(ctx, &group.id, &update))
        .await?;
    report.record(
        "update policy group",
        Some(renamed.id.as_str()),
        format!("renamed to '{}'", renamed.name),
    );

    if !example.keep {
        if let (Some(environment_id), Some(existing)) = (&example.environment, previous_links) {
            let update = EnvironmentUpdateOptions::new().with_policy_groups(existing);
            report
                .run(
                    "unlink policy group",
                    environments.update(ctx, environment_id, &update),
                )
                .await?;
            report.record(
                "unlink policy group",
                Some(environment_id.as_str()),
                format!("unlinked {}", group.id),
            );
        }

        report
            .run("delete policy group", groups.delete(ctx, &group.id))
            .await?;
        report.record("delete policy group", Some(group.id.as_str()), "deleted".to_string());
    }

    Ok(report)
}

/// Inputs for [`team_lifecycle`]
#[derive(Debug, Clone, PartialEq)]
pub struct TeamExample {
    pub name: String,
    pub account: String,
    pub description: Option<String>,
    /// Initial members
    pub users: Vec<String>,
    pub keep: bool,
}

impl TeamExample {
    pub fn new(name: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            account: account.into(),
            description: None,
            users: Vec::new(),
            keep: false,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.users.push(user.into());
        self
    }

    #[must_use]
    pub fn with_keep(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }
}

/// Create a team with its initial members, change its description, read it
/// back with members embedded, then delete it
pub async fn team_lifecycle(
    client: &ScalrClient,
    ctx: &Context,
    example: &TeamExample,
) -> WorkflowResult<WorkflowReport> {
    let handler = client.teams();
    let mut report = WorkflowReport::new("team");

    let mut options = TeamCreateOptions::new(&example.name, &example.account);
    if let Some(description) = &example.description {
        options = options.with_description(description);
    }
    for user in &example.users {
        options = options.with_user(user);
    }
    let team = report
        .run("create team", handler.create(ctx, &options))
        .await?;
    report.record(
        "create team",
        Some(team.id.as_str()),
        format!("created '{}' with {} member(s)", team.name, team.users.len()),
    );

    let update = TeamUpdateOptions::new().with_description(format!("{} (updated)", team.name));
    let updated = report
        .run("update team", handler.update(ctx, &team.id, &update))
        .await?;
    report.record(
        "update team",
        Some(updated.id.as_str()),
        format!(
            "description={}",
            updated.description.as_deref().unwrap_or("-")
        ),
    );

    let include = ["users".to_string()];
    let read = report
        .run("read team", handler.read_with(ctx, &team.id, &include))
        .await?;
    let members: Vec<String> = read
        .users
        .iter()
        .map(|u| match &u.resource {
            Some(user) => user.email.clone(),
            None => u.id.clone(),
        })
        .collect();
    report.record(
        "read team",
        Some(read.id.as_str()),
        format!("members: [{}]", members.join(", ")),
    );

    if !example.keep {
        report
            .run("delete team", handler.delete(ctx, &team.id))
            .await?;
        report.record("delete team", Some(team.id.as_str()), "deleted".to_string());
    }

    Ok(report)
}

/// Inputs for [`environment_lifecycle`]
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentExample {
    pub name: String,
    pub account: String,
    pub keep: bool,
}

impl EnvironmentExample {
    pub fn new(name: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            account: account.into(),
            keep: false,
        }
    }

    #[must_use]
    pub fn with_keep(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }
}

/// Create an environment, enable cost estimation, find it again through a
/// filtered list, then delete it
pub async fn environment_lifecycle(
    client: &ScalrClient,
    ctx: &Context,
    example: &EnvironmentExample,
) -> WorkflowResult<WorkflowReport> {
    let handler = client.environments();
    let mut report = WorkflowReport::new("environment");

    let options = EnvironmentCreateOptions::new(&example.name, &example.account)
        .with_cost_estimation(false);
    let environment = report
        .run("create environment", handler.create(ctx, &options))
        .await?;
    report.record(
        "create environment",
        Some(environment.id.as_str()),
        format!("created '{}' in {}", environment.name, example.account),
    );

    let update = EnvironmentUpdateOptions::new().with_cost_estimation(true);
    let updated = report
        .run(
            "update environment",
            handler.update(ctx, &environment.id, &update),
        )
        .await?;
    report.record(
        "update environment",
        Some(updated.id.as_str()),
        format!("cost_estimation_enabled={}", updated.cost_estimation_enabled),
    );

    let filter = EnvironmentListOptions::new()
        .with_account(&example.account)
        .with_name(&example.name)
        .with_page_size(10);
    let page = report
        .run("list environments", handler.list(ctx, &filter))
        .await?;
    report.record(
        "list environments",
        None,
        format!(
            "{} of {} matching environment(s), found created: {}",
            page.len(),
            page.total_count(),
            page.iter().any(|e| e.id == environment.id)
        ),
    );

    if !example.keep {
        report
            .run("delete environment", handler.delete(ctx, &environment.id))
            .await?;
        report.record(
            "delete environment",
            Some(environment.id.as_str()),
            "deleted".to_string(),
        );
    }

    Ok(report)
}

/// List one page of users
pub async fn list_users(
    client: &ScalrClient,
    ctx: &Context,
    options: &UserListOptions,
) -> WorkflowResult<Page<User>> {
    let page = single_step("users", "list users", client.users().list(ctx, options)).await?;
    info!(
        items = page.len(),
        total = page.total_count(),
        page = page.current_page(),
        "Listed users"
    );
    Ok(page)
}

/// List one page of account-user relations
pub async fn list_account_users(
    client: &ScalrClient,
    ctx: &Context,
    options: &AccountUserListOptions,
) -> WorkflowResult<Page<AccountUser>> {
    let page = single_step(
        "account-users",
        "list account users",
        client.account_users().list(ctx, options),
    )
    .await?;
    info!(
        items = page.len(),
        total = page.total_count(),
        page = page.current_page(),
        "Listed account users"
    );
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_error_names_step() {
        let err = WorkflowError {
            step: "update workspace",
            source: ScalrError::NotFound {
                message: "Workspace not found".to_string(),
            },
        };
        assert!(err.to_string().starts_with("update workspace failed"));
        assert!(err.source.is_not_found());
    }

    #[tokio::test]
    async fn test_run_maps_error_to_step() {
        let report = WorkflowReport::new("test");
        let result: WorkflowResult<()> = report
            .run("read thing", async { Err(ScalrError::Cancelled) })
            .await;
        let err = result.unwrap_err();
        assert_eq!(err.step, "read thing");
        assert!(matches!(err.source, ScalrError::Cancelled));
    }

    #[test]
    fn test_record_keeps_order() {
        let mut report = WorkflowReport::new("test");
        report.record("first", Some("ws-1"), "one".to_string());
        report.record("second", None, "two".to_string());
        assert_eq!(report.step_names(), vec!["first", "second"]);
        assert_eq!(report.steps[1].id, None);
    }

    #[test]
    fn test_example_defaults() {
        let example = WorkspaceExample::new("example-ws", "env-1");
        assert_eq!(example.terraform_version, "0.12.28");
        assert!(!example.keep);

        let example = TeamExample::new("dev", "acc-1").with_user("user-1");
        assert_eq!(example.users, vec!["user-1".to_string()]);
    }
}
