//! Example workflow command implementations

use crate::cli::{ExampleCommands, OutputFormat};
use crate::commands::list::print_page;
use crate::error::ScalrCtlError;
use crate::output;
use colored::Colorize;
use scalr_core::workflows::{
    self, EnvironmentExample, PolicyGroupExample, TeamExample, WorkspaceExample,
};
use scalr_core::{
    AccountUserListOptions, Context, ScalrClient, UserListOptions, VcsRepo, WorkflowReport,
};
use tracing::debug;

/// Handle example workflow commands
pub async fn handle_example_command(
    client: &ScalrClient,
    ctx: &Context,
    example_cmd: &ExampleCommands,
    output_format: OutputFormat,
) -> Result<(), ScalrCtlError> {
    use ExampleCommands::*;

    debug!("Running example: {:?}", example_cmd);
    match example_cmd {
        Workspace {
            environment,
            name,
            terraform_version,
            keep,
        } => {
            let example = WorkspaceExample::new(name, environment)
                .with_terraform_version(terraform_version)
                .with_keep(*keep);
            let report = workflows::workspace_lifecycle(client, ctx, &example).await?;
            print_report(&report, output_format)
        }
        PolicyGroup {
            account,
            vcs_provider,
            repo,
            branch,
            path,
            opa_version,
            environment,
            name,
            keep,
        } => {
            let mut vcs_repo = VcsRepo::new(repo);
            if let Some(branch) = branch {
                vcs_repo = vcs_repo.with_branch(branch);
            }
            if let Some(path) = path {
                vcs_repo = vcs_repo.with_path(path);
            }
            let mut example =
                PolicyGroupExample::new(name, account, vcs_provider, vcs_repo).with_keep(*keep);
            if let Some(version) = opa_version {
                example = example.with_opa_version(version);
            }
            if let Some(environment) = environment {
                example = example.with_environment(environment);
            }
            let report = workflows::policy_group_lifecycle(client, ctx, &example).await?;
            print_report(&report, output_format)
        }
        Team {
            account,
            name,
            description,
            users,
            keep,
        } => {
            let mut example = TeamExample::new(name, account).with_keep(*keep);
            if let Some(description) = description {
                example = example.with_description(description);
            }
            for user in users {
                example = example.with_user(user);
            }
            let report = workflows::team_lifecycle(client, ctx, &example).await?;
            print_report(&report, output_format)
        }
        Environment {
            account,
            name,
            keep,
        } => {
            let example = EnvironmentExample::new(name, account).with_keep(*keep);
            let report = workflows::environment_lifecycle(client, ctx, &example).await?;
            print_report(&report, output_format)
        }
        Users {
            page,
            page_size,
            email,
            status,
        } => {
            let mut options = UserListOptions::new().with_page_size(*page_size);
            if let Some(page) = page {
                options = options.with_page_number(*page);
            }
            if let Some(email) = email {
                options = options.with_email(email);
            }
            if let Some(status) = status {
                options = options.with_status((*status).into());
            }
            let page = workflows::list_users(client, ctx, &options).await?;
            print_page(page, output_format)
        }
        AccountUsers {
            account,
            user,
            include,
            page,
            page_size,
        } => {
            let mut options = AccountUserListOptions::new().with_page_size(*page_size);
            if let Some(page) = page {
                options = options.with_page_number(*page);
            }
            if let Some(account) = account {
                options = options.with_account(account);
            }
            if let Some(user) = user {
                options = options.with_user(user);
            }
            for related in include {
                options = options.with_include(related);
            }
            let page = workflows::list_account_users(client, ctx, &options).await?;
            print_page(page, output_format)
        }
    }
}

fn print_report(report: &WorkflowReport, output_format: OutputFormat) -> Result<(), ScalrCtlError> {
    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => {
            output::print_output(report, output_format.resolve(output::OutputFormat::Json))?;
        }
        OutputFormat::Table => {
            output::print_output(&report.steps, output::OutputFormat::Table)?;
        }
        OutputFormat::Auto => {
            println!("{} workflow", report.workflow.bold());
            for step in &report.steps {
                let id = step
                    .id
                    .as_deref()
                    .map(|id| format!(" [{}]", id))
                    .unwrap_or_default();
                println!("  {} {}{}: {}", "ok".green(), step.step, id, step.detail);
            }
        }
    }
    Ok(())
}
