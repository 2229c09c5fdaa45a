//! `scalrctl list <resource>`: one page of a collection, or every page with --all

use crate::cli::{ListArgs, OutputFormat, ResourceKind};
use crate::error::ScalrCtlError;
use crate::output;
use scalr_core::{
    AccountUserListOptions, Context, EnvironmentListOptions, Page, PolicyGroupListOptions,
    ScalrClient, TeamListOptions, UserListOptions, WorkspaceListOptions,
};
use serde::Serialize;
use tracing::{debug, info};

/// Options for one collection, built from the command line
#[derive(Debug, Clone, PartialEq)]
pub enum ListRequest {
    Workspaces(WorkspaceListOptions),
    Environments(EnvironmentListOptions),
    Teams(TeamListOptions),
    Users(UserListOptions),
    PolicyGroups(PolicyGroupListOptions),
    AccountUsers(AccountUserListOptions),
}

/// Reject filters the collection does not support
fn ensure_unset(
    resource: ResourceKind,
    flag: &str,
    present: bool,
) -> Result<(), ScalrCtlError> {
    if present {
        return Err(ScalrCtlError::InvalidInput {
            message: format!("--{} does not apply to {}", flag, resource.collection()),
        });
    }
    Ok(())
}

impl ListRequest {
    /// Build the options for `args.resource`
    ///
    /// Unset flags stay unset; a flag the collection has no filter for is an
    /// error rather than silently ignored.
    pub fn from_args(args: &ListArgs) -> Result<Self, ScalrCtlError> {
        let resource = args.resource;
        let unsupported = |flag: &str, present: bool| ensure_unset(resource, flag, present);

        let request = match resource {
            ResourceKind::Workspaces => {
                unsupported("account", args.account.is_some())?;
                unsupported("user", args.user.is_some())?;
                unsupported("email", args.email.is_some())?;
                unsupported("status", args.status.is_some())?;
                let mut options = WorkspaceListOptions::new();
                options.list = page_options(args);
                options.environment = args.environment.clone();
                options.name = args.name.clone();
                options.include = args.include.clone();
                ListRequest::Workspaces(options)
            }
            ResourceKind::Environments => {
                unsupported("user", args.user.is_some())?;
                unsupported("environment", args.environment.is_some())?;
                unsupported("email", args.email.is_some())?;
                unsupported("status", args.status.is_some())?;
                let mut options = EnvironmentListOptions::new();
                options.list = page_options(args);
                options.account = args.account.clone();
                options.name = args.name.clone();
                options.include = args.include.clone();
                ListRequest::Environments(options)
            }
            ResourceKind::Teams => {
                unsupported("user", args.user.is_some())?;
                unsupported("environment", args.environment.is_some())?;
                unsupported("email", args.email.is_some())?;
                unsupported("status", args.status.is_some())?;
                let mut options = TeamListOptions::new();
                options.list = page_options(args);
                options.account = args.account.clone();
                options.name = args.name.clone();
                options.include = args.include.clone();
                ListRequest::Teams(options)
            }
            ResourceKind::Users => {
                unsupported("account", args.account.is_some())?;
                unsupported("user", args.user.is_some())?;
                unsupported("environment", args.environment.is_some())?;
                unsupported("name", args.name.is_some())?;
                let mut options = UserListOptions::new();
                options.list = page_options(args);
                options.email = args.email.clone();
                options.status = args.status.map(Into::into);
                options.include = args.include.clone();
                ListRequest::Users(options)
            }
            ResourceKind::PolicyGroups => {
                unsupported("user", args.user.is_some())?;
                unsupported("email", args.email.is_some())?;
                unsupported("status", args.status.is_some())?;
                let mut options = PolicyGroupListOptions::new();
                options.list = page_options(args);
                options.account = args.account.clone();
                options.environment = args.environment.clone();
                options.name = args.name.clone();
                options.include = args.include.clone();
                ListRequest::PolicyGroups(options)
            }
            ResourceKind::AccountUsers => {
                unsupported("environment", args.environment.is_some())?;
                unsupported("name", args.name.is_some())?;
                unsupported("email", args.email.is_some())?;
                unsupported("status", args.status.is_some())?;
                let mut options = AccountUserListOptions::new();
                options.list = page_options(args);
                options.account = args.account.clone();
                options.user = args.user.clone();
                options.include = args.include.clone();
                ListRequest::AccountUsers(options)
            }
        };
        Ok(request)
    }
}

fn page_options(args: &ListArgs) -> scalr_core::ListOptions {
    let mut options = scalr_core::ListOptions::new();
    options.page_number = args.page;
    options.page_size = args.page_size;
    options
}

/// Handle `list`
pub async fn handle_list_command(
    client: &ScalrClient,
    ctx: &Context,
    args: &ListArgs,
    output_format: OutputFormat,
) -> Result<(), ScalrCtlError> {
    let request = ListRequest::from_args(args)?;
    debug!(?request, all = args.all, "Listing {}", args.resource.collection());

    match request {
        ListRequest::Workspaces(options) => {
            let handler = client.workspaces();
            if args.all {
                print_all(handler.list_all(ctx, &options).await?, output_format)
            } else {
                print_page(handler.list(ctx, &options).await?, output_format)
            }
        }
        ListRequest::Environments(options) => {
            let handler = client.environments();
            if args.all {
                print_all(handler.list_all(ctx, &options).await?, output_format)
            } else {
                print_page(handler.list(ctx, &options).await?, output_format)
            }
        }
        ListRequest::Teams(options) => {
            let handler = client.teams();
            if args.all {
                print_all(handler.list_all(ctx, &options).await?, output_format)
            } else {
                print_page(handler.list(ctx, &options).await?, output_format)
            }
        }
        ListRequest::Users(options) => {
            let handler = client.users();
            if args.all {
                print_all(handler.list_all(ctx, &options).await?, output_format)
            } else {
                print_page(handler.list(ctx, &options).await?, output_format)
            }
        }
        ListRequest::PolicyGroups(options) => {
            let handler = client.policy_groups();
            if args.all {
                print_all(handler.list_all(ctx, &options).await?, output_format)
            } else {
                print_page(handler.list(ctx, &options).await?, output_format)
            }
        }
        ListRequest::AccountUsers(options) => {
            let handler = client.account_users();
            if args.all {
                print_all(handler.list_all(ctx, &options).await?, output_format)
            } else {
                print_page(handler.list(ctx, &options).await?, output_format)
            }
        }
    }
}

/// Print one page: the whole page for JSON/YAML, the items plus a footer otherwise
pub fn print_page<T: Serialize>(
    page: Page<T>,
    output_format: OutputFormat,
) -> Result<(), ScalrCtlError> {
    info!(
        items = page.len(),
        total = page.total_count(),
        page = page.current_page(),
        "Listed page"
    );

    if output_format.is_structured() {
        output::print_output(&page, output_format.resolve(output::OutputFormat::Json))?;
        return Ok(());
    }

    if page.is_empty() {
        println!("No results.");
    } else {
        output::print_output(&page.items, output::OutputFormat::Table)?;
    }
    println!("{}", page_footer(&page));
    Ok(())
}

fn print_all<T: Serialize>(
    items: Vec<T>,
    output_format: OutputFormat,
) -> Result<(), ScalrCtlError> {
    info!(items = items.len(), "Listed every page");

    if output_format.is_structured() {
        let output_data = serde_json::json!({
            "items": items,
            "count": items.len(),
        });
        output::print_output(&output_data, output_format.resolve(output::OutputFormat::Json))?;
        return Ok(());
    }

    if items.is_empty() {
        println!("No results.");
    } else {
        output::print_output(&items, output::OutputFormat::Table)?;
    }
    println!("{} item(s)", items.len());
    Ok(())
}

fn page_footer<T>(page: &Page<T>) -> String {
    let mut footer = format!(
        "Page {} of {} ({} total)",
        page.current_page(),
        page.pagination.total_pages.max(1),
        page.total_count()
    );
    if let Some(next) = page.next_page() {
        footer.push_str(&format!(", next: --page {}", next));
    }
    footer
}
