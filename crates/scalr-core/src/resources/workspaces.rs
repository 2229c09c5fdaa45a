//! Workspaces
//!
//! A workspace belongs to exactly one environment and holds the Terraform
//! settings for a single configuration.
//!
//! # Example
//!
//! ```rust,ignore
//! use scalr_core::{Context, WorkspaceCreateOptions, WorkspaceUpdateOptions};
//!
//! let ctx = Context::background();
//! let ws = client
//!     .workspaces()
//!     .create(&ctx, &WorkspaceCreateOptions::new("example-ws", "env-1"))
//!     .await?;
//!
//! // Only the fields set here are sent; everything else stays as it was.
//! let ws = client
//!     .workspaces()
//!     .update(
//!         &ctx,
//!         &ws.id,
//!         &WorkspaceUpdateOptions::new()
//!             .with_auto_apply(false)
//!             .with_terraform_version("0.12.28"),
//!     )
//!     .await?;
//! ```

use super::{Environment, include_query, member_path};
use crate::client::{ScalrClient, validate_id};
use crate::context::Context;
use crate::error::Result;
use crate::jsonapi::{Included, Related, Resource, ResourceObject};
use crate::pagination::{ListOptions, ListQuery, Page, push_filter, push_include};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

const COLLECTION: &str = "workspaces";

/// Where Terraform runs for a workspace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Remote,
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub auto_apply: bool,
    pub operations: bool,
    pub execution_mode: ExecutionMode,
    pub terraform_version: Option<String>,
    pub working_directory: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub environment: Option<Related<Environment>>,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct WorkspaceAttributes {
    name: String,
    #[serde(default)]
    auto_apply: bool,
    #[serde(default = "default_true")]
    operations: bool,
    #[serde(default)]
    execution_mode: ExecutionMode,
    #[serde(default)]
    terraform_version: Option<String>,
    #[serde(default)]
    working_directory: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl Resource for Workspace {
    const TYPE: &'static str = "workspaces";

    fn from_object(object: ResourceObject, included: &Included) -> Result<Self> {
        let attrs: WorkspaceAttributes = object.attributes()?;
        Ok(Self {
            id: object.require_id()?,
            name: attrs.name,
            auto_apply: attrs.auto_apply,
            operations: attrs.operations,
            execution_mode: attrs.execution_mode,
            terraform_version: attrs.terraform_version,
            working_directory: attrs.working_directory,
            created_at: attrs.created_at,
            environment: object.to_one("environment", included)?,
        })
    }
}

/// Attributes sent on create and update; unset fields are omitted
#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct WorkspaceWriteAttributes<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_apply: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    operations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    execution_mode: Option<ExecutionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    terraform_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    working_directory: Option<&'a str>,
}

/// Options for creating a workspace
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceCreateOptions {
    /// Workspace name (required)
    pub name: String,
    /// Environment the workspace is created in (required)
    pub environment: String,
    pub auto_apply: Option<bool>,
    pub operations: Option<bool>,
    pub execution_mode: Option<ExecutionMode>,
    pub terraform_version: Option<String>,
    /// Directory, relative to the repository root, Terraform runs in
    pub working_directory: Option<String>,
}

impl WorkspaceCreateOptions {
    #[must_use]
    pub fn new(name: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            environment: environment.into(),
            auto_apply: None,
            operations: None,
            execution_mode: None,
            terraform_version: None,
            working_directory: None,
        }
    }

    #[must_use]
    pub fn with_auto_apply(mut self, auto_apply: bool) -> Self {
        self.auto_apply = Some(auto_apply);
        self
    }

    #[must_use]
    pub fn with_operations(mut self, operations: bool) -> Self {
        self.operations = Some(operations);
        self
    }

    #[must_use]
    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn with_terraform_version(mut self, version: impl Into<String>) -> Self {
        self.terraform_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_working_directory(mut self, directory: impl Into<String>) -> Self {
        self.working_directory = Some(directory.into());
        self
    }

    fn to_object(&self) -> Result<ResourceObject> {
        let attributes = WorkspaceWriteAttributes {
            name: Some(&self.name),
            auto_apply: self.auto_apply,
            operations: self.operations,
            execution_mode: self.execution_mode,
            terraform_version: self.terraform_version.as_deref(),
            working_directory: self.working_directory.as_deref(),
        };
        Ok(ResourceObject::new(Workspace::TYPE)
            .attributes_from(&attributes)?
            .relate_one("environment", Environment::TYPE, &self.environment))
    }
}

/// Options for updating a workspace
///
/// All fields are optional - only set fields you want to change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceUpdateOptions {
    pub name: Option<String>,
    pub auto_apply: Option<bool>,
    pub operations: Option<bool>,
    pub execution_mode: Option<ExecutionMode>,
    pub terraform_version: Option<String>,
    pub working_directory: Option<String>,
}

impl WorkspaceUpdateOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_auto_apply(mut self, auto_apply: bool) -> Self {
        self.auto_apply = Some(auto_apply);
        self
    }

    #[must_use]
    pub fn with_operations(mut self, operations: bool) -> Self {
        self.operations = Some(operations);
        self
    }

    #[must_use]
    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn with_terraform_version(mut self, version: impl Into<String>) -> Self {
        self.terraform_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_working_directory(mut self, directory: impl Into<String>) -> Self {
        self.working_directory = Some(directory.into());
        self
    }

    /// Check if any fields are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn to_object(&self, id: &str) -> Result<ResourceObject> {
        let attributes = WorkspaceWriteAttributes {
            name: self.name.as_deref(),
            auto_apply: self.auto_apply,
            operations: self.operations,
            execution_mode: self.execution_mode,
            terraform_version: self.terraform_version.as_deref(),
            working_directory: self.working_directory.as_deref(),
        };
        ResourceObject::with_id(Workspace::TYPE, id).attributes_from(&attributes)
    }
}

/// Filters for listing workspaces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceListOptions {
    pub list: ListOptions,
    /// Only workspaces in this environment
    pub environment: Option<String>,
    /// Only workspaces with this exact name
    pub name: Option<String>,
    /// Related resources to embed, e.g. `environment`
    pub include: Vec<String>,
}

impl WorkspaceListOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page_number(mut self, page_number: u32) -> Self {
        self.list.page_number = Some(page_number);
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.list.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_include(mut self, related: impl Into<String>) -> Self {
        self.include.push(related.into());
        self
    }
}

impl ListQuery for WorkspaceListOptions {
    fn list_options(&self) -> &ListOptions {
        &self.list
    }

    fn list_options_mut(&mut self) -> &mut ListOptions {
        &mut self.list
    }

    fn filters(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_filter(&mut pairs, "environment", self.environment.as_deref());
        push_filter(&mut pairs, "name", self.name.as_deref());
        push_include(&mut pairs, &self.include);
        pairs
    }
}

/// Workspace operations
#[derive(Debug, Clone)]
pub struct WorkspaceHandler {
    client: ScalrClient,
}

impl WorkspaceHandler {
    pub fn new(client: ScalrClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, ctx, options), fields(name = %options.name))]
    pub async fn create(&self, ctx: &Context, options: &WorkspaceCreateOptions) -> Result<Workspace> {
        validate_id("environment", &options.environment)?;
        self.client
            .create(ctx, COLLECTION, options.to_object()?)
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn read(&self, ctx: &Context, id: &str) -> Result<Workspace> {
        self.read_with(ctx, id, &[]).await
    }

    /// Read a workspace, embedding the named related resources
    #[instrument(skip(self, ctx))]
    pub async fn read_with(&self, ctx: &Context, id: &str, include: &[String]) -> Result<Workspace> {
        validate_id("workspace", id)?;
        self.client
            .get(ctx, &member_path(COLLECTION, id), &include_query(include))
            .await
    }

    #[instrument(skip(self, ctx, options))]
    pub async fn update(
        &self,
        ctx: &Context,
        id: &str,
        options: &WorkspaceUpdateOptions,
    ) -> Result<Workspace> {
        validate_id("workspace", id)?;
        self.client
            .update(ctx, &member_path(COLLECTION, id), options.to_object(id)?)
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &Context, id: &str) -> Result<()> {
        validate_id("workspace", id)?;
        self.client.delete(ctx, &member_path(COLLECTION, id)).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(&self, ctx: &Context, options: &WorkspaceListOptions) -> Result<Page<Workspace>> {
        self.client.list_page(ctx, COLLECTION, options).await
    }

    /// Every workspace matching the filters, across all pages
    #[instrument(skip(self, ctx))]
    pub async fn list_all(&self, ctx: &Context, options: &WorkspaceListOptions) -> Result<Vec<Workspace>> {
        self.client.list_all(ctx, COLLECTION, options).await
    }
}
