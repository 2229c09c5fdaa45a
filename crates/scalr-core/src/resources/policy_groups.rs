//! Policy groups: OPA policies pulled from a VCS repository

use super::{Account, Environment, VcsProvider, include_query, member_path};
use crate::client::{ScalrClient, validate_id};
use crate::context::Context;
use crate::error::Result;
use crate::jsonapi::{Included, Related, Resource, ResourceObject};
use crate::pagination::{ListOptions, ListQuery, Page, push_filter, push_include};
use serde::{Deserialize, Serialize};
use tracing::instrument;

const COLLECTION: &str = "policy-groups";

/// Location of the policies inside a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsRepo {
    /// `org/repo`
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl VcsRepo {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            branch: None,
            path: None,
        }
    }

    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyGroup {
    pub id: String,
    pub name: String,
    pub status: Option<String>,
    pub error_message: Option<String>,
    pub opa_version: Option<String>,
    pub vcs_repo: Option<VcsRepo>,
    pub account: Option<Related<Account>>,
    pub vcs_provider: Option<Related<VcsProvider>>,
    pub environments: Vec<Related<Environment>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct PolicyGroupAttributes {
    name: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    opa_version: Option<String>,
    #[serde(default)]
    vcs_repo: Option<VcsRepo>,
}

impl Resource for PolicyGroup {
    const TYPE: &'static str = "policy-groups";

    fn from_object(object: ResourceObject, included: &Included) -> Result<Self> {
        let attrs: PolicyGroupAttributes = object.attributes()?;
        Ok(Self {
            id: object.require_id()?,
            name: attrs.name,
            status: attrs.status,
            error_message: attrs.error_message,
            opa_version: attrs.opa_version,
            vcs_repo: attrs.vcs_repo,
            account: object.to_one("account", included)?,
            vcs_provider: object.to_one("vcs-provider", included)?,
            environments: object.to_many("environments", included)?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct PolicyGroupWriteAttributes<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    opa_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vcs_repo: Option<&'a VcsRepo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyGroupCreateOptions {
    pub name: String,
    pub account: String,
    pub vcs_provider: String,
    pub vcs_repo: VcsRepo,
    pub opa_version: Option<String>,
}

impl PolicyGroupCreateOptions {
    #[must_use]
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
        }
    }

    #[must_use]
    pub fn with_opa_version(mut self, version: impl Into<String>) -> Self {
        self.opa_version = Some(version.into());
        self
    }

    fn to_object(&self) -> Result<ResourceObject> {
        let attributes = PolicyGroupWriteAttributes {
            name: Some(&self.name),
            opa_version: self.opa_version.as_deref(),
            vcs_repo: Some(&self.vcs_repo),
        };
        Ok(ResourceObject::new(PolicyGroup::TYPE)
            .attributes_from(&attributes)?
            .relate_one("account", Account::TYPE, &self.account)
            .relate_one("vcs-provider", VcsProvider::TYPE, &self.vcs_provider))
    }
}

/// All fields are optional - only set fields you want to change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyGroupUpdateOptions {
    pub name: Option<String>,
    pub opa_version: Option<String>,
    pub vcs_repo: Option<VcsRepo>,
    pub vcs_provider: Option<String>,
}

impl PolicyGroupUpdateOptions {
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
    pub fn with_opa_version(mut self, version: impl Into<String>) -> Self {
        self.opa_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_vcs_repo(mut self, repo: VcsRepo) -> Self {
        self.vcs_repo = Some(repo);
        self
    }

    #[must_use]
    pub fn with_vcs_provider(mut self, provider: impl Into<String>) -> Self {
        self.vcs_provider = Some(provider.into());
        self
    }

    fn to_object(&self, id: &str) -> Result<ResourceObject> {
        let attributes = PolicyGroupWriteAttributes {
            name: self.name.as_deref(),
            opa_version: self.opa_version.as_deref(),
            vcs_repo: self.vcs_repo.as_ref(),
        };
        let mut object = ResourceObject::with_id(PolicyGroup::TYPE, id).attributes_from(&attributes)?;
        if let Some(provider) = &self.vcs_provider {
            object = object.relate_one("vcs-provider", VcsProvider::TYPE, provider);
        }
        Ok(object)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyGroupListOptions {
    pub list: ListOptions,
    pub account: Option<String>,
    pub environment: Option<String>,
    pub name: Option<String>,
    pub include: Vec<String>,
}

impl PolicyGroupListOptions {
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
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
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

impl ListQuery for PolicyGroupListOptions {
    fn list_options(&self) -> &ListOptions {
        &self.list
    }

    fn list_options_mut(&mut self) -> &mut ListOptions {
        &mut self.list
    }

    fn filters(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_filter(&mut pairs, "account", self.account.as_deref());
        push_filter(&mut pairs, "environment", self.environment.as_deref());
        push_filter(&mut pairs, "name", self.name.as_deref());
        push_include(&mut pairs, &self.include);
        pairs
    }
}

#[derive(Debug, Clone)]
pub struct PolicyGroupHandler {
    client: ScalrClient,
}

impl PolicyGroupHandler {
    pub fn new(client: ScalrClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, ctx, options), fields(name = %options.name))]
    pub async fn create(&self, ctx: &Context, options: &PolicyGroupCreateOptions) -> Result<PolicyGroup> {
        validate_id("account", &options.account)?;
        validate_id("vcs provider", &options.vcs_provider)?;
        self.client
            .create(ctx, COLLECTION, options.to_object()?)
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn read(&self, ctx: &Context, id: &str) -> Result<PolicyGroup> {
        self.read_with(ctx, id, &[]).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn read_with(&self, ctx: &Context, id: &str, include: &[String]) -> Result<PolicyGroup> {
        validate_id("policy group", id)?;
        self.client
            .get(ctx, &member_path(COLLECTION, id), &include_query(include))
            .await
    }

    #[instrument(skip(self, ctx, options))]
    pub async fn update(
        &self,
        ctx: &Context,
        id: &str,
        options: &PolicyGroupUpdateOptions,
    ) -> Result<PolicyGroup> {
        validate_id("policy group", id)?;
        self.client
            .update(ctx, &member_path(COLLECTION, id), options.to_object(id)?)
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &Context, id: &str) -> Result<()> {
        validate_id("policy group", id)?;
        self.client.delete(ctx, &member_path(COLLECTION, id)).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(&self, ctx: &Context, options: &PolicyGroupListOptions) -> Result<Page<PolicyGroup>> {
        self.client.list_page(ctx, COLLECTION, options).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_all(
        &self,
        ctx: &Context,
        options: &PolicyGroupListOptions,
    ) -> Result<Vec<PolicyGroup>> {
        self.client.list_all(ctx, COLLECTION, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_body() {
        let repo = VcsRepo::new("org/policies").with_path("cost");
        let object = PolicyGroupCreateOptions::new("cost-policies", "acc-1", "vcs-1", repo)
            .to_object()
            .unwrap();
        let body = serde_json::to_value(&object).unwrap();

        assert_eq!(
            body["attributes"],
            json!({"name": "cost-policies", "vcs-repo": {"identifier": "org/policies", "path": "cost"}})
        );
        assert_eq!(body["relationships"]["vcs-provider"]["data"]["id"], "vcs-1");
    }

    #[test]
    fn test_update_name_only() {
        let object = PolicyGroupUpdateOptions::new()
            .with_name("renamed")
            .to_object("pgrp-1")
            .unwrap();
        let body = serde_json::to_value(&object).unwrap();
        assert_eq!(body["attributes"], json!({"name": "renamed"}));
        assert!(body.get("relationships").is_none());
    }

    #[test]
    fn test_decode_errored_policy_group() {
        let object: ResourceObject = serde_json::from_value(json!({
            "type": "policy-groups",
            "id": "pgrp-1",
            "attributes": {
                "name": "cost-policies",
                "status": "errored",
                "error-message": "policy path not found",
                "vcs-repo": {"identifier": "org/policies", "branch": "main", "path": null}
            },
            "relationships": {
                "environments": {"data": [{"type": "environments", "id": "env-1"}]},
                "vcs-provider": {"data": {"type": "vcs-providers", "id": "vcs-1"}}
            }
        }))
        .unwrap();

        let group = PolicyGroup::from_object(object, &Included::default()).unwrap();
        assert_eq!(group.status.as_deref(), Some("errored"));
        assert_eq!(group.error_message.as_deref(), Some("policy path not found"));
        assert_eq!(group.vcs_repo.unwrap().branch.as_deref(), Some("main"));
        assert_eq!(group.environments.len(), 1);
        assert_eq!(group.vcs_provider.unwrap().id, "vcs-1");
    }
}
