//! Environments group workspaces inside an account

use super::{Account, PolicyGroup, include_query, member_path};
use crate::client::{ScalrClient, validate_id};
use crate::context::Context;
use crate::error::Result;
use crate::jsonapi::{Included, Related, Resource, ResourceObject};
use crate::pagination::{ListOptions, ListQuery, Page, push_filter, push_include};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

const COLLECTION: &str = "environments";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Environment {
    pub id: String,
    pub name: String,
    pub status: Option<String>,
    pub cost_estimation_enabled: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub account: Option<Related<Account>>,
    pub policy_groups: Vec<Related<PolicyGroup>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct EnvironmentAttributes {
    name: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    cost_estimation_enabled: bool,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl Resource for Environment {
    const TYPE: &'static str = "environments";

    fn from_object(object: ResourceObject, included: &Included) -> Result<Self> {
        let attrs: EnvironmentAttributes = object.attributes()?;
        Ok(Self {
            id: object.require_id()?,
            name: attrs.name,
            status: attrs.status,
            cost_estimation_enabled: attrs.cost_estimation_enabled,
            created_at: attrs.created_at,
            account: object.to_one("account", included)?,
            policy_groups: object.to_many("policy-groups", included)?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct EnvironmentWriteAttributes<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost_estimation_enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentCreateOptions {
    pub name: String,
    /// Owning account (required)
    pub account: String,
    pub cost_estimation_enabled: Option<bool>,
    /// Policy groups to link; `None` leaves the service default
    pub policy_groups: Option<Vec<String>>,
}

impl EnvironmentCreateOptions {
    #[must_use]
    pub fn new(name: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            account: account.into(),
            cost_estimation_enabled: None,
            policy_groups: None,
        }
    }

    #[must_use]
    pub fn with_cost_estimation(mut self, enabled: bool) -> Self {
        self.cost_estimation_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn with_policy_groups<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy_groups = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    fn to_object(&self) -> Result<ResourceObject> {
        let attributes = EnvironmentWriteAttributes {
            name: Some(&self.name),
            cost_estimation_enabled: self.cost_estimation_enabled,
        };
        let mut object = ResourceObject::new(Environment::TYPE)
            .attributes_from(&attributes)?
            .relate_one("account", Account::TYPE, &self.account);
        if let Some(groups) = &self.policy_groups {
            object = object.relate_many("policy-groups", PolicyGroup::TYPE, groups.iter().cloned());
        }
        Ok(object)
    }
}

/// All fields are optional - only set fields you want to change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentUpdateOptions {
    pub name: Option<String>,
    pub cost_estimation_enabled: Option<bool>,
    /// Replaces the linked policy groups when set; `Some(vec![])` unlinks all
    pub policy_groups: Option<Vec<String>>,
}

impl EnvironmentUpdateOptions {
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
    pub fn with_cost_estimation(mut self, enabled: bool) -> Self {
        self.cost_estimation_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn with_policy_groups<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy_groups = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    fn to_object(&self, id: &str) -> Result<ResourceObject> {
        let attributes = EnvironmentWriteAttributes {
            name: self.name.as_deref(),
            cost_estimation_enabled: self.cost_estimation_enabled,
        };
        let mut object = ResourceObject::with_id(Environment::TYPE, id).attributes_from(&attributes)?;
        if let Some(groups) = &self.policy_groups {
            object = object.relate_many("policy-groups", PolicyGroup::TYPE, groups.iter().cloned());
        }
        Ok(object)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentListOptions {
    pub list: ListOptions,
    pub account: Option<String>,
    pub name: Option<String>,
    pub include: Vec<String>,
}

impl EnvironmentListOptions {
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

impl ListQuery for EnvironmentListOptions {
    fn list_options(&self) -> &ListOptions {
        &self.list
    }

    fn list_options_mut(&mut self) -> &mut ListOptions {
        &mut self.list
    }

    fn filters(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_filter(&mut pairs, "account", self.account.as_deref());
        push_filter(&mut pairs, "name", self.name.as_deref());
        push_include(&mut pairs, &self.include);
        pairs
    }
}

#[derive(Debug, Clone)]
pub struct EnvironmentHandler {
    client: ScalrClient,
}

impl EnvironmentHandler {
    pub fn new(client: ScalrClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, ctx, options), fields(name = %options.name))]
    pub async fn create(&self, ctx: &Context, options: &EnvironmentCreateOptions) -> Result<Environment> {
        validate_id("account", &options.account)?;
        self.client
            .create(ctx, COLLECTION, options.to_object()?)
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn read(&self, ctx: &Context, id: &str) -> Result<Environment> {
        self.read_with(ctx, id, &[]).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn read_with(&self, ctx: &Context, id: &str, include: &[String]) -> Result<Environment> {
        validate_id("environment", id)?;
        self.client
            .get(ctx, &member_path(COLLECTION, id), &include_query(include))
            .await
    }

    #[instrument(skip(self, ctx, options))]
    pub async fn update(
        &self,
        ctx: &Context,
        id: &str,
        options: &EnvironmentUpdateOptions,
    ) -> Result<Environment> {
        validate_id("environment", id)?;
        self.client
            .update(ctx, &member_path(COLLECTION, id), options.to_object(id)?)
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &Context, id: &str) -> Result<()> {
        validate_id("environment", id)?;
        self.client.delete(ctx, &member_path(COLLECTION, id)).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(&self, ctx: &Context, options: &EnvironmentListOptions) -> Result<Page<Environment>> {
        self.client.list_page(ctx, COLLECTION, options).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_all(
        &self,
        ctx: &Context,
        options: &EnvironmentListOptions,
    ) -> Result<Vec<Environment>> {
        self.client.list_all(ctx, COLLECTION, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_links_account_and_policy_groups() {
        let object = EnvironmentCreateOptions::new("staging", "acc-1")
            .with_cost_estimation(false)
            .with_policy_groups(["pgrp-1"])
            .to_object()
            .unwrap();
        let body = serde_json::to_value(&object).unwrap();

        assert_eq!(body["attributes"], json!({"name": "staging", "cost-estimation-enabled": false}));
        assert_eq!(body["relationships"]["account"]["data"]["id"], "acc-1");
        assert_eq!(
            body["relationships"]["policy-groups"]["data"],
            json!([{"type": "policy-groups", "id": "pgrp-1"}])
        );
    }

    #[test]
    fn test_update_without_policy_groups_leaves_relationship_out() {
        let object = EnvironmentUpdateOptions::new()
            .with_name("prod")
            .to_object("env-1")
            .unwrap();
        let body = serde_json::to_value(&object).unwrap();
        assert!(body.get("relationships").is_none());
    }

    #[test]
    fn test_decode_environment_with_included_account() {
        let object: ResourceObject = serde_json::from_value(json!({
            "type": "environments",
            "id": "env-1",
            "attributes": {"name": "staging", "status": "Active", "cost-estimation-enabled": true},
            "relationships": {
                "account": {"data": {"type": "accounts", "id": "acc-1"}},
                "policy-groups": {"data": []}
            }
        }))
        .unwrap();
        let included = Included::new(vec![
            serde_json::from_value(json!({"type": "accounts", "id": "acc-1", "attributes": {"name": "main"}}))
                .unwrap(),
        ]);

        let env = Environment::from_object(object, &included).unwrap();
        assert!(env.cost_estimation_enabled);
        assert!(env.policy_groups.is_empty());
        let account = env.account.unwrap();
        assert_eq!(account.resource.unwrap().name.as_deref(), Some("main"));
    }
}
