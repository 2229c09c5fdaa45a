//! Teams: named groups of users within an account

use super::{Account, User, include_query, member_path};
use crate::client::{ScalrClient, validate_id};
use crate::context::Context;
use crate::error::Result;
use crate::jsonapi::{Included, Related, Resource, ResourceObject};
use crate::pagination::{ListOptions, ListQuery, Page, push_filter, push_include};
use serde::{Deserialize, Serialize};
use tracing::instrument;

const COLLECTION: &str = "teams";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub account: Option<Related<Account>>,
    pub users: Vec<Related<User>>,
}

#[derive(Deserialize)]
struct TeamAttributes {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

impl Resource for Team {
    const TYPE: &'static str = "teams";

    fn from_object(object: ResourceObject, included: &Included) -> Result<Self> {
        let attrs: TeamAttributes = object.attributes()?;
        Ok(Self {
            id: object.require_id()?,
            name: attrs.name,
            description: attrs.description,
            account: object.to_one("account", included)?,
            users: object.to_many("users", included)?,
        })
    }
}

#[derive(Serialize)]
struct TeamWriteAttributes<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamCreateOptions {
    pub name: String,
    pub account: String,
    pub description: Option<String>,
    /// Initial members
    pub users: Vec<String>,
}

impl TeamCreateOptions {
    #[must_use]
    pub fn new(name: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            account: account.into(),
            description: None,
            users: Vec::new(),
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

    fn to_object(&self) -> Result<ResourceObject> {
        let attributes = TeamWriteAttributes {
            name: Some(&self.name),
            description: self.description.as_deref(),
        };
        let mut object = ResourceObject::new(Team::TYPE)
            .attributes_from(&attributes)?
            .relate_one("account", Account::TYPE, &self.account);
        if !self.users.is_empty() {
            object = object.relate_many("users", User::TYPE, self.users.iter().cloned());
        }
        Ok(object)
    }
}

/// All fields are optional - only set fields you want to change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamUpdateOptions {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Replaces the member list when set
    pub users: Option<Vec<String>>,
}

impl TeamUpdateOptions {
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
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users = Some(users.into_iter().map(Into::into).collect());
        self
    }

    fn to_object(&self, id: &str) -> Result<ResourceObject> {
        let attributes = TeamWriteAttributes {
            name: self.name.as_deref(),
            description: self.description.as_deref(),
        };
        let mut object = ResourceObject::with_id(Team::TYPE, id).attributes_from(&attributes)?;
        if let Some(users) = &self.users {
            object = object.relate_many("users", User::TYPE, users.iter().cloned());
        }
        Ok(object)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamListOptions {
    pub list: ListOptions,
    pub account: Option<String>,
    pub name: Option<String>,
    pub include: Vec<String>,
}

impl TeamListOptions {
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

impl ListQuery for TeamListOptions {
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
pub struct TeamHandler {
    client: ScalrClient,
}

impl TeamHandler {
    pub fn new(client: ScalrClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, ctx, options), fields(name = %options.name))]
    pub async fn create(&self, ctx: &Context, options: &TeamCreateOptions) -> Result<Team> {
        validate_id("account", &options.account)?;
        for user in &options.users {
            validate_id("user", user)?;
        }
        self.client
            .create(ctx, COLLECTION, options.to_object()?)
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn read(&self, ctx: &Context, id: &str) -> Result<Team> {
        self.read_with(ctx, id, &[]).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn read_with(&self, ctx: &Context, id: &str, include: &[String]) -> Result<Team> {
        validate_id("team", id)?;
        self.client
            .get(ctx, &member_path(COLLECTION, id), &include_query(include))
            .await
    }

    #[instrument(skip(self, ctx, options))]
    pub async fn update(&self, ctx: &Context, id: &str, options: &TeamUpdateOptions) -> Result<Team> {
        validate_id("team", id)?;
        self.client
            .update(ctx, &member_path(COLLECTION, id), options.to_object(id)?)
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &Context, id: &str) -> Result<()> {
        validate_id("team", id)?;
        self.client.delete(ctx, &member_path(COLLECTION, id)).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(&self, ctx: &Context, options: &TeamListOptions) -> Result<Page<Team>> {
        self.client.list_page(ctx, COLLECTION, options).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_all(&self, ctx: &Context, options: &TeamListOptions) -> Result<Vec<Team>> {
        self.client.list_all(ctx, COLLECTION, options).await
    }
}
