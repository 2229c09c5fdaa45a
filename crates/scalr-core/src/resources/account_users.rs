//! Account-user relations: membership of a user in an account
//!
//! Listing supports filtering by account and by user, and embedding the
//! related user and teams through `include`.

use super::{Account, Team, User, UserStatus, include_query, member_path};
use crate::client::{ScalrClient, validate_id};
use crate::context::Context;
use crate::error::Result;
use crate::jsonapi::{Included, Related, Resource, ResourceObject};
use crate::pagination::{ListOptions, ListQuery, Page, push_filter, push_include};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

const COLLECTION: &str = "account-users";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountUser {
    pub id: String,
    pub status: UserStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub account: Option<Related<Account>>,
    pub user: Option<Related<User>>,
    pub teams: Vec<Related<Team>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct AccountUserAttributes {
    status: UserStatus,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl Resource for AccountUser {
    const TYPE: &'static str = "account-users";

    fn from_object(object: ResourceObject, included: &Included) -> Result<Self> {
        let attrs: AccountUserAttributes = object.attributes()?;
        Ok(Self {
            id: object.require_id()?,
            status: attrs.status,
            created_at: attrs.created_at,
            account: object.to_one("account", included)?,
            user: object.to_one("user", included)?,
            teams: object.to_many("teams", included)?,
        })
    }
}

#[derive(Serialize)]
struct AccountUserWriteAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<UserStatus>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountUserCreateOptions {
    pub account: String,
    pub user: String,
    pub teams: Vec<String>,
}

impl AccountUserCreateOptions {
    #[must_use]
    pub fn new(account: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            user: user.into(),
            teams: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.teams.push(team.into());
        self
    }

    fn to_object(&self) -> Result<ResourceObject> {
        let mut object = ResourceObject::new(AccountUser::TYPE)
            .attributes_from(&AccountUserWriteAttributes { status: None })?
            .relate_one("account", Account::TYPE, &self.account)
            .relate_one("user", User::TYPE, &self.user);
        if !self.teams.is_empty() {
            object = object.relate_many("teams", Team::TYPE, self.teams.iter().cloned());
        }
        Ok(object)
    }
}

/// All fields are optional - only set fields you want to change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountUserUpdateOptions {
    pub status: Option<UserStatus>,
    /// Replaces team membership when set
    pub teams: Option<Vec<String>>,
}

impl AccountUserUpdateOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_teams<I, S>(mut self, teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.teams = Some(teams.into_iter().map(Into::into).collect());
        self
    }

    fn to_object(&self, id: &str) -> Result<ResourceObject> {
        let mut object = ResourceObject::with_id(AccountUser::TYPE, id)
            .attributes_from(&AccountUserWriteAttributes { status: self.status })?;
        if let Some(teams) = &self.teams {
            object = object.relate_many("teams", Team::TYPE, teams.iter().cloned());
        }
        Ok(object)
    }
}

/// Filters for listing account-user relations
///
/// ```rust
/// use scalr_core::{AccountUserListOptions, ListQuery};
///
/// let options = AccountUserListOptions::new()
///     .with_account("acc-svrcncgh453bi8g")
///     .with_include("user");
/// assert!(options.to_query().contains(&("include".to_string(), "user".to_string())));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountUserListOptions {
    pub list: ListOptions,
    pub account: Option<String>,
    pub user: Option<String>,
    /// Related resources to embed: `user`, `teams`
    pub include: Vec<String>,
}

impl AccountUserListOptions {
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
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn with_include(mut self, related: impl Into<String>) -> Self {
        self.include.push(related.into());
        self
    }
}

impl ListQuery for AccountUserListOptions {
    fn list_options(&self) -> &ListOptions {
        &self.list
    }

    fn list_options_mut(&mut self) -> &mut ListOptions {
        &mut self.list
    }

    fn filters(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_filter(&mut pairs, "account", self.account.as_deref());
        push_filter(&mut pairs, "user", self.user.as_deref());
        push_include(&mut pairs, &self.include);
        pairs
    }
}

#[derive(Debug, Clone)]
pub struct AccountUserHandler {
    client: ScalrClient,
}

impl AccountUserHandler {
    pub fn new(client: ScalrClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, ctx))]
    pub async fn create(&self, ctx: &Context, options: &AccountUserCreateOptions) -> Result<AccountUser> {
        validate_id("account", &options.account)?;
        validate_id("user", &options.user)?;
        self.client
            .create(ctx, COLLECTION, options.to_object()?)
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn read(&self, ctx: &Context, id: &str) -> Result<AccountUser> {
        self.read_with(ctx, id, &[]).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn read_with(&self, ctx: &Context, id: &str, include: &[String]) -> Result<AccountUser> {
        validate_id("account user", id)?;
        self.client
            .get(ctx, &member_path(COLLECTION, id), &include_query(include))
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn update(
        &self,
        ctx: &Context,
        id: &str,
        options: &AccountUserUpdateOptions,
    ) -> Result<AccountUser> {
        validate_id("account user", id)?;
        self.client
            .update(ctx, &member_path(COLLECTION, id), options.to_object(id)?)
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &Context, id: &str) -> Result<()> {
        validate_id("account user", id)?;
        self.client.delete(ctx, &member_path(COLLECTION, id)).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(&self, ctx: &Context, options: &AccountUserListOptions) -> Result<Page<AccountUser>> {
        self.client.list_page(ctx, COLLECTION, options).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_all(
        &self,
        ctx: &Context,
        options: &AccountUserListOptions,
    ) -> Result<Vec<AccountUser>> {
        self.client.list_all(ctx, COLLECTION, options).await
    }
}
