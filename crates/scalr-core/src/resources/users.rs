//! Users

use super::{Team, include_query, member_path};
use crate::client::{ScalrClient, validate_id};
use crate::context::Context;
use crate::error::Result;
use crate::jsonapi::{Included, Related, Resource, ResourceObject};
use crate::pagination::{ListOptions, ListQuery, Page, push_filter, push_include};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

const COLLECTION: &str = "users";

/// Status shared by users and account-user relations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    Active,
    Inactive,
    Pending,
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Active => write!(f, "Active"),
            UserStatus::Inactive => write!(f, "Inactive"),
            UserStatus::Pending => write!(f, "Pending"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub status: Option<UserStatus>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub teams: Vec<Related<Team>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct UserAttributes {
    email: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    status: Option<UserStatus>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    last_login: Option<DateTime<Utc>>,
}

impl Resource for User {
    const TYPE: &'static str = "users";

    fn from_object(object: ResourceObject, included: &Included) -> Result<Self> {
        let attrs: UserAttributes = object.attributes()?;
        Ok(Self {
            id: object.require_id()?,
            email: attrs.email,
            username: attrs.username,
            full_name: attrs.full_name,
            status: attrs.status,
            created_at: attrs.created_at,
            last_login: attrs.last_login,
            teams: object.to_many("teams", included)?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct UserWriteAttributes<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<UserStatus>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserCreateOptions {
    pub email: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
}

impl UserCreateOptions {
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            username: None,
            full_name: None,
        }
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    fn to_object(&self) -> Result<ResourceObject> {
        ResourceObject::new(User::TYPE).attributes_from(&UserWriteAttributes {
            email: Some(&self.email),
            username: self.username.as_deref(),
            full_name: self.full_name.as_deref(),
            status: None,
        })
    }
}

/// All fields are optional - only set fields you want to change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdateOptions {
    pub full_name: Option<String>,
    pub status: Option<UserStatus>,
}

impl UserUpdateOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }

    fn to_object(&self, id: &str) -> Result<ResourceObject> {
        ResourceObject::with_id(User::TYPE, id).attributes_from(&UserWriteAttributes {
            email: None,
            username: None,
            full_name: self.full_name.as_deref(),
            status: self.status,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserListOptions {
    pub list: ListOptions,
    pub email: Option<String>,
    pub status: Option<UserStatus>,
    pub include: Vec<String>,
}

impl UserListOptions {
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
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_include(mut self, related: impl Into<String>) -> Self {
        self.include.push(related.into());
        self
    }
}

impl ListQuery for UserListOptions {
    fn list_options(&self) -> &ListOptions {
        &self.list
    }

    fn list_options_mut(&mut self) -> &mut ListOptions {
        &mut self.list
    }

    fn filters(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let status = self.status.map(|s| s.to_string());
        push_filter(&mut pairs, "email", self.email.as_deref());
        push_filter(&mut pairs, "status", status.as_deref());
        push_include(&mut pairs, &self.include);
        pairs
    }
}

#[derive(Debug, Clone)]
pub struct UserHandler {
    client: ScalrClient,
}

impl UserHandler {
    pub fn new(client: ScalrClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, ctx, options))]
    pub async fn create(&self, ctx: &Context, options: &UserCreateOptions) -> Result<User> {
        self.client
            .create(ctx, COLLECTION, options.to_object()?)
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn read(&self, ctx: &Context, id: &str) -> Result<User> {
        self.read_with(ctx, id, &[]).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn read_with(&self, ctx: &Context, id: &str, include: &[String]) -> Result<User> {
        validate_id("user", id)?;
        self.client
            .get(ctx, &member_path(COLLECTION, id), &include_query(include))
            .await
    }

    #[instrument(skip(self, ctx, options))]
    pub async fn update(&self, ctx: &Context, id: &str, options: &UserUpdateOptions) -> Result<User> {
        validate_id("user", id)?;
        self.client
            .update(ctx, &member_path(COLLECTION, id), options.to_object(id)?)
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &Context, id: &str) -> Result<()> {
        validate_id("user", id)?;
        self.client.delete(ctx, &member_path(COLLECTION, id)).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(&self, ctx: &Context, options: &UserListOptions) -> Result<Page<User>> {
        self.client.list_page(ctx, COLLECTION, options).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_all(&self, ctx: &Context, options: &UserListOptions) -> Result<Vec<User>> {
        self.client.list_all(ctx, COLLECTION, options).await
    }
}
