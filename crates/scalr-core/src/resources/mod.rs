//! Typed resources and their per-collection handlers
//!
//! Each submodule defines a record type, its create/update/list options,
//! and a handler exposing `create`, `read`, `update`, `delete` and `list`.
//! Handlers are obtained from [`ScalrClient`]:
//!
//! ```rust,ignore
//! let ctx = Context::background();
//! let page = client.users().list(&ctx, &UserListOptions::new().with_page_size(20)).await?;
//! ```

pub mod account_users;
pub mod environments;
pub mod policy_groups;
pub mod teams;
pub mod users;
pub mod workspaces;

pub use account_users::*;
pub use environments::*;
pub use policy_groups::*;
pub use teams::*;
pub use users::*;
pub use workspaces::*;

use crate::client::ScalrClient;
use crate::error::Result;
use crate::jsonapi::{Included, Resource, ResourceObject};
use serde::{Deserialize, Serialize};

impl ScalrClient {
    pub fn account_users(&self) -> AccountUserHandler {
        AccountUserHandler::new(self.clone())
    }

    pub fn environments(&self) -> EnvironmentHandler {
        EnvironmentHandler::new(self.clone())
    }

    pub fn policy_groups(&self) -> PolicyGroupHandler {
        PolicyGroupHandler::new(self.clone())
    }

    pub fn teams(&self) -> TeamHandler {
        TeamHandler::new(self.clone())
    }

    pub fn users(&self) -> UserHandler {
        UserHandler::new(self.clone())
    }

    pub fn workspaces(&self) -> WorkspaceHandler {
        WorkspaceHandler::new(self.clone())
    }
}

/// `collection/id`
pub(crate) fn member_path(collection: &str, id: &str) -> String {
    format!("{collection}/{id}")
}

/// Query pairs for a read that embeds related resources
pub(crate) fn include_query(include: &[String]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    crate::pagination::push_include(&mut pairs, include);
    pairs
}

/// Account; only ever seen as a related resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct AccountAttributes {
    #[serde(default)]
    name: Option<String>,
}

impl Resource for Account {
    const TYPE: &'static str = "accounts";

    fn from_object(object: ResourceObject, _included: &Included) -> Result<Self> {
        let attrs: AccountAttributes = object.attributes()?;
        Ok(Self {
            id: object.require_id()?,
            name: attrs.name,
        })
    }
}

/// VCS provider connection referenced by policy groups
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VcsProvider {
    pub id: String,
    pub name: Option<String>,
    pub vcs_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct VcsProviderAttributes {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    vcs_type: Option<String>,
}

impl Resource for VcsProvider {
    const TYPE: &'static str = "vcs-providers";

    fn from_object(object: ResourceObject, _included: &Included) -> Result<Self> {
        let attrs: VcsProviderAttributes = object.attributes()?;
        Ok(Self {
            id: object.require_id()?,
            name: attrs.name,
            vcs_type: attrs.vcs_type,
        })
    }
}
