//! # scalr-core
//!
//! Typed client for the Scalr infrastructure-management API, shared by the
//! `scalrctl` CLI.
//!
//! ## Layers
//!
//! - **Transport** ([`ScalrClient`]) - bearer auth, JSON:API media types and
//!   error mapping. One call is one HTTP request; nothing is retried.
//! - **List contract** ([`pagination`]) - [`ListOptions`] selects a page,
//!   per-resource list options add `filter[...]` and `include`, and every
//!   list call returns exactly one [`Page`]. `list_all` is the opt-in walk.
//! - **Resources** ([`resources`]) - workspaces, environments, teams, users,
//!   policy groups and account-user relations, each with create / read /
//!   update / delete / list.
//! - **Workflows** ([`workflows`]) - the example sequences that exercise
//!   the above.
//! - **Config** ([`config`]) - named profiles in a TOML file.
//!
//! Every remote call takes a [`Context`] carrying an optional deadline and a
//! cancellation token.
//!
//! ## Example
//!
//! ```rust,no_run
//! use scalr_core::{ClientConfig, Context, ScalrClient, UserListOptions};
//! use std::time::Duration;
//!
//! # async fn example() -> scalr_core::Result<()> {
//! let client = ScalrClient::new(ClientConfig::from_env())?;
//! let ctx = Context::background().with_timeout(Duration::from_secs(30));
//!
//! let page = client
//!     .users()
//!     .list(&ctx, &UserListOptions::new().with_page_size(20))
//!     .await?;
//! println!("{} of {} users", page.len(), page.total_count());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod jsonapi;
pub mod pagination;
pub mod resources;
pub mod workflows;

pub use client::{ClientConfig, ScalrClient};
pub use config::{Config, Profile};
pub use context::Context;
pub use error::{Result, ScalrError};
pub use jsonapi::{Related, Resource};
pub use pagination::{ListOptions, ListQuery, Page, Pagination};
pub use resources::*;
pub use workflows::{WorkflowError, WorkflowReport, WorkflowResult};
