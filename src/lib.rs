//! Client library for the NixOS package and option search backend
//!
//! This crate turns high-level search intents into weighted, filtered,
//! paginated queries against the remote document-search service behind
//! search.nixos.org, and resolves human-friendly release-channel names
//! (`stable`, `beta`, `unstable`, `flakes`) into the backend's
//! versioned index names.
//!
//! - **Channels**: [`Channel`] classification and symbolic-name
//!   resolution against the discovered channel set
//! - **Query builders**: [`PackageQuery`] and [`OptionQuery`] assemble
//!   field-weighted dismax queries with faceted aggregations
//! - **Resilience**: transient failures retry with capped exponential
//!   backoff; backend rejections surface as a single typed error
//! - **Facade**: [`SearchClient`] hands out builders and caches
//!   discovered channels for the process lifetime
//!
//! # Example
//!
//! ```no_run
//! use nix_search_client::{ClientConfig, SearchClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SearchClient::new(ClientConfig::default())?;
//!     let channel = client.resolve_channel("stable").await?;
//!
//!     let results = client
//!         .packages()
//!         .for_channel(channel)
//!         .with_query(Some("ripgrep"))
//!         .page(0, 20)?
//!         .execute()
//!         .await?;
//!
//!     println!("{} packages match", results.total);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod channel;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod tool;

pub use channel::Channel;
pub use client::SearchClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use models::{FacetCount, License, Maintainer, NixOption, Package, SearchResults};
pub use query::{OptionQuery, PackageQuery, SortOrder};
pub use tool::ToolEnvelope;
