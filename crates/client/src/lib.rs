//! # Serialized client
//!
//! Async client for the Serialized event-sourcing API.
//!
//! ## Overview
//!
//! Every method on [`Client`] is a single request to the provider:
//!
//! 1. Feeds: list feeds, read pages with a `since` cursor, stream entries
//! 2. Aggregates: store and load events
//! 3. Projections: manage definitions and read single or aggregated projections
//! 4. Reactions: register and list webhook rules
//!
//! A response with any status other than the one the endpoint returns on success
//! becomes [`Error::UnexpectedStatus`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use futures_util::TryStreamExt;
//! use serialized_client::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Client::new(ClientConfig::from_env()?)?;
//!
//!     let mut entries = std::pin::pin!(client.feed_entries("payment", 0));
//!     while let Some(entry) = entries.try_next().await? {
//!         println!("{} {}", entry.sequence_number, entry.aggregate_id);
//!     }
//!
//!     client
//!         .create_reaction(&Reaction {
//!             id: uuid::Uuid::new_v4().to_string(),
//!             name: "PaymentProcessedEmailReaction".to_string(),
//!             feed: "payment".to_string(),
//!             event_type: "PaymentProcessed".to_string(),
//!             action: Action {
//!                 http_method: "POST".to_string(),
//!                 target_uri: "https://your-webhook".to_string(),
//!                 body: "A new payment was processed".to_string(),
//!                 action_type: "HTTP".to_string(),
//!             },
//!         })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod projection;
pub mod reaction;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, Result};

pub mod prelude {
    pub use crate::aggregate::*;
    pub use crate::client::Client;
    pub use crate::config::ClientConfig;
    pub use crate::error::*;
    pub use crate::event::*;
    pub use crate::feed::*;
    pub use crate::projection::*;
    pub use crate::reaction::*;
}
