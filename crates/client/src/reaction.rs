use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    client::{Client, expect_status, json},
    error::Result,
};

/// A webhook rule: when `event_type` appears on `feed`, the provider performs `action`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reaction {
    pub id: String,
    pub name: String,
    pub feed: String,
    pub event_type: String,
    pub action: Action,
}

/// The HTTP call a reaction makes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Action {
    pub http_method: String,
    pub target_uri: String,
    pub body: String,
    pub action_type: String,
}

#[derive(Deserialize)]
struct ReactionsResponse {
    #[serde(default)]
    reactions: Vec<Reaction>,
}

impl Client {
    /// Registers a new reaction. The provider answers `201 Created`.
    pub async fn create_reaction(&self, reaction: &Reaction) -> Result<()> {
        let url = self.endpoint(["reactions"])?;
        expect_status(self.post(url, reaction).await?, StatusCode::CREATED).await?;
        Ok(())
    }

    /// Returns all registered reactions.
    pub async fn list_reactions(&self) -> Result<Vec<Reaction>> {
        let url = self.endpoint(["reactions"])?;
        let response = expect_status(self.get(url).await?, StatusCode::OK).await?;
        let ReactionsResponse { reactions } = json(response).await?;
        Ok(reactions)
    }

    /// Removes the reaction with `id`.
    pub async fn delete_reaction(&self, id: &str) -> Result<()> {
        let url = self.endpoint(["reactions", id])?;
        expect_status(self.delete(url).await?, StatusCode::OK).await?;
        Ok(())
    }
}
