use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    client::{Client, expect_status, json},
    error::Result,
    event::Event,
};

/// The full event history of one aggregate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Aggregate {
    pub aggregate_id: String,
    pub aggregate_type: String,
    pub aggregate_version: i64,
    pub events: Vec<Event>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoreEventsRequest<'a> {
    events: &'a [Event],
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_version: Option<i64>,
}

impl Client {
    /// Appends `events` to an aggregate.
    ///
    /// With `expected_version` set, the provider rejects the write if the aggregate has
    /// moved past that version.
    pub async fn store_events(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
        events: &[Event],
        expected_version: Option<i64>,
    ) -> Result<()> {
        let url = self.endpoint(["aggregates", aggregate_type, aggregate_id, "events"])?;
        let body = StoreEventsRequest {
            events,
            expected_version,
        };
        expect_status(self.post(url, &body).await?, StatusCode::OK).await?;
        Ok(())
    }

    /// Returns every event stored for the aggregate.
    pub async fn load_aggregate(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Result<Aggregate> {
        let url = self.endpoint(["aggregates", aggregate_type, aggregate_id])?;
        let response = expect_status(self.get(url).await?, StatusCode::OK).await?;
        json(response).await
    }

    /// Returns whether the provider has any events for the aggregate.
    pub async fn aggregate_exists(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Result<bool> {
        let url = self.endpoint(["aggregates", aggregate_type, aggregate_id])?;
        let response = self.head(url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        expect_status(response, StatusCode::OK).await?;
        Ok(true)
    }
}
