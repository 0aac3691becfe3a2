use reqwest::StatusCode;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    client::{Client, expect_status, json},
    error::Result,
};

/// A read model computed by the provider from a feed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    #[serde(
        rename = "projectionId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Projection {
    /// Deserializes the projection data. Missing data is treated as JSON `null`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        let data = self.data.clone().unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }
}

/// Describes how the provider builds a projection from a feed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionDefinition {
    #[serde(
        rename = "projectionName",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub name: String,
    #[serde(rename = "feedName", default, skip_serializing_if = "String::is_empty")]
    pub feed: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub handlers: Vec<EventHandler>,
}

/// The functions applied to a projection when an event of `event_type` arrives.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHandler {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<Function>,
}

/// A provider-side projection function, such as `set`, `inc` or `push`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub function: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target_selector: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub event_selector: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target_filter: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub event_filter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<Value>,
}

impl EventHandler {
    /// Creates a handler for `event_type` with no functions.
    pub fn new(event_type: impl Into<String>) -> Self {
        EventHandler {
            event_type: event_type.into(),
            functions: Vec::new(),
        }
    }

    /// Appends a function to run when the event arrives.
    pub fn function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }
}

impl Function {
    /// Creates a function by provider name, e.g. `set` or `inc`.
    pub fn new(function: impl Into<String>) -> Self {
        Function {
            function: function.into(),
            ..Default::default()
        }
    }

    /// JSONPath into the projection the function writes to.
    pub fn target_selector(mut self, selector: impl Into<String>) -> Self {
        self.target_selector = selector.into();
        self
    }

    /// JSONPath into the event the function reads from.
    pub fn event_selector(mut self, selector: impl Into<String>) -> Self {
        self.event_selector = selector.into();
        self
    }

    /// Restricts the function to projection elements matching the filter.
    pub fn target_filter(mut self, filter: impl Into<String>) -> Self {
        self.target_filter = filter.into();
        self
    }

    /// Runs the function only for events matching the filter.
    pub fn event_filter(mut self, filter: impl Into<String>) -> Self {
        self.event_filter = filter.into();
        self
    }

    /// Literal value the function uses instead of event data.
    pub fn raw_data(mut self, raw_data: Value) -> Self {
        self.raw_data = Some(raw_data);
        self
    }
}

#[derive(Deserialize)]
struct DefinitionsResponse {
    #[serde(default)]
    definitions: Vec<ProjectionDefinition>,
}

#[derive(Deserialize)]
struct ProjectionsResponse {
    #[serde(default)]
    projections: Vec<Projection>,
}

impl Client {
    /// Returns every projection definition.
    pub async fn list_projection_definitions(&self) -> Result<Vec<ProjectionDefinition>> {
        let url = self.endpoint(["projections", "definitions"])?;
        let response = expect_status(self.get(url).await?, StatusCode::OK).await?;
        let DefinitionsResponse { definitions } = json(response).await?;
        Ok(definitions)
    }

    /// Registers a new projection definition.
    pub async fn create_projection_definition(
        &self,
        definition: &ProjectionDefinition,
    ) -> Result<()> {
        let url = self.endpoint(["projections", "definitions"])?;
        expect_status(self.post(url, definition).await?, StatusCode::OK).await?;
        Ok(())
    }

    /// Returns the projection definition called `name`.
    pub async fn projection_definition(&self, name: &str) -> Result<ProjectionDefinition> {
        let url = self.endpoint(["projections", "definitions", name])?;
        let response = expect_status(self.get(url).await?, StatusCode::OK).await?;
        json(response).await
    }

    /// Deletes the projection definition called `name`.
    pub async fn delete_projection_definition(&self, name: &str) -> Result<()> {
        let url = self.endpoint(["projections", "definitions", name])?;
        expect_status(self.delete(url).await?, StatusCode::OK).await?;
        Ok(())
    }

    /// Returns the single projection `projection_name` for one aggregate.
    pub async fn single_projection(
        &self,
        projection_name: &str,
        aggregate_id: &str,
    ) -> Result<Projection> {
        let url = self.endpoint(["projections", "single", projection_name, aggregate_id])?;
        let response = expect_status(self.get(url).await?, StatusCode::OK).await?;
        json(response).await
    }

    /// Returns every aggregate's instance of the single projection `name`.
    pub async fn list_single_projections(&self, name: &str) -> Result<Vec<Projection>> {
        let url = self.endpoint(["projections", "single", name])?;
        let response = expect_status(self.get(url).await?, StatusCode::OK).await?;
        let ProjectionsResponse { projections } = json(response).await?;
        Ok(projections)
    }

    /// Returns the aggregated projection `name`.
    pub async fn aggregated_projection(&self, name: &str) -> Result<Projection> {
        let url = self.endpoint(["projections", "aggregated", name])?;
        let response = expect_status(self.get(url).await?, StatusCode::OK).await?;
        json(response).await
    }

    /// Returns every aggregated projection.
    pub async fn list_aggregated_projections(&self) -> Result<Vec<Projection>> {
        let url = self.endpoint(["projections", "aggregated"])?;
        let response = expect_status(self.get(url).await?, StatusCode::OK).await?;
        let ProjectionsResponse { projections } = json(response).await?;
        Ok(projections)
    }
}
