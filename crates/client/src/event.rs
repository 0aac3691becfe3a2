use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;

/// An event as stored by the provider.
///
/// The payload is kept as raw JSON; use [`Event::data_as`] or [`Event::decode`]
/// to turn it into a typed struct.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_id: Uuid,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_data: Option<String>,
}

/// Trait for typed event payloads.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize)]
/// struct PaymentProcessed {
///     payment_id: String,
///     amount: u64,
/// }
///
/// impl DomainEvent for PaymentProcessed {
///     const EVENT_TYPE: &'static str = "PaymentProcessed";
/// }
/// ```
pub trait DomainEvent: Serialize + DeserializeOwned {
    /// The event type name as it appears in the provider.
    const EVENT_TYPE: &'static str;
}

impl Event {
    /// Creates an event with a fresh id, serializing `data` as its payload.
    pub fn new<T: Serialize + ?Sized>(event_type: impl Into<String>, data: &T) -> Result<Self> {
        Ok(Event {
            event_id: Uuid::new_v4(),
            event_type: event_type.into(),
            data: Some(serde_json::to_value(data)?),
            encrypted_data: None,
        })
    }

    /// Creates an event from a typed payload.
    pub fn from_domain<E: DomainEvent>(event: &E) -> Result<Self> {
        Self::new(E::EVENT_TYPE, event)
    }

    /// Replaces the generated event id.
    pub fn with_event_id(mut self, event_id: Uuid) -> Self {
        self.event_id = event_id;
        self
    }

    /// Deserializes the payload. A missing payload is treated as JSON `null`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        let data = self.data.clone().unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    /// Attempt to deserialize the payload into `E`.
    ///
    /// Returns `None` if the event type does not match `E`,
    /// or `Some(Err(...))` if deserialization fails.
    pub fn decode<E: DomainEvent>(&self) -> Option<Result<E>> {
        if self.event_type != E::EVENT_TYPE {
            return None;
        }

        Some(self.data_as())
    }
}
