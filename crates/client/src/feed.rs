use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use futures_util::{Stream, stream};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    client::{Client, expect_status, json},
    error::{Error, Result},
    event::Event,
};

pub const CURRENT_SEQUENCE_NUMBER_HEADER: &str = "Current-Sequence-Number";

/// A page of a feed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    #[serde(default)]
    pub entries: Vec<FeedEntry>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_sequence_number: Option<i64>,
}

/// The events one aggregate stored in a single request, at a position in the feed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedEntry {
    pub sequence_number: i64,
    pub aggregate_id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub events: Vec<Event>,
}

impl FeedEntry {
    /// The entry timestamp, or `None` if it is out of range.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

#[derive(Deserialize)]
struct FeedsResponse {
    #[serde(default)]
    feeds: Vec<String>,
}

impl Client {
    /// Returns the names of all feeds.
    pub async fn feeds(&self) -> Result<Vec<String>> {
        let url = self.endpoint(["feeds"])?;
        let response = expect_status(self.get(url).await?, StatusCode::OK).await?;
        let FeedsResponse { feeds } = json(response).await?;
        Ok(feeds)
    }

    /// Returns the page of `name` following sequence number `since`.
    ///
    /// A `since` of zero or less reads from the start of the feed.
    pub async fn feed(&self, name: &str, since: i64) -> Result<Feed> {
        let mut url = self.endpoint(["feeds", name])?;
        if since > 0 {
            url.query_pairs_mut().append_pair("since", &since.to_string());
        }

        let response = expect_status(self.get(url).await?, StatusCode::OK).await?;
        json(response).await
    }

    /// Returns the sequence number at the head of `name`.
    pub async fn feed_sequence_number(&self, name: &str) -> Result<i64> {
        let url = self.endpoint(["feeds", name])?;
        let response = expect_status(self.head(url).await?, StatusCode::OK).await?;

        let value = response
            .headers()
            .get(CURRENT_SEQUENCE_NUMBER_HEADER)
            .and_then(|value| value.to_str().ok());
        value
            .and_then(|value| value.trim().parse().ok())
            .ok_or_else(|| Error::InvalidHeader {
                name: CURRENT_SEQUENCE_NUMBER_HEADER,
                value: value.map(str::to_string),
            })
    }

    /// Streams every entry of `name` after `since`, requesting further pages while the
    /// provider reports more are available.
    ///
    /// The stream ends after yielding the first error.
    pub fn feed_entries(
        &self,
        name: impl Into<String>,
        since: i64,
    ) -> impl Stream<Item = Result<FeedEntry>> + Send + 'static {
        let state = FeedCursor {
            client: self.clone(),
            name: name.into(),
            since,
            buffered: VecDeque::new(),
            exhausted: false,
        };

        stream::try_unfold(state, FeedCursor::advance)
    }
}

struct FeedCursor {
    client: Client,
    name: String,
    since: i64,
    buffered: VecDeque<FeedEntry>,
    exhausted: bool,
}

impl FeedCursor {
    async fn advance(mut self) -> Result<Option<(FeedEntry, FeedCursor)>> {
        loop {
            if let Some(entry) = self.buffered.pop_front() {
                return Ok(Some((entry, self)));
            }
            if self.exhausted {
                return Ok(None);
            }

            let page = self.client.feed(&self.name, self.since).await?;
            self.exhausted = !page.has_more;
            match page.entries.last() {
                Some(last) if last.sequence_number > self.since => {
                    self.since = last.sequence_number;
                }
                // A page that does not move the cursor would be served again.
                _ => self.exhausted = true,
            }
            self.buffered.extend(page.entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_util::TryStreamExt;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    use super::*;
    use crate::config::ClientConfig;

    fn client(server: &MockServer) -> Client {
        Client::new(ClientConfig::new("access", "secret").with_base_url(server.uri())).unwrap()
    }

    fn entry(sequence_number: i64, aggregate_id: &str) -> serde_json::Value {
        json!({
            "sequenceNumber": sequence_number,
            "aggregateId": aggregate_id,
            "timestamp": 1_523_429_398_512_i64,
            "events": [{
                "eventId": "127b80b5-4a05-4774-b870-1c9a2e2a27a3",
                "eventType": "PaymentProcessed",
                "data": { "amount": 1000 },
            }],
        })
    }

    #[test]
    fn entry_timestamp_is_epoch_millis() {
        let entry: FeedEntry = serde_json::from_value(entry(1, "a")).unwrap();

        let timestamp = entry.timestamp().unwrap();

        assert_eq!(timestamp.timestamp_millis(), 1_523_429_398_512);
    }

    #[tokio::test]
    async fn lists_feed_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "feeds": ["order", "payment"] })),
            )
            .mount(&server)
            .await;

        let feeds = client(&server).feeds().await.unwrap();

        assert_eq!(feeds, ["order", "payment"]);
    }

    #[tokio::test]
    async fn reads_feed_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds/payment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entries": [entry(1, "a"), entry(2, "b")],
                "hasMore": true,
                "currentSequenceNumber": 10,
            })))
            .mount(&server)
            .await;

        let feed = client(&server).feed("payment", 0).await.unwrap();

        assert_eq!(feed.entries.len(), 2);
        assert!(feed.has_more);
        assert_eq!(feed.current_sequence_number, Some(10));
        assert_eq!(feed.entries[1].aggregate_id, "b");
        assert_eq!(feed.entries[0].events[0].event_type, "PaymentProcessed");
    }

    #[tokio::test]
    async fn omits_since_when_not_positive() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds/payment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "entries": [] })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).feed("payment", 0).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn passes_since_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds/payment"))
            .and(query_param("since", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entries": [entry(43, "a")],
                "hasMore": false,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let feed = client(&server).feed("payment", 42).await.unwrap();

        assert_eq!(feed.entries[0].sequence_number, 43);
        server.verify().await;
    }

    #[tokio::test]
    async fn feed_rejects_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server).feed("missing", 0).await.unwrap_err();

        assert_eq!(err.to_string(), "unexpected status code: 404");
    }

    #[tokio::test]
    async fn reads_head_sequence_number() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/feeds/payment"))
            .respond_with(
                ResponseTemplate::new(200).insert_header(CURRENT_SEQUENCE_NUMBER_HEADER, "1337"),
            )
            .mount(&server)
            .await;

        let seq = client(&server)
            .feed_sequence_number("payment")
            .await
            .unwrap();

        assert_eq!(seq, 1337);
    }

    #[tokio::test]
    async fn missing_sequence_header_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/feeds/payment"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = client(&server)
            .feed_sequence_number("payment")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidHeader { value: None, .. }));
    }

    #[tokio::test]
    async fn non_numeric_sequence_header_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/feeds/payment"))
            .respond_with(
                ResponseTemplate::new(200).insert_header(CURRENT_SEQUENCE_NUMBER_HEADER, "head"),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .feed_sequence_number("payment")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidHeader { value: Some(v), .. } if v == "head"));
    }

    #[tokio::test]
    async fn streams_entries_across_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds/payment"))
            .and(query_param("since", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entries": [entry(3, "c")],
                "hasMore": false,
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/feeds/payment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entries": [entry(1, "a"), entry(2, "b")],
                "hasMore": true,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let entries: Vec<_> = client(&server)
            .feed_entries("payment", 0)
            .try_collect()
            .await
            .unwrap();

        let sequence: Vec<_> = entries.iter().map(|e| e.sequence_number).collect();
        assert_eq!(sequence, [1, 2, 3]);
        server.verify().await;
    }

    #[test]
    fn entry_tolerates_missing_fields() {
        let entry: FeedEntry = serde_json::from_value(json!({ "sequenceNumber": 5 })).unwrap();

        assert_eq!(entry.sequence_number, 5);
        assert_eq!(entry.aggregate_id, "");
        assert!(entry.events.is_empty());
    }

    #[tokio::test]
    async fn stream_stops_on_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds/payment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entries": [],
                "hasMore": true,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let entries: Vec<_> = client(&server)
            .feed_entries("payment", 0)
            .try_collect()
            .await
            .unwrap();

        assert!(entries.is_empty());
        server.verify().await;
    }

    #[tokio::test]
    async fn stream_stops_when_cursor_does_not_advance() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds/payment"))
            .and(query_param("since", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entries": [entry(4, "a"), entry(5, "b")],
                "hasMore": true,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let entries: Vec<_> = client(&server)
            .feed_entries("payment", 5)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        server.verify().await;
    }

    #[tokio::test]
    async fn sequence_number_rejects_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/feeds/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server)
            .feed_sequence_number("missing")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::UnexpectedStatus {
                status: 404,
                expected: 200,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn stream_stops_on_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds/payment"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let results: Vec<_> = futures_util::StreamExt::collect(
            client(&server).feed_entries("payment", 0),
        )
        .await;

        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(Error::UnexpectedStatus { status: 500, .. })
        ));
        server.verify().await;
    }
}
