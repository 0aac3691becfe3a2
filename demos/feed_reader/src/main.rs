use std::{pin::pin, time::Duration};

use futures_util::TryStreamExt;
use serialized_client::{Client, ClientConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Prints the available feeds, then follows the feed named on the command line
/// until interrupted.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = Client::new(ClientConfig::from_env()?)?;

    let feeds = client.feeds().await?;
    println!("feeds: {}", feeds.join(", "));

    let Some(feed) = std::env::args().nth(1) else {
        return Ok(());
    };

    let head = client.feed_sequence_number(&feed).await?;
    info!(feed = %feed, head, "following feed");

    tokio::select! {
        res = follow(&client, &feed) => {
            res?;
        }
        _ = tokio::signal::ctrl_c() => {}
    }

    Ok(())
}

async fn follow(client: &Client, feed: &str) -> anyhow::Result<()> {
    let mut since = 0;
    loop {
        let mut entries = pin!(client.feed_entries(feed, since));
        while let Some(entry) = entries.try_next().await? {
            since = entry.sequence_number;
            for event in &entry.events {
                println!(
                    "#{} {} {} {}",
                    entry.sequence_number, entry.aggregate_id, event.event_type, event.event_id
                );
            }
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
