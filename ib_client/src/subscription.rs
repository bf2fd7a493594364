//! WebSocket transport for board events.

use async_trait::async_trait;
use futures_util::StreamExt;
use in_between::net::{
    authority::{EventStream, Subscriber},
    errors::{ClientError, ClientResult},
};
use reqwest::Url;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Subscribes to topics on the event server
pub struct WsSubscriber {
    events_url: String,
}

impl WsSubscriber {
    /// Create a subscriber for the given event server base URL
    pub fn new(events_url: impl Into<String>) -> Self {
        Self {
            events_url: events_url.into(),
        }
    }

    fn topic_url(&self, topic: &str, consumer: &str) -> ClientResult<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.events_url, topic))
            .map_err(|e| ClientError::Subscription(format!("Invalid topic URL for {topic}: {e}")))?;
        url.query_pairs_mut().append_pair("consumer", consumer);
        Ok(url)
    }
}

#[async_trait]
impl Subscriber for WsSubscriber {
    async fn subscribe(&self, topic: &str, consumer: &str) -> ClientResult<EventStream> {
        let url = self.topic_url(topic, consumer)?;
        log::info!("Subscribing to {topic}");

        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| ClientError::Subscription(format!("Failed to connect to {url}: {e}")))?;

        let (_write, read) = ws_stream.split();

        // Text frames carry events; a close frame or transport error ends the stream.
        let events = read
            .take_while(|msg| {
                let open = match msg {
                    Ok(Message::Close(_)) => {
                        log::info!("Event server closed connection");
                        false
                    }
                    Err(e) => {
                        log::warn!("Event stream error: {e}");
                        false
                    }
                    _ => true,
                };
                futures_util::future::ready(open)
            })
            .filter_map(|msg| {
                let raw = match msg {
                    Ok(Message::Text(text)) => Some(Ok(text.as_str().as_bytes().to_vec())),
                    Ok(Message::Binary(bytes)) => Some(Ok(bytes.to_vec())),
                    _ => None,
                };
                futures_util::future::ready(raw)
            });

        Ok(Box::pin(events))
    }
}
