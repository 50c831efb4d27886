//! # engine::transport
//!
//! Production [`Connector`]: dials the bot service's push endpoint with
//! `tokio-tungstenite` and flattens the socket into [`TransportEvent`]s.
//! Control frames are consumed here; the listener only ever sees text.

use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info};
use url::Url;

use super::listener::{Connector, TransportEvent};
use crate::error::SyncError;

#[derive(Debug, Clone)]
pub struct WsConnector {
    url: Url,
}

impl WsConnector {
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

impl Connector for WsConnector {
    async fn connect(&self) -> Result<BoxStream<'static, TransportEvent>, SyncError> {
        info!(url = %self.url, "Dialling push channel");
        let (ws, _) = connect_async(self.url.as_str()).await?;

        // A read error ends the stream: the socket is unusable afterwards.
        let events = stream::unfold(Some(ws), |ws| async move {
            let mut ws = ws?;
            loop {
                match ws.next().await? {
                    Ok(Message::Text(text)) => return Some((TransportEvent::Message(text), Some(ws))),
                    Ok(Message::Binary(bytes)) => {
                        let text = String::from_utf8_lossy(&bytes).into_owned();
                        return Some((TransportEvent::Message(text), Some(ws)));
                    }
                    Ok(Message::Close(frame)) => debug!(?frame, "Close frame received"),
                    // Pings are answered by tungstenite on the next read.
                    Ok(_) => continue,
                    Err(err) => return Some((TransportEvent::Error(err.to_string()), None)),
                }
            }
        });

        Ok(events.boxed())
    }
}
