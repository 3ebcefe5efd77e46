//! Endpoint derivation and the WebSocket connection lifecycle.
//!
//! One session owns exactly one connection. `connect` opens it, wires the
//! UI capability, and spawns the pump task that interleaves inbound frames
//! with the outbound queue; the connection is never recreated.

use crate::{
    protocol::{CHAT_ENDPOINT_PATH, InboundFrame, OutboundFrame},
    session::ChatSession,
    ui::ChatUi,
};
use anyhow::{Context, Result, bail};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::{
    net::TcpStream,
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{Instrument, info, warn};
use url::Url;

/// The resolved address of the chat endpoint.
///
/// Derived from the http(s) origin the client is pointed at: a secure
/// origin yields the secure transport variant. The path is fixed; the
/// scheme is never configured independently of the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
}

impl Endpoint {
    /// Derives the chat URL from an http(s) origin.
    pub fn from_origin(origin: &str) -> Result<Self> {
        let origin: Url = origin
            .parse()
            .with_context(|| format!("invalid origin URL: {origin}"))?;
        let scheme = match origin.scheme() {
            "https" | "wss" => "wss",
            "http" | "ws" => "ws",
            other => bail!("origin scheme `{other}` cannot carry a chat connection"),
        };
        if origin.host_str().is_none() {
            bail!("origin URL has no host");
        }

        let mut url = origin;
        url.set_scheme(scheme)
            .map_err(|_| anyhow::anyhow!("cannot apply scheme `{scheme}` to origin"))?;
        url.set_path(CHAT_ENDPOINT_PATH);
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Lifecycle state of the connection underneath a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Open,
    Closing,
    Closed,
}

/// Cheap clonable handle pairing the outbound frame queue with the
/// connection state published by the pump task.
#[derive(Debug, Clone)]
pub struct Link {
    pub(crate) outbound_tx: mpsc::UnboundedSender<OutboundFrame>,
    pub(crate) state: watch::Receiver<LinkState>,
}

impl Link {
    /// The connection state as last published by the pump task.
    pub fn state(&self) -> LinkState {
        *self.state.borrow()
    }

    /// Enqueues a frame for transmission, fire-and-forget. Returns false
    /// when the pump task has already terminated.
    pub(crate) fn transmit(&self, frame: OutboundFrame) -> bool {
        self.outbound_tx.send(frame).is_ok()
    }
}

/// Opens the connection and starts a session over it.
///
/// On success the conversation log has been cleared (the only trigger for
/// that besides an explicit `processlist_clear` frame) and the pump task is
/// running; its join handle resolves when the connection ends, with the
/// fatal error if one occurred.
pub async fn connect(
    endpoint: &Endpoint,
    ui: Arc<dyn ChatUi>,
) -> Result<(ChatSession, JoinHandle<Result<()>>)> {
    let (state_tx, state_rx) = watch::channel(LinkState::Connecting);
    let (ws, _response) = connect_async(endpoint.url().as_str())
        .await
        .with_context(|| format!("failed to connect to chat endpoint {}", endpoint.url()))?;
    state_tx.send_replace(LinkState::Open);
    info!(endpoint = %endpoint.url(), "connected to chat server");

    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let session = ChatSession::new(
        ui.clone(),
        Link {
            outbound_tx,
            state: state_rx,
        },
    );

    // A clean conversational log at session start, before any inbound
    // frame is processed.
    ui.clear_log().await;

    let pump_session = session.clone();
    let handle = tokio::spawn(
        pump(ws, outbound_rx, state_tx, pump_session)
            .instrument(tracing::info_span!("chat_link")),
    );
    Ok((session, handle))
}

/// Runs the connection to completion; the state ends at Closed on every
/// exit path.
async fn pump(
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    outbound_rx: mpsc::UnboundedReceiver<OutboundFrame>,
    state: watch::Sender<LinkState>,
    session: ChatSession,
) -> Result<()> {
    let result = drive(ws, outbound_rx, &state, session).await;
    state.send_replace(LinkState::Closed);
    if result.is_ok() {
        info!("chat connection closed");
    }
    result
}

/// The single event loop interleaving inbound frames and queued sends.
async fn drive(
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    mut outbound_rx: mpsc::UnboundedReceiver<OutboundFrame>,
    state: &watch::Sender<LinkState>,
    session: ChatSession,
) -> Result<()> {
    let (mut ws_tx, mut ws_rx) = ws.split();
    loop {
        tokio::select! {
            inbound = ws_rx.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    let frame: InboundFrame =
                        serde_json::from_str(&text).context("malformed inbound frame")?;
                    session.handle_frame(frame).await?;
                }
                Some(Ok(Message::Close(_))) => {
                    info!("server sent close frame");
                    state.send_replace(LinkState::Closing);
                    break;
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Ok(other)) => warn!(?other, "dropping unexpected non-text frame"),
                Some(Err(e)) => {
                    return Err(e).context("error receiving from chat connection");
                }
                None => break,
            },
            outbound = outbound_rx.recv() => {
                // The session half keeps a sender alive, so recv() always
                // yields a frame here.
                if let Some(frame) = outbound {
                    let text = serde_json::to_string(&frame)
                        .context("failed to serialize outbound frame")?;
                    ws_tx
                        .send(Message::Text(text.into()))
                        .await
                        .context("failed to transmit frame")?;
                }
            }
        }
    }
    Ok(())
}
