//! WebSocket Transport - mounts relay endpoints on sockets
//!
//! Design decisions:
//! 1. One reader task and one writer task per socket, connected to the
//!    session by unbounded channels. The session itself never awaits a socket.
//! 2. The outbound side is exposed as a plain `SendMessage` callback, so
//!    handlers stay synchronous.
//! 3. Frames that are not CDP JSON are logged and dropped, never fatal.

use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_hdr_async, WebSocketStream};
use url::Url;

use crate::connection::SendMessage;
use crate::protocol::CdpMessage;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Missing query parameter: {0}")]
    MissingQueryParam(&'static str),

    #[error("Connection closed")]
    Closed,
}

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Page a debugger asked for (`/inspector/debug?device=..&page=..`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebuggerTarget {
    pub device: String,
    pub page: String,
}

impl DebuggerTarget {
    pub fn from_uri(uri: &str) -> Result<Self> {
        let mut params = query_params(uri)?;
        Ok(Self {
            device: take_param(&mut params, "device")?,
            page: take_param(&mut params, "page")?,
        })
    }
}

/// Device announced on connect (`/inspector/device?device=..&name=..&app=..`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
    pub app: String,
}

impl DeviceInfo {
    pub fn from_uri(uri: &str) -> Result<Self> {
        let mut params = query_params(uri)?;
        let id = take_param(&mut params, "device")?;
        Ok(Self {
            name: params.remove("name").unwrap_or_else(|| id.clone()),
            app: params.remove("app").unwrap_or_default(),
            id,
        })
    }
}

/// What the debugger told us during the handshake
#[derive(Debug, Clone)]
pub struct DebuggerHandshake {
    pub target: DebuggerTarget,
    pub user_agent: Option<String>,
}

fn query_params(uri: &str) -> Result<HashMap<String, String>> {
    // Handshake URIs are origin-form (`/path?query`)
    let url = Url::parse("ws://localhost")?.join(uri)?;
    Ok(url.query_pairs().into_owned().collect())
}

fn take_param(params: &mut HashMap<String, String>, key: &'static str) -> Result<String> {
    params
        .remove(key)
        .filter(|value| !value.is_empty())
        .ok_or(RelayError::MissingQueryParam(key))
}

/// Server handshake that records the request URI and `User-Agent`
async fn accept_with_headers<S>(stream: S) -> Result<(WebSocketStream<S>, String, Option<String>)>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut uri = None;
    let mut user_agent = None;

    let ws = accept_hdr_async(stream, |request: &Request, response: Response| {
        uri = Some(request.uri().to_string());
        user_agent = request
            .headers()
            .get("user-agent")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        Ok::<_, ErrorResponse>(response)
    })
    .await?;

    let uri = uri.ok_or(RelayError::Closed)?;
    Ok((ws, uri, user_agent))
}

/// Accept a debugger socket and parse its target page
pub async fn accept_debugger<S>(stream: S) -> Result<(WebSocketStream<S>, DebuggerHandshake)>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (ws, uri, user_agent) = accept_with_headers(stream).await?;
    let target = DebuggerTarget::from_uri(&uri)?;
    tracing::info!(
        "Debugger connected to page {} on device {} ({:?})",
        target.page,
        target.device,
        user_agent
    );
    Ok((ws, DebuggerHandshake { target, user_agent }))
}

/// Accept a device socket and parse its identity
pub async fn accept_device<S>(stream: S) -> Result<(WebSocketStream<S>, DeviceInfo)>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (ws, uri, _) = accept_with_headers(stream).await?;
    let device = DeviceInfo::from_uri(&uri)?;
    tracing::info!("Device connected: {} ({})", device.name, device.id);
    Ok((ws, device))
}

/// Split a socket into an outbound callback and an inbound message stream
///
/// The writer task ends (closing the socket) once every clone of the
/// returned `SendMessage` is dropped. The receiver ends when the peer
/// closes or the socket fails.
pub fn spawn_endpoint<S>(
    ws: WebSocketStream<S>,
    label: &'static str,
) -> (SendMessage, mpsc::UnboundedReceiver<CdpMessage>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sink, mut stream) = ws.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<CdpMessage>();
    let (in_tx, in_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("[{}] Failed to serialize message: {}", label, e);
                    continue;
                }
            };
            if let Err(e) = sink.send(Message::Text(text)).await {
                tracing::error!("[{}] WebSocket send failed: {}", label, e);
                break;
            }
        }
        let _ = sink.close().await;
    });

    tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => match serde_json::from_str::<CdpMessage>(&text) {
                    Ok(message) => {
                        if in_tx.send(message).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("[{}] Dropped non-CDP frame: {}", label, e),
                },
                Ok(Message::Close(_)) => {
                    tracing::info!("[{}] WebSocket closed", label);
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("[{}] WebSocket error: {}", label, e);
                    break;
                }
            }
        }
    });

    let send: SendMessage = Arc::new(move |message| {
        // Receiver gone means the socket is already closing
        let _ = out_tx.send(message);
    });

    (send, in_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tokio::net::TcpListener;
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::client::IntoClientRequest;
    use tokio_tungstenite::tungstenite::http::HeaderValue;

    #[test]
    fn test_debugger_target_from_uri() {
        let target = DebuggerTarget::from_uri("/inspector/debug?device=abc&page=1").unwrap();
        assert_eq!(
            target,
            DebuggerTarget {
                device: "abc".to_string(),
                page: "1".to_string(),
            }
        );
    }

    #[test]
    fn test_debugger_target_requires_page() {
        let err = DebuggerTarget::from_uri("/inspector/debug?device=abc").unwrap_err();
        assert!(matches!(err, RelayError::MissingQueryParam("page")));

        let err = DebuggerTarget::from_uri("/inspector/debug?device=abc&page=").unwrap_err();
        assert!(matches!(err, RelayError::MissingQueryParam("page")));
    }

    #[test]
    fn test_device_info_defaults() {
        let device = DeviceInfo::from_uri("/inspector/device?device=d1&name=Pixel%207").unwrap();
        assert_eq!(device.id, "d1");
        assert_eq!(device.name, "Pixel 7");
        assert_eq!(device.app, "");

        let device = DeviceInfo::from_uri("/inspector/device?device=d2").unwrap();
        assert_eq!(device.name, "d2");
    }

    #[tokio::test]
    async fn test_debugger_endpoint_over_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            accept_debugger(stream).await.unwrap()
        });

        let mut request = format!("ws://{addr}/inspector/debug?device=d1&page=p1")
            .into_client_request()
            .unwrap();
        request
            .headers_mut()
            .insert("user-agent", HeaderValue::from_static("vscode/1.87.0"));
        let (mut client, _) = connect_async(request).await.unwrap();

        let (ws, handshake) = server.await.unwrap();
        assert_eq!(handshake.target.device, "d1");
        assert_eq!(handshake.target.page, "p1");
        assert_eq!(handshake.user_agent.as_deref(), Some("vscode/1.87.0"));

        let (send, mut inbound) = spawn_endpoint(ws, "debugger");

        // Garbage is dropped, the next frame still arrives
        client.send(Message::Text("not json".into())).await.unwrap();
        client
            .send(Message::Text(r#"{"id":1,"method":"Runtime.enable"}"#.into()))
            .await
            .unwrap();

        let received = inbound.recv().await.unwrap();
        assert_eq!(received.id, Some(1));
        assert!(received.is_method("Runtime.enable"));

        send(CdpMessage::response(Some(1), json!({})));
        let reply = match client.next().await.unwrap().unwrap() {
            Message::Text(text) => serde_json::from_str::<Value>(&text).unwrap(),
            other => panic!("Expected text frame, got {:?}", other),
        };
        assert_eq!(reply, json!({ "id": 1, "result": {} }));

        client.close(None).await.unwrap();
        assert!(inbound.recv().await.is_none());
    }
}
