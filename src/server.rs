//! TCP transport: accepts connections, frames JSON messages and delivers
//! router output to the right subset of clients.
//!
//! Frames are a u32 big-endian length followed by a JSON body. Each
//! connection gets a reader task and a writer task; outbound messages go
//! through a per-connection channel, so delivery order per client matches
//! the order the router produced.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::Duration;

use crate::common::IdentityId;
use crate::config::BOT_THINK_MILLIS;
use crate::protocol::{ClientCommand, Outbound, Recipients, ServerMessage};
use crate::router::{BotTurn, Router};

/// Maximum frame body size; larger frames close the connection.
const MAX_MESSAGE_SIZE: u32 = 1_000_000;

type ConnId = u64;

struct ConnHandle {
    tx: mpsc::UnboundedSender<ServerMessage>,
    identity: Option<IdentityId>,
}

/// Connection table plus the router it feeds.
pub struct Server {
    router: Arc<Router>,
    conns: Mutex<HashMap<ConnId, ConnHandle>>,
    next_conn: AtomicU64,
}

impl Server {
    pub fn new(router: Arc<Router>) -> Arc<Self> {
        Arc::new(Self {
            router,
            conns: Mutex::new(HashMap::new()),
            next_conn: AtomicU64::new(0),
        })
    }

    /// Bind and run the accept loop.
    pub async fn run(self: Arc<Self>, bind: &str) -> anyhow::Result<()> {
        let listener = TcpListener::bind(bind)
            .await
            .with_context(|| format!("binding {}", bind))?;
        self.serve(listener).await
    }

    /// Accept loop over an already-bound listener. Runs until it fails.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> anyhow::Result<()> {
        info!("listening on {}", listener.local_addr()?);
        loop {
            let (stream, addr) = listener.accept().await.context("accepting connection")?;
            info!("connection from {}", addr);
            let server = Arc::clone(&self);
            tokio::spawn(async move {
                if let Err(err) = server.handle_connection(stream).await {
                    debug!("connection {} closed: {}", addr, err);
                }
            });
        }
    }

    async fn handle_connection(self: Arc<Self>, stream: TcpStream) -> anyhow::Result<()> {
        let conn_id = self.next_conn.fetch_add(1, Ordering::Relaxed);
        let (mut reader, mut writer) = stream.into_split();

        let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
        self.conns
            .lock()
            .unwrap()
            .insert(conn_id, ConnHandle { tx, identity: None });

        let write_task = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if write_frame(&mut writer, &msg).await.is_err() {
                    break;
                }
            }
        });

        let result = self.read_loop(conn_id, &mut reader).await;

        self.conns.lock().unwrap().remove(&conn_id);
        write_task.abort();
        result
    }

    async fn read_loop<R: AsyncRead + Unpin>(
        self: &Arc<Self>,
        conn_id: ConnId,
        reader: &mut R,
    ) -> anyhow::Result<()> {
        loop {
            let body = read_frame(reader).await?;
            let cmd: ClientCommand = match serde_json::from_slice(&body) {
                Ok(cmd) => cmd,
                Err(err) => {
                    warn!("connection {}: malformed command: {}", conn_id, err);
                    self.send_to(
                        conn_id,
                        ServerMessage::Error {
                            error_text: "malformed command".to_string(),
                        },
                    );
                    continue;
                }
            };

            let sender = self.identity_of(conn_id);
            let dispatch = self.router.dispatch(sender, cmd);
            if let Some(identity) = dispatch.authenticated {
                if let Some(conn) = self.conns.lock().unwrap().get_mut(&conn_id) {
                    conn.identity = Some(identity);
                }
            }
            self.deliver(Some(conn_id), &dispatch.messages);
            self.schedule_bots(dispatch.bot_turns);
        }
    }

    /// Resolve each recipient set against the connection table and queue
    /// the message. Identities without a live connection (the bot's, or a
    /// player who dropped) are skipped.
    fn deliver(&self, origin: Option<ConnId>, messages: &[Outbound]) {
        let conns = self.conns.lock().unwrap();
        for outbound in messages {
            match &outbound.to {
                Recipients::Sender => {
                    if let Some(conn) = origin.and_then(|id| conns.get(&id)) {
                        let _ = conn.tx.send(outbound.message.clone());
                    }
                }
                Recipients::Identities(ids) => {
                    for conn in conns
                        .values()
                        .filter(|c| c.identity.is_some_and(|i| ids.contains(&i)))
                    {
                        let _ = conn.tx.send(outbound.message.clone());
                    }
                }
                Recipients::All => {
                    for conn in conns.values() {
                        let _ = conn.tx.send(outbound.message.clone());
                    }
                }
            }
        }
    }

    /// Run a deferred bot move chain: think, fire, and keep going while the
    /// bot retains the turn. Every firing is re-validated by the router.
    fn schedule_bots(self: &Arc<Self>, turns: Vec<BotTurn>) {
        for mut turn in turns {
            let server = Arc::clone(self);
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_millis(BOT_THINK_MILLIS)).await;
                    let dispatch = server.router.bot_move(turn);
                    server.deliver(None, &dispatch.messages);
                    match dispatch.bot_turns.first() {
                        Some(next) => turn = *next,
                        None => break,
                    }
                }
            });
        }
    }

    fn send_to(&self, conn_id: ConnId, message: ServerMessage) {
        if let Some(conn) = self.conns.lock().unwrap().get(&conn_id) {
            let _ = conn.tx.send(message);
        }
    }

    fn identity_of(&self, conn_id: ConnId) -> Option<IdentityId> {
        self.conns
            .lock()
            .unwrap()
            .get(&conn_id)
            .and_then(|c| c.identity)
    }
}

/// Write one length-prefixed JSON frame.
pub async fn write_frame<W, T>(writer: &mut W, msg: &T) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
    T: serde::Serialize,
{
    let data = serde_json::to_vec(msg).context("serializing frame")?;
    if data.len() as u32 > MAX_MESSAGE_SIZE {
        anyhow::bail!("frame too large: {} bytes", data.len());
    }
    writer.write_all(&(data.len() as u32).to_be_bytes()).await?;
    writer.write_all(&data).await?;
    Ok(())
}

/// Read one length-prefixed frame body. Frame-level failures (EOF, zero or
/// oversized length) are connection-fatal; JSON errors are not handled
/// here so the caller can answer them without dropping the connection.
pub async fn read_frame<R>(reader: &mut R) -> anyhow::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await.context("reading frame length")?;
    let len = u32::from_be_bytes(len_buf);
    if len == 0 {
        anyhow::bail!("invalid frame length: 0");
    }
    if len > MAX_MESSAGE_SIZE {
        anyhow::bail!("frame too large: {} bytes", len);
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await.context("reading frame body")?;
    Ok(buf)
}
