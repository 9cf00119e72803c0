use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::config::TcpConfig;
use crate::errors::{IoOperation, TransportError};

/// Mutex-guarded connection state shared between `send`, explicit
/// connect/close and the idle-close task.
#[derive(Debug)]
pub(crate) struct ConnState {
    conn: Option<TcpStream>,
    last_activity: Instant,
    /// Bumped on every activity mark and explicit close so a sleeping
    /// idle-close task can tell its scheduling is stale.
    generation: u64,
}

/// Shared plumbing for the TCP-based transports: dialing with a timeout,
/// deadline-bounded reads and writes, pending-input drain and the
/// idle-close timer. The framing strategy on top differs per transport.
#[derive(Debug)]
pub(crate) struct TcpChannel {
    config: TcpConfig,
    state: Arc<Mutex<ConnState>>,
}

impl TcpChannel {
    pub fn new(config: TcpConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(ConnState {
                conn: None,
                last_activity: Instant::now(),
                generation: 0,
            })),
        }
    }

    pub fn trace_frames(&self) -> bool {
        self.config.trace_frames
    }

    pub async fn lock(&self) -> MutexGuard<'_, ConnState> {
        self.state.lock().await
    }

    /// Dials if there is no live connection.
    pub async fn ensure_connected(&self, state: &mut ConnState) -> Result<(), TransportError> {
        if state.conn.is_some() {
            return Ok(());
        }
        let address = self.config.address.clone();
        let conn = if self.config.connect_timeout.is_zero() {
            TcpStream::connect(&address).await.map_err(|source| {
                TransportError::Connect {
                    address: address.clone(),
                    source,
                }
            })?
        } else {
            timeout(self.config.connect_timeout, TcpStream::connect(&address))
                .await
                .map_err(|_| TransportError::ConnectTimeout {
                    address: address.clone(),
                    limit: self.config.connect_timeout,
                })?
                .map_err(|source| TransportError::Connect {
                    address: address.clone(),
                    source,
                })?
        };
        debug!("connected to {}", address);
        state.conn = Some(conn);
        Ok(())
    }

    /// Records activity and re-arms the single-shot idle-close timer. The
    /// timer task re-acquires the state mutex and re-checks both the
    /// generation and the elapsed idle time before closing, so explicit
    /// closes and later sends invalidate it.
    pub fn mark_activity(&self, state: &mut ConnState) {
        state.last_activity = Instant::now();
        state.generation = state.generation.wrapping_add(1);

        let idle = self.config.idle_timeout;
        if idle.is_zero() {
            return;
        }
        let generation = state.generation;
        let shared = Arc::clone(&self.state);
        tokio::spawn(async move {
            tokio::time::sleep(idle).await;
            let mut state = shared.lock().await;
            if state.generation == generation
                && state.last_activity.elapsed() >= idle
                && state.conn.take().is_some()
            {
                debug!("closing connection after {:?} idle", idle);
            }
        });
    }

    /// Writes the whole request within the i/o deadline. Errors drop the
    /// connection so the next `send` re-dials.
    pub async fn write_all(
        &self,
        state: &mut ConnState,
        buf: &[u8],
    ) -> Result<(), TransportError> {
        let limit = self.config.io_timeout;
        let result = {
            let conn = state.conn.as_mut().ok_or(TransportError::NoResponse)?;
            if limit.is_zero() {
                conn.write_all(buf)
                    .await
                    .map_err(|e| TransportError::io(IoOperation::Write, e))
            } else {
                match timeout(limit, conn.write_all(buf)).await {
                    Err(_) => Err(TransportError::timeout(IoOperation::Write, limit)),
                    Ok(r) => r.map_err(|e| TransportError::io(IoOperation::Write, e)),
                }
            }
        };
        if result.is_err() {
            state.conn = None;
        }
        result
    }

    /// Fills `buf` completely within the i/o deadline. Errors drop the
    /// connection.
    pub async fn read_exact(
        &self,
        state: &mut ConnState,
        buf: &mut [u8],
    ) -> Result<(), TransportError> {
        let limit = self.config.io_timeout;
        let result = {
            let conn = state.conn.as_mut().ok_or(TransportError::NoResponse)?;
            if limit.is_zero() {
                conn.read_exact(buf)
                    .await
                    .map(|_| ())
                    .map_err(|e| TransportError::io(IoOperation::Read, e))
            } else {
                match timeout(limit, conn.read_exact(buf)).await {
                    Err(_) => Err(TransportError::timeout(IoOperation::Read, limit)),
                    Ok(r) => r.map(|_| ()).map_err(|e| TransportError::io(IoOperation::Read, e)),
                }
            }
        };
        if result.is_err() {
            state.conn = None;
        }
        result
    }

    /// Reads whatever is available within the i/o deadline. Returning zero
    /// means the peer closed the connection; the handle is dropped so the
    /// next `send` re-dials.
    pub async fn read_some(
        &self,
        state: &mut ConnState,
        buf: &mut [u8],
    ) -> Result<usize, TransportError> {
        let limit = self.config.io_timeout;
        let result = {
            let conn = state.conn.as_mut().ok_or(TransportError::NoResponse)?;
            if limit.is_zero() {
                conn.read(buf)
                    .await
                    .map_err(|e| TransportError::io(IoOperation::Read, e))
            } else {
                match timeout(limit, conn.read(buf)).await {
                    Err(_) => Err(TransportError::timeout(IoOperation::Read, limit)),
                    Ok(r) => r.map_err(|e| TransportError::io(IoOperation::Read, e)),
                }
            }
        };
        match result {
            Ok(0) => {
                state.conn = None;
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(e) => {
                state.conn = None;
                Err(e)
            }
        }
    }

    /// Drains pending input without blocking, used after a length-field
    /// violation left unread bytes on the wire. Running dry is not an
    /// error.
    pub fn flush_pending(&self, state: &mut ConnState) {
        let mut peer_closed = false;
        if let Some(conn) = state.conn.as_ref() {
            let mut discard = [0u8; 512];
            loop {
                match conn.try_read(&mut discard) {
                    Ok(0) => {
                        peer_closed = true;
                        break;
                    }
                    Ok(n) => trace!("flushed {} pending bytes", n),
                    Err(_) => break,
                }
            }
        }
        if peer_closed {
            state.conn = None;
        }
    }

    pub async fn connect(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        self.ensure_connected(&mut state).await
    }

    /// Idempotent; also invalidates any armed idle-close task.
    pub async fn close(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        state.generation = state.generation.wrapping_add(1);
        if state.conn.take().is_some() {
            debug!("connection closed");
        }
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.conn.is_some()
    }
}
