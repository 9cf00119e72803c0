use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::trace;

use crate::config::TcpConfig;
use crate::errors::{IoOperation, ModbusError, TransportError};
use crate::frame::ASCII_MAX_ADU;

use super::Transport;

/// Datagram transport: one request datagram out, one response datagram
/// back. Works with any packager since framing is preserved per datagram.
/// There is no idle-close timer; a bound socket holds no remote resources.
#[derive(Debug)]
pub struct UdpTransport {
    config: TcpConfig,
    socket: Mutex<Option<UdpSocket>>,
}

impl UdpTransport {
    pub fn new(config: TcpConfig) -> Self {
        Self {
            config,
            socket: Mutex::new(None),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.socket.lock().await.is_some()
    }

    async fn ensure_connected(
        &self,
        socket: &mut Option<UdpSocket>,
    ) -> Result<(), TransportError> {
        if socket.is_some() {
            return Ok(());
        }
        let bound = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|source| TransportError::Connect {
                address: self.config.address.clone(),
                source,
            })?;
        bound
            .connect(&self.config.address)
            .await
            .map_err(|source| TransportError::Connect {
                address: self.config.address.clone(),
                source,
            })?;
        *socket = Some(bound);
        Ok(())
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(&self, adu_request: &[u8]) -> Result<Vec<u8>, ModbusError> {
        let mut guard = self.socket.lock().await;
        self.ensure_connected(&mut guard).await?;
        let Some(socket) = guard.as_ref() else {
            unreachable!("ensure_connected sets the socket");
        };

        if self.config.trace_frames {
            trace!("sending {:02X?}", adu_request);
        }
        socket
            .send(adu_request)
            .await
            .map_err(|e| TransportError::io(IoOperation::Write, e))?;

        let mut data = [0u8; ASCII_MAX_ADU];
        let limit = self.config.io_timeout;
        let received = if limit.is_zero() {
            socket
                .recv(&mut data)
                .await
                .map_err(|e| TransportError::io(IoOperation::Read, e))?
        } else {
            timeout(limit, socket.recv(&mut data))
                .await
                .map_err(|_| TransportError::timeout(IoOperation::Read, limit))?
                .map_err(|e| TransportError::io(IoOperation::Read, e))?
        };

        let adu = data[..received].to_vec();
        if self.config.trace_frames {
            trace!("received {:02X?}", adu);
        }
        Ok(adu)
    }

    async fn connect(&self) -> Result<(), ModbusError> {
        let mut guard = self.socket.lock().await;
        Ok(self.ensure_connected(&mut guard).await?)
    }

    async fn close(&self) -> Result<(), ModbusError> {
        self.socket.lock().await.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn exchanges_one_datagram_per_send() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let address = server.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (n, peer) = server.recv_from(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b":1103006B00037E\r\n");
            server
                .send_to(b":110304AABBCCDD\r\n", peer)
                .await
                .unwrap();
        });

        let config = TcpConfig {
            address,
            io_timeout: Duration::from_secs(1),
            ..Default::default()
        };
        let transport = UdpTransport::new(config);
        let adu = transport.send(b":1103006B00037E\r\n").await.unwrap();
        assert_eq!(adu, b":110304AABBCCDD\r\n");
    }
}
