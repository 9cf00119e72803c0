use async_trait::async_trait;
use tracing::trace;

use crate::config::TcpConfig;
use crate::errors::ModbusError;
use crate::frame::{ascii_frame_complete, ASCII_MAX_ADU};

use super::net::TcpChannel;
use super::Transport;

/// Transport tunneling ASCII frames over TCP. Accumulates chunks until the
/// CRLF terminator arrives or the frame buffer is full.
#[derive(Debug)]
pub struct AsciiOverTcpTransport {
    channel: TcpChannel,
}

impl AsciiOverTcpTransport {
    pub fn new(config: TcpConfig) -> Self {
        Self {
            channel: TcpChannel::new(config),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.channel.is_connected().await
    }
}

#[async_trait]
impl Transport for AsciiOverTcpTransport {
    async fn send(&self, adu_request: &[u8]) -> Result<Vec<u8>, ModbusError> {
        let mut state = self.channel.lock().await;
        self.channel.ensure_connected(&mut state).await?;
        self.channel.mark_activity(&mut state);

        if self.channel.trace_frames() {
            trace!("sending {:?}", String::from_utf8_lossy(adu_request));
        }
        self.channel.write_all(&mut state, adu_request).await?;

        let mut data = [0u8; ASCII_MAX_ADU];
        let mut length = 0;
        loop {
            let n = self
                .channel
                .read_some(&mut state, &mut data[length..])
                .await?;
            length += n;
            if length >= ASCII_MAX_ADU || n == 0 {
                break;
            }
            if ascii_frame_complete(&data[..length]) {
                break;
            }
        }

        let adu = data[..length].to_vec();
        if self.channel.trace_frames() {
            trace!("received {:?}", String::from_utf8_lossy(&adu));
        }
        Ok(adu)
    }

    async fn connect(&self) -> Result<(), ModbusError> {
        Ok(self.channel.connect().await?)
    }

    async fn close(&self) -> Result<(), ModbusError> {
        Ok(self.channel.close().await?)
    }
}
