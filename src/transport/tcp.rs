use async_trait::async_trait;
use tracing::trace;

use crate::config::TcpConfig;
use crate::errors::{FrameError, ModbusError};
use crate::frame::{TCP_HEADER_LEN, TCP_MAX_ADU};

use super::net::TcpChannel;
use super::Transport;

/// Transport for plain Modbus TCP. Reads the 7-byte MBAP header first and
/// then exactly the number of bytes its length field announces.
#[derive(Debug)]
pub struct TcpTransport {
    channel: TcpChannel,
}

impl TcpTransport {
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
impl Transport for TcpTransport {
    async fn send(&self, adu_request: &[u8]) -> Result<Vec<u8>, ModbusError> {
        let mut state = self.channel.lock().await;
        self.channel.ensure_connected(&mut state).await?;
        self.channel.mark_activity(&mut state);

        if self.channel.trace_frames() {
            trace!("sending {:02X?}", adu_request);
        }
        self.channel.write_all(&mut state, adu_request).await?;

        let mut header = [0u8; TCP_HEADER_LEN];
        self.channel.read_exact(&mut state, &mut header).await?;

        let length = u16::from_be_bytes([header[4], header[5]]) as usize;
        let max = TCP_MAX_ADU - 6;
        if length == 0 || length > max {
            // Whatever follows the bogus header cannot be framed; drop it
            self.channel.flush_pending(&mut state);
            return Err(FrameError::InvalidLengthField { length, max }.into());
        }

        // The unit id was already read as part of the header
        let mut adu = vec![0u8; TCP_HEADER_LEN + length - 1];
        adu[..TCP_HEADER_LEN].copy_from_slice(&header);
        self.channel
            .read_exact(&mut state, &mut adu[TCP_HEADER_LEN..])
            .await?;

        if self.channel.trace_frames() {
            trace!("received {:02X?}", adu);
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
