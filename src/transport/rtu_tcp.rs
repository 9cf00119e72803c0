use async_trait::async_trait;
use tracing::trace;

use crate::config::TcpConfig;
use crate::errors::ModbusError;
use crate::frame::rtu_expected_response_length;
use crate::frame::{RTU_MAX_ADU, RTU_MIN_ADU};

use super::net::TcpChannel;
use super::Transport;

/// Transport tunneling raw RTU frames over TCP. The stream carries no
/// length field, so the expected response size is predicted from the
/// request and corrected once the first bytes reveal an exception frame or
/// a FIFO byte count.
#[derive(Debug)]
pub struct RtuOverTcpTransport {
    channel: TcpChannel,
}

impl RtuOverTcpTransport {
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
impl Transport for RtuOverTcpTransport {
    async fn send(&self, adu_request: &[u8]) -> Result<Vec<u8>, ModbusError> {
        let mut state = self.channel.lock().await;
        self.channel.ensure_connected(&mut state).await?;
        self.channel.mark_activity(&mut state);

        if self.channel.trace_frames() {
            trace!("sending {:02X?}", adu_request);
        }
        self.channel.write_all(&mut state, adu_request).await?;

        let mut buf = [0u8; RTU_MAX_ADU];
        self.channel
            .read_exact(&mut state, &mut buf[..RTU_MIN_ADU])
            .await?;
        let mut total = RTU_MIN_ADU;

        let expected = rtu_expected_response_length(adu_request, &buf[..total])
            .clamp(RTU_MIN_ADU, RTU_MAX_ADU);
        if expected > total {
            self.channel
                .read_exact(&mut state, &mut buf[total..expected])
                .await?;
            total = expected;
        }

        let adu = buf[..total].to_vec();
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

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use crate::checksum::crc16;

    use super::*;

    fn test_config(address: String) -> TcpConfig {
        TcpConfig {
            address,
            connect_timeout: Duration::from_secs(1),
            io_timeout: Duration::from_secs(1),
            ..Default::default()
        }
    }

    fn rtu_frame(body: &[u8]) -> Vec<u8> {
        let mut frame = body.to_vec();
        frame.extend_from_slice(&crc16(body).to_le_bytes());
        frame
    }

    #[tokio::test]
    async fn reads_predicted_length_for_register_read() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 8];
            socket.read_exact(&mut request).await.unwrap();
            // Two registers, dribbled out in two writes
            let response = rtu_frame(&[0x01, 0x03, 0x04, 0x00, 0x2A, 0x00, 0x2B]);
            socket.write_all(&response[..3]).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
            socket.write_all(&response[3..]).await.unwrap();
        });

        let transport = RtuOverTcpTransport::new(test_config(address));
        let request = rtu_frame(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x02]);
        let adu = transport.send(&request).await.unwrap();
        assert_eq!(adu.len(), 9);
        assert_eq!(adu[1], 0x03);
        assert_eq!(adu[2], 0x04);
    }

    #[tokio::test]
    async fn exception_response_is_read_as_five_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 8];
            socket.read_exact(&mut request).await.unwrap();
            socket
                .write_all(&rtu_frame(&[0x01, 0x83, 0x02]))
                .await
                .unwrap();
        });

        let transport = RtuOverTcpTransport::new(test_config(address));
        let request = rtu_frame(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x7D]);
        let adu = transport.send(&request).await.unwrap();
        assert_eq!(adu.len(), 5);
        assert_eq!(adu[1], 0x83);
        assert_eq!(adu[2], 0x02);
    }
}
