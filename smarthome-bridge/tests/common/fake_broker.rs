use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const CONNACK_ACCEPTED: [u8; 4] = [0x20, 0x02, 0x00, 0x00];
pub const CONNACK_BAD_CREDENTIALS: [u8; 4] = [0x20, 0x02, 0x00, 0x04];

pub const CONNECT: u8 = 0x10;
pub const SUBSCRIBE: u8 = 0x82;
pub const DISCONNECT: u8 = 0xe0;

/// Minimal MQTT 3.1.1 peer speaking raw packets over a local socket.
pub struct FakeBroker {
    listener: TcpListener,
}

impl FakeBroker {
    pub async fn bind() -> Self {
        Self {
            listener: TcpListener::bind("127.0.0.1:0").await.unwrap(),
        }
    }

    pub fn port(&self) -> u16 {
        self.listener.local_addr().unwrap().port()
    }

    pub async fn accept(&self) -> BrokerConnection {
        let (stream, _) = self.listener.accept().await.unwrap();
        BrokerConnection { stream }
    }
}

pub struct BrokerConnection {
    stream: TcpStream,
}

impl BrokerConnection {
    /// Reads one packet, returning its first header byte and body.
    /// `None` once the client has closed the socket.
    pub async fn read_packet(&mut self) -> Option<(u8, Vec<u8>)> {
        let header = self.stream.read_u8().await.ok()?;

        let mut length = 0usize;
        for shift in [0, 7, 14, 21] {
            let byte = self.stream.read_u8().await.ok()?;
            length |= usize::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                break;
            }
        }

        let mut body = vec![0; length];
        self.stream.read_exact(&mut body).await.ok()?;

        Some((header, body))
    }

    pub async fn write(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).await.unwrap();
    }

    pub async fn handshake(&mut self, connack: &[u8]) {
        let (header, _) = self.read_packet().await.unwrap();
        assert_eq!(header, CONNECT);
        self.write(connack).await;
    }

    /// Waits for the client's SUBSCRIBE, acknowledges it and returns the
    /// requested filter.
    pub async fn accept_subscription(&mut self) -> String {
        loop {
            let (header, body) = self.read_packet().await.expect("client closed before subscribing");
            if header != SUBSCRIBE {
                continue;
            }

            let filter_len = usize::from(u16::from_be_bytes([body[2], body[3]]));
            let filter = String::from_utf8(body[4..4 + filter_len].to_vec()).unwrap();

            self.write(&[0x90, 0x03, body[0], body[1], 0x01]).await;

            return filter;
        }
    }

    /// QoS 0 publish.
    pub async fn publish(&mut self, topic: &str, payload: &[u8]) {
        let length = 2 + topic.len() + payload.len();
        assert!(length < 128);

        let mut packet = vec![0x30, length as u8];
        packet.extend_from_slice(&(topic.len() as u16).to_be_bytes());
        packet.extend_from_slice(topic.as_bytes());
        packet.extend_from_slice(payload);

        self.write(&packet).await;
    }

    /// Headers of every packet read until `header` arrives, or `None` if the
    /// socket closes first.
    pub async fn read_until(&mut self, header: u8) -> Option<Vec<u8>> {
        let mut seen = Vec::new();
        loop {
            let (next, _) = self.read_packet().await?;
            if next == header {
                return Some(seen);
            }
            seen.push(next);
        }
    }
}
