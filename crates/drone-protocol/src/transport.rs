//! UDP datagram transport with bounded-timeout receive, spec §4.5/§5. Every
//! peer binds a dedicated send socket and a dedicated receive socket on
//! localhost; receives are cooperatively polled with a short deadline so
//! callers can interleave other work (travel simulation, shutdown checks)
//! between datagrams.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::debug;

/// Upper bound on a single receive poll, per spec §4.5.
pub const MAX_POLL_TIMEOUT: Duration = Duration::from_millis(250);

const MAX_DATAGRAM_BYTES: usize = 512;

/// A received datagram, decoded as UTF-8 text, and the address it came from.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub text: String,
    pub sender: SocketAddr,
}

/// A bound pair of UDP sockets: one for sending, one for receiving.
pub struct Transport {
    send_socket: UdpSocket,
    recv_socket: UdpSocket,
}

impl Transport {
    /// Binds both sockets on `127.0.0.1`. Bind failure is fatal to the
    /// calling process per spec §6 (exit code 1).
    pub async fn bind(send_port: u16, recv_port: u16) -> io::Result<Self> {
        let send_socket = UdpSocket::bind(("127.0.0.1", send_port)).await?;
        let recv_socket = UdpSocket::bind(("127.0.0.1", recv_port)).await?;
        Ok(Self {
            send_socket,
            recv_socket,
        })
    }

    /// Sends a text datagram from the send socket to `addr`.
    pub async fn send_to(&self, message: &str, addr: SocketAddr) -> io::Result<()> {
        self.send_socket.send_to(message.as_bytes(), addr).await?;
        Ok(())
    }

    /// Polls the receive socket for up to `deadline` (clamped to
    /// `MAX_POLL_TIMEOUT`). Returns `Ok(None)` on a timeout, which callers
    /// treat as a routine transient condition, not an error.
    pub async fn recv(&self, deadline: Duration) -> io::Result<Option<Inbound>> {
        let deadline = deadline.min(MAX_POLL_TIMEOUT);
        let mut buf = [0u8; MAX_DATAGRAM_BYTES];

        match timeout(deadline, self.recv_socket.recv_from(&mut buf)).await {
            Ok(Ok((len, sender))) => match std::str::from_utf8(&buf[..len]) {
                Ok(text) => Ok(Some(Inbound {
                    text: text.to_string(),
                    sender,
                })),
                Err(_) => {
                    debug!(%sender, "discarding non-UTF-8 datagram");
                    Ok(None)
                }
            },
            Ok(Err(e)) => Err(e),
            Err(_elapsed) => Ok(None),
        }
    }

    /// Local address of the receive socket, useful for tests that need to
    /// address this transport from a peer.
    pub fn receive_addr(&self) -> io::Result<SocketAddr> {
        self.recv_socket.local_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_and_receive_round_trip() {
        let a = Transport::bind(0, 0).await.unwrap();
        let b = Transport::bind(0, 0).await.unwrap();

        let b_recv_addr = b.receive_addr().unwrap();
        a.send_to("hello", b_recv_addr).await.unwrap();

        let inbound = b.recv(Duration::from_millis(200)).await.unwrap();
        assert_eq!(inbound.unwrap().text, "hello");
    }

    #[tokio::test]
    async fn recv_times_out_when_nothing_arrives() {
        let a = Transport::bind(0, 0).await.unwrap();
        let result = a.recv(Duration::from_millis(20)).await.unwrap();
        assert!(result.is_none());
    }
}
