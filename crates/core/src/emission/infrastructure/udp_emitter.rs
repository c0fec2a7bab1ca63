use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};

use crate::emission::domain::emitter::{EmitError, Emitter};
use crate::emission::domain::packet::Packet;

/// Sends each packet as one UDP datagram to a fixed destination.
///
/// The socket is bound once to an ephemeral local port; the destination is
/// resolved once at construction, so a hostname is looked up only at startup.
pub struct UdpEmitter {
    socket: UdpSocket,
    destination: SocketAddr,
}

impl UdpEmitter {
    /// Resolves `address` (`host:port`) and binds a socket of the matching
    /// address family.
    pub fn connect(address: &str) -> Result<Self, EmitError> {
        let destination = address
            .to_socket_addrs()
            .map_err(|source| EmitError::Resolve {
                address: address.to_string(),
                source,
            })?
            .next()
            .ok_or_else(|| EmitError::NoAddress(address.to_string()))?;
        Self::bind_for(destination)
    }

    pub fn bind_for(destination: SocketAddr) -> Result<Self, EmitError> {
        let local: SocketAddr = match destination {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local).map_err(EmitError::Bind)?;
        log::info!("Sending face packets to {destination}");
        Ok(Self {
            socket,
            destination,
        })
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }
}

impl Emitter for UdpEmitter {
    fn send(&mut self, packet: &Packet) -> Result<(), EmitError> {
        let payload = packet.to_wire();
        self.socket
            .send_to(payload.as_bytes(), self.destination)
            .map_err(|source| EmitError::Send {
                destination: self.destination,
                source,
            })?;
        log::debug!("Sent '{payload}' to {}", self.destination);
        Ok(())
    }
}
