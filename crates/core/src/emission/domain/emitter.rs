use std::net::SocketAddr;

use thiserror::Error;

use crate::emission::domain::packet::Packet;

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("could not resolve destination {address}: {source}")]
    Resolve {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("destination {0} resolved to no addresses")]
    NoAddress(String),
    #[error("failed to bind datagram socket: {0}")]
    Bind(#[source] std::io::Error),
    #[error("failed to send packet to {destination}: {source}")]
    Send {
        destination: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Fire-and-forget packet sink bound to a single destination.
///
/// A failed `send` loses that packet; callers never retry.
pub trait Emitter: Send {
    fn send(&mut self, packet: &Packet) -> Result<(), EmitError>;
}
