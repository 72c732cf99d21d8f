/*!
   Utilities for random value generation.
*/

use rand::Rng;
use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};

/// Generates a random `u32` value, used to name run directories.
pub fn random_u32() -> u32 {
    rand::thread_rng().gen()
}

/// Generates a random non-privileged port.
fn random_port() -> u16 {
    rand::thread_rng().gen_range(1024..=u16::MAX)
}

/**
   Find a random non-privileged TCP port that is currently free on the
   loopback interface.

   The port is only probed, not reserved: another process may still take
   it before the node binds it.
*/
pub fn random_unused_tcp_port() -> u16 {
    loop {
        let port = random_port();
        let address = SocketAddrV4::new(Ipv4Addr::LOCALHOST, port);

        if TcpListener::bind(address).is_ok() {
            return port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_port_is_not_privileged() {
        for _ in 0..100 {
            assert!(random_unused_tcp_port() >= 1024);
        }
    }

    #[test]
    fn random_port_can_be_bound() {
        let port = random_unused_tcp_port();

        assert!(TcpListener::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port)).is_ok());
    }
}
