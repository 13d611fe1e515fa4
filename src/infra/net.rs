use std::net::{SocketAddr, ToSocketAddrs};

use crate::domain::error::{TransportError, TransportErrorKind};

/// 解析 host:port 为第一个可用地址
pub fn resolve_addr(host: &str, port: u16) -> Result<SocketAddr, TransportError> {
    (host, port)
        .to_socket_addrs()
        .map_err(|e| {
            TransportError::new(
                TransportErrorKind::Connection,
                format!("无法解析地址 {}:{}: {}", host, port, e),
            )
        })?
        .next()
        .ok_or_else(|| {
            TransportError::new(
                TransportErrorKind::Connection,
                format!("无法解析地址 {}:{}", host, port),
            )
        })
}
