use crate::domain::config::TransportKind;
use crate::domain::ports::{Transport, TransportFactory};

use super::ftp::FtpTransport;
use super::ssh::SftpTransport;

/// 按配置选择 FTP 或 SFTP 传输
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredTransportFactory {
    kind: TransportKind,
}

impl ConfiguredTransportFactory {
    pub fn new(kind: TransportKind) -> Self {
        Self { kind }
    }
}

impl TransportFactory for ConfiguredTransportFactory {
    fn create(&self) -> Box<dyn Transport> {
        match self.kind {
            TransportKind::Ftp => Box::new(FtpTransport::new()),
            TransportKind::Sftp => Box::new(SftpTransport::new()),
        }
    }
}
