use std::fs::File;
use std::path::Path;

use suppaftp::native_tls::TlsConnector;
use suppaftp::types::FileType;
use suppaftp::{FtpError, NativeTlsConnector, NativeTlsFtpStream};

use crate::domain::config::Credentials;
use crate::domain::error::{TransportError, TransportErrorKind, TransportResult};
use crate::domain::ports::Transport;
use crate::infra::net::resolve_addr;
use crate::shared::path_utils::ancestor_prefixes;

/// 按 FTP 应答码分类，应答码不足以区分时再看应答正文
fn kind_from_reply(code: u32, text: &str) -> TransportErrorKind {
    match code {
        530 | 332 => TransportErrorKind::Authentication,
        421 | 425 | 426 => TransportErrorKind::Connection,
        550 | 553 => match TransportErrorKind::classify(text) {
            TransportErrorKind::Other if code == 553 => TransportErrorKind::Permission,
            kind => kind,
        },
        _ => TransportErrorKind::classify(text),
    }
}

fn map_ftp_error(e: FtpError) -> TransportError {
    match e {
        FtpError::ConnectionError(io) => {
            TransportError::new(TransportErrorKind::Connection, io.to_string())
        }
        FtpError::UnexpectedResponse(resp) => {
            let code = resp.status.code();
            let text = String::from_utf8_lossy(&resp.body).trim().to_string();
            TransportError::new(kind_from_reply(code, &text), format!("[{}] {}", code, text))
        }
        other => TransportError::from_message(other.to_string()),
    }
}

/// FTP / FTPS 传输
#[derive(Default)]
pub struct FtpTransport {
    stream: Option<NativeTlsFtpStream>,
}

impl FtpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn stream(&mut self) -> TransportResult<&mut NativeTlsFtpStream> {
        self.stream.as_mut().ok_or_else(|| {
            TransportError::new(TransportErrorKind::Connection, "FTP 会话未建立")
        })
    }
}

impl Transport for FtpTransport {
    fn connect(&mut self, credentials: &Credentials) -> TransportResult<()> {
        let addr = resolve_addr(&credentials.host, credentials.port)?;
        let mut stream = NativeTlsFtpStream::connect_timeout(addr, credentials.connect_timeout)
            .map_err(map_ftp_error)?;
        tracing::debug!(%addr, "FTP 连接成功");

        if credentials.secure {
            let tls = TlsConnector::new().map_err(|e| {
                TransportError::new(TransportErrorKind::Connection, e.to_string())
            })?;
            stream = stream
                .into_secure(NativeTlsConnector::from(tls), &credentials.host)
                .map_err(map_ftp_error)?;
            tracing::debug!("已切换到 FTPS");
        }

        let password = credentials.password.as_deref().unwrap_or_default();
        stream.login(credentials.user.as_str(), password).map_err(|e| {
            let err = map_ftp_error(e);
            match err.kind {
                TransportErrorKind::Connection => err,
                _ => TransportError::new(TransportErrorKind::Authentication, err.message),
            }
        })?;
        stream
            .transfer_type(FileType::Binary)
            .map_err(map_ftp_error)?;

        self.stream = Some(stream);
        Ok(())
    }

    /// 通过切换工作目录探测目录是否存在，随后切回原目录
    fn exists(&mut self, path: &str) -> TransportResult<bool> {
        let stream = self.stream()?;
        let previous = stream.pwd().map_err(map_ftp_error)?;
        match stream.cwd(path) {
            Ok(()) => {
                stream.cwd(&previous).map_err(map_ftp_error)?;
                Ok(true)
            }
            Err(e) => {
                tracing::debug!(path, error = %e, "CWD 失败，视为不存在");
                Ok(false)
            }
        }
    }

    /// recursive 时逐级 MKD，单级失败只记录，最后以 CWD 探测为准
    fn make_directory(&mut self, path: &str, recursive: bool) -> TransportResult<()> {
        if !recursive {
            return self.stream()?.mkdir(path).map_err(map_ftp_error);
        }

        for prefix in ancestor_prefixes(path) {
            if !self.exists(&prefix)? {
                if let Err(e) = self.stream()?.mkdir(&prefix) {
                    tracing::debug!(path = %prefix, error = %e, "MKD 失败");
                }
            }
        }
        if self.exists(path)? {
            Ok(())
        } else {
            Err(TransportError::from_message(format!("无法创建目录 {}", path)))
        }
    }

    fn change_permissions(&mut self, path: &str, _mode: i32) -> TransportResult<()> {
        Err(TransportError::unsupported(format!(
            "FTP 不支持修改权限: {}",
            path
        )))
    }

    fn upload_file(&mut self, local_path: &Path, remote_path: &str) -> TransportResult<u64> {
        let mut local_file = File::open(local_path).map_err(|e| {
            TransportError::new(
                TransportErrorKind::Other,
                format!("无法打开本地文件 {:?}: {}", local_path, e),
            )
        })?;
        self.stream()?
            .put_file(remote_path, &mut local_file)
            .map_err(map_ftp_error)
    }

    fn delete_file(&mut self, remote_path: &str) -> TransportResult<()> {
        self.stream()?.rm(remote_path).map_err(map_ftp_error)
    }

    fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.quit() {
                tracing::debug!(error = %e, "FTP QUIT 失败");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconnected_operations_fail_as_connection_errors() {
        let mut transport = FtpTransport::new();
        let err = transport.exists("/uploads").unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Connection);
        assert!(transport.make_directory("/uploads", false).is_err());
        let err = transport.make_directory("/srv/uploads", true).unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Connection);
    }

    #[test]
    fn test_reply_code_decides_kind() {
        assert_eq!(
            kind_from_reply(530, "Login incorrect."),
            TransportErrorKind::Authentication
        );
        assert_eq!(
            kind_from_reply(421, "Service not available"),
            TransportErrorKind::Connection
        );
        assert_eq!(
            kind_from_reply(550, "/srv/uploads/vehicles: Permission denied"),
            TransportErrorKind::Permission
        );
        assert_eq!(
            kind_from_reply(550, "/srv/uploads/vehicles/ab12.jpg: No such file or directory"),
            TransportErrorKind::NotFound
        );
        assert_eq!(
            kind_from_reply(550, "/srv/uploads/test: File exists"),
            TransportErrorKind::AlreadyExists
        );
        assert_eq!(
            kind_from_reply(553, "Could not create file."),
            TransportErrorKind::Permission
        );
    }

    #[test]
    fn test_reply_codes_inside_paths_are_ignored() {
        // 随机文件名里出现 530/553 不影响分类
        assert_eq!(
            kind_from_reply(
                452,
                "/srv/site/uploads/vehicles/0a5533fe91c2d4b7.jpg: Insufficient storage space"
            ),
            TransportErrorKind::Other
        );
        assert_eq!(
            kind_from_reply(451, "/srv/site/uploads/brands/5309be11c0a4f2d8.png: Local error"),
            TransportErrorKind::Other
        );
    }

    #[test]
    fn test_close_is_idempotent_without_connect() {
        let mut transport = FtpTransport::new();
        transport.close();
        transport.close();
        assert!(transport.stream.is_none());
    }

    #[test]
    fn test_change_permissions_is_unsupported() {
        let mut transport = FtpTransport::new();
        let err = transport.change_permissions("/uploads", 0o755).unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Unsupported);
    }
}
