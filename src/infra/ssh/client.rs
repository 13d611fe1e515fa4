use std::fs::File;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::Path;
use std::time::Duration;

use ssh2::{ErrorCode, FileStat, Session, Sftp};

use crate::domain::config::Credentials;
use crate::domain::error::{TransportError, TransportErrorKind, TransportResult};
use crate::domain::ports::Transport;
use crate::infra::net::resolve_addr;
use crate::shared::path_utils::escape_shell_arg;

use super::auth;

// libssh2 SFTP 状态码
const FX_NO_SUCH_FILE: i32 = 2;
const FX_PERMISSION_DENIED: i32 = 3;
const FX_FILE_ALREADY_EXISTS: i32 = 11;

fn map_ssh_error(e: ssh2::Error) -> TransportError {
    let kind = match e.code() {
        ErrorCode::SFTP(FX_NO_SUCH_FILE) => TransportErrorKind::NotFound,
        ErrorCode::SFTP(FX_PERMISSION_DENIED) => TransportErrorKind::Permission,
        ErrorCode::SFTP(FX_FILE_ALREADY_EXISTS) => TransportErrorKind::AlreadyExists,
        _ => TransportErrorKind::classify(e.message()),
    };
    TransportError::new(kind, e.to_string())
}

fn connection_error(context: &str, e: impl std::fmt::Display) -> TransportError {
    TransportError::new(
        TransportErrorKind::Connection,
        format!("{}: {}", context, e),
    )
}

/// ssh2 的阻塞超时以 u32 毫秒表示，超出范围取上限
fn session_timeout_ms(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

fn mkdir_p_command(path: &str) -> String {
    format!("mkdir -p {}", escape_shell_arg(path))
}

/// 已认证的 SSH 连接，sftp 需先于 session 释放
struct Connection {
    sftp: Sftp,
    session: Session,
    _tcp: TcpStream, // 保持 TCP 连接存活
}

/// SSH/SFTP 传输
#[derive(Default)]
pub struct SftpTransport {
    conn: Option<Connection>,
}

impl SftpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn conn(&mut self) -> TransportResult<&mut Connection> {
        self.conn.as_mut().ok_or_else(|| {
            TransportError::new(TransportErrorKind::Connection, "SFTP 会话未建立")
        })
    }

    /// 在远程执行 shell 命令，非零退出码视为失败
    fn remote_exec(&mut self, command: &str) -> TransportResult<String> {
        let conn = self.conn()?;
        let mut channel = conn
            .session
            .channel_session()
            .map_err(map_ssh_error)?;
        channel.exec(command).map_err(map_ssh_error)?;
        let mut output = String::new();
        channel
            .read_to_string(&mut output)
            .map_err(|e| TransportError::from_message(e.to_string()))?;
        channel.wait_close().ok();
        let exit = channel.exit_status().unwrap_or(-1);
        if exit != 0 {
            return Err(TransportError::from_message(format!(
                "命令退出码 {}: {}",
                exit,
                output.trim()
            )));
        }
        Ok(output)
    }
}

impl Transport for SftpTransport {
    fn connect(&mut self, credentials: &Credentials) -> TransportResult<()> {
        let addr = resolve_addr(&credentials.host, credentials.port)?;
        let tcp = TcpStream::connect_timeout(&addr, credentials.connect_timeout)
            .map_err(|e| connection_error("TCP 连接失败", e))?;
        tracing::debug!(%addr, "TCP 连接成功");

        let mut session = Session::new().map_err(|e| connection_error("Session 创建失败", e))?;
        let tcp_clone = tcp
            .try_clone()
            .map_err(|e| connection_error("TCP 克隆失败", e))?;
        session.set_tcp_stream(tcp_clone);
        session.set_timeout(session_timeout_ms(credentials.connect_timeout));
        session
            .handshake()
            .map_err(|e| connection_error("SSH 握手失败", e))?;
        tracing::debug!("SSH 握手成功");

        auth::authenticate(&session, credentials)?;
        if !session.authenticated() {
            return Err(TransportError::new(
                TransportErrorKind::Authentication,
                "认证未通过",
            ));
        }

        let sftp = session.sftp().map_err(map_ssh_error)?;
        self.conn = Some(Connection {
            sftp,
            session,
            _tcp: tcp,
        });
        Ok(())
    }

    fn exists(&mut self, path: &str) -> TransportResult<bool> {
        let conn = self.conn()?;
        match conn.sftp.stat(Path::new(path)) {
            Ok(_) => Ok(true),
            Err(e) => {
                let err = map_ssh_error(e);
                if err.kind == TransportErrorKind::NotFound {
                    Ok(false)
                } else {
                    Err(err)
                }
            }
        }
    }

    /// recursive 时通过 exec 通道执行 `mkdir -p`，否则为单级 SFTP mkdir
    fn make_directory(&mut self, path: &str, recursive: bool) -> TransportResult<()> {
        if recursive {
            self.remote_exec(&mkdir_p_command(path))?;
            return Ok(());
        }
        let conn = self.conn()?;
        conn.sftp
            .mkdir(Path::new(path), 0o755)
            .map_err(map_ssh_error)
    }

    fn change_permissions(&mut self, path: &str, mode: i32) -> TransportResult<()> {
        let conn = self.conn()?;
        let stat = FileStat {
            size: None,
            uid: None,
            gid: None,
            perm: Some(mode as u32),
            atime: None,
            mtime: None,
        };
        conn.sftp
            .setstat(Path::new(path), stat)
            .map_err(map_ssh_error)
    }

    fn upload_file(&mut self, local_path: &Path, remote_path: &str) -> TransportResult<u64> {
        let mut local_file = File::open(local_path).map_err(|e| {
            TransportError::new(
                TransportErrorKind::Other,
                format!("无法打开本地文件 {:?}: {}", local_path, e),
            )
        })?;

        let conn = self.conn()?;
        let mut remote_file = conn
            .sftp
            .create(Path::new(remote_path))
            .map_err(map_ssh_error)?;

        let io_err = |e: std::io::Error| TransportError::from_message(e.to_string());
        let mut buffer = [0u8; 8192];
        let mut transferred = 0u64;

        loop {
            let bytes_read = local_file.read(&mut buffer).map_err(io_err)?;
            if bytes_read == 0 {
                break;
            }
            remote_file
                .write_all(&buffer[..bytes_read])
                .map_err(io_err)?;
            transferred += bytes_read as u64;
        }
        remote_file.flush().map_err(io_err)?;

        Ok(transferred)
    }

    fn delete_file(&mut self, remote_path: &str) -> TransportResult<()> {
        let conn = self.conn()?;
        conn.sftp
            .unlink(Path::new(remote_path))
            .map_err(map_ssh_error)
    }

    fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            let Connection { sftp, session, _tcp } = conn;
            drop(sftp);
            if let Err(e) = session.disconnect(None, "bye", None) {
                tracing::debug!(error = %e, "SSH 断开连接失败");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconnected_operations_fail_as_connection_errors() {
        let mut transport = SftpTransport::new();
        let err = transport.exists("/srv").unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Connection);
        assert!(transport.delete_file("/srv/a.jpg").is_err());
        let err = transport.make_directory("/srv/uploads", true).unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Connection);
    }

    #[test]
    fn test_mkdir_p_command_quotes_path() {
        assert_eq!(
            mkdir_p_command("/srv/site/uploads/vehicles"),
            "mkdir -p '/srv/site/uploads/vehicles'"
        );
        assert_eq!(
            mkdir_p_command("/srv/uploads/it's; rm -rf /"),
            "mkdir -p '/srv/uploads/it'\\''s; rm -rf /'"
        );
    }

    #[test]
    fn test_session_timeout_is_clamped() {
        assert_eq!(session_timeout_ms(Duration::from_secs(30)), 30_000);
        assert_eq!(session_timeout_ms(Duration::from_secs(u64::MAX)), u32::MAX);
    }

    #[test]
    fn test_close_is_idempotent_without_connect() {
        let mut transport = SftpTransport::new();
        transport.close();
        transport.close();
        assert!(transport.conn.is_none());
    }

    #[test]
    fn test_map_ssh_error_codes() {
        let err = map_ssh_error(ssh2::Error::new(
            ErrorCode::SFTP(FX_NO_SUCH_FILE),
            "no such file",
        ));
        assert_eq!(err.kind, TransportErrorKind::NotFound);

        let err = map_ssh_error(ssh2::Error::new(
            ErrorCode::SFTP(FX_PERMISSION_DENIED),
            "permission denied",
        ));
        assert_eq!(err.kind, TransportErrorKind::Permission);
    }
}
