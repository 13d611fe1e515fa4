use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// 传输层错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// 网络不可达、连接被拒绝、超时
    Connection,
    /// 凭据被远程拒绝
    Authentication,
    /// 无权限操作该路径
    Permission,
    NotFound,
    AlreadyExists,
    /// 当前传输不支持该操作
    Unsupported,
    Other,
}

impl TransportErrorKind {
    /// 根据常见消息片段推断错误类别
    ///
    /// 只匹配文字片段。消息里常带有远程路径，而随机文件名可能包含任意数字，
    /// 所以协议数字码由各传输自己解析。
    pub fn classify(message: &str) -> Self {
        let msg = message.to_lowercase();

        const AUTH: &[&str] = &[
            "authentication",
            "auth fail",
            "login incorrect",
            "not logged in",
            "username/publickey",
        ];
        const CONNECTION: &[&str] = &[
            "refused",
            "timed out",
            "timeout",
            "unreachable",
            "failed to lookup",
            "no route",
            "reset by peer",
            "handshake",
            "econnrefused",
            "etimedout",
            "enotfound",
        ];
        const PERMISSION: &[&str] = &["permission denied", "eacces", "access denied"];
        const EXISTS: &[&str] = &["already exists", "file exists", "eexist"];
        const NOT_FOUND: &[&str] = &["no such file", "not found", "enoent"];

        let hit = |needles: &[&str]| needles.iter().any(|n| msg.contains(n));

        if hit(AUTH) {
            Self::Authentication
        } else if hit(PERMISSION) {
            Self::Permission
        } else if hit(CONNECTION) {
            Self::Connection
        } else if hit(EXISTS) {
            Self::AlreadyExists
        } else if hit(NOT_FOUND) {
            Self::NotFound
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Connection => "连接错误",
            Self::Authentication => "认证失败",
            Self::Permission => "权限不足",
            Self::NotFound => "路径不存在",
            Self::AlreadyExists => "路径已存在",
            Self::Unsupported => "不支持的操作",
            Self::Other => "传输错误",
        };
        f.write_str(s)
    }
}

/// 传输客户端 (FTP/SFTP) 返回的原始错误
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// 由消息内容自动推断类别
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: TransportErrorKind::classify(&message),
            message,
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unsupported, message)
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind == TransportErrorKind::AlreadyExists
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

/// 上传流水线中的错误
#[derive(Debug, Error)]
pub enum StageError {
    #[error("本地文件不可用: {path:?}: {reason}")]
    LocalFile { path: PathBuf, reason: String },

    #[error("无法连接到 {host}:{port}: {source}")]
    Connection {
        host: String,
        port: u16,
        #[source]
        source: TransportError,
    },

    #[error("{host} 拒绝了用户 {user} 的凭据: {source}")]
    Authentication {
        host: String,
        user: String,
        #[source]
        source: TransportError,
    },

    #[error("无权限操作远程路径 {path}: {source}")]
    Permission {
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("无法创建远程目录 {path}")]
    DirectoryCreation {
        path: String,
        #[source]
        source: Option<TransportError>,
    },

    #[error("远程操作失败 {path}: {source}")]
    Transfer {
        path: String,
        #[source]
        source: TransportError,
    },
}

impl StageError {
    /// 将针对某个远程路径的传输错误归类
    pub fn at_path(path: &str, source: TransportError) -> Self {
        match source.kind {
            TransportErrorKind::Permission => Self::Permission {
                path: path.to_string(),
                source,
            },
            _ => Self::Transfer {
                path: path.to_string(),
                source,
            },
        }
    }
}

/// 上传入口返回的唯一错误类型，总是带上本地与远程路径
#[derive(Debug, Error)]
#[error("上传 {local:?} 到 {remote} 失败: {kind}")]
pub struct UploadError {
    pub local: PathBuf,
    pub remote: String,
    #[source]
    pub kind: StageError,
}
