use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// 覆盖配置文件中密码的环境变量
pub const PASSWORD_ENV: &str = "STAGER_PASSWORD";

/// 远程传输协议
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Ftp,
    #[default]
    Sftp,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ftp => f.write_str("ftp"),
            Self::Sftp => f.write_str("sftp"),
        }
    }
}

/// 上传流水线配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StagingConfig {
    /// 传输协议: "ftp" 或 "sftp"
    #[serde(default)]
    pub transport: TransportKind,
    /// 主机地址 (IP 或域名)
    pub host: String,
    pub port: u16,
    pub user: String,
    /// 密码，可由 STAGER_PASSWORD 覆盖
    #[serde(default)]
    pub password: Option<String>,
    /// 私钥路径 (仅 SFTP)
    #[serde(default)]
    pub key_path: Option<String>,
    /// 显式 FTPS (仅 FTP)
    #[serde(default)]
    pub secure: bool,
    /// 远程站点根目录，上传文件位于 <remote_base>/uploads/<category>/
    pub remote_base: String,
    /// 对外访问地址，对应远程 uploads 目录
    pub public_base_url: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// 新建目录后尝试设置的权限 (如 0o755)，失败只记录警告
    #[serde(default)]
    pub directory_mode: Option<i32>,
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Sftp,
            host: "127.0.0.1".to_string(),
            port: 22,
            user: "deploy".to_string(),
            password: None,
            key_path: None,
            secure: false,
            remote_base: "/var/www/site".to_string(),
            public_base_url: "http://127.0.0.1/uploads".to_string(),
            connect_timeout_secs: default_connect_timeout_secs(),
            directory_mode: Some(0o755),
        }
    }
}

impl StagingConfig {
    /// 远程 uploads 根目录
    pub fn uploads_root(&self) -> String {
        format!("{}/uploads", self.remote_base.trim_end_matches('/'))
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            key_path: self
                .key_path
                .as_ref()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            secure: self.secure,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }

    /// 用环境变量中的密码覆盖配置
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(pwd) = std::env::var(PASSWORD_ENV) {
            if !pwd.is_empty() {
                self.password = Some(pwd);
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            bail!("host 不能为空");
        }
        if self.port == 0 {
            bail!("port 不能为 0");
        }
        if self.user.trim().is_empty() {
            bail!("user 不能为空");
        }
        if self.public_base_url.trim().is_empty() {
            bail!("public_base_url 不能为空");
        }
        if self.connect_timeout_secs == 0 {
            bail!("connect_timeout_secs 必须大于 0");
        }
        Ok(())
    }
}

/// 建立会话所需的凭据
#[derive(Clone)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub key_path: Option<PathBuf>,
    pub secure: bool,
    pub connect_timeout: Duration,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("key_path", &self.key_path)
            .field("secure", &self.secure)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_secret() {
        let cfg = StagingConfig::default();
        assert!(cfg.password.is_none());
        assert_eq!(cfg.transport, TransportKind::Sftp);
        assert_eq!(cfg.connect_timeout_secs, 30);
    }

    #[test]
    fn test_uploads_root_trims_trailing_slash() {
        let cfg = StagingConfig {
            remote_base: "/srv/site/".into(),
            ..StagingConfig::default()
        };
        assert_eq!(cfg.uploads_root(), "/srv/site/uploads");
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = StagingConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: StagingConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.host, config.host);
        assert_eq!(parsed.port, config.port);
        assert_eq!(parsed.transport, config.transport);
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let parsed: StagingConfig = toml::from_str(
            r#"
            transport = "ftp"
            host = "ftp.example.com"
            port = 21
            user = "web"
            remote_base = "/public_html"
            public_base_url = "https://example.com/uploads"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.transport, TransportKind::Ftp);
        assert_eq!(parsed.connect_timeout_secs, 30);
        assert!(!parsed.secure);
        assert!(parsed.directory_mode.is_none());
    }

    #[test]
    fn test_validate_rejects_empty_host() {
        let cfg = StagingConfig {
            host: " ".into(),
            ..StagingConfig::default()
        };
        assert!(cfg.validate().is_err());
        assert!(StagingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let cfg = StagingConfig {
            connect_timeout_secs: 0,
            ..StagingConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("connect_timeout_secs"));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let cfg = StagingConfig {
            password: Some("hunter2".into()),
            key_path: Some(String::new()),
            ..StagingConfig::default()
        };
        let creds = cfg.credentials();
        assert!(creds.key_path.is_none());
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
