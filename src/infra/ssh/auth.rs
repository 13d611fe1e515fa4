use std::path::Path;

use ssh2::Session;

use crate::domain::config::Credentials;
use crate::domain::error::{TransportError, TransportErrorKind};

fn auth_error(message: impl Into<String>) -> TransportError {
    TransportError::new(TransportErrorKind::Authentication, message)
}

/// 依次尝试: 密码 -> 指定密钥 -> SSH Agent -> ~/.ssh 下的私钥
pub fn authenticate(session: &Session, credentials: &Credentials) -> Result<(), TransportError> {
    let user = credentials.user.as_str();

    if let Some(pwd) = &credentials.password {
        tracing::debug!(user, "尝试密码认证");
        return session
            .userauth_password(user, pwd)
            .map_err(|e| auth_error(format!("密码认证失败: {}", e)));
    }

    if let Some(key_path) = &credentials.key_path {
        tracing::debug!(user, key = ?key_path, "尝试指定密钥");
        match session.userauth_pubkey_file(user, None, key_path, None) {
            Ok(_) => return Ok(()),
            Err(e) => tracing::debug!(error = %e, "指定密钥认证失败"),
        }
    }

    tracing::debug!(user, "尝试 SSH Agent");
    match session.userauth_agent(user) {
        Ok(_) => return Ok(()),
        Err(e) => tracing::debug!(error = %e, "SSH Agent 认证失败/跳过"),
    }

    if try_default_keys(session, user) {
        return Ok(());
    }

    Err(auth_error(format!("用户 {} 的所有认证方式均失败", user)))
}

fn is_candidate_key(file_name: &str) -> bool {
    !(file_name.ends_with(".pub")
        || file_name.starts_with("known_hosts")
        || file_name == "config"
        || file_name == "authorized_keys")
}

fn try_default_keys(session: &Session, user: &str) -> bool {
    let Some(home) = dirs::home_dir() else {
        tracing::debug!("无法获取用户主目录");
        return false;
    };
    let Ok(entries) = std::fs::read_dir(home.join(".ssh")) else {
        return false;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !is_candidate_key(file_name) {
            continue;
        }
        if try_key(session, user, &path) {
            return true;
        }
    }
    false
}

fn try_key(session: &Session, user: &str, path: &Path) -> bool {
    match session.userauth_pubkey_file(user, None, path, None) {
        Ok(_) => {
            tracing::debug!(key = ?path, "密钥认证成功");
            true
        }
        Err(e) => {
            tracing::debug!(key = ?path, error = %e, "密钥文件不匹配");
            false
        }
    }
}
