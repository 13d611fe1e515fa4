use crate::domain::error::{StageError, TransportError};
use crate::domain::ports::Transport;
use crate::shared::path_utils::ancestor_prefixes;

/// 确保远程目录 (及其所有上级目录) 存在，返回新建的目录数
///
/// 目录已存在时不做任何创建。逐级检查前缀，缺失的才创建；
/// 单级创建失败 (包括并发下的 "已存在") 只记录日志。
/// 逐级创建后目录仍不存在时，再让传输层递归创建一次，
/// 由最后一次存在性检查决定成败。
/// `mode` 不为空时，新建目录后尽力设置权限，失败只告警。
pub fn ensure_directory(
    transport: &mut dyn Transport,
    path: &str,
    mode: Option<i32>,
) -> Result<usize, StageError> {
    if transport
        .exists(path)
        .map_err(|e| StageError::at_path(path, e))?
    {
        tracing::debug!(path, "远程目录已存在");
        return Ok(0);
    }

    let mut created = 0;
    let mut last_error: Option<TransportError> = None;

    for prefix in ancestor_prefixes(path) {
        let present = transport
            .exists(&prefix)
            .map_err(|e| StageError::at_path(&prefix, e))?;
        if present {
            continue;
        }

        tracing::debug!(path = %prefix, "创建远程目录");
        match transport.make_directory(&prefix, false) {
            Ok(()) => {
                created += 1;
                apply_mode(transport, &prefix, mode);
            }
            Err(e) if e.is_already_exists() => {
                tracing::debug!(path = %prefix, "目录已被其他会话创建");
            }
            Err(e) => {
                tracing::warn!(path = %prefix, error = %e, "创建目录失败");
                last_error = Some(e);
            }
        }
    }

    match transport.exists(path) {
        Ok(true) => return ready(path, created),
        Ok(false) => {}
        Err(e) => {
            return Err(StageError::DirectoryCreation {
                path: path.to_string(),
                source: Some(e),
            })
        }
    }

    tracing::debug!(path, "逐级创建未完成，尝试递归创建");
    match transport.make_directory(path, true) {
        Ok(()) => {
            created += 1;
            apply_mode(transport, path, mode);
        }
        Err(e) => {
            tracing::warn!(path, error = %e, "递归创建目录失败");
            last_error = Some(e);
        }
    }

    match transport.exists(path) {
        Ok(true) => ready(path, created),
        Ok(false) => Err(StageError::DirectoryCreation {
            path: path.to_string(),
            source: last_error,
        }),
        Err(e) => Err(StageError::DirectoryCreation {
            path: path.to_string(),
            source: Some(e),
        }),
    }
}

fn apply_mode(transport: &mut dyn Transport, path: &str, mode: Option<i32>) {
    if let Some(mode) = mode {
        if let Err(e) = transport.change_permissions(path, mode) {
            tracing::warn!(path, mode = %format!("{:o}", mode), error = %e, "设置目录权限失败");
        }
    }
}

fn ready(path: &str, created: usize) -> Result<usize, StageError> {
    tracing::info!(path, created, "远程目录就绪");
    Ok(created)
}
