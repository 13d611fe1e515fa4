use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::error::StageError;

/// 标准化路径，相对路径基于当前工作目录
pub fn normalize_path(path_str: &str) -> Result<PathBuf> {
    let path = PathBuf::from(path_str);

    if let Ok(p) = std::fs::canonicalize(&path) {
        return Ok(p);
    }

    if path.is_absolute() {
        Ok(path)
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .with_context(|| "无法获取当前工作目录")
    }
}

/// 检查路径存在、是文件且可读
pub fn ensure_readable_file(path: &Path) -> Result<(), StageError> {
    let local_err = |reason: &str| StageError::LocalFile {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if !path.exists() {
        return Err(local_err("文件不存在"));
    }
    if !path.is_file() {
        return Err(local_err("路径不是一个文件"));
    }
    File::open(path).map_err(|e| local_err(&e.to_string()))?;
    Ok(())
}

/// 远程路径从根到叶的各级前缀
/// "/a/b/c" -> ["/a", "/a/b", "/a/b/c"]
pub fn ancestor_prefixes(path: &str) -> Vec<String> {
    let lead = if path.starts_with('/') { "/" } else { "" };
    let mut prefixes = Vec::new();
    let mut current = String::new();

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if current.is_empty() {
            current = format!("{}{}", lead, segment);
        } else {
            current.push('/');
            current.push_str(segment);
        }
        prefixes.push(current.clone());
    }
    prefixes
}

/// 转义 shell 参数，防止注入攻击
/// 用单引号包裹，内部单引号用 '\'' 转义
pub fn escape_shell_arg(arg: &str) -> String {
    let escaped = arg.replace('\'', "'\\''");
    format!("'{}'", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_shell_arg_simple() {
        assert_eq!(escape_shell_arg("/tmp/test"), "'/tmp/test'");
    }

    #[test]
    fn test_escape_shell_arg_with_single_quote() {
        assert_eq!(escape_shell_arg("it's"), "'it'\\''s'");
    }

    #[test]
    fn test_escape_shell_arg_injection() {
        let escaped = escape_shell_arg("/tmp; rm -rf /");
        assert_eq!(escaped, "'/tmp; rm -rf /'");
    }

    #[test]
    fn test_ancestor_prefixes_absolute() {
        assert_eq!(
            ancestor_prefixes("/srv/uploads/brands"),
            vec!["/srv", "/srv/uploads", "/srv/uploads/brands"]
        );
    }

    #[test]
    fn test_ancestor_prefixes_relative_and_repeated_slashes() {
        assert_eq!(
            ancestor_prefixes("uploads//vehicles/"),
            vec!["uploads", "uploads/vehicles"]
        );
        assert!(ancestor_prefixes("/").is_empty());
    }

    #[test]
    fn test_ensure_readable_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(ensure_readable_file(file.path()).is_ok());

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ensure_readable_file(dir.path()),
            Err(StageError::LocalFile { .. })
        ));
        assert!(ensure_readable_file(&dir.path().join("missing.jpg")).is_err());
    }

    #[test]
    fn test_normalize_relative_path_is_absolute() {
        let p = normalize_path("does-not-exist.jpg").unwrap();
        assert!(p.is_absolute());
    }
}
