use std::path::Path;

use anyhow::Result;

use super::config::{Credentials, StagingConfig};
use super::error::TransportResult;

pub trait ConfigRepository {
    fn load(&self) -> Result<StagingConfig>;
    fn save(&self, config: &StagingConfig) -> Result<()>;
}

/// 远程文件存储的传输客户端 (FTP/SFTP)
///
/// 一个实例只服务一次上传或删除：先 `connect`，最后 `close`。
/// `close` 必须幂等，且在 `connect` 失败后调用也是安全的。
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send {
    fn connect(&mut self, credentials: &Credentials) -> TransportResult<()>;

    fn exists(&mut self, path: &str) -> TransportResult<bool>;

    /// recursive 为 true 时同时创建缺失的上级目录
    fn make_directory(&mut self, path: &str, recursive: bool) -> TransportResult<()>;

    fn change_permissions(&mut self, path: &str, mode: i32) -> TransportResult<()>;

    /// 上传本地文件，返回写入的字节数
    fn upload_file(&mut self, local_path: &Path, remote_path: &str) -> TransportResult<u64>;

    fn delete_file(&mut self, remote_path: &str) -> TransportResult<()>;

    fn close(&mut self);
}

/// 每次调用产生一个全新的、未连接的传输实例
#[cfg_attr(test, mockall::automock)]
pub trait TransportFactory: Send + Sync {
    fn create(&self) -> Box<dyn Transport>;
}
