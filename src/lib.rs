//! 远程文件暂存流水线：把本地文件经 FTP/SFTP 上传到
//! `<remote_base>/uploads/<category>/<随机名>`，返回公网地址与删除用的 key。

pub mod app;
pub mod domain;
pub mod infra;
pub mod shared;

pub use app::context::AppContext;
pub use app::services::stager::Stager;
pub use domain::config::{StagingConfig, TransportKind};
pub use domain::error::{StageError, TransportError, TransportErrorKind, UploadError};
pub use domain::upload::{Category, UploadRequest, UploadResult};
