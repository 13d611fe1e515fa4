use std::path::Path;

use super::upload::Category;

/// 随机标识的字节数 (十六进制后 16 个字符)
const PUBLIC_ID_BYTES: usize = 8;

/// 生成的远程文件名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedName {
    pub public_id: String,
    pub file_name: String,
}

/// 为本地文件生成随机文件名，保留原扩展名 (含大小写)
pub fn generate_unique_file_name(local_file_path: &Path) -> GeneratedName {
    let bytes: [u8; PUBLIC_ID_BYTES] = rand::random();
    let public_id = hex::encode(bytes);
    let ext = local_file_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    GeneratedName {
        file_name: format!("{}{}", public_id, ext),
        public_id,
    }
}

/// 远程目录布局: <uploads_root>/<category>/<file_name>
#[derive(Debug, Clone)]
pub struct RemoteLayout {
    uploads_root: String,
    public_base_url: String,
}

impl RemoteLayout {
    pub fn new(uploads_root: impl Into<String>, public_base_url: impl Into<String>) -> Self {
        Self {
            uploads_root: uploads_root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn uploads_root(&self) -> &str {
        &self.uploads_root
    }

    pub fn resolve_directory(&self, category: &Category) -> String {
        format!("{}/{}", self.uploads_root, category)
    }

    pub fn remote_path(&self, category: &Category, file_name: &str) -> String {
        format!("{}/{}", self.resolve_directory(category), file_name)
    }

    /// 由 key 还原远程完整路径
    pub fn path_for_key(&self, key: &str) -> String {
        format!("{}/{}", self.uploads_root, key)
    }

    pub fn key(category: &Category, file_name: &str) -> String {
        format!("{}/{}", category, file_name)
    }

    pub fn public_url(&self, category: &Category, file_name: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            Self::key(category, file_name)
        )
    }
}
