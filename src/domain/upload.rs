use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 上传分类，决定远程子目录
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    Vehicles,
    Brands,
    Test,
    /// 调用方自定义的目录名，不做校验
    Custom(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Vehicles => "vehicles",
            Self::Brands => "brands",
            Self::Test => "test",
            Self::Custom(s) => s,
        }
    }
}

impl FromStr for Category {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "vehicles" => Self::Vehicles,
            "brands" => Self::Brands,
            "test" => Self::Test,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(c) => c,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次上传请求，由调用方在上传前构造
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub local_file_path: PathBuf,
    pub category: Category,
}

impl UploadRequest {
    pub fn new(local_file_path: impl Into<PathBuf>, category: Category) -> Self {
        Self {
            local_file_path: local_file_path.into(),
            category,
        }
    }
}

/// 上传成功后返回给调用方保存的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    /// 公网访问地址
    pub url: String,
    /// <category>/<file_name>，删除时使用
    pub key: String,
    /// 文件名中的随机标识
    pub public_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_known_and_custom() {
        assert_eq!(Category::from("vehicles"), Category::Vehicles);
        assert_eq!(Category::from("brands"), Category::Brands);
        assert_eq!(Category::from("test"), Category::Test);
        assert_eq!(
            Category::from("banners"),
            Category::Custom("banners".to_string())
        );
        assert_eq!(Category::default().as_str(), "vehicles");
    }

    #[test]
    fn test_upload_result_serializes_camel_case() {
        let result = UploadResult {
            url: "https://cdn/vehicles/a.jpg".into(),
            key: "vehicles/a.jpg".into(),
            public_id: "a".into(),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"publicId\":\"a\""));
    }
}
