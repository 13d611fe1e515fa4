use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stager::shared::path_utils;
use stager::{AppContext, Category, UploadRequest};

#[derive(Parser, Debug)]
#[command(author, version, about = "通过 FTP/SFTP 暂存车辆与品牌图片", long_about = None)]
struct Args {
    /// 配置文件路径 (默认 ~/.config/stager/stager.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 上传文件，输出 JSON 结果
    Upload {
        #[arg(value_name = "FILE")]
        file: String,
        /// 远程分类目录: vehicles / brands / test / 自定义
        #[arg(long, short, default_value = "vehicles")]
        category: String,
    },
    /// 按 key 删除远程文件 (如 vehicles/ab12cd34ef56ab12.jpg)
    Remove {
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// 测试连接并检查 uploads 目录
    Check,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let ctx = AppContext::bootstrap(args.config)?;
    let stager = ctx.stager();

    match args.command {
        Command::Upload { file, category } => {
            let local = path_utils::normalize_path(&file)?;
            let request = UploadRequest::new(local, Category::from(category.as_str()));
            let result = stager.upload(&request)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Remove { key } => {
            let removed = stager.remove(&key);
            println!("{}", removed);
            Ok(if removed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Check => {
            let root_exists = stager.check()?;
            tracing::info!(
                host = %ctx.config.host,
                transport = %ctx.config.transport,
                root = %stager.layout().uploads_root(),
                root_exists,
                "连接成功"
            );
            println!("{}", root_exists);
            Ok(ExitCode::SUCCESS)
        }
    }
}
