// 运行配置文件（TOML）

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{ConfigOption, ProxyDescriptor};
use crate::error::ConfigError;

/// 日志配置段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSection {
    /// 引擎内置适配器名，例如 console、file
    pub adapter: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// 运行配置文件
///
/// ```toml
/// server_addr = "frp.mydomain.com"
/// token = "secret-token-123"
///
/// [[proxies]]
/// name = "web-server"
/// target_domain = "mysite"
/// use_encryption = true
/// local_port = 8080
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFile {
    /// 中继服务器地址
    pub server_addr: String,
    /// 认证令牌
    pub token: String,
    /// 中继服务器端口（可选）
    #[serde(default)]
    pub server_port: Option<u16>,
    /// 平滑关闭时限（秒）
    #[serde(default)]
    pub graceful_close_secs: Option<u64>,
    #[serde(default)]
    pub log: Option<LogSection>,
    #[serde(default)]
    pub proxies: Vec<ProxyDescriptor>,
}

impl RunFile {
    /// 从文件加载，路径支持 ~ 展开
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = expand_path(path.as_ref());
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .map_err(|e| ConfigError::load(&path, e))?;
        Self::parse(&content).map_err(|e| ConfigError::load(&path, e))
    }

    /// 解析 TOML 内容
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("Failed to parse run file")
    }

    /// 转换为配置选项
    pub fn options(&self) -> Vec<ConfigOption> {
        let mut options = Vec::new();

        if let Some(log) = &self.log {
            options.push(ConfigOption::log_adapter(&log.adapter, log.args.iter()));
        }
        if let Some(port) = self.server_port {
            options.push(ConfigOption::server_port(port));
        }
        if let Some(secs) = self.graceful_close_secs {
            options.push(ConfigOption::graceful_close(Duration::from_secs(secs)));
        }
        if !self.proxies.is_empty() {
            options.push(ConfigOption::proxies(self.proxies.iter().cloned()));
        }

        options
    }
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).as_ref()),
        None => path.to_path_buf(),
    }
}

/// 示例运行文件
pub const RUN_FILE_TEMPLATE: &str = r#"# Relay server address and static token
server_addr = "frp.mydomain.com"
token = "secret-token-123"
# server_port = 7000
# graceful_close_secs = 5

# Optional engine log adapter (console, file, ...); args are passed through
# [log]
# adapter = "file"
# args = ['{"filename":"tunnel.log"}']

[[proxies]]
name = "web-server"
target_domain = "mysite"
use_encryption = true
use_compression = true
local_port = 8080
"#;
