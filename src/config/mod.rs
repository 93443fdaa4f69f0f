// 配置管理模块 - 选项累积、验证和运行文件加载

mod builder;
mod file;
mod validator;

pub use builder::ConfigBuilder;
pub use file::{LogSection, RunFile, RUN_FILE_TEMPLATE};
pub use validator::ConfigValidator;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ConfigError;
use crate::logging::{LogSelection, Logger};

/// 默认平滑关闭时限
pub const DEFAULT_GRACEFUL_CLOSE: Duration = Duration::from_secs(5);

/// 单个隧道的描述
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProxyDescriptor {
    /// 代理名称，同一次运行内应唯一
    #[serde(default)]
    pub name: String,
    /// 对外访问的子域名，例如 webhooktest
    #[serde(default)]
    pub target_domain: String,
    #[serde(default)]
    pub use_encryption: bool,
    #[serde(default)]
    pub use_compression: bool,
    /// 转发到的本地端口
    #[serde(default)]
    pub local_port: u16,
}

impl ProxyDescriptor {
    pub fn new(name: impl Into<String>, target_domain: impl Into<String>, local_port: u16) -> Self {
        Self {
            name: name.into(),
            target_domain: target_domain.into(),
            local_port,
            ..Default::default()
        }
    }

    /// 启用加密
    pub fn encrypted(mut self, enabled: bool) -> Self {
        self.use_encryption = enabled;
        self
    }

    /// 启用压缩
    pub fn compressed(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    /// 验证必填字段
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigValidator::validate_proxy(self)
    }
}

/// 单个配置选项
///
/// 选项按顺序应用，应用过程不会失败，错误只在验证时出现
#[derive(Clone)]
pub enum ConfigOption {
    /// 选择内置日志适配器（覆盖之前的适配器设置）
    LogAdapter { name: String, args: Vec<String> },
    /// 使用自定义日志器（覆盖之前的自定义日志器）
    CustomLogger(Arc<dyn Logger>),
    /// 追加代理
    Proxies(Vec<ProxyDescriptor>),
    /// 覆盖中继服务器端口，0 表示使用引擎默认值
    ServerPort(u16),
    /// 覆盖平滑关闭时限
    GracefulClose(Duration),
}

impl ConfigOption {
    pub fn log_adapter<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::LogAdapter {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn custom_logger(logger: Arc<dyn Logger>) -> Self {
        Self::CustomLogger(logger)
    }

    pub fn proxies(proxies: impl IntoIterator<Item = ProxyDescriptor>) -> Self {
        Self::Proxies(proxies.into_iter().collect())
    }

    pub fn server_port(port: u16) -> Self {
        Self::ServerPort(port)
    }

    pub fn graceful_close(budget: Duration) -> Self {
        Self::GracefulClose(budget)
    }
}

impl fmt::Debug for ConfigOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LogAdapter { name, args } => f
                .debug_struct("LogAdapter")
                .field("name", name)
                .field("args", args)
                .finish(),
            Self::CustomLogger(_) => write!(f, "CustomLogger(..)"),
            Self::Proxies(p) => f.debug_tuple("Proxies").field(p).finish(),
            Self::ServerPort(p) => f.debug_tuple("ServerPort").field(p).finish(),
            Self::GracefulClose(d) => f.debug_tuple("GracefulClose").field(d).finish(),
        }
    }
}

/// 一次运行的配置
#[derive(Clone)]
pub struct Config {
    pub(crate) adapter_name: String,
    pub(crate) adapter_args: Vec<String>,
    pub(crate) custom_logger: Option<Arc<dyn Logger>>,
    pub(crate) server_port: u16,
    pub(crate) proxies: Vec<ProxyDescriptor>,
    pub(crate) graceful_close: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adapter_name: String::new(),
            adapter_args: Vec::new(),
            custom_logger: None,
            server_port: 0,
            proxies: Vec::new(),
            graceful_close: DEFAULT_GRACEFUL_CLOSE,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("adapter_name", &self.adapter_name)
            .field("adapter_args", &self.adapter_args)
            .field("custom_logger", &self.custom_logger.is_some())
            .field("server_port", &self.server_port)
            .field("proxies", &self.proxies)
            .field("graceful_close", &self.graceful_close)
            .finish()
    }
}

impl Config {
    /// 在默认配置上依次应用选项
    pub fn from_options(options: impl IntoIterator<Item = ConfigOption>) -> Self {
        let mut config = Self::default();
        for option in options {
            config.apply(option);
        }
        config
    }

    /// 应用单个选项
    pub fn apply(&mut self, option: ConfigOption) {
        match option {
            ConfigOption::LogAdapter { name, args } => {
                self.adapter_name = name;
                self.adapter_args = args;
            }
            ConfigOption::CustomLogger(logger) => self.custom_logger = Some(logger),
            ConfigOption::Proxies(proxies) => self.proxies.extend(proxies),
            ConfigOption::ServerPort(port) => self.server_port = port,
            ConfigOption::GracefulClose(budget) => self.graceful_close = budget,
        }
    }

    /// 验证配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigValidator::validate_config(self)
    }

    /// 是否设置了日志适配器（名称或参数任一非空）
    pub fn adapter_set(&self) -> bool {
        !self.adapter_name.is_empty() || !self.adapter_args.is_empty()
    }

    /// 当前的日志选择
    ///
    /// 应在验证通过后调用；若两者都设置，自定义日志器优先
    pub fn log_selection(&self) -> LogSelection {
        if let Some(logger) = &self.custom_logger {
            LogSelection::Custom(logger.clone())
        } else if !self.adapter_name.is_empty() {
            LogSelection::Adapter {
                name: self.adapter_name.clone(),
                args: self.adapter_args.clone(),
            }
        } else {
            LogSelection::None
        }
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn proxies(&self) -> &[ProxyDescriptor] {
        &self.proxies
    }

    pub fn graceful_close(&self) -> Duration {
        self.graceful_close
    }
}
