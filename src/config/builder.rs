use std::sync::Arc;
use std::time::Duration;

use super::{Config, ConfigOption, ProxyDescriptor};
use crate::error::ConfigError;
use crate::logging::Logger;

/// Config Builder
///
/// 与依次应用 `ConfigOption` 等价，`build` 时统一验证
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    options: Vec<ConfigOption>,
}

impl ConfigBuilder {
    /// 创建新的 Builder
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置日志适配器
    pub fn log_adapter<I, S>(mut self, name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.push(ConfigOption::log_adapter(name, args));
        self
    }

    /// 设置自定义日志器
    pub fn custom_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.options.push(ConfigOption::custom_logger(logger));
        self
    }

    /// 追加单个代理
    pub fn proxy(mut self, proxy: ProxyDescriptor) -> Self {
        self.options.push(ConfigOption::proxies([proxy]));
        self
    }

    /// 追加多个代理
    pub fn proxies(mut self, proxies: impl IntoIterator<Item = ProxyDescriptor>) -> Self {
        self.options.push(ConfigOption::proxies(proxies));
        self
    }

    /// 设置中继服务器端口
    pub fn server_port(mut self, port: u16) -> Self {
        self.options.push(ConfigOption::server_port(port));
        self
    }

    /// 设置平滑关闭时限
    pub fn graceful_close(mut self, budget: Duration) -> Self {
        self.options.push(ConfigOption::graceful_close(budget));
        self
    }

    /// 已累积的选项
    pub fn into_options(self) -> Vec<ConfigOption> {
        self.options
    }

    /// 构建 Config 并验证
    pub fn build(self) -> Result<Config, ConfigError> {
        let config = Config::from_options(self.options);
        config.validate()?;
        Ok(config)
    }
}
