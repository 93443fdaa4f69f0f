use std::collections::HashSet;

use super::{Config, ProxyDescriptor};
use crate::error::{ConfigError, ProxyField};

/// 配置验证器 - 负责所有配置验证逻辑
pub struct ConfigValidator;

impl ConfigValidator {
    /// 验证单个代理描述的必填字段
    ///
    /// 按 name、target_domain、local_port 的顺序检查，返回第一个缺失的字段
    pub fn validate_proxy(proxy: &ProxyDescriptor) -> Result<(), ConfigError> {
        if proxy.name.is_empty() {
            return Err(ConfigError::invalid_proxy("", ProxyField::Name));
        }
        if proxy.target_domain.is_empty() {
            return Err(ConfigError::invalid_proxy(&proxy.name, ProxyField::TargetDomain));
        }
        if proxy.local_port == 0 {
            return Err(ConfigError::invalid_proxy(&proxy.name, ProxyField::LocalPort));
        }
        Ok(())
    }

    /// 验证代理列表，遇到第一个错误即返回
    pub fn validate_proxies(proxies: &[ProxyDescriptor]) -> Result<(), ConfigError> {
        let mut seen_names = HashSet::new();

        for proxy in proxies {
            Self::validate_proxy(proxy)?;

            if !seen_names.insert(proxy.name.as_str()) {
                return Err(ConfigError::DuplicateProxyName {
                    name: proxy.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// 验证完整配置
    pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
        if config.adapter_set() && config.custom_logger.is_some() {
            return Err(ConfigError::ConflictingLogger);
        }

        Self::validate_proxies(&config.proxies)
    }
}
