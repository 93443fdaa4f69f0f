// 代理描述转换 - ProxyDescriptor -> 引擎 HTTP 代理配置

use std::collections::BTreeMap;
use tracing::debug;

use crate::config::ProxyDescriptor;
use crate::engine::{HttpProxyConf, ProxyConf, ProxyKind};
use crate::error::TranslationError;

/// 转发的路径前缀，本层只支持整域名转发
pub const ROOT_LOCATION: &str = "/";

/// 将单个代理描述转换为 HTTP 代理配置
pub fn translate(proxy: &ProxyDescriptor) -> Result<HttpProxyConf, TranslationError> {
    let mut conf = match ProxyConf::default_for(ProxyKind::Http) {
        ProxyConf::Http(conf) => conf,
        other => {
            return Err(TranslationError::UnexpectedDefault {
                name: proxy.name.clone(),
                found: other.kind(),
                expected: ProxyKind::Http,
            })
        }
    };

    conf.base.proxy_name = proxy.name.clone();
    conf.base.use_encryption = proxy.use_encryption;
    conf.base.use_compression = proxy.use_compression;
    conf.base.local_port = proxy.local_port;
    conf.subdomain = proxy.target_domain.clone();
    conf.locations = vec![ROOT_LOCATION.to_string()];

    Ok(conf)
}

/// 转换全部代理描述，以名称为键
///
/// 重名的描述只保留最后一个；`run` 在验证阶段已拒绝重名
pub fn translate_all(
    proxies: &[ProxyDescriptor],
) -> Result<BTreeMap<String, ProxyConf>, TranslationError> {
    let mut map = BTreeMap::new();
    for proxy in proxies {
        let conf = translate(proxy)?;
        debug!(
            "Proxy '{}': {}.* -> {}:{}",
            proxy.name, conf.subdomain, conf.base.local_ip, conf.base.local_port
        );
        map.insert(proxy.name.clone(), ProxyConf::Http(conf));
    }
    Ok(map)
}
