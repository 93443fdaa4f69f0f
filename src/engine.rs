// 隧道引擎接口 - 协议、认证、多路复用都由引擎实现，本层只负责组装配置和驱动生命周期

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::logging::LogBackend;

/// 引擎默认的中继服务器端口
pub const DEFAULT_SERVER_PORT: u16 = 7000;

/// 认证方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// 静态令牌
    #[default]
    Token,
    /// OIDC（引擎支持，本层不使用）
    Oidc,
}

/// 引擎客户端基础配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConf {
    /// 中继服务器地址
    pub server_addr: String,
    /// 中继服务器端口
    pub server_port: u16,
    /// 认证方式
    pub auth_method: AuthMethod,
    /// 认证令牌
    #[serde(default, skip_serializing)]
    pub token: String,
    /// 登录失败时是否直接退出
    pub login_fail_exit: bool,
}

impl Default for ClientConf {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0".to_string(),
            server_port: DEFAULT_SERVER_PORT,
            auth_method: AuthMethod::default(),
            token: String::new(),
            login_fail_exit: true,
        }
    }
}

/// 代理类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    Tcp,
    Http,
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyKind::Tcp => write!(f, "tcp"),
            ProxyKind::Http => write!(f, "http"),
        }
    }
}

/// 所有代理类型共有的字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseProxyConf {
    pub proxy_name: String,
    pub use_encryption: bool,
    pub use_compression: bool,
    pub local_ip: String,
    pub local_port: u16,
}

impl Default for BaseProxyConf {
    fn default() -> Self {
        Self {
            proxy_name: String::new(),
            use_encryption: false,
            use_compression: false,
            local_ip: "127.0.0.1".to_string(),
            local_port: 0,
        }
    }
}

/// HTTP 反向代理配置
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HttpProxyConf {
    #[serde(flatten)]
    pub base: BaseProxyConf,
    /// 中继服务器上的子域名
    pub subdomain: String,
    #[serde(default)]
    pub custom_domains: Vec<String>,
    /// 转发的路径前缀
    pub locations: Vec<String>,
}

/// TCP 端口代理配置
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TcpProxyConf {
    #[serde(flatten)]
    pub base: BaseProxyConf,
    pub remote_port: u16,
}

/// 引擎的代理配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProxyConf {
    Tcp(TcpProxyConf),
    Http(HttpProxyConf),
}

impl ProxyConf {
    /// 获取指定类型的默认配置
    pub fn default_for(kind: ProxyKind) -> Self {
        match kind {
            ProxyKind::Tcp => ProxyConf::Tcp(TcpProxyConf::default()),
            ProxyKind::Http => ProxyConf::Http(HttpProxyConf::default()),
        }
    }

    pub fn kind(&self) -> ProxyKind {
        match self {
            ProxyConf::Tcp(_) => ProxyKind::Tcp,
            ProxyConf::Http(_) => ProxyKind::Http,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ProxyConf::Tcp(c) => &c.base.proxy_name,
            ProxyConf::Http(c) => &c.base.proxy_name,
        }
    }
}

/// 构造引擎所需的完整配置
#[derive(Debug, Clone)]
pub struct EngineConf {
    pub client: ClientConf,
    /// 以代理名称为键
    pub proxies: BTreeMap<String, ProxyConf>,
    /// 日志后端，由引擎在构造时接管
    pub logging: LogBackend,
}

/// 隧道引擎实例
#[async_trait]
pub trait TunnelEngine: Send + Sync + 'static {
    /// 运行引擎直到结束，返回终止原因
    async fn run(&self) -> anyhow::Result<()>;

    /// 在给定时间内尝试平滑关闭
    async fn graceful_close(&self, budget: Duration) -> anyhow::Result<()>;
}

/// 引擎构造器
///
/// 构造失败时不应有任何后台任务启动
pub trait EngineBuilder {
    fn build(&self, conf: EngineConf) -> anyhow::Result<Arc<dyn TunnelEngine>>;
}

impl<F> EngineBuilder for F
where
    F: Fn(EngineConf) -> anyhow::Result<Arc<dyn TunnelEngine>>,
{
    fn build(&self, conf: EngineConf) -> anyhow::Result<Arc<dyn TunnelEngine>> {
        self(conf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_conf_defaults() {
        let conf = ClientConf::default();
        assert_eq!(conf.server_port, DEFAULT_SERVER_PORT);
        assert_eq!(conf.auth_method, AuthMethod::Token);
        assert!(conf.token.is_empty());
    }

    #[test]
    fn test_default_for_kind() {
        assert_eq!(ProxyConf::default_for(ProxyKind::Http).kind(), ProxyKind::Http);
        assert_eq!(ProxyConf::default_for(ProxyKind::Tcp).kind(), ProxyKind::Tcp);
    }

    #[test]
    fn test_http_proxy_conf_serialization() {
        let mut conf = HttpProxyConf::default();
        conf.base.proxy_name = "web".to_string();
        conf.subdomain = "mysite".to_string();
        conf.locations = vec!["/".to_string()];

        let json = serde_json::to_value(ProxyConf::Http(conf)).unwrap();
        assert_eq!(json["type"], "http");
        assert_eq!(json["proxy_name"], "web");
        assert_eq!(json["subdomain"], "mysite");
        assert_eq!(json["local_ip"], "127.0.0.1");
    }

    #[test]
    fn test_token_not_serialized() {
        let conf = ClientConf {
            token: "secret-token-123".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&conf).unwrap();
        assert!(!json.contains("secret-token-123"));
    }
}
