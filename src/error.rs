/// 自定义错误类型
///
/// 配置、转换、运行三个阶段各自使用独立的错误类型，
/// 调用者可以据此区分"配置写错了"和"隧道运行时失败"
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::engine::ProxyKind;

/// 代理描述中缺失的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyField {
    /// 代理名称
    Name,
    /// 目标子域名
    TargetDomain,
    /// 本地端口
    LocalPort,
}

impl fmt::Display for ProxyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyField::Name => write!(f, "name"),
            ProxyField::TargetDomain => write!(f, "target_domain"),
            ProxyField::LocalPort => write!(f, "local_port"),
        }
    }
}

/// 配置验证错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 同时设置了日志适配器和自定义日志器
    #[error("can only set one of adapter logger or custom logger")]
    ConflictingLogger,

    /// 代理描述缺少必填字段
    #[error("failed to validate proxy {name:?}: no {field} was specified")]
    InvalidProxy { name: String, field: ProxyField },

    /// 同一次运行中出现重名代理
    #[error("duplicate proxy name {name:?}: each proxy must have a unique name")]
    DuplicateProxyName { name: String },

    /// 运行配置文件加载失败
    #[error("failed to load run file {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl ConfigError {
    /// 创建字段缺失错误
    pub fn invalid_proxy(name: impl Into<String>, field: ProxyField) -> Self {
        Self::InvalidProxy {
            name: name.into(),
            field,
        }
    }

    /// 创建文件加载错误
    pub fn load(path: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        Self::Load {
            path: path.into(),
            source: source.into(),
        }
    }

    /// 返回出错字段（仅字段缺失错误）
    pub fn proxy_field(&self) -> Option<ProxyField> {
        match self {
            Self::InvalidProxy { field, .. } => Some(*field),
            _ => None,
        }
    }
}

/// 代理描述转换为引擎配置时的错误
///
/// 只在引擎返回的默认配置与期望类型不一致时出现，属于集成缺陷而不是用户输入错误
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("failed to convert proxy {name:?}: unexpected default proxy config {found}, expected {expected}")]
    UnexpectedDefault {
        name: String,
        found: ProxyKind,
        expected: ProxyKind,
    },
}

/// 运行隧道时的错误
#[derive(Error, Debug)]
pub enum RunError {
    /// 配置无效，引擎未创建
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// 代理转换失败，引擎未创建
    #[error(transparent)]
    Translation(#[from] TranslationError),

    /// 引擎拒绝了组装好的配置
    #[error("failed to init tunnel engine: {0:#}")]
    EngineConstruction(#[source] anyhow::Error),

    /// 引擎运行循环以错误结束
    #[error("tunnel engine stopped: {0:#}")]
    Runtime(#[source] anyhow::Error),

    /// 调用方在引擎结束前取消
    #[error("run cancelled")]
    Cancelled,
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, RunError>;

impl RunError {
    /// 检查是否为取消
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// 检查是否为配置错误
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }

    /// 检查是否发生在引擎启动之后
    pub fn is_runtime(&self) -> bool {
        matches!(self, Self::Runtime(_))
    }
}
