// 日志后端绑定 - 将调用方选择的日志方式交给引擎

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// 自定义日志器注册时使用的保留适配器名
pub const CUSTOM_ADAPTER: &str = "custom";

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// 调用方提供的日志器
///
/// 日志器应在交给本层之前完成配置，`init` 收到的配置字符串始终为空
pub trait Logger: Send + Sync {
    fn init(&self, config: &str) -> anyhow::Result<()>;

    fn write_msg(&self, when: SystemTime, msg: &str, level: LogLevel) -> anyhow::Result<()>;

    fn flush(&self);

    fn destroy(&self);
}

/// 日志选择（三选一）
#[derive(Clone, Default)]
pub enum LogSelection {
    /// 保持引擎默认日志行为
    #[default]
    None,
    /// 引擎内置的日志适配器，名称和参数由引擎解释
    Adapter { name: String, args: Vec<String> },
    /// 调用方提供的日志器
    Custom(Arc<dyn Logger>),
}

impl fmt::Debug for LogSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSelection::None => write!(f, "None"),
            LogSelection::Adapter { name, args } => f
                .debug_struct("Adapter")
                .field("name", name)
                .field("args", args)
                .finish(),
            LogSelection::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// 交给引擎构造的日志后端
#[derive(Clone, Default)]
pub enum LogBackend {
    /// 不修改引擎日志
    #[default]
    EngineDefault,
    /// 选择引擎内置适配器，参数原样透传
    Adapter { name: String, args: Vec<String> },
    /// 以保留名注册的自定义日志器，不带适配器参数
    Custom {
        adapter: &'static str,
        logger: Arc<dyn Logger>,
    },
}

impl LogBackend {
    /// 引擎应选用的适配器名
    pub fn adapter_name(&self) -> Option<&str> {
        match self {
            LogBackend::EngineDefault => None,
            LogBackend::Adapter { name, .. } => Some(name.as_str()),
            LogBackend::Custom { adapter, .. } => Some(*adapter),
        }
    }

    /// 适配器参数，自定义日志器没有参数
    pub fn adapter_args(&self) -> &[String] {
        match self {
            LogBackend::Adapter { args, .. } => args.as_slice(),
            _ => &[],
        }
    }

    pub fn logger(&self) -> Option<&Arc<dyn Logger>> {
        match self {
            LogBackend::Custom { logger, .. } => Some(logger),
            _ => None,
        }
    }
}

impl fmt::Debug for LogBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogBackend::EngineDefault => write!(f, "EngineDefault"),
            LogBackend::Adapter { name, args } => f
                .debug_struct("Adapter")
                .field("name", name)
                .field("args", args)
                .finish(),
            LogBackend::Custom { adapter, .. } => f
                .debug_struct("Custom")
                .field("adapter", adapter)
                .finish_non_exhaustive(),
        }
    }
}

/// 将日志选择绑定为引擎日志后端
///
/// 每次运行在构造引擎之前调用一次；结果随配置传入引擎，不写入任何全局注册表
pub fn bind_logging(selection: &LogSelection) -> LogBackend {
    match selection {
        LogSelection::Custom(logger) => {
            if let Err(e) = logger.init("") {
                warn!("Custom logger init failed: {:#}", e);
            }
            info!("Using custom logger for tunnel engine");
            LogBackend::Custom {
                adapter: CUSTOM_ADAPTER,
                logger: logger.clone(),
            }
        }
        LogSelection::Adapter { name, args } => {
            info!("Using '{}' log adapter for tunnel engine", name);
            LogBackend::Adapter {
                name: name.clone(),
                args: args.clone(),
            }
        }
        LogSelection::None => {
            debug!("No log selection, keeping engine default logging");
            LogBackend::EngineDefault
        }
    }
}

/// 将引擎日志转发到 tracing 的日志器
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn init(&self, _config: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn write_msg(&self, _when: SystemTime, msg: &str, level: LogLevel) -> anyhow::Result<()> {
        match level {
            LogLevel::Error => tracing::error!(target: "tunnel_engine", "{}", msg),
            LogLevel::Warn => tracing::warn!(target: "tunnel_engine", "{}", msg),
            LogLevel::Info => tracing::info!(target: "tunnel_engine", "{}", msg),
            LogLevel::Debug => tracing::debug!(target: "tunnel_engine", "{}", msg),
            LogLevel::Trace => tracing::trace!(target: "tunnel_engine", "{}", msg),
        }
        Ok(())
    }

    fn flush(&self) {}

    fn destroy(&self) {}
}

/// 初始化 tracing 输出
///
/// `filter` 使用 EnvFilter 语法，例如 "info" 或 "tunnel_embed=debug"
pub fn init_tracing(filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to init tracing: {}", e))
}
