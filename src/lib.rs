//! tunnel-embed 库入口
//!
//! 把"将这些本地端口通过中继暴露出去"的声明式描述变成一个运行中的反向隧道客户端，
//! 并在取消时平滑关闭。协议与连接由实现 [`TunnelEngine`] 的引擎负责。
//!
//! ```no_run
//! use tunnel_embed::{run, ConfigOption, ProxyDescriptor, EngineBuilder};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(engine: impl EngineBuilder) -> Result<(), tunnel_embed::RunError> {
//! let proxies = ConfigOption::proxies([ProxyDescriptor::new("web-server", "mysite", 8080)
//!     .encrypted(true)
//!     .compressed(true)]);
//! run(CancellationToken::new(), &engine, "frp.mydomain.com", "secret-token-123", [proxies]).await
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod runner;
pub mod translate;

// 重新导出常用类型
pub use config::{Config, ConfigBuilder, ConfigOption, ProxyDescriptor, RunFile};
pub use engine::{EngineBuilder, EngineConf, TunnelEngine};
pub use error::{ConfigError, ProxyField, Result, RunError, TranslationError};
pub use logging::{LogBackend, LogLevel, LogSelection, Logger, TracingLogger};
pub use runner::{run, run_with_config, GracefulCloseGuard};
