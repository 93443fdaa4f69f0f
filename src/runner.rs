// 生命周期编排 - 验证配置、构造引擎、在取消与引擎结束之间竞争，并保证平滑关闭

use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{Config, ConfigOption};
use crate::engine::{AuthMethod, ClientConf, EngineBuilder, EngineConf, TunnelEngine};
use crate::error::{Result, RunError};
use crate::logging::bind_logging;
use crate::translate::translate_all;

/// 运行隧道客户端，直到调用方取消或引擎结束
///
/// - `server_addr` 中继服务器地址，例如 frp.mydomain.com
/// - `token` 静态认证令牌
/// - `options` 按顺序应用的配置选项
///
/// 取消先发生时返回 [`RunError::Cancelled`]，否则返回引擎的结束结果。
/// 引擎启动后，无论以何种方式返回都会发出一次平滑关闭请求，但不等待其完成。
pub async fn run<B>(
    cancel: CancellationToken,
    builder: &B,
    server_addr: &str,
    token: &str,
    options: impl IntoIterator<Item = ConfigOption>,
) -> Result<()>
where
    B: EngineBuilder + ?Sized,
{
    let config = Config::from_options(options);
    run_with_config(cancel, builder, server_addr, token, &config).await
}

/// 使用已累积好的配置运行
pub async fn run_with_config<B>(
    cancel: CancellationToken,
    builder: &B,
    server_addr: &str,
    token: &str,
    config: &Config,
) -> Result<()>
where
    B: EngineBuilder + ?Sized,
{
    config.validate()?;

    let client = client_conf(server_addr, token, config.server_port());
    let logging = bind_logging(&config.log_selection());
    let proxies = translate_all(config.proxies())?;

    info!(
        "Starting tunnel client to {}:{} with {} proxies",
        client.server_addr,
        client.server_port,
        proxies.len()
    );

    let engine = builder
        .build(EngineConf {
            client,
            proxies,
            logging,
        })
        .map_err(RunError::EngineConstruction)?;

    let _close_guard = GracefulCloseGuard::new(engine.clone(), config.graceful_close());

    let task_engine = engine.clone();
    let engine_task = tokio::spawn(async move { task_engine.run().await });

    tokio::select! {
        _ = cancel.cancelled() => {
            info!("Run cancelled, closing tunnel engine");
            Err(RunError::Cancelled)
        }
        result = engine_task => match result {
            Ok(Ok(())) => {
                info!("Tunnel engine stopped");
                Ok(())
            }
            Ok(Err(e)) => {
                error!("Tunnel engine error: {:#}", e);
                Err(RunError::Runtime(e))
            }
            Err(e) => {
                error!("Tunnel engine task failed: {}", e);
                Err(RunError::Runtime(anyhow::anyhow!("engine task failed: {}", e)))
            }
        },
    }
}

/// 组装引擎基础配置
///
/// 认证固定为静态令牌，端口只在非零时覆盖引擎默认值
pub fn client_conf(server_addr: &str, token: &str, server_port: u16) -> ClientConf {
    let mut conf = ClientConf {
        auth_method: AuthMethod::Token,
        token: token.to_string(),
        server_addr: server_addr.to_string(),
        ..Default::default()
    };
    if server_port != 0 {
        conf.server_port = server_port;
    }
    conf
}

/// 离开作用域时请求引擎平滑关闭
///
/// 关闭在当前运行时上后台执行，调用方不等待；关闭结果只记录日志
pub struct GracefulCloseGuard {
    engine: Arc<dyn TunnelEngine>,
    budget: Duration,
}

impl GracefulCloseGuard {
    pub fn new(engine: Arc<dyn TunnelEngine>, budget: Duration) -> Self {
        Self { engine, budget }
    }
}

impl Drop for GracefulCloseGuard {
    fn drop(&mut self) {
        let engine = self.engine.clone();
        let budget = self.budget;

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    debug!("Closing tunnel engine within {:?}", budget);
                    match engine.graceful_close(budget).await {
                        Ok(()) => debug!("Tunnel engine closed"),
                        Err(e) => warn!("Tunnel engine graceful close failed: {:#}", e),
                    }
                });
            }
            Err(_) => warn!("No tokio runtime available, skipping graceful close"),
        }
    }
}
