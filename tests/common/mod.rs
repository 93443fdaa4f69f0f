//! Common utilities for integration tests
#![allow(dead_code)]
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Notify;
use tokio::time::{sleep, timeout};
use tunnel_embed::engine::{EngineBuilder, EngineConf, TunnelEngine};
use tunnel_embed::logging::{LogLevel, Logger};

/// How the mock engine's run loop ends
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Run until graceful_close is requested
    UntilClosed,
    /// Finish on its own after a delay, optionally with an error
    CompleteAfter(Duration, Option<String>),
    /// Panic inside the run loop
    Panic,
}

pub struct MockEngine {
    behavior: Behavior,
    stop: Notify,
    closed: Notify,
    close_calls: AtomicUsize,
    close_delay: Option<Duration>,
    close_budget: Mutex<Option<Duration>>,
    run_finished: AtomicBool,
}

impl MockEngine {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Self::build(behavior, None)
    }

    /// Engine whose graceful_close takes `delay` before returning
    pub fn with_close_delay(behavior: Behavior, delay: Duration) -> Arc<Self> {
        Self::build(behavior, Some(delay))
    }

    fn build(behavior: Behavior, close_delay: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            stop: Notify::new(),
            closed: Notify::new(),
            close_calls: AtomicUsize::new(0),
            close_delay,
            close_budget: Mutex::new(None),
            run_finished: AtomicBool::new(false),
        })
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn close_budget(&self) -> Option<Duration> {
        *self.close_budget.lock()
    }

    pub fn run_finished(&self) -> bool {
        self.run_finished.load(Ordering::SeqCst)
    }

    /// Wait for the background graceful close to reach the engine
    pub async fn wait_closed(&self) {
        timeout(Duration::from_secs(2), self.closed.notified())
            .await
            .expect("graceful close was not issued");
    }

    /// Wait until graceful_close has been entered, without waiting for it to return
    pub async fn wait_close_started(&self) {
        for _ in 0..200 {
            if self.close_calls() > 0 {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("graceful close was not issued");
    }

    /// Wait for the run loop to return
    pub async fn wait_run_finished(&self) {
        for _ in 0..200 {
            if self.run_finished() {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("engine run loop did not finish");
    }
}

#[async_trait]
impl TunnelEngine for MockEngine {
    async fn run(&self) -> anyhow::Result<()> {
        let result = match &self.behavior {
            Behavior::UntilClosed => {
                self.stop.notified().await;
                Ok(())
            }
            Behavior::CompleteAfter(delay, err) => {
                sleep(*delay).await;
                match err {
                    Some(msg) => Err(anyhow::anyhow!("{}", msg)),
                    None => Ok(()),
                }
            }
            Behavior::Panic => panic!("engine crashed"),
        };
        self.run_finished.store(true, Ordering::SeqCst);
        result
    }

    async fn graceful_close(&self, budget: Duration) -> anyhow::Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        *self.close_budget.lock() = Some(budget);
        self.stop.notify_one();
        if let Some(delay) = self.close_delay {
            sleep(delay).await;
        }
        self.closed.notify_one();
        Ok(())
    }
}

/// Records the assembled engine config and hands out a mock engine
pub struct MockBuilder {
    engine: Arc<MockEngine>,
    fail: Option<String>,
    builds: AtomicUsize,
    seen: Mutex<Option<EngineConf>>,
}

impl MockBuilder {
    pub fn new(engine: Arc<MockEngine>) -> Self {
        Self {
            engine,
            fail: None,
            builds: AtomicUsize::new(0),
            seen: Mutex::new(None),
        }
    }

    pub fn failing(engine: Arc<MockEngine>, msg: &str) -> Self {
        Self {
            fail: Some(msg.to_string()),
            ..Self::new(engine)
        }
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> EngineConf {
        self.seen.lock().clone().expect("engine was not built")
    }
}

impl EngineBuilder for MockBuilder {
    fn build(&self, conf: EngineConf) -> anyhow::Result<Arc<dyn TunnelEngine>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        *self.seen.lock() = Some(conf);
        match &self.fail {
            Some(msg) => Err(anyhow::anyhow!("{}", msg)),
            None => Ok(self.engine.clone()),
        }
    }
}

/// Logger that keeps nothing, like a caller-supplied sink
#[derive(Default)]
pub struct DiscardLogger {
    pub inits: AtomicUsize,
}

impl Logger for DiscardLogger {
    fn init(&self, _config: &str) -> anyhow::Result<()> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn write_msg(&self, _when: SystemTime, _msg: &str, _level: LogLevel) -> anyhow::Result<()> {
        Ok(())
    }

    fn flush(&self) {}

    fn destroy(&self) {}
}
