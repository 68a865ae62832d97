//! Recording bundler for orchestration tests.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{BuildOptions, Bundler, DevServer, EnvVars, LifecycleError, ServeOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundlerCall {
    Serve { port: u16, env: EnvVars },
    Restart { env: EnvVars },
    Stop,
    Build { out_dir: PathBuf, debugger: bool, env: EnvVars },
}

#[derive(Debug, Clone, Default)]
pub struct FakeBundler {
    calls: Arc<Mutex<Vec<BundlerCall>>>,
    fail_serve: bool,
    fail_build: bool,
}

impl FakeBundler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_serve() -> Self {
        Self {
            fail_serve: true,
            ..Self::default()
        }
    }

    pub fn failing_build() -> Self {
        Self {
            fail_build: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<BundlerCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: BundlerCall) {
        self.calls.lock().push(call);
    }
}

impl Bundler for FakeBundler {
    type Server = FakeServer;

    async fn serve(&self, opts: ServeOptions, env: &EnvVars) -> Result<FakeServer, LifecycleError> {
        if self.fail_serve {
            return Err(LifecycleError::Other("port in use".into()));
        }
        self.record(BundlerCall::Serve {
            port: opts.port,
            env: env.clone(),
        });
        Ok(FakeServer {
            port: opts.port,
            bundler: self.clone(),
        })
    }

    async fn build(&self, opts: &BuildOptions, env: &EnvVars) -> Result<(), LifecycleError> {
        self.record(BundlerCall::Build {
            out_dir: opts.out_dir.clone(),
            debugger: opts.debugger,
            env: env.clone(),
        });
        if self.fail_build {
            return Err(LifecycleError::Other("build broke".into()));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct FakeServer {
    port: u16,
    bundler: FakeBundler,
}

impl DevServer for FakeServer {
    fn port(&self) -> u16 {
        self.port
    }

    async fn restart(&mut self, env: &EnvVars) -> Result<(), LifecycleError> {
        self.bundler.record(BundlerCall::Restart { env: env.clone() });
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), LifecycleError> {
        self.bundler.record(BundlerCall::Stop);
        Ok(())
    }
}
