//! Bundler driven as a child process (`npx vite` by default).
//!
//! The dev server runs in its own process group so stopping it also takes
//! down whatever the launcher spawned (`npx` → `node vite`).

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};

use crate::core::BuildMode;

use super::{Bundler, BuildOptions, DevServer, EnvVars, LifecycleError, ServeOptions, mode_flags};

/// How long to wait for the dev server to report its address.
const READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Grace period between SIGTERM and SIGKILL on stop.
#[cfg(unix)]
const STOP_GRACE: Duration = Duration::from_secs(3);

/// Local URL printed by the bundler once it listens.
static LOCAL_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://(?:localhost|127\.0\.0\.1|\[::1\]):([0-9]+)").unwrap());

/// ANSI color codes (the bundler highlights the port).
static ANSI: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

type StdoutLines = Lines<BufReader<ChildStdout>>;

#[derive(Debug, Clone)]
pub struct ProcessBundler {
    /// Program followed by its leading arguments
    program: Vec<String>,
    /// Bundler root (`.elm-land/server`)
    cwd: PathBuf,
    ready_timeout: Duration,
}

impl ProcessBundler {
    pub fn new(program: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program,
            cwd: cwd.into(),
            ready_timeout: READY_TIMEOUT,
        }
    }

    /// A server that stays silent this long is assumed to listen on the
    /// requested port.
    #[cfg(test)]
    fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    fn command<I, A>(
        &self,
        args: I,
        env: &EnvVars,
        mode: BuildMode,
        debugger: bool,
    ) -> Result<Command, LifecycleError>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        let (name, leading) = self.program.split_first().ok_or(LifecycleError::EmptyCommand)?;
        let program = which::which(name).map_err(|e| LifecycleError::NotFound(name.clone(), e))?;

        let mut command = Command::new(program);
        command
            .args(leading)
            .args(args)
            .current_dir(&self.cwd)
            .envs(env)
            .envs(mode_flags(mode, debugger))
            .stdin(Stdio::null())
            .kill_on_drop(true);
        Ok(command)
    }

    /// Spawn the dev server and wait until it reports where it listens.
    ///
    /// Exiting before that is a startup failure. A server that never prints
    /// a local URL is taken to be on the requested port once the ready
    /// timeout passes.
    async fn spawn_server(&self, opts: ServeOptions, env: &EnvVars) -> Result<(Child, u16), LifecycleError> {
        let port = opts.port.to_string();
        let mut command = self.command(["--port", port.as_str()], env, opts.mode, opts.debugger)?;
        command.stdout(Stdio::piped());
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|e| self.spawn_error(e))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LifecycleError::Spawn(self.program.join(" "), std::io::ErrorKind::BrokenPipe.into()))?;
        let mut lines = BufReader::new(stdout).lines();

        let bound = match tokio::time::timeout(self.ready_timeout, wait_ready(&mut child, &mut lines)).await {
            Ok(Ok(port)) => port,
            Ok(Err(e)) => {
                kill_group(&mut child).await;
                return Err(e);
            }
            Err(_) => {
                crate::debug!("bundler"; "no address reported, assuming port {}", opts.port);
                opts.port
            }
        };

        tokio::spawn(forward(lines));
        crate::debug!("bundler"; "started {} on port {}", self.program.join(" "), bound);
        Ok((child, bound))
    }

    fn spawn_error(&self, e: std::io::Error) -> LifecycleError {
        LifecycleError::Spawn(self.program.join(" "), e)
    }
}

impl Bundler for ProcessBundler {
    type Server = ProcessServer;

    async fn serve(&self, opts: ServeOptions, env: &EnvVars) -> Result<ProcessServer, LifecycleError> {
        let (child, port) = self.spawn_server(opts, env).await?;
        Ok(ProcessServer {
            bundler: self.clone(),
            opts,
            port,
            child: Some(child),
        })
    }

    async fn build(&self, opts: &BuildOptions, env: &EnvVars) -> Result<(), LifecycleError> {
        let args = [
            OsStr::new("build"),
            OsStr::new("--outDir"),
            opts.out_dir.as_os_str(),
            OsStr::new("--emptyOutDir"),
        ];
        let mut command = self.command(args, env, opts.mode, opts.debugger)?;

        let status = command.status().await.map_err(|e| self.spawn_error(e))?;
        if !status.success() {
            return Err(LifecycleError::Failed(status));
        }
        Ok(())
    }
}

/// Dev server child process. Dropping it kills the child.
#[derive(Debug)]
pub struct ProcessServer {
    bundler: ProcessBundler,
    opts: ServeOptions,
    /// Port the server reported, which may differ from the requested one
    port: u16,
    child: Option<Child>,
}

impl DevServer for ProcessServer {
    fn port(&self) -> u16 {
        self.port
    }

    async fn restart(&mut self, env: &EnvVars) -> Result<(), LifecycleError> {
        self.stop().await?;
        let (child, port) = self.bundler.spawn_server(self.opts, env).await?;
        self.child = Some(child);
        self.port = port;
        crate::log!("bundler"; "restarted dev server with updated environment");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), LifecycleError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        terminate(&mut child).await
    }
}

/// Read stdout until the server prints its local URL or exits.
async fn wait_ready(child: &mut Child, lines: &mut StdoutLines) -> Result<u16, LifecycleError> {
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                println!("{line}");
                if let Some(port) = bound_port(&line) {
                    return Ok(port);
                }
            }
            // stdout closed: the server is going away
            Ok(None) | Err(_) => {
                let status = child.wait().await.map_err(LifecycleError::Stop)?;
                return Err(LifecycleError::Exited(status));
            }
        }
    }
}

/// Pass the rest of the server output through.
async fn forward(mut lines: StdoutLines) {
    while let Ok(Some(line)) = lines.next_line().await {
        println!("{line}");
    }
}

/// Port from a line like `Local: http://localhost:5173/`.
fn bound_port(line: &str) -> Option<u16> {
    let plain = ANSI.replace_all(line, "");
    LOCAL_URL.captures(&plain)?.get(1)?.as_str().parse().ok()
}

/// Stop the whole process group: SIGTERM, then SIGKILL after a grace period.
#[cfg(unix)]
async fn terminate(child: &mut Child) -> Result<(), LifecycleError> {
    let Some(pgid) = child.id() else {
        return Ok(()); // already reaped
    };
    signal_group(pgid, libc::SIGTERM);

    match tokio::time::timeout(STOP_GRACE, child.wait()).await {
        Ok(status) => {
            status.map_err(LifecycleError::Stop)?;
            // Stragglers the launcher left behind.
            signal_group(pgid, libc::SIGKILL);
            Ok(())
        }
        Err(_) => {
            signal_group(pgid, libc::SIGKILL);
            child.wait().await.map(|_| ()).map_err(LifecycleError::Stop)
        }
    }
}

#[cfg(not(unix))]
async fn terminate(child: &mut Child) -> Result<(), LifecycleError> {
    if child.try_wait().map_err(LifecycleError::Stop)?.is_some() {
        return Ok(());
    }
    child.kill().await.map_err(LifecycleError::Stop)
}

/// Best-effort kill after a failed start.
async fn kill_group(child: &mut Child) {
    if let Err(e) = terminate(child).await {
        crate::debug!("bundler"; "cleanup after failed start: {}", e);
    }
}

#[cfg(unix)]
fn signal_group(pgid: u32, signal: libc::c_int) {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // ESRCH (group already gone) is fine.
    // SAFETY: killpg has no memory-safety preconditions.
    unsafe {
        libc::killpg(pgid, signal);
    }
}
