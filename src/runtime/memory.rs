// ABOUTME: In-memory runtime implementing the full contract for tests.
// ABOUTME: Exec runs probe processes locally with the container's env and cwd.

use crate::runtime::{
    BoundedSink, CapturedOutput, ContainerError, ContainerStore, ExecError, ExecOps, ExecProcess,
    ProcessDefaults, ProcessSpec, TaskError, TaskOps, TaskState, TaskStatus,
};
use crate::types::{ContainerId, ExecId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

/// A container registered with the [`MemoryRuntime`].
#[derive(Debug, Clone)]
pub struct MemoryContainer {
    pub id: String,
    pub name: String,
    pub labels: HashMap<String, String>,
    /// Init process environment, `KEY=VALUE` form.
    pub env: Vec<String>,
    pub cwd: String,
    pub task: Option<MemoryTask>,
}

/// Task state of a memory container.
#[derive(Debug, Clone)]
pub struct MemoryTask {
    pub status: TaskStatus,
    pub started_at: DateTime<Utc>,
}

impl MemoryContainer {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            labels: HashMap::new(),
            env: vec!["PATH=/usr/local/bin:/usr/bin:/bin".to_string()],
            cwd: "/".to_string(),
            task: None,
        }
    }

    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_env(mut self, entry: &str) -> Self {
        self.env.push(entry.to_string());
        self
    }

    pub fn with_cwd(mut self, cwd: &str) -> Self {
        self.cwd = cwd.to_string();
        self
    }

    /// Give the container a running task that started at the given instant.
    pub fn running_since(mut self, started_at: DateTime<Utc>) -> Self {
        self.task = Some(MemoryTask {
            status: TaskStatus::Running,
            started_at,
        });
        self
    }

    /// Give the container a task in an arbitrary state.
    pub fn with_task_status(mut self, status: TaskStatus) -> Self {
        self.task = Some(MemoryTask {
            status,
            started_at: Utc::now(),
        });
        self
    }
}

/// In-memory implementation of the runtime contract.
///
/// Containers live in a shared table; exec'd probes run as local processes
/// restricted to the container's recorded environment and working
/// directory. Tests drive the full probe path against it without a real
/// runtime, and it doubles as reference semantics for contract
/// implementors.
#[derive(Clone, Default)]
pub struct MemoryRuntime {
    containers: Arc<Mutex<HashMap<String, MemoryContainer>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, container: MemoryContainer) {
        self.lock().insert(container.id.clone(), container);
    }

    /// Snapshot of a container's labels, for assertions.
    pub fn labels_of(&self, id: &str) -> HashMap<String, String> {
        self.lock()
            .get(id)
            .map(|c| c.labels.clone())
            .unwrap_or_default()
    }

    /// Fail every subsequent label write, for persistence-failure tests.
    pub fn fail_label_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, MemoryContainer>> {
        self.containers.lock().expect("container table poisoned")
    }
}

#[async_trait]
impl ContainerStore for MemoryRuntime {
    async fn resolve(&self, id_or_name: &str) -> Result<ContainerId, ContainerError> {
        let table = self.lock();
        if table.contains_key(id_or_name) {
            return Ok(ContainerId::new(id_or_name));
        }
        table
            .values()
            .find(|c| c.name == id_or_name)
            .map(|c| ContainerId::new(c.id.clone()))
            .ok_or_else(|| ContainerError::NotFound(id_or_name.to_string()))
    }

    async fn labels(&self, id: &ContainerId) -> Result<HashMap<String, String>, ContainerError> {
        self.lock()
            .get(id.as_str())
            .map(|c| c.labels.clone())
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))
    }

    async fn set_labels(
        &self,
        id: &ContainerId,
        labels: HashMap<String, String>,
    ) -> Result<(), ContainerError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ContainerError::LabelWrite("label store unavailable".to_string()));
        }
        let mut table = self.lock();
        let container = table
            .get_mut(id.as_str())
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        container.labels.extend(labels);
        Ok(())
    }

    async fn process_defaults(&self, id: &ContainerId) -> Result<ProcessDefaults, ContainerError> {
        self.lock()
            .get(id.as_str())
            .map(|c| ProcessDefaults {
                env: c.env.clone(),
                cwd: c.cwd.clone(),
            })
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl TaskOps for MemoryRuntime {
    async fn task(&self, id: &ContainerId) -> Result<TaskState, TaskError> {
        let table = self.lock();
        let container = table
            .get(id.as_str())
            .ok_or_else(|| TaskError::Runtime(format!("no such container {id}")))?;
        let task = container.task.as_ref().ok_or(TaskError::NotFound)?;
        Ok(TaskState {
            status: task.status,
            started_at: task.started_at,
        })
    }
}

#[async_trait]
impl ExecOps for MemoryRuntime {
    async fn exec(
        &self,
        id: &ContainerId,
        _exec_id: &ExecId,
        process: &ProcessSpec,
    ) -> Result<Box<dyn ExecProcess>, ExecError> {
        if !self.lock().contains_key(id.as_str()) {
            return Err(ExecError::Rejected(format!("no such container {id}")));
        }
        let (program, args) = process
            .args
            .split_first()
            .ok_or_else(|| ExecError::Rejected("empty argv".to_string()))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .env_clear()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // The probe sees exactly the container's environment, nothing from
        // the test process.
        for entry in &process.env {
            if let Some((key, value)) = entry.split_once('=') {
                cmd.env(key, value);
            }
        }
        if !process.cwd.is_empty() {
            cmd.current_dir(&process.cwd);
        }

        let mut child = cmd.spawn().map_err(|e| ExecError::Spawn(e.to_string()))?;
        let stdout = SinkDrain::start(child.stdout.take());
        let stderr = SinkDrain::start(child.stderr.take());
        Ok(Box::new(LocalExecProcess {
            child,
            stdout,
            stderr,
        }))
    }
}

/// A bounded sink plus the task filling it from a stdio pipe.
struct SinkDrain {
    sink: Arc<Mutex<BoundedSink>>,
    handle: Option<JoinHandle<()>>,
}

impl SinkDrain {
    fn start(pipe: Option<impl AsyncRead + Unpin + Send + 'static>) -> Self {
        let sink = Arc::new(Mutex::new(BoundedSink::default()));
        let handle = pipe.map(|mut reader| {
            let sink = Arc::clone(&sink);
            tokio::spawn(async move {
                let mut chunk = [0u8; 8192];
                loop {
                    match reader.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => sink.lock().expect("sink poisoned").write(&chunk[..n]),
                    }
                }
            })
        });
        Self { sink, handle }
    }

    /// Wait for the pipe to close, then take the accumulated bytes.
    async fn finish(&mut self) -> Vec<u8> {
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        let mut sink = self.sink.lock().expect("sink poisoned");
        std::mem::take(&mut *sink).into_bytes()
    }
}

struct LocalExecProcess {
    child: Child,
    stdout: SinkDrain,
    stderr: SinkDrain,
}

#[async_trait]
impl ExecProcess for LocalExecProcess {
    async fn wait(&mut self) -> Result<i32, ExecError> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| ExecError::Wait(e.to_string()))?;
        Ok(exit_code(status))
    }

    async fn kill(&mut self) -> Result<(), ExecError> {
        self.child
            .kill()
            .await
            .map_err(|e| ExecError::Signal(e.to_string()))
    }

    async fn output(&mut self) -> CapturedOutput {
        CapturedOutput {
            stdout: self.stdout.finish().await,
            stderr: self.stderr.finish().await,
        }
    }
}

#[cfg(unix)]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .unwrap_or_else(|| 128 + status.signal().unwrap_or(0))
}

#[cfg(not(unix))]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
