use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use promoter_core::format_duration;

use crate::processor::Processor;
use crate::queue::{Take, Task, TaskQueue};
use crate::{Host, HostReply, ProcessError};

const JOIN_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Longest a worker waits on the queue before checking in again.
    pub poll_interval: Duration,
    /// How long `shutdown` waits for each worker before leaving it behind.
    pub join_timeout: Duration,
    /// Host calls slower than this are logged.
    pub slow_call: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            join_timeout: Duration::from_secs(5),
            slow_call: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("a worker pool needs at least one host")]
    NoHosts,
    #[error("worker pool already started")]
    AlreadyStarted,
    #[error("failed to start worker for {host}: {source}")]
    Spawn {
        host: Host,
        #[source]
        source: std::io::Error,
    },
}

struct Worker {
    host: Host,
    handle: JoinHandle<()>,
}

/// One worker thread per host, all draining a shared [`TaskQueue`].
///
/// A host handles one URL at a time, so at most `hosts.len()` calls are in
/// flight. Faster hosts come back to the queue sooner and take more work.
pub struct HostWorkerPool {
    hosts: Vec<Host>,
    processor: Arc<dyn Processor>,
    settings: PoolSettings,
    queue: Arc<TaskQueue>,
    workers: Vec<Worker>,
    started: bool,
}

impl HostWorkerPool {
    pub fn new(
        hosts: Vec<Host>,
        processor: Arc<dyn Processor>,
        settings: PoolSettings,
    ) -> Result<Self, PoolError> {
        if hosts.is_empty() {
            return Err(PoolError::NoHosts);
        }
        Ok(Self {
            hosts,
            processor,
            settings,
            queue: Arc::new(TaskQueue::new()),
            workers: Vec::new(),
            started: false,
        })
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Launch one worker thread per host. Can only be done once.
    pub fn start(&mut self) -> Result<(), PoolError> {
        if self.started {
            return Err(PoolError::AlreadyStarted);
        }
        self.started = true;
        for host in self.hosts.clone() {
            let queue = self.queue.clone();
            let processor = self.processor.clone();
            let settings = self.settings.clone();
            let worker_host = host.clone();
            let spawned = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .and_then(|runtime| {
                    thread::Builder::new()
                        .name(format!("promoter-worker-{host}"))
                        .spawn(move || {
                            run_worker(worker_host, &runtime, &queue, processor.as_ref(), &settings)
                        })
                });
            match spawned {
                Ok(handle) => self.workers.push(Worker { host, handle }),
                Err(source) => {
                    self.shutdown();
                    return Err(PoolError::Spawn { host, source });
                }
            }
        }
        engine_info!("Started {} host workers", self.workers.len());
        Ok(())
    }

    /// Queue `url` and wait until a worker answers for it. There is no timeout.
    pub async fn submit_and_await(&self, url: &str) -> HostReply {
        if !self.started {
            return Err(ProcessError::PoolUnavailable);
        }
        let (task, answer) = Task::new(url);
        if self.queue.submit(task).is_err() {
            return Err(ProcessError::PoolUnavailable);
        }
        answer.await.unwrap_or(Err(ProcessError::Dropped))
    }

    /// Close the queue and wait for the workers. Workers still stuck in a host
    /// call after `join_timeout` are detached. Returns how many were detached.
    pub fn shutdown(&mut self) -> usize {
        if self.queue.is_closed() && self.workers.is_empty() {
            return 0;
        }
        self.queue.close();

        let mut detached = 0;
        for worker in self.workers.drain(..) {
            if !join_within(worker, self.settings.join_timeout) {
                detached += 1;
            }
        }
        if let Some(dropped) = self.queue.drain() {
            if dropped > 0 {
                engine_warn!("Dropped {} queued tasks at shutdown", dropped);
            }
        }
        engine_info!("Worker pool shut down ({} detached)", detached);
        detached
    }
}

impl Drop for HostWorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(
    host: Host,
    runtime: &tokio::runtime::Runtime,
    queue: &TaskQueue,
    processor: &dyn Processor,
    settings: &PoolSettings,
) {
    engine_logging::set_worker_label(host.as_str());
    engine_debug!("Worker {} waiting for tasks", engine_logging::worker_label());
    loop {
        match runtime.block_on(queue.take(settings.poll_interval)) {
            Take::Task(task) => {
                let reply = call_host(processor, &host, &task.url, settings.slow_call);
                if task.completion.send(reply).is_err() {
                    engine_debug!("Caller for {} stopped waiting", task.url);
                }
            }
            Take::Empty => continue,
            Take::Closed => break,
        }
    }
    engine_debug!("Worker {} exiting", host);
}

fn call_host(processor: &dyn Processor, host: &Host, url: &str, slow_call: Duration) -> HostReply {
    let started = Instant::now();
    let reply = panic::catch_unwind(AssertUnwindSafe(|| processor.process(host, url)))
        .unwrap_or_else(|payload| Err(ProcessError::Panicked(panic_message(payload.as_ref()))));
    let elapsed = started.elapsed();
    if elapsed > slow_call {
        engine_info!("Processed in {} on {}: {}", format_duration(elapsed), host, url);
    }
    if let Err(err) = &reply {
        engine_warn!("Host {} failed on {}: {}", host, url, err);
    }
    reply
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn join_within(worker: Worker, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while !worker.handle.is_finished() {
        if Instant::now() >= deadline {
            engine_warn!("Worker {} did not stop in time; detaching it", worker.host);
            return false;
        }
        thread::sleep(JOIN_POLL);
    }
    if worker.handle.join().is_err() {
        engine_error!("Worker {} panicked", worker.host);
    }
    true
}
