use std::time::Duration;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_util::sync::CancellationToken;

use crate::HostReply;

/// One URL waiting for a worker, with the channel its answer goes back on.
#[derive(Debug)]
pub struct Task {
    pub url: String,
    pub completion: oneshot::Sender<HostReply>,
}

impl Task {
    pub fn new(url: impl Into<String>) -> (Self, oneshot::Receiver<HostReply>) {
        let (completion, rx) = oneshot::channel();
        (
            Self {
                url: url.into(),
                completion,
            },
            rx,
        )
    }
}

/// Result of waiting on the queue.
#[derive(Debug)]
pub enum Take {
    Task(Task),
    /// Nothing arrived before the timeout.
    Empty,
    Closed,
}

#[derive(Debug, thiserror::Error)]
#[error("task queue is closed")]
pub struct QueueClosed(pub Task);

/// FIFO shared by every worker. Whoever is idle first takes the next task.
///
/// Closing cancels a token that every pending [`TaskQueue::take`] is waiting
/// on, so all workers wake up at once without sentinels.
#[derive(Debug)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<Task>,
    rx: Mutex<mpsc::UnboundedReceiver<Task>>,
    closed: CancellationToken,
}

impl TaskQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
            closed: CancellationToken::new(),
        }
    }

    /// Enqueue without blocking. A closed queue hands the task back.
    pub fn submit(&self, task: Task) -> Result<(), QueueClosed> {
        if self.closed.is_cancelled() {
            return Err(QueueClosed(task));
        }
        self.tx.send(task).map_err(|err| QueueClosed(err.0))
    }

    /// Wait up to `timeout` for the next task.
    pub async fn take(&self, timeout: Duration) -> Take {
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => Take::Closed,
            next = tokio::time::timeout(timeout, self.next()) => match next {
                Ok(Some(task)) => Take::Task(task),
                Ok(None) => Take::Closed,
                Err(_) => Take::Empty,
            },
        }
    }

    async fn next(&self) -> Option<Task> {
        self.rx.lock().await.recv().await
    }

    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Drop every task still queued after close; their callers see
    /// [`crate::ProcessError::Dropped`]. Returns how many were dropped, or
    /// `None` if a worker is still holding the receiver.
    pub fn drain(&self) -> Option<usize> {
        let mut rx = self.rx.try_lock().ok()?;
        rx.close();
        let mut dropped = 0;
        while rx.try_recv().is_ok() {
            dropped += 1;
        }
        Some(dropped)
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::{Take, Task, TaskQueue};

    const WAIT: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn tasks_come_out_in_submission_order() {
        let queue = TaskQueue::new();
        let (first, _rx1) = Task::new("https://a.example");
        let (second, _rx2) = Task::new("https://b.example");
        queue.submit(first).unwrap();
        queue.submit(second).unwrap();

        let urls: Vec<String> = [queue.take(WAIT).await, queue.take(WAIT).await]
            .into_iter()
            .map(|take| match take {
                Take::Task(task) => task.url,
                other => panic!("expected a task, got {other:?}"),
            })
            .collect();
        assert_eq!(urls, vec!["https://a.example", "https://b.example"]);
    }

    #[tokio::test]
    async fn empty_queue_times_out() {
        let queue = TaskQueue::new();
        assert!(matches!(queue.take(WAIT).await, Take::Empty));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn close_wakes_every_waiter() {
        let queue = Arc::new(TaskQueue::new());
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move { queue.take(Duration::from_secs(30)).await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.close();

        for waiter in waiters {
            let take = tokio::time::timeout(Duration::from_secs(5), waiter)
                .await
                .expect("waiter woke up")
                .unwrap();
            assert!(matches!(take, Take::Closed));
        }
    }

    #[tokio::test]
    async fn closed_queue_refuses_and_drains() {
        let queue = TaskQueue::new();
        let (queued, rx) = Task::new("https://a.example");
        queue.submit(queued).unwrap();
        queue.close();

        let (late, _late_rx) = Task::new("https://b.example");
        let refused = queue.submit(late).unwrap_err();
        assert_eq!(refused.0.url, "https://b.example");

        assert_eq!(queue.drain(), Some(1));
        assert!(rx.await.is_err(), "dropped task must not resolve");
    }
}
