// This is free and unencumbered software released into the public domain.

use std::{
    sync::mpsc::{Sender, channel},
    thread::JoinHandle,
};

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks handed over by the native framework.
pub trait Executor: Send + Sync {
    fn execute(&self, task: Task);
}

enum ExecutorMsg {
    Run(Task),
    Stop,
}

/// A single worker thread running tasks in submission order.
pub struct SerialExecutor {
    tx: Sender<ExecutorMsg>,
    join: Option<JoinHandle<()>>,
}

impl core::fmt::Debug for SerialExecutor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SerialExecutor")
            .field("running", &self.join.is_some())
            .finish()
    }
}

impl SerialExecutor {
    pub fn new(name: impl Into<String>) -> std::io::Result<Self> {
        let (tx, rx) = channel::<ExecutorMsg>();

        let join = std::thread::Builder::new().name(name.into()).spawn(move || {
            while let Ok(msg) = rx.recv() {
                match msg {
                    ExecutorMsg::Run(task) => task(),
                    ExecutorMsg::Stop => break,
                }
            }
        })?;

        Ok(Self {
            tx,
            join: Some(join),
        })
    }

    /// Drains queued tasks, then joins the worker.
    pub fn shutdown(&mut self) {
        let _ = self.tx.send(ExecutorMsg::Stop);
        if let Some(j) = self.join.take() {
            if j.thread().id() != std::thread::current().id() {
                let _ = j.join();
            }
        }
    }
}

impl Executor for SerialExecutor {
    fn execute(&self, task: Task) {
        if self.tx.send(ExecutorMsg::Run(task)).is_err() {
            #[cfg(feature = "tracing")]
            asimov_module::tracing::warn!(
                target: "asimov_camerax_bridge",
                "executor stopped, task dropped"
            );
        }
    }
}

impl Drop for SerialExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::mpsc, time::Duration};

    #[test]
    fn tasks_run_in_order_off_the_calling_thread() {
        let executor = SerialExecutor::new("test-executor").unwrap();
        let (tx, rx) = mpsc::channel();
        let caller = std::thread::current().id();

        for n in 0..3 {
            let tx = tx.clone();
            executor.execute(Box::new(move || {
                let _ = tx.send((n, std::thread::current().id()));
            }));
        }

        for expected in 0..3 {
            let (n, thread) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            assert_eq!(n, expected);
            assert_ne!(thread, caller);
        }
    }

    #[test]
    fn shutdown_drains_queued_tasks() {
        let mut executor = SerialExecutor::new("test-executor").unwrap();
        let (tx, rx) = mpsc::channel();
        executor.execute(Box::new(move || {
            std::thread::sleep(Duration::from_millis(20));
            let _ = tx.send(());
        }));
        executor.shutdown();
        assert!(rx.try_recv().is_ok());
    }
}
