//! Built-in task batches for exercising the scheduler from the command line.

use std::hint::black_box;
use std::time::{Duration, Instant};

use batchrun_scheduler::{Task, TaskError};
use clap::ValueEnum;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    /// Six mixed tasks: sleeps of varying length, one CPU-bound, one failure
    Sample,
    /// A 2s task and a 500ms task, run with a 1s timeout unless overridden
    Timeout,
    /// Twenty tasks sleeping 100-480ms
    Large,
    /// Every task fails
    Failing,
}

impl Demo {
    pub fn tasks(self) -> Vec<Task> {
        match self {
            Demo::Sample => sample_tasks(),
            Demo::Timeout => timeout_tasks(),
            Demo::Large => large_tasks(20),
            Demo::Failing => failing_tasks(4),
        }
    }

    /// Timeout applied when neither flags nor config set one.
    pub fn default_timeout(self) -> Option<Duration> {
        match self {
            Demo::Timeout => Some(Duration::from_secs(1)),
            _ => None,
        }
    }
}

fn sleep_task(name: &str, ms: u64) -> Task {
    let label = name.to_string();
    Task::new(move || {
        let label = label.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            debug!(task = %label, "sleep finished");
            Ok(())
        }
    })
    .with_name(name)
}

fn sample_tasks() -> Vec<Task> {
    vec![
        sleep_task("fast", 100),
        sleep_task("medium", 300),
        sleep_task("slow", 500),
        Task::new(|| async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Err(TaskError::failed("simulated upstream failure"))
        })
        .with_name("flaky"),
        Task::blocking(|| {
            let start = Instant::now();
            let mut acc: u64 = 0;
            for i in 0..1_000_000u64 {
                acc = acc.wrapping_add(black_box(i * i));
            }
            debug!(acc, elapsed_us = start.elapsed().as_micros() as u64, "compute finished");
            Ok(())
        })
        .with_name("compute"),
        sleep_task("network", 400),
    ]
}

fn timeout_tasks() -> Vec<Task> {
    vec![sleep_task("overdue", 2_000), sleep_task("prompt", 500)]
}

fn large_tasks(n: u64) -> Vec<Task> {
    (0..n)
        .map(|i| sleep_task(&format!("batch-{i}"), 100 + (i * 20) % 400))
        .collect()
}

fn failing_tasks(n: usize) -> Vec<Task> {
    (0..n)
        .map(|i| {
            Task::new(move || async move { Err(TaskError::failed(format!("record {i} rejected"))) })
                .with_name(format!("reject-{i}"))
        })
        .collect()
}
