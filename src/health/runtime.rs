//! Runtime info provider.
//!
//! Process facts (pid, uptime, memory, CPU) are read through the
//! [`RuntimeInfo`] trait so status and metrics endpoints can be tested with
//! fixed values.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Point-in-time resource usage of the process.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessSample {
    pub rss_bytes: u64,
    pub virtual_bytes: u64,
    pub cpu_percent: f32,
}

pub trait RuntimeInfo: Send + Sync {
    fn pid(&self) -> u32;

    /// Time since the provider was created (service start).
    fn uptime(&self) -> Duration;

    fn sample(&self) -> ProcessSample;
}

/// [`RuntimeInfo`] backed by the operating system via `sysinfo`.
pub struct SystemRuntime {
    pid: Pid,
    started: Instant,
    system: Mutex<System>,
}

impl SystemRuntime {
    pub fn new() -> Self {
        let pid = sysinfo::get_current_pid().unwrap_or_else(|_| Pid::from_u32(std::process::id()));
        Self {
            pid,
            started: Instant::now(),
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeInfo for SystemRuntime {
    fn pid(&self) -> u32 {
        self.pid.as_u32()
    }

    fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    fn sample(&self) -> ProcessSample {
        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::new().with_memory().with_cpu(),
        );

        match system.process(self.pid) {
            Some(process) => ProcessSample {
                rss_bytes: process.memory(),
                virtual_bytes: process.virtual_memory(),
                cpu_percent: process.cpu_usage(),
            },
            None => {
                tracing::debug!(pid = self.pid.as_u32(), "Process not visible to sysinfo");
                ProcessSample::default()
            }
        }
    }
}

/// Fixed values, for tests and environments without process introspection.
#[derive(Debug, Clone)]
pub struct StaticRuntime {
    pub pid: u32,
    pub uptime: Duration,
    pub sample: ProcessSample,
}

impl RuntimeInfo for StaticRuntime {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn uptime(&self) -> Duration {
        self.uptime
    }

    fn sample(&self) -> ProcessSample {
        self.sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_runtime_reports_this_process() {
        let runtime = SystemRuntime::new();
        assert_eq!(runtime.pid(), std::process::id());

        let sample = runtime.sample();
        assert!(sample.rss_bytes > 0);
        assert!(runtime.uptime() < Duration::from_secs(60));
    }
}
