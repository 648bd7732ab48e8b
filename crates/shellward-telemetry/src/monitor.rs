//! Per-execution resource monitoring.
//!
//! A [`PerformanceMonitor`] brackets one command: `start_monitoring` spawns
//! a fixed-interval sampling task, `stop_monitoring` aborts it and folds the
//! samples into a [`PerformanceSnapshot`] together with I/O estimates from
//! the command text and the length of its captured output.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use shellward_core::PerformanceSnapshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::estimate::{estimate_file_operations, estimate_network_activity};

/// Default sampling interval.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// One resource reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSample {
    /// CPU usage since the previous reading, in percent of one core.
    pub cpu_percent: f64,
    /// Resident memory in megabytes.
    pub memory_mb: f64,
}

/// Source of resource readings.
///
/// Returning `None` skips the tick; sampling failures never surface.
pub trait ResourceSampler: Send + Sync + fmt::Debug {
    /// Take one reading.
    fn sample(&self) -> Option<ResourceSample>;
}

/// A sampler that never produces readings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSampler;

impl ResourceSampler for NullSampler {
    fn sample(&self) -> Option<ResourceSample> {
        None
    }
}

/// Samples `getrusage` for this process and its reaped children.
#[cfg(unix)]
#[derive(Debug, Default)]
pub struct RusageSampler {
    previous: Mutex<Option<(std::time::Instant, f64)>>,
}

#[cfg(unix)]
impl RusageSampler {
    /// Create a sampler; the first reading establishes the baseline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn cpu_seconds(usage: &nix::sys::resource::Usage) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let secs = |tv: nix::sys::time::TimeVal| tv.tv_sec() as f64 + tv.tv_usec() as f64 / 1e6;
        secs(usage.user_time()) + secs(usage.system_time())
    }
}

#[cfg(unix)]
impl ResourceSampler for RusageSampler {
    fn sample(&self) -> Option<ResourceSample> {
        use nix::sys::resource::{UsageWho, getrusage};

        let own = getrusage(UsageWho::RUSAGE_SELF).ok()?;
        let children = getrusage(UsageWho::RUSAGE_CHILDREN).ok()?;
        let cpu = Self::cpu_seconds(&own) + Self::cpu_seconds(&children);
        let now = std::time::Instant::now();

        let mut previous = self.previous.lock().unwrap_or_else(PoisonError::into_inner);
        let cpu_percent = match previous.replace((now, cpu)) {
            Some((at, last_cpu)) => {
                let wall = now.duration_since(at).as_secs_f64();
                if wall > 0.0 {
                    ((cpu - last_cpu) / wall * 100.0).max(0.0)
                } else {
                    0.0
                }
            },
            None => 0.0,
        };

        // Linux reports max RSS in kilobytes.
        #[allow(clippy::cast_precision_loss)]
        let memory_mb = own.max_rss().max(children.max_rss()) as f64 / 1024.0;

        Some(ResourceSample {
            cpu_percent,
            memory_mb,
        })
    }
}

/// The sampler for this platform.
#[must_use]
pub fn default_sampler() -> Arc<dyn ResourceSampler> {
    #[cfg(unix)]
    {
        Arc::new(RusageSampler::new())
    }
    #[cfg(not(unix))]
    {
        Arc::new(NullSampler)
    }
}

struct ActiveSession {
    command: String,
    samples: Arc<Mutex<Vec<ResourceSample>>>,
    task: JoinHandle<()>,
}

/// Samples resource usage while one command runs.
pub struct PerformanceMonitor {
    sampler: Arc<dyn ResourceSampler>,
    interval: Duration,
    active: Option<ActiveSession>,
}

impl fmt::Debug for PerformanceMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerformanceMonitor")
            .field("sampler", &self.sampler)
            .field("interval", &self.interval)
            .field("active", &self.active.is_some())
            .finish()
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(default_sampler(), DEFAULT_SAMPLE_INTERVAL)
    }
}

impl PerformanceMonitor {
    /// Create a monitor reading from `sampler` every `interval`.
    ///
    /// A zero interval is raised to one millisecond.
    #[must_use]
    pub fn new(sampler: Arc<dyn ResourceSampler>, interval: Duration) -> Self {
        Self {
            sampler,
            interval: interval.max(Duration::from_millis(1)),
            active: None,
        }
    }

    /// Whether a sampling task is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Begin sampling for `command`. Must be called within a Tokio runtime.
    ///
    /// A session already in progress is discarded.
    pub fn start_monitoring(&mut self, command: &str) {
        if let Some(previous) = self.active.take() {
            warn!(
                command = %previous.command,
                "monitoring restarted before stop, discarding samples"
            );
            previous.task.abort();
        }

        let samples = Arc::new(Mutex::new(Vec::new()));
        let sampler = Arc::clone(&self.sampler);
        let sink = Arc::clone(&samples);
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Some(sample) = sampler.sample() {
                    sink.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(sample);
                }
            }
        });

        debug!(command, ?interval, "performance monitoring started");
        self.active = Some(ActiveSession {
            command: command.to_owned(),
            samples,
            task,
        });
    }

    /// Stop sampling and summarize.
    ///
    /// CPU and memory are the means of the samples taken, absent when none
    /// were. I/O counters are estimated from the command text and
    /// `output_len`, the captured stdout plus stderr length in bytes (zero
    /// when nothing was captured). Without a session in progress, returns
    /// an empty snapshot.
    pub fn stop_monitoring(&mut self, output_len: usize) -> PerformanceSnapshot {
        let Some(session) = self.active.take() else {
            return PerformanceSnapshot::default();
        };
        session.task.abort();

        let samples = session
            .samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let snapshot = PerformanceSnapshot {
            cpu_usage: mean(samples.iter().map(|s| s.cpu_percent)),
            memory_usage: mean(samples.iter().map(|s| s.memory_mb)),
            network_activity: estimate_network_activity(&session.command, output_len),
            file_system_operations: estimate_file_operations(&session.command, output_len),
        };

        debug!(
            command = %session.command,
            samples = samples.len(),
            output_len,
            "performance monitoring stopped"
        );
        snapshot
    }
}

impl Drop for PerformanceMonitor {
    fn drop(&mut self) {
        if let Some(session) = self.active.take() {
            session.task.abort();
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n.saturating_add(1)));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct FixedSampler(ResourceSample);

    impl ResourceSampler for FixedSampler {
        fn sample(&self) -> Option<ResourceSample> {
            Some(self.0)
        }
    }

    #[derive(Debug, Default)]
    struct CountingSampler(AtomicU32);

    impl ResourceSampler for CountingSampler {
        fn sample(&self) -> Option<ResourceSample> {
            self.0.fetch_add(1, Ordering::SeqCst);
            None
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_is_mean_of_samples() {
        let sampler = Arc::new(FixedSampler(ResourceSample {
            cpu_percent: 25.0,
            memory_mb: 64.0,
        }));
        let mut monitor = PerformanceMonitor::new(sampler, Duration::from_millis(100));

        monitor.start_monitoring("cat notes.txt");
        assert!(monitor.is_active());
        tokio::time::sleep(Duration::from_millis(350)).await;
        let snapshot = monitor.stop_monitoring(0);

        assert!(!monitor.is_active());
        assert_eq!(snapshot.cpu_usage, Some(25.0));
        assert_eq!(snapshot.memory_usage, Some(64.0));
        assert_eq!(snapshot.file_system_operations.reads, 1);
        assert_eq!(snapshot.network_activity.requests, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampling_stops_after_stop() {
        let sampler = Arc::new(CountingSampler::default());
        let mut monitor = PerformanceMonitor::new(sampler.clone(), Duration::from_millis(100));

        monitor.start_monitoring("sleep 1");
        tokio::time::sleep(Duration::from_millis(250)).await;
        let snapshot = monitor.stop_monitoring(0);
        let taken = sampler.0.load(Ordering::SeqCst);
        assert!(taken >= 1);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(sampler.0.load(Ordering::SeqCst), taken);

        assert_eq!(snapshot.cpu_usage, None);
        assert_eq!(snapshot.memory_usage, None);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_empty() {
        let mut monitor = PerformanceMonitor::new(Arc::new(NullSampler), DEFAULT_SAMPLE_INTERVAL);
        assert_eq!(monitor.stop_monitoring(0), PerformanceSnapshot::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_estimate_included() {
        let mut monitor = PerformanceMonitor::new(Arc::new(NullSampler), DEFAULT_SAMPLE_INTERVAL);
        monitor.start_monitoring("curl https://example.com");
        let snapshot = monitor.stop_monitoring(0);
        assert_eq!(snapshot.network_activity.requests, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_length_folded_into_snapshot() {
        let mut monitor = PerformanceMonitor::new(Arc::new(NullSampler), DEFAULT_SAMPLE_INTERVAL);

        monitor.start_monitoring("cat server.log");
        let quiet = monitor.stop_monitoring(0);
        monitor.start_monitoring("cat server.log");
        let chatty = monitor.stop_monitoring(256 * 1024);

        assert_eq!(quiet.file_system_operations.reads, 1);
        assert_eq!(chatty.file_system_operations.reads, 1);
        assert_eq!(chatty.file_system_operations.bytes_read, 256 * 1024);
        assert!(chatty.file_system_operations.bytes_read > quiet.file_system_operations.bytes_read);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(std::iter::empty()), None);
        assert_eq!(mean([1.0, 2.0, 6.0].into_iter()), Some(3.0));
    }

    #[cfg(unix)]
    #[test]
    fn test_rusage_sampler_reads() {
        let sampler = RusageSampler::new();
        let first = sampler.sample().unwrap();
        assert!(first.memory_mb > 0.0);
        assert!(first.cpu_percent >= 0.0);
    }
}
