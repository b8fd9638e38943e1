//! System resource monitoring for the `status` and `metrics` builtins.

use chrono::{DateTime, Local};
use sysinfo::{Disks, System};
use tracing::debug;

use crate::config::MonitorConfig;

/// A point-in-time reading of system resources, with any threshold alerts.
#[derive(Debug, Clone)]
pub struct ResourceSnapshot {
    pub timestamp: DateTime<Local>,
    pub cpu_percent: f32,
    pub cpu_count: usize,
    pub memory_percent: f32,
    pub memory_used: u64,
    pub memory_total: u64,
    pub disk_percent: f32,
    pub disk_free_gb: f64,
    pub process_count: usize,
    pub alerts: Vec<String>,
}

impl ResourceSnapshot {
    pub fn under_pressure(&self) -> bool {
        !self.alerts.is_empty()
    }
}

pub struct SystemMonitor {
    system: System,
    config: MonitorConfig,
}

impl SystemMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            system: System::new_all(),
            config,
        }
    }

    /// Refresh and read current resource usage.
    ///
    /// CPU usage is measured between refreshes, so the very first snapshot
    /// of a session may read as zero.
    pub fn snapshot(&mut self) -> ResourceSnapshot {
        self.system.refresh_cpu();
        self.system.refresh_memory();
        self.system.refresh_processes();

        let cpu_percent = self.system.global_cpu_info().cpu_usage();
        let cpu_count = self.system.cpus().len();
        let memory_total = self.system.total_memory();
        let memory_used = self.system.used_memory();
        let memory_percent = if memory_total > 0 {
            (memory_used as f32 / memory_total as f32) * 100.0
        } else {
            0.0
        };
        let (disk_percent, disk_free_gb) = disk_usage();
        let process_count = self.system.processes().len();

        let alerts = alerts_for(cpu_percent, memory_percent, disk_percent, &self.config);
        debug!(cpu_percent, memory_percent, disk_percent, process_count, "resource snapshot");

        ResourceSnapshot {
            timestamp: Local::now(),
            cpu_percent,
            cpu_count,
            memory_percent,
            memory_used,
            memory_total,
            disk_percent,
            disk_free_gb,
            process_count,
            alerts,
        }
    }
}

const GB: f64 = 1_073_741_824.0;

/// Usage across all mounted disks: percent of total space used, and the
/// free space left in gigabytes.
fn disk_usage() -> (f32, f64) {
    let disks = Disks::new_with_refreshed_list();
    let mut total: u64 = 0;
    let mut available: u64 = 0;
    for disk in disks.list() {
        total = total.saturating_add(disk.total_space());
        available = available.saturating_add(disk.available_space());
    }
    let free_gb = available as f64 / GB;
    if total == 0 {
        return (0.0, free_gb);
    }
    (((total - available) as f32 / total as f32) * 100.0, free_gb)
}

fn alerts_for(cpu: f32, memory: f32, disk: f32, config: &MonitorConfig) -> Vec<String> {
    let mut alerts = Vec::new();
    if cpu >= config.cpu_high {
        alerts.push(format!("high CPU usage: {cpu:.1}%"));
    }
    if memory >= config.memory_high {
        alerts.push(format!("high memory usage: {memory:.1}%"));
    }
    if disk >= config.disk_high {
        alerts.push(format!("high disk usage: {disk:.1}%"));
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reads_plausible_values() {
        let mut monitor = SystemMonitor::new(MonitorConfig::default());
        let snapshot = monitor.snapshot();
        assert!(snapshot.memory_total > 0);
        assert!(snapshot.memory_used <= snapshot.memory_total);
        assert!((0.0..=100.0).contains(&snapshot.memory_percent));
        assert!((0.0..=100.0).contains(&snapshot.disk_percent));
        assert!(snapshot.disk_free_gb >= 0.0);
        assert!(snapshot.process_count > 0);
        assert!(snapshot.timestamp <= Local::now());
    }

    #[test]
    fn snapshot_counts_at_least_one_cpu() {
        let mut monitor = SystemMonitor::new(MonitorConfig::default());
        assert!(monitor.snapshot().cpu_count > 0);
    }

    #[test]
    fn alerts_fire_at_thresholds() {
        let config = MonitorConfig::default();
        assert!(alerts_for(10.0, 10.0, 10.0, &config).is_empty());

        let alerts = alerts_for(85.0, 10.0, 10.0, &config);
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("CPU"));

        let alerts = alerts_for(90.0, 90.0, 95.0, &config);
        assert_eq!(alerts.len(), 3);
    }

    #[test]
    fn threshold_boundaries_are_inclusive() {
        let config = MonitorConfig::default();
        assert_eq!(alerts_for(80.0, 0.0, 0.0, &config).len(), 1);
        assert!(alerts_for(79.9, 0.0, 0.0, &config).is_empty());
        assert_eq!(alerts_for(0.0, 85.0, 0.0, &config).len(), 1);
        assert_eq!(alerts_for(0.0, 0.0, 90.0, &config).len(), 1);
    }

    #[test]
    fn pressure_tracks_alerts() {
        let mut monitor = SystemMonitor::new(MonitorConfig {
            cpu_high: 200.0,
            memory_high: 200.0,
            disk_high: 200.0,
        });
        assert!(!monitor.snapshot().under_pressure());
    }
}
