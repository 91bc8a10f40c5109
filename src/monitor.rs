//! System resource monitoring
//!
//! CPU/RAM snapshots for status and diagnostics, network counters, a
//! reachability probe, and the background task that warns about sustained
//! high load.

use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use sysinfo::{Networks, System};
use tokio::net::{lookup_host, TcpStream, UdpSocket};
use tracing::{debug, warn};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSnapshot {
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub memory_used_gb: f64,
    pub memory_total_gb: f64,
    pub memory_available_gb: f64,
}

impl ResourceSnapshot {
    pub fn over(&self, threshold: f32) -> bool {
        self.cpu_percent > threshold || self.memory_percent > threshold
    }
}

#[derive(Debug)]
pub struct SystemMonitor {
    sys: Mutex<System>,
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemMonitor {
    pub fn new() -> Self {
        let mut sys = System::new();
        // First CPU reading is only meaningful relative to a previous one
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        Self {
            sys: Mutex::new(sys),
        }
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        let mut sys = self.sys.lock().unwrap_or_else(PoisonError::into_inner);
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let total = sys.total_memory();
        let used = sys.used_memory();
        ResourceSnapshot {
            cpu_percent: sys.global_cpu_usage(),
            memory_percent: if total == 0 {
                0.0
            } else {
                (used as f64 / total as f64 * 100.0) as f32
            },
            memory_used_gb: used as f64 / GIB,
            memory_total_gb: total as f64 / GIB,
            memory_available_gb: sys.available_memory() as f64 / GIB,
        }
    }

    /// OS, host, cores and RAM, one item per entry
    pub fn system_info(&self) -> Vec<String> {
        let sys = self.sys.lock().unwrap_or_else(PoisonError::into_inner);
        let os = match (System::name(), System::os_version()) {
            (Some(name), Some(version)) => format!("{} {}", name, version),
            (Some(name), None) => name,
            _ => std::env::consts::OS.to_string(),
        };
        vec![
            format!("System: {}", os),
            format!(
                "Host: {}",
                System::host_name().unwrap_or_else(|| "unknown".to_string())
            ),
            format!("CPU Cores: {}", sys.cpus().len()),
            format!("Total RAM: {:.2} GB", sys.total_memory() as f64 / GIB),
        ]
    }
}

/// Bytes moved since boot, summed over all interfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetworkTotals {
    pub sent: u64,
    pub received: u64,
}

impl NetworkTotals {
    pub fn read() -> Self {
        let networks = Networks::new_with_refreshed_list();
        networks
            .list()
            .values()
            .fold(Self::default(), |acc, data| Self {
                sent: acc.sent.saturating_add(data.total_transmitted()),
                received: acc.received.saturating_add(data.total_received()),
            })
    }

    pub fn describe(&self) -> String {
        format!(
            "Network statistics: Bytes Sent: {:.2} MB, Bytes Received: {:.2} MB",
            self.sent as f64 / MIB,
            self.received as f64 / MIB
        )
    }
}

/// Address of the interface that routes to `addr`. A connected UDP socket
/// picks the route without sending anything.
pub async fn local_ip(addr: &str) -> Option<IpAddr> {
    let target = match lookup_host(addr).await {
        Ok(mut addrs) => addrs.next()?,
        Err(e) => {
            debug!("Cannot resolve {}: {}", addr, e);
            return None;
        }
    };
    let bind = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    let socket = UdpSocket::bind(bind).await.ok()?;
    if let Err(e) = socket.connect(target).await {
        debug!("No route to {}: {}", target, e);
        return None;
    }
    socket.local_addr().ok().map(|local| local.ip())
}

/// TCP connect to `addr` within two seconds
pub async fn probe_network(addr: &str) -> bool {
    match tokio::time::timeout(Duration::from_secs(2), TcpStream::connect(addr)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!("Network probe {} failed: {}", addr, e);
            false
        }
        Err(_) => {
            debug!("Network probe {} timed out", addr);
            false
        }
    }
}

pub fn load_warning(snapshot: &ResourceSnapshot) -> String {
    format!(
        "Warning: High system load (CPU: {:.0}%, RAM: {:.0}%)",
        snapshot.cpu_percent, snapshot.memory_percent
    )
}

/// Sample every `interval` and hand a warning to `notify` while load stays
/// above `threshold`. Ends when `notify` returns false.
pub async fn run_monitor<F>(
    monitor: std::sync::Arc<SystemMonitor>,
    interval: Duration,
    threshold: f32,
    mut notify: F,
) where
    F: FnMut(String) -> bool + Send,
{
    let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let snapshot = monitor.snapshot();
        if snapshot.over(threshold) {
            warn!("⚠️ High load: {:?}", snapshot);
            if !notify(load_warning(&snapshot)) {
                break;
            }
        }
    }
    debug!("Resource monitor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_ranges() {
        let monitor = SystemMonitor::new();
        let snap = monitor.snapshot();
        assert!(snap.memory_percent >= 0.0 && snap.memory_percent <= 100.0);
        assert!(snap.memory_total_gb >= snap.memory_used_gb);
    }

    #[test]
    fn test_threshold() {
        let snap = ResourceSnapshot {
            cpu_percent: 95.0,
            memory_percent: 40.0,
            memory_used_gb: 4.0,
            memory_total_gb: 10.0,
            memory_available_gb: 6.0,
        };
        assert!(snap.over(90.0));
        assert!(!snap.over(96.0));
        assert_eq!(load_warning(&snap), "Warning: High system load (CPU: 95%, RAM: 40%)");
    }

    #[test]
    fn test_system_info_items() {
        let info = SystemMonitor::new().system_info();
        assert_eq!(info.len(), 4);
        assert!(info[2].starts_with("CPU Cores: "));
    }

    #[test]
    fn test_network_totals_text() {
        let totals = NetworkTotals {
            sent: 3 * 1024 * 1024,
            received: 1024 * 1024 / 2,
        };
        assert_eq!(
            totals.describe(),
            "Network statistics: Bytes Sent: 3.00 MB, Bytes Received: 0.50 MB"
        );
        // Counters are host-dependent; reading them must not fail
        let _ = NetworkTotals::read();
    }

    #[tokio::test]
    async fn test_local_ip_for_loopback() {
        let ip = local_ip("127.0.0.1:9").await;
        assert_eq!(ip, Some(IpAddr::from([127, 0, 0, 1])));
        assert_eq!(local_ip("not a host").await, None);
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        assert!(!probe_network("127.0.0.1:9").await);
    }
}
