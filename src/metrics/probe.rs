//! Process snapshot providers

use std::sync::{Mutex, PoisonError};
use sysinfo::{Pid, System};

/// Memory readings in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryUsage {
    /// Resident set size
    pub rss: u64,
    /// Resident anonymous memory
    pub heap_used: u64,
    /// Data segment size
    pub heap_total: u64,
    /// Resident file-backed memory
    pub external: u64,
    /// Resident shared memory
    pub array_buffers: u64,
}

/// CPU time consumed by the process, in microseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub system: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSnapshot {
    pub memory: MemoryUsage,
    pub cpu: CpuTimes,
}

/// Read-only view of the running process.
///
/// Implementations must be cheap enough to call on every request.
pub trait ProcessProbe: Send + Sync {
    fn snapshot(&self) -> ProcessSnapshot;
}

/// Probe backed by procfs on Linux, with `sysinfo` as the portable fallback
pub struct SystemProbe {
    system: Mutex<System>,
    pid: Option<Pid>,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    fn sysinfo_memory(&self) -> MemoryUsage {
        let Some(pid) = self.pid else {
            return MemoryUsage::default();
        };

        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        if !system.refresh_process(pid) {
            return MemoryUsage::default();
        }
        system.process(pid).map_or_else(MemoryUsage::default, |process| {
            portable_memory(process.memory(), process.virtual_memory())
        })
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessProbe for SystemProbe {
    fn snapshot(&self) -> ProcessSnapshot {
        let memory = std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|status| parse_status(&status))
            .unwrap_or_else(|| self.sysinfo_memory());

        let cpu = std::fs::read_to_string("/proc/self/stat")
            .ok()
            .and_then(|stat| parse_stat(&stat))
            .unwrap_or_default();

        ProcessSnapshot { memory, cpu }
    }
}

/// Parse memory fields out of `/proc/<pid>/status`.
///
/// Returns `None` unless at least `VmRSS` is present.
fn parse_status(status: &str) -> Option<MemoryUsage> {
    let field = |name: &str| -> Option<u64> {
        status.lines().find_map(|line| {
            let rest = line.strip_prefix(name)?.strip_prefix(':')?;
            let kb: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
            Some(kb * 1024)
        })
    };

    let rss = field("VmRSS")?;
    Some(MemoryUsage {
        rss,
        heap_used: field("RssAnon").unwrap_or(rss),
        heap_total: field("VmData").unwrap_or(0),
        external: field("RssFile").unwrap_or(0),
        array_buffers: field("RssShmem").unwrap_or(0),
    })
}

/// Map the sizes `sysinfo` exposes; the finer breakdown is reported as zero
const fn portable_memory(resident: u64, virtual_size: u64) -> MemoryUsage {
    MemoryUsage {
        rss: resident,
        heap_used: 0,
        heap_total: virtual_size,
        external: 0,
        array_buffers: 0,
    }
}

/// Kernel clock ticks per second (`USER_HZ`), fixed at 100 on Linux
const CLOCK_TICKS_PER_SEC: u64 = 100;

/// Parse user and system CPU time out of `/proc/<pid>/stat`
fn parse_stat(stat: &str) -> Option<CpuTimes> {
    // The command name may contain spaces, so fields are counted from the
    // closing parenthesis. utime and stime are fields 14 and 15.
    let after_comm = &stat[stat.rfind(')')? + 1..];
    let mut fields = after_comm.split_whitespace().skip(11);
    let utime: u64 = fields.next()?.parse().ok()?;
    let stime: u64 = fields.next()?.parse().ok()?;

    let to_micros = |ticks: u64| ticks * (1_000_000 / CLOCK_TICKS_PER_SEC);
    Some(CpuTimes {
        user: to_micros(utime),
        system: to_micros(stime),
    })
}
