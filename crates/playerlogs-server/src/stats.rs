//! Memory figures for the status module.

use playerlogs_api::MemoryStats;
use sysinfo::System;

const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Something that can report memory figures on demand.
pub trait MemorySource {
    fn sample(&mut self) -> Option<MemoryStats>;
}

/// Host memory via `sysinfo`.
pub struct SystemMemory {
    sys: System,
}

impl SystemMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemMemory {
    fn default() -> Self {
        Self { sys: System::new() }
    }
}

impl MemorySource for SystemMemory {
    fn sample(&mut self) -> Option<MemoryStats> {
        self.sys.refresh_memory();
        to_stats(
            self.sys.total_memory(),
            self.sys.used_memory(),
            self.sys.available_memory(),
            self.sys.total_swap(),
        )
    }
}

/// Max is physical plus swap. `None` when the platform reports no memory at all.
fn to_stats(total: u64, used: u64, available: u64, swap: u64) -> Option<MemoryStats> {
    if total == 0 {
        return None;
    }
    Some(MemoryStats {
        used_mb: used / BYTES_PER_MIB,
        free_mb: available / BYTES_PER_MIB,
        total_mb: total / BYTES_PER_MIB,
        max_mb: total.saturating_add(swap) / BYTES_PER_MIB,
    })
}
