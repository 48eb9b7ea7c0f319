// gpu.rs
use gfxinfo::active_gpu;

use crate::types::GpuStats;

/// Probe the active GPU, if any. gfxinfo exposes no temperature, so that
/// field stays empty here.
pub fn collect_gpu() -> Result<GpuStats, Box<dyn std::error::Error>> {
    let gpu = active_gpu()?;
    let info = gpu.info();

    Ok(GpuStats {
        model: gpu.model().to_string(),
        usage: Some(info.load_pct() as u32),
        memory_used_bytes: Some(info.used_vram()),
        memory_total_bytes: Some(info.total_vram()),
        temperature: None,
    })
}
