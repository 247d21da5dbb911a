use std::hint::black_box;

use rand::Rng;

use crate::core::config::BenchConfig;
use crate::core::error::{BenchError, Result};
use crate::core::outcome::{Category, Measurement};
use crate::core::registry::SuiteRegistry;

const MIB: usize = 1024 * 1024;

/// The memory suite: fill/sum throughput, copy bandwidth, allocation stress,
/// and two scattered-access patterns.
pub fn suite() -> Result<SuiteRegistry> {
    let mut registry = SuiteRegistry::new(Category::Memory);

    registry.register("Memory Read/Write Speed", |cfg: &BenchConfig| {
        read_write(cfg.memory_block_mb)
    })?;
    registry.register("Memory Bandwidth Test", |cfg: &BenchConfig| {
        bandwidth(cfg.memory_block_mb)
    })?;
    registry.register("Memory Allocation Stress Test", |cfg: &BenchConfig| {
        allocation(cfg.alloc_block_mb)
    })?;
    registry.register("Page Faults Test", |cfg: &BenchConfig| {
        page_faults(cfg.page_fault_iterations)
    })?;
    registry.register("Random Access Latency", |cfg: &BenchConfig| {
        random_access(cfg.random_access_iterations)
    })?;

    Ok(registry)
}

fn alloc_bytes(bytes: usize, what: &str) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(bytes).map_err(|_| {
        BenchError::ResourceExhaustion(format!("cannot allocate {} bytes for {}", bytes, what))
    })?;
    data.resize(bytes, 0);
    Ok(data)
}

/// Writes a rolling byte pattern through the block, then reads it all back.
fn read_write(size_mb: usize) -> Result<Measurement> {
    let bytes = size_mb * MIB;
    let mut data = alloc_bytes(bytes, "read/write block")?;

    let (measurement, checksum) = Measurement::capture(format!("size={}MB", size_mb), || {
        for (i, slot) in data.iter_mut().enumerate() {
            *slot = (i % 256) as u8;
        }
        data.iter().map(|&b| b as u64).sum::<u64>()
    });
    black_box(checksum);
    Ok(measurement)
}

/// Copies a block of f64 values; the timed section is the copy alone.
fn bandwidth(size_mb: usize) -> Result<Measurement> {
    let elements = size_mb * MIB / std::mem::size_of::<f64>();
    let mut source: Vec<f64> = Vec::new();
    source.try_reserve_exact(elements).map_err(|_| {
        BenchError::ResourceExhaustion(format!(
            "cannot allocate {} elements for bandwidth copy",
            elements
        ))
    })?;
    source.resize(elements, 1.0);

    let (measurement, copy) =
        Measurement::capture(format!("size={}MB", size_mb), || source.clone());
    black_box(copy.len());
    Ok(measurement)
}

/// Allocates and frees one large block inside the timed section.
fn allocation(size_mb: usize) -> Result<Measurement> {
    let bytes = size_mb * MIB;
    let (measurement, result) = Measurement::capture(format!("size={}MB", size_mb), || {
        let block = alloc_bytes(bytes, "allocation stress block")?;
        black_box(block.as_ptr());
        drop(block);
        Ok::<(), BenchError>(())
    });
    result?;
    Ok(measurement)
}

/// Scattered single-word writes over a working set large enough to defeat
/// the cache.
fn page_faults(iterations: usize) -> Result<Measurement> {
    let mut arena = vec![0i32; iterations.max(1)];
    let mut rng = rand::thread_rng();

    let (measurement, _) = Measurement::capture(format!("iterations={}", iterations), || {
        for _ in 0..iterations {
            let index = rng.gen_range(0..arena.len());
            arena[index] += 1;
        }
    });
    black_box(arena.first().copied());
    Ok(measurement)
}

/// Like `page_faults` but with the index sequence generated up front, so the
/// timed section is pure memory access.
fn random_access(iterations: usize) -> Result<Measurement> {
    let len = iterations.max(1);
    let mut arena = vec![0i32; len];
    let mut rng = rand::thread_rng();
    let indices: Vec<usize> = (0..iterations).map(|_| rng.gen_range(0..len)).collect();

    let (measurement, _) = Measurement::capture(format!("iterations={}", iterations), || {
        for &index in &indices {
            arena[index] += 1;
        }
    });
    black_box(arena.first().copied());
    Ok(measurement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_small_block() {
        let m = read_write(1).unwrap();
        assert_eq!(m.detail, "size=1MB");
        assert!(m.duration.as_secs_f64() >= 0.0);
    }

    #[test]
    fn test_bandwidth_small_block() {
        let m = bandwidth(1).unwrap();
        assert_eq!(m.detail, "size=1MB");
    }

    #[test]
    fn test_allocation_small_block() {
        let m = allocation(2).unwrap();
        assert_eq!(m.detail, "size=2MB");
    }

    #[test]
    fn test_scattered_access_units() {
        let m = page_faults(10_000).unwrap();
        assert_eq!(m.detail, "iterations=10000");
        let m = random_access(10_000).unwrap();
        assert_eq!(m.detail, "iterations=10000");
    }

    #[test]
    fn test_suite_registers_five_units_in_order() {
        let registry = suite().unwrap();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.units()[0].name(), "Memory Read/Write Speed");
        assert_eq!(registry.units()[4].name(), "Random Access Latency");
    }
}
