use std::hint::black_box;

use rand::Rng;

use crate::core::config::BenchConfig;
use crate::core::error::{BenchError, Result};
use crate::core::outcome::{Category, Measurement};
use crate::core::profile;
use crate::core::registry::SuiteRegistry;

/// The accelerator suite. Vector addition is gated on device presence; the
/// two CPU proxies are kept as distinct comparison units rather than folded
/// into the CPU suite.
pub fn suite() -> Result<SuiteRegistry> {
    let mut registry = SuiteRegistry::new(Category::Accelerator);

    registry.register("Vector Addition", |cfg: &BenchConfig| {
        vector_addition(cfg.vector_elements)
    })?;
    registry.register("Matrix Multiplication (CPU)", |cfg: &BenchConfig| {
        matrix_multiplication_cpu(cfg.accel_matrix_size)
    })?;
    registry.register("CPU Computation", |cfg: &BenchConfig| {
        cpu_computation(cfg.cpu_sum_limit)
    })?;

    Ok(registry)
}

fn vector_addition(elements: usize) -> Result<Measurement> {
    if !profile::render_node_present() {
        return Err(BenchError::EnvironmentUnavailable(
            "no accelerator render node found under /dev/dri".to_string(),
        ));
    }

    let mut rng = rand::thread_rng();
    let a: Vec<f32> = (0..elements).map(|_| rng.gen()).collect();
    let b: Vec<f32> = (0..elements).map(|_| rng.gen()).collect();

    let (measurement, sum) = Measurement::capture(format!("{} elements", elements), || {
        let c: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
        c.iter().sum::<f32>()
    });
    black_box(sum);
    Ok(measurement)
}

/// Flat-buffer f32 matrix multiply, the host-side reference the accelerator
/// result is compared against.
fn matrix_multiplication_cpu(size: usize) -> Result<Measurement> {
    let mut rng = rand::thread_rng();
    let a: Vec<f32> = (0..size * size).map(|_| rng.gen()).collect();
    let b: Vec<f32> = (0..size * size).map(|_| rng.gen()).collect();

    let (measurement, product) =
        Measurement::capture(format!("matrix_size={}x{}", size, size), || {
            let mut c = vec![0.0f32; size * size];
            for i in 0..size {
                for k in 0..size {
                    let aik = a[i * size + k];
                    for j in 0..size {
                        c[i * size + j] += aik * b[k * size + j];
                    }
                }
            }
            c
        });
    black_box(product.len());
    Ok(measurement)
}

fn cpu_computation(limit: u64) -> Result<Measurement> {
    let (measurement, sum) = Measurement::capture(
        format!("sum 0 to {}", limit.saturating_sub(1)),
        || (0..limit).sum::<u64>(),
    );
    black_box(sum);
    Ok(measurement)
}
