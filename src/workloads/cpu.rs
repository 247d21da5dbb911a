use std::hint::black_box;
use std::io::Write;
use std::time::Instant;

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::{Rng, RngCore};
use rayon::prelude::*;
use sha2::{Digest, Sha256};

use crate::core::config::BenchConfig;
use crate::core::error::{BenchError, Result};
use crate::core::outcome::{Category, Measurement};
use crate::core::registry::SuiteRegistry;

/// The CPU suite: prime search, hashing, encryption, compression, numeric
/// kernels, and a multi-threaded prime search.
pub fn suite() -> Result<SuiteRegistry> {
    let mut registry = SuiteRegistry::new(Category::Cpu);

    registry.register("Prime Number Calculation (Brute-Force)", |cfg: &BenchConfig| {
        prime_brute_force(cfg.prime_limit)
    })?;
    registry.register(
        "Prime Number Calculation (Sieve of Eratosthenes)",
        |cfg: &BenchConfig| sieve_of_eratosthenes(cfg.prime_limit),
    )?;
    registry.register("SHA256 Hashing", |cfg: &BenchConfig| {
        sha256_hashing(cfg.hash_iterations)
    })?;
    registry.register("AES Encryption", |cfg: &BenchConfig| {
        aes_encryption(cfg.cipher_iterations)
    })?;
    registry.register("GZIP Compression", |cfg: &BenchConfig| {
        gzip_compression(cfg.compress_size_bytes)
    })?;
    registry.register("Matrix Multiplication", |cfg: &BenchConfig| {
        matrix_multiplication(cfg.matrix_size)
    })?;
    registry.register("Sorting Algorithm", |cfg: &BenchConfig| {
        sorting(cfg.sort_count)
    })?;
    registry.register("Multi-threaded Prime Calculation", |cfg: &BenchConfig| {
        multi_threaded_primes(cfg.mt_prime_limit, cfg.worker_threads)
    })?;

    Ok(registry)
}

pub(crate) fn is_prime(n: u32) -> bool {
    if n < 2 {
        return false;
    }
    let mut i = 2;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

fn prime_brute_force(limit: u32) -> Result<Measurement> {
    let (measurement, count) = Measurement::capture(format!("n={}", limit), || {
        (2..limit).filter(|&n| is_prime(n)).count()
    });
    black_box(count);
    Ok(measurement)
}

pub(crate) fn sieve(limit: usize) -> Vec<usize> {
    let mut is_composite = vec![false; limit + 1];
    let mut p = 2;
    while p * p <= limit {
        if !is_composite[p] {
            let mut multiple = p * p;
            while multiple <= limit {
                is_composite[multiple] = true;
                multiple += p;
            }
        }
        p += 1;
    }
    (2..limit).filter(|&n| !is_composite[n]).collect()
}

fn sieve_of_eratosthenes(limit: u32) -> Result<Measurement> {
    let (measurement, primes) =
        Measurement::capture(format!("n={}", limit), || sieve(limit as usize));
    black_box(primes.len());
    Ok(measurement)
}

fn sha256_hashing(iterations: u32) -> Result<Measurement> {
    let (measurement, last) = Measurement::capture(format!("iterations={}", iterations), || {
        let mut last = [0u8; 32];
        for _ in 0..iterations {
            last = Sha256::digest(b"benchmark").into();
        }
        last
    });
    black_box(last);
    Ok(measurement)
}

fn aes_encryption(iterations: u32) -> Result<Measurement> {
    let mut rng = rand::thread_rng();
    let key: [u8; 16] = rng.gen();
    let data: [u8; 16] = rng.gen();

    let cipher = Aes128::new(GenericArray::from_slice(&key));
    let mut block = *GenericArray::from_slice(&data);

    let (measurement, _) = Measurement::capture(format!("iterations={}", iterations), || {
        for _ in 0..iterations {
            cipher.encrypt_block(&mut block);
        }
    });
    black_box(block);
    Ok(measurement)
}

fn gzip_compression(size: usize) -> Result<Measurement> {
    let mut data = Vec::new();
    data.try_reserve_exact(size).map_err(|_| {
        BenchError::ResourceExhaustion(format!("cannot allocate {} bytes to compress", size))
    })?;
    data.resize(size, 0);
    rand::thread_rng().fill_bytes(&mut data);

    let start = Instant::now();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&data)?;
    let compressed = encoder.finish()?;
    let duration = start.elapsed();

    black_box(compressed.len());
    Ok(Measurement::new(duration, format!("size={} bytes", size)))
}

fn matrix_multiplication(size: usize) -> Result<Measurement> {
    let mut rng = rand::thread_rng();
    let a: Vec<Vec<f64>> = (0..size)
        .map(|_| (0..size).map(|_| rng.gen::<f64>()).collect())
        .collect();
    let b: Vec<Vec<f64>> = (0..size)
        .map(|_| (0..size).map(|_| rng.gen::<f64>()).collect())
        .collect();

    let (measurement, product) =
        Measurement::capture(format!("matrix_size={}x{}", size, size), || {
            let mut c = vec![vec![0.0f64; size]; size];
            for i in 0..size {
                for k in 0..size {
                    let aik = a[i][k];
                    for j in 0..size {
                        c[i][j] += aik * b[k][j];
                    }
                }
            }
            c
        });
    black_box(product.len());
    Ok(measurement)
}

fn sorting(count: usize) -> Result<Measurement> {
    let mut rng = rand::thread_rng();
    let mut data: Vec<f64> = (0..count).map(|_| rng.gen::<f64>()).collect();

    let (measurement, _) = Measurement::capture(format!("n={}", count), || {
        data.sort_unstable_by(f64::total_cmp);
    });
    black_box(data.first().copied());
    Ok(measurement)
}

/// Splits the prime search across a private worker pool. The pool joins
/// before the measurement is returned; no work outlives the unit.
fn multi_threaded_primes(limit: u32, threads: usize) -> Result<Measurement> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .map_err(|e| BenchError::Configuration(format!("cannot build worker pool: {}", e)))?;

    let (measurement, count) = Measurement::capture(
        format!("n={}, threads={}", limit, threads),
        || pool.install(|| (2..limit).into_par_iter().filter(|&n| is_prime(n)).count()),
    );
    black_box(count);
    Ok(measurement)
}
