use std::fs::{self, File, OpenOptions};
use std::hint::black_box;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use rand::{Rng, RngCore};

use crate::core::config::BenchConfig;
use crate::core::error::{BenchError, Result};
use crate::core::outcome::{Category, Measurement};
use crate::core::registry::SuiteRegistry;

const MIB: usize = 1024 * 1024;

/// The storage suite: sequential and random file I/O, small-file IOPS,
/// deletion throughput, and filesystem metadata latency. Every unit works on
/// its own uniquely named scratch path and cleans up on all exits.
pub fn suite() -> Result<SuiteRegistry> {
    let mut registry = SuiteRegistry::new(Category::Storage);

    registry.register("Sequential Write Speed", |cfg: &BenchConfig| {
        sequential_write(&cfg.scratch_dir, cfg.storage_file_mb)
    })?;
    registry.register("Sequential Read Speed", |cfg: &BenchConfig| {
        sequential_read(&cfg.scratch_dir, cfg.storage_file_mb)
    })?;
    registry.register("Random Read/Write Speed", |cfg: &BenchConfig| {
        random_read_write(
            &cfg.scratch_dir,
            cfg.random_io_block_size,
            cfg.random_io_iterations,
        )
    })?;
    registry.register("File IOPS Test", |cfg: &BenchConfig| {
        file_iops(&cfg.scratch_dir, cfg.iops_operations)
    })?;
    registry.register("File Deletion Performance", |cfg: &BenchConfig| {
        file_deletion(&cfg.scratch_dir, cfg.small_file_count)
    })?;
    registry.register("Filesystem Latency Test", |cfg: &BenchConfig| {
        filesystem_latency(&cfg.scratch_dir, cfg.small_file_count)
    })?;

    Ok(registry)
}

/// Scratch file removed when the guard leaves scope, error paths included.
struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    fn new(dir: &Path, name: &str) -> Self {
        Self {
            path: dir.join(name),
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Scratch directory removed recursively when the guard leaves scope.
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    fn create(dir: &Path, name: &str) -> Result<Self> {
        let path = dir.join(name);
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn random_chunk(len: usize) -> Result<Vec<u8>> {
    let mut chunk = Vec::new();
    chunk.try_reserve_exact(len).map_err(|_| {
        BenchError::ResourceExhaustion(format!("cannot allocate {} byte I/O buffer", len))
    })?;
    chunk.resize(len, 0);
    rand::thread_rng().fill_bytes(&mut chunk);
    Ok(chunk)
}

fn write_file_of(path: &Path, size_mb: usize) -> Result<()> {
    let chunk = random_chunk(MIB)?;
    let mut file = File::create(path)?;
    for _ in 0..size_mb {
        file.write_all(&chunk)?;
    }
    file.flush()?;
    Ok(())
}

fn sequential_write(scratch: &Path, size_mb: usize) -> Result<Measurement> {
    let guard = ScratchFile::new(scratch, "hostbench_seq_write.dat");
    let chunk = random_chunk(MIB)?;

    let start = Instant::now();
    let mut file = File::create(&guard.path)?;
    for _ in 0..size_mb {
        file.write_all(&chunk)?;
    }
    file.flush()?;
    let duration = start.elapsed();

    Ok(Measurement::new(duration, format!("size={}MB", size_mb)))
}

fn sequential_read(scratch: &Path, size_mb: usize) -> Result<Measurement> {
    let guard = ScratchFile::new(scratch, "hostbench_seq_read.dat");
    write_file_of(&guard.path, size_mb)?;

    let mut buffer = vec![0u8; MIB];
    let start = Instant::now();
    let mut file = File::open(&guard.path)?;
    let mut total = 0usize;
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        total += read;
    }
    let duration = start.elapsed();

    black_box(total);
    Ok(Measurement::new(duration, format!("size={}MB", size_mb)))
}

fn random_read_write(scratch: &Path, block_size: usize, iterations: usize) -> Result<Measurement> {
    let guard = ScratchFile::new(scratch, "hostbench_random_io.dat");
    let file_size = block_size * iterations.max(1);
    write_file_of(&guard.path, file_size.div_ceil(MIB).max(1))?;

    let block = random_chunk(block_size)?;
    let mut rng = rand::thread_rng();
    let span = file_size.saturating_sub(block_size).max(1) as u64;

    let start = Instant::now();
    let mut file = OpenOptions::new().read(true).write(true).open(&guard.path)?;
    for _ in 0..iterations {
        file.seek(SeekFrom::Start(rng.gen_range(0..span)))?;
        file.write_all(&block)?;
    }
    file.flush()?;
    let duration = start.elapsed();

    Ok(Measurement::new(
        duration,
        format!("block_size={}B, iterations={}", block_size, iterations),
    ))
}

fn file_iops(scratch: &Path, operations: usize) -> Result<Measurement> {
    let dir = ScratchDir::create(scratch, "hostbench_iops")?;

    let start = Instant::now();
    for i in 0..operations {
        let path = dir.path.join(format!("iops_{}.tmp", i));
        fs::write(&path, b"test")?;
        fs::remove_file(&path)?;
    }
    let duration = start.elapsed();

    Ok(Measurement::new(
        duration,
        format!("operations={}", operations),
    ))
}

fn file_deletion(scratch: &Path, count: usize) -> Result<Measurement> {
    let dir = ScratchDir::create(scratch, "hostbench_delete")?;
    for i in 0..count {
        fs::write(dir.path.join(format!("file_{}.tmp", i)), b"test")?;
    }

    let start = Instant::now();
    for i in 0..count {
        fs::remove_file(dir.path.join(format!("file_{}.tmp", i)))?;
    }
    let duration = start.elapsed();

    Ok(Measurement::new(duration, format!("num_files={}", count)))
}

/// Full create/read/delete cycle over many small files, all timed.
fn filesystem_latency(scratch: &Path, count: usize) -> Result<Measurement> {
    let dir = ScratchDir::create(scratch, "hostbench_latency")?;

    let start = Instant::now();
    for i in 0..count {
        fs::write(dir.path.join(format!("file_{}.tmp", i)), b"test")?;
    }
    let mut contents = String::new();
    for i in 0..count {
        contents.clear();
        File::open(dir.path.join(format!("file_{}.tmp", i)))?.read_to_string(&mut contents)?;
    }
    for i in 0..count {
        fs::remove_file(dir.path.join(format!("file_{}.tmp", i)))?;
    }
    let duration = start.elapsed();

    Ok(Measurement::new(duration, format!("num_files={}", count)))
}
