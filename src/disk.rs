//! Concrete media: an in-memory disk and a disk image file.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::{BLOCK_SIZE, TOTAL_BLOCKS};
use crate::error::{FsError, Result};
use crate::BlockDevice;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Poisoning leaves the bytes intact.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory disk. Clones share the same storage, so a clone outlives a
/// dropped `FileSystem` the way a real disk outlives a crashed process.
#[derive(Debug, Clone)]
pub struct RamDisk {
    inner: Arc<Mutex<Vec<u8>>>,
    num_blocks: usize,
}

impl RamDisk {
    /// Creates a new RamDisk with the specified number of blocks.
    pub fn new(num_blocks: usize) -> Self {
        RamDisk {
            inner: Arc::new(Mutex::new(vec![0u8; num_blocks * BLOCK_SIZE])),
            num_blocks,
        }
    }

    /// A copy of the whole medium, for comparing states in tests.
    pub fn snapshot(&self) -> Vec<u8> {
        lock(&self.inner).clone()
    }
}

impl Default for RamDisk {
    fn default() -> Self {
        RamDisk::new(TOTAL_BLOCKS)
    }
}

impl BlockDevice for RamDisk {
    fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8; BLOCK_SIZE]) -> Result<()> {
        if block_id >= self.num_blocks {
            return Err(FsError::InvalidBlockId(block_id));
        }
        let start = block_id * BLOCK_SIZE;
        buf.copy_from_slice(&lock(&self.inner)[start..start + BLOCK_SIZE]);
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8; BLOCK_SIZE]) -> Result<()> {
        if block_id >= self.num_blocks {
            return Err(FsError::InvalidBlockId(block_id));
        }
        let start = block_id * BLOCK_SIZE;
        lock(&self.inner)[start..start + BLOCK_SIZE].copy_from_slice(buf);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn format(&self) -> Result<()> {
        lock(&self.inner).fill(0);
        Ok(())
    }
}

/// A disk image file of `num_blocks * BLOCK_SIZE` bytes.
#[derive(Debug)]
pub struct FileDisk {
    inner: Mutex<File>,
    num_blocks: usize,
}

impl FileDisk {
    /// Creates (or truncates) an image at `path` and zero-fills it.
    pub fn create(path: impl AsRef<Path>, num_blocks: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len((num_blocks * BLOCK_SIZE) as u64)?;
        Ok(FileDisk {
            inner: Mutex::new(file),
            num_blocks,
        })
    }

    /// Opens an existing image, which must be exactly `TOTAL_BLOCKS` blocks
    /// long.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let len = file.metadata()?.len() as usize;
        if len != TOTAL_BLOCKS * BLOCK_SIZE {
            return Err(std::io::Error::new(
                ErrorKind::InvalidData,
                format!("image length {len}, expected {} bytes", TOTAL_BLOCKS * BLOCK_SIZE),
            )
            .into());
        }
        Ok(FileDisk {
            inner: Mutex::new(file),
            num_blocks: TOTAL_BLOCKS,
        })
    }
}

impl BlockDevice for FileDisk {
    fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8; BLOCK_SIZE]) -> Result<()> {
        if block_id >= self.num_blocks {
            return Err(FsError::InvalidBlockId(block_id));
        }
        let mut file = lock(&self.inner);
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8; BLOCK_SIZE]) -> Result<()> {
        if block_id >= self.num_blocks {
            return Err(FsError::InvalidBlockId(block_id));
        }
        let mut file = lock(&self.inner);
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))?;
        file.write_all(buf)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut file = lock(&self.inner);
        file.flush()?;
        file.sync_data()?;
        Ok(())
    }
}
