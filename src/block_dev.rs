use crate::config::BLOCK_SIZE;
use crate::error::Result;

/// The medium underneath the file system. Every call goes straight to the
/// device, nothing above this trait keeps blocks in memory.
pub trait BlockDevice {
    /// Returns the number of blocks in the block device.
    fn num_blocks(&self) -> usize;

    /// Reads a block of data from the block device.
    /// Ids outside `[0, num_blocks)` fail with `InvalidBlockId`.
    fn read_block(&self, block_id: usize, buf: &mut [u8; BLOCK_SIZE]) -> Result<()>;

    /// Writes a block of data to the block device.
    fn write_block(&self, block_id: usize, buf: &[u8; BLOCK_SIZE]) -> Result<()>;

    /// Flushes any buffered data to the medium.
    fn flush(&self) -> Result<()>;

    /// Zero-fills the entire device.
    fn format(&self) -> Result<()> {
        let zero = [0u8; BLOCK_SIZE];
        for block_id in 0..self.num_blocks() {
            self.write_block(block_id, &zero)?;
        }
        self.flush()
    }
}

/// Reads a block into a fresh buffer.
pub(crate) fn read(device: &impl BlockDevice, block_id: usize) -> Result<Box<[u8; BLOCK_SIZE]>> {
    let mut buf = Box::new([0u8; BLOCK_SIZE]);
    device.read_block(block_id, &mut buf)?;
    Ok(buf)
}
