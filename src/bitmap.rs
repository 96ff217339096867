//! Free Block Vector management.
//! Block 1 holds one bit per block, most significant bit first: a set bit
//! marks a free block, a cleared bit an allocated one.

use log::debug;

use crate::block_dev::read;
use crate::config::*;
use crate::error::{FsError, Result};
use crate::BlockDevice;

fn locate_bit(block_id: usize) -> Result<(usize, u8)> {
    if block_id >= TOTAL_BLOCKS {
        return Err(FsError::InvalidBlockId(block_id));
    }
    Ok((block_id / 8, 0x80 >> (block_id % 8)))
}

pub fn read_fbv(device: &impl BlockDevice) -> Result<Box<[u8; BLOCK_SIZE]>> {
    read(device, FBV_BLOCK_ID)
}

pub fn write_fbv(device: &impl BlockDevice, fbv: &[u8; BLOCK_SIZE]) -> Result<()> {
    device.write_block(FBV_BLOCK_ID, fbv)
}

/// Bitmap for a freshly formatted disk: the reserved blocks are taken,
/// everything else is free.
pub fn initial_fbv() -> [u8; BLOCK_SIZE] {
    let mut fbv = [0xffu8; BLOCK_SIZE];
    for block_id in 0..NUM_RESERVED_BLOCKS {
        fbv[block_id / 8] &= !(0x80 >> (block_id % 8));
    }
    fbv
}

/// Returns the lowest-indexed free block, or `None` if the disk is full.
pub fn find_free_block(device: &impl BlockDevice) -> Result<Option<u16>> {
    let fbv = read_fbv(device)?;
    let found = fbv
        .iter()
        .enumerate()
        .find(|(_, byte)| **byte != 0)
        .map(|(i, byte)| (i * 8 + byte.leading_zeros() as usize) as u16);
    Ok(found)
}

pub fn is_free(device: &impl BlockDevice, block_id: usize) -> Result<bool> {
    let (byte, mask) = locate_bit(block_id)?;
    Ok(read_fbv(device)?[byte] & mask != 0)
}

/// Marks a block as allocated.
pub fn mark(device: &impl BlockDevice, block_id: usize) -> Result<()> {
    let (byte, mask) = locate_bit(block_id)?;
    let mut fbv = read_fbv(device)?;
    fbv[byte] &= !mask;
    write_fbv(device, &fbv)?;
    debug!("[fbv] marked block {block_id}");
    Ok(())
}

/// Marks a block as free.
pub fn unmark(device: &impl BlockDevice, block_id: usize) -> Result<()> {
    let (byte, mask) = locate_bit(block_id)?;
    let mut fbv = read_fbv(device)?;
    fbv[byte] |= mask;
    write_fbv(device, &fbv)?;
    debug!("[fbv] released block {block_id}");
    Ok(())
}

/// Finds the lowest free block and marks it allocated.
pub fn alloc_block(device: &impl BlockDevice) -> Result<u16> {
    let block_id = find_free_block(device)?.ok_or(FsError::AllocationExhausted("blocks"))?;
    mark(device, block_id as usize)?;
    Ok(block_id)
}
