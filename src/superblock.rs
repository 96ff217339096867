use log::info;

use crate::bitmap::{initial_fbv, mark, write_fbv};
use crate::block_dev::read;
use crate::config::*;
use crate::error::{FsError, Result};
use crate::inode::write_inode;
use crate::{BlockDevice, Inode, SuperBlock};

pub fn read_superblock(device: &impl BlockDevice) -> Result<SuperBlock> {
    let superblock = SuperBlock::decode(&*read(device, SUPERBLOCK_ID)?);

    // Only a consistency check, nothing else in the layout is negotiable.
    if superblock.magic != MAGIC {
        return Err(FsError::InvalidMagic(superblock.magic));
    }
    if superblock.num_blocks as usize != TOTAL_BLOCKS || superblock.num_inodes as usize != MAX_INODES {
        return Err(FsError::Corrupted("superblock geometry does not match the layout"));
    }
    Ok(superblock)
}

pub fn write_superblock(device: &impl BlockDevice, superblock: &SuperBlock) -> Result<()> {
    device.write_block(SUPERBLOCK_ID, &superblock.encode())
}

/// Lays out an empty file system: zeroed medium, superblock, free block
/// vector and the root directory at inode 1 / block 10.
pub fn format_fs(device: &impl BlockDevice) -> Result<SuperBlock> {
    if device.num_blocks() < TOTAL_BLOCKS {
        return Err(FsError::InvalidBlockId(TOTAL_BLOCKS - 1));
    }
    device.format()?;

    let superblock = SuperBlock::new();
    write_superblock(device, &superblock)?;
    write_fbv(device, &initial_fbv())?;

    // Block 10 is already zeroed, marking it is enough.
    write_inode(device, ROOT_INODE_ID, &Inode::directory(ROOT_BLOCK_ID))?;
    mark(device, ROOT_BLOCK_ID as usize)?;
    device.flush()?;

    info!("formatted {} blocks, {} inodes", superblock.num_blocks, superblock.num_inodes);
    Ok(superblock)
}
