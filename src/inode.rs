//! The inode table, blocks 4..8. Slot `i` lives in block `4 + i / 16` at
//! offset `(i % 16) * 32`; slot 0 is never handed out.

use log::debug;

use crate::block_dev::read;
use crate::config::*;
use crate::error::{FsError, Result};
use crate::{BlockDevice, Inode};

fn locate(inode_id: u8) -> Result<(usize, usize)> {
    let id = inode_id as usize;
    if id == 0 || id >= MAX_INODES {
        return Err(FsError::Corrupted("inode id out of range"));
    }
    Ok((INODE_TABLE_START + id / INODES_PER_BLOCK, (id % INODES_PER_BLOCK) * INODE_SIZE))
}

/// Reads the raw 32 bytes of an inode slot.
pub fn read_raw_inode(device: &impl BlockDevice, inode_id: u8) -> Result<[u8; INODE_SIZE]> {
    let (block_id, offset) = locate(inode_id)?;
    let buf = read(device, block_id)?;
    let mut raw = [0u8; INODE_SIZE];
    raw.copy_from_slice(&buf[offset..offset + INODE_SIZE]);
    Ok(raw)
}

pub fn write_raw_inode(device: &impl BlockDevice, inode_id: u8, raw: &[u8; INODE_SIZE]) -> Result<()> {
    let (block_id, offset) = locate(inode_id)?;
    let mut buf = read(device, block_id)?;
    buf[offset..offset + INODE_SIZE].copy_from_slice(raw);
    device.write_block(block_id, &buf)
}

/// Reads an in-use inode. A free slot reads as `Corrupted`, since every
/// caller reaches the slot through a live directory entry.
pub fn get_inode(device: &impl BlockDevice, inode_id: u8) -> Result<Inode> {
    Inode::decode(&read_raw_inode(device, inode_id)?)?
        .ok_or(FsError::Corrupted("directory entry points at a free inode"))
}

pub fn write_inode(device: &impl BlockDevice, inode_id: u8, inode: &Inode) -> Result<()> {
    write_raw_inode(device, inode_id, &inode.encode())
}

/// Zeroes an inode record, returning the slot to the free pool.
pub fn free_inode(device: &impl BlockDevice, inode_id: u8) -> Result<()> {
    write_raw_inode(device, inode_id, &Inode::FREE)?;
    debug!("[inode] freed inode {inode_id}");
    Ok(())
}

/// Returns the lowest free slot, or `None` when all are in use.
pub fn find_free_slot(device: &impl BlockDevice) -> Result<Option<u8>> {
    for i in 0..INODE_TABLE_BLOCKS {
        let buf = read(device, INODE_TABLE_START + i)?;
        for j in 0..INODES_PER_BLOCK {
            let inode_id = i * INODES_PER_BLOCK + j;
            if inode_id == 0 {
                continue;
            }
            let offset = j * INODE_SIZE;
            if buf[offset..offset + 4] == [0; 4] {
                return Ok(Some(inode_id as u8));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::RamDisk;

    #[test]
    fn test_slot_placement() {
        assert_eq!(locate(1).unwrap(), (4, 32));
        assert_eq!(locate(15).unwrap(), (4, 480));
        assert_eq!(locate(16).unwrap(), (5, 0));
        assert_eq!(locate(63).unwrap(), (7, 480));
        assert!(locate(0).is_err());
        assert!(locate(64).is_err());
    }

    #[test]
    fn test_find_free_slot() {
        let rd = RamDisk::default();
        assert_eq!(find_free_slot(&rd).unwrap(), Some(1));
        write_inode(&rd, 1, &Inode::directory(10)).unwrap();
        write_inode(&rd, 2, &Inode::data_file(5, vec![11])).unwrap();
        assert_eq!(find_free_slot(&rd).unwrap(), Some(3));
        free_inode(&rd, 2).unwrap();
        assert_eq!(find_free_slot(&rd).unwrap(), Some(2));
    }

    #[test]
    fn test_table_full() {
        let rd = RamDisk::default();
        for id in 1..MAX_INODES as u8 {
            write_inode(&rd, id, &Inode::directory(10)).unwrap();
        }
        assert_eq!(find_free_slot(&rd).unwrap(), None);
    }

    #[test]
    fn test_neighbours_untouched() {
        let rd = RamDisk::default();
        let a = Inode::data_file(700, vec![20, 21]);
        let b = Inode::directory(30);
        write_inode(&rd, 16, &a).unwrap();
        write_inode(&rd, 17, &b).unwrap();
        assert_eq!(get_inode(&rd, 16).unwrap(), a);
        assert_eq!(get_inode(&rd, 17).unwrap(), b);
    }
}
