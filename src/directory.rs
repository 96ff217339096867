//! Entry operations on a directory block. Every directory owns exactly one
//! block of 16 entry slots.

use log::debug;

use crate::block_dev::read;
use crate::config::*;
use crate::error::{FsError, Result};
use crate::{BlockDevice, DirEntry};

fn entry_at(buf: &[u8; BLOCK_SIZE], slot: usize) -> DirEntry {
    let mut raw = [0u8; DIR_ENTRY_SIZE];
    raw.copy_from_slice(&buf[slot * DIR_ENTRY_SIZE..(slot + 1) * DIR_ENTRY_SIZE]);
    DirEntry::decode(&raw)
}

/// All 16 slots of a directory block, free ones included.
pub fn read_slots(device: &impl BlockDevice, dir_block: u16) -> Result<Vec<DirEntry>> {
    let buf = read(device, dir_block as usize)?;
    Ok((0..NUM_ENTRY_PER_BLOCK).map(|slot| entry_at(&buf, slot)).collect())
}

/// The live entries of a directory block, in slot order.
pub fn read_dir(device: &impl BlockDevice, dir_block: u16) -> Result<Vec<DirEntry>> {
    Ok(read_slots(device, dir_block)?
        .into_iter()
        .filter(|entry| !entry.is_free())
        .collect())
}

/// Query an entry by name. Returns its slot and the entry itself.
pub fn dir_lookup(device: &impl BlockDevice, dir_block: u16, name: &str) -> Result<Option<(u8, DirEntry)>> {
    let found = read_slots(device, dir_block)?
        .into_iter()
        .enumerate()
        .find(|(_, entry)| !entry.is_free() && entry.name_eq(name))
        .map(|(slot, entry)| (slot as u8, entry));
    Ok(found)
}

/// First free slot of a directory block.
pub fn find_free_entry(device: &impl BlockDevice, dir_block: u16) -> Result<Option<u8>> {
    Ok(read_slots(device, dir_block)?
        .iter()
        .position(DirEntry::is_free)
        .map(|slot| slot as u8))
}

pub fn read_raw_entry(device: &impl BlockDevice, dir_block: u16, slot: u8) -> Result<[u8; DIR_ENTRY_SIZE]> {
    let buf = read(device, dir_block as usize)?;
    Ok(entry_at(&buf, slot as usize).encode())
}

pub fn write_raw_entry(
    device: &impl BlockDevice,
    dir_block: u16,
    slot: u8,
    raw: &[u8; DIR_ENTRY_SIZE],
) -> Result<()> {
    let slot = slot as usize;
    if slot >= NUM_ENTRY_PER_BLOCK {
        return Err(FsError::Corrupted("directory slot out of range"));
    }
    let mut buf = read(device, dir_block as usize)?;
    buf[slot * DIR_ENTRY_SIZE..(slot + 1) * DIR_ENTRY_SIZE].copy_from_slice(raw);
    device.write_block(dir_block as usize, &buf)
}

/// Writes an entry into the first free slot of a directory block.
/// Does not check for duplicate names, callers do that before they start.
pub fn dir_add_entry(device: &impl BlockDevice, dir_block: u16, entry: &DirEntry) -> Result<u8> {
    let slot = find_free_entry(device, dir_block)?.ok_or(FsError::DirectoryFull(dir_block))?;
    write_raw_entry(device, dir_block, slot, &entry.encode())?;
    debug!(
        "[dir] added '{}' -> inode {} at block {dir_block} slot {slot}",
        entry.name_str(),
        entry.inode_id
    );
    Ok(slot)
}

/// Clears the entry naming `inode_id` and returns its slot.
/// The inode and its blocks are the caller's to reclaim.
pub fn dir_rm_entry(device: &impl BlockDevice, dir_block: u16, inode_id: u8) -> Result<u8> {
    let slot = read_slots(device, dir_block)?
        .iter()
        .position(|entry| entry.inode_id == inode_id)
        .ok_or(FsError::Corrupted("parent has no entry for the inode"))? as u8;
    write_raw_entry(device, dir_block, slot, &DirEntry::NULL.encode())?;
    debug!("[dir] removed inode {inode_id} from block {dir_block} slot {slot}");
    Ok(slot)
}
