//! Single-slot undo log.
//!
//! Before a mutation touches anything, `begin` saves the parent directory
//! entry, the target inode record and the free block vector. `commit` lowers
//! the working flag; `recover` finds the flag still raised after a crash and
//! writes the saved state back. Only one operation is ever tracked.

use log::{debug, info};

use crate::bitmap::{read_fbv, write_fbv};
use crate::block_dev::read;
use crate::config::*;
use crate::directory::{dir_lookup, find_free_entry, read_raw_entry, write_raw_entry};
use crate::error::{FsError, Result};
use crate::inode::{find_free_slot, read_raw_inode, write_raw_inode};
use crate::path::{file_name, resolve_parent};
use crate::{BlockDevice, Inode, SafetySnapshot};

pub fn read_snapshot(device: &impl BlockDevice) -> Result<SafetySnapshot> {
    Ok(SafetySnapshot::decode(&*read(device, SNAPSHOT_BLOCK_ID)?))
}

fn set_working(device: &impl BlockDevice, working: bool) -> Result<()> {
    let mut buf = read(device, SNAPSHOT_BLOCK_ID)?;
    buf[0] = working as u8;
    device.write_block(SNAPSHOT_BLOCK_ID, &buf)?;
    device.flush()
}

/// Records the pre-state of a mutation on `path`.
///
/// If the final component already has an entry, that slot and its inode are
/// saved. Otherwise the first free slot is saved along with the inode slot
/// the operation is going to claim. Fails with `DirectoryFull` before
/// writing anything when a new entry would not fit.
pub fn begin(device: &impl BlockDevice, path: &str) -> Result<SafetySnapshot> {
    let name = file_name(path)?;
    let parent_block = resolve_parent(device, path)?;

    let (slot, inode_id) = match dir_lookup(device, parent_block, name)? {
        Some((slot, entry)) => (slot, entry.inode_id),
        None => {
            let slot = find_free_entry(device, parent_block)?.ok_or(FsError::DirectoryFull(parent_block))?;
            (slot, find_free_slot(device)?.unwrap_or(0))
        }
    };
    let saved_inode = if inode_id == 0 {
        Inode::FREE
    } else {
        read_raw_inode(device, inode_id)?
    };
    let snapshot = SafetySnapshot {
        working: true,
        parent_block,
        slot,
        inode_id,
        saved_entry: read_raw_entry(device, parent_block, slot)?,
        saved_inode,
    };

    // The backup must be in place before the raised flag can send recovery to it.
    let fbv = read_fbv(device)?;
    device.write_block(FBV_BACKUP_BLOCK_ID, &fbv)?;
    device.write_block(SNAPSHOT_BLOCK_ID, &snapshot.encode())?;
    device.flush()?;

    debug!(
        "[journal] begin '{path}': block {parent_block} slot {slot} inode {inode_id}"
    );
    Ok(snapshot)
}

/// Lowers the working flag. Last step of every successful mutation.
pub fn commit(device: &impl BlockDevice) -> Result<()> {
    set_working(device, false)?;
    debug!("[journal] commit");
    Ok(())
}

/// Rolls back an uncommitted mutation. Returns whether anything was restored.
/// A no-op when the working flag is down.
pub fn recover(device: &impl BlockDevice) -> Result<bool> {
    let snapshot = read_snapshot(device)?;
    if !snapshot.working {
        return Ok(false);
    }

    write_raw_entry(device, snapshot.parent_block, snapshot.slot, &snapshot.saved_entry)?;
    if snapshot.inode_id != 0 {
        write_raw_inode(device, snapshot.inode_id, &snapshot.saved_inode)?;
    }
    let backup = read(device, FBV_BACKUP_BLOCK_ID)?;
    write_fbv(device, &backup)?;
    device.flush()?;

    // Lowered last, an interrupted recovery simply runs again.
    set_working(device, false)?;
    info!(
        "rolled back uncommitted operation on block {} slot {} inode {}",
        snapshot.parent_block, snapshot.slot, snapshot.inode_id
    );
    Ok(true)
}

/// Raises the working flag again, leaving the last snapshot pending as if
/// the process had died before `commit`.
pub(crate) fn reopen(device: &impl BlockDevice) -> Result<()> {
    set_working(device, true)
}
