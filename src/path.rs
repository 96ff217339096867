//! Path resolution. Paths are slash-delimited and always taken from the root;
//! empty components (`//`, leading or trailing `/`) are skipped.

use log::debug;

use crate::config::*;
use crate::directory::dir_lookup;
use crate::error::{FsError, Result};
use crate::inode::get_inode;
use crate::BlockDevice;

/// Splits a path into its components.
/// Fails with `InvalidPath` for the bare root and `PathTooDeep` past the depth limit.
pub fn split(path: &str) -> Result<Vec<&str>> {
    let components: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if components.is_empty() {
        return Err(FsError::InvalidPath(path.to_string()));
    }
    if components.len() > MAX_PATH_DEPTH {
        return Err(FsError::PathTooDeep {
            depth: components.len(),
            max: MAX_PATH_DEPTH,
        });
    }
    for name in &components {
        if name.contains('\0') {
            return Err(FsError::InvalidPath(path.to_string()));
        }
        if name.len() > MAX_FILE_NAME_LEN {
            return Err(FsError::NameTooLong(name.to_string()));
        }
    }
    Ok(components)
}

/// Where a path's final component lives, or would live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub parent_block: u16,
    pub slot: u8,
    pub inode_id: u8,
}

/// Walks every component but the last and returns the data block of the
/// directory that should hold the final one.
pub fn resolve_parent(device: &impl BlockDevice, path: &str) -> Result<u16> {
    let components = split(path)?;
    let mut parent_block = ROOT_BLOCK_ID;

    for component in &components[..components.len() - 1] {
        let (_, entry) = dir_lookup(device, parent_block, component)?
            .ok_or_else(|| FsError::PathNotFound(component.to_string()))?;
        let inode = get_inode(device, entry.inode_id)?;
        if !inode.is_dir() {
            return Err(FsError::NotADirectory(component.to_string()));
        }
        parent_block = inode.dir_block()?;
    }

    debug!("[path] parent of '{path}' is block {parent_block}");
    Ok(parent_block)
}

/// Resolves a path to the slot and inode of its final component.
pub fn locate(device: &impl BlockDevice, path: &str) -> Result<Location> {
    let components = split(path)?;
    let name = components[components.len() - 1];
    let parent_block = resolve_parent(device, path)?;
    let (slot, entry) = dir_lookup(device, parent_block, name)?
        .ok_or_else(|| FsError::FileNotFound(name.to_string()))?;
    Ok(Location {
        parent_block,
        slot,
        inode_id: entry.inode_id,
    })
}

/// Resolves a path to its inode id.
pub fn resolve_inode(device: &impl BlockDevice, path: &str) -> Result<u8> {
    Ok(locate(device, path)?.inode_id)
}

/// Name of the final component.
pub fn file_name(path: &str) -> Result<&str> {
    let components = split(path)?;
    Ok(components[components.len() - 1])
}
