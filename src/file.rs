//! File operations composed from the allocator, inode table and resolver.
//! None of these bracket themselves with the journal; `FileSystem` does.

use log::debug;

use crate::bitmap::{alloc_block, find_free_block, mark, unmark};
use crate::config::*;
use crate::directory::{dir_add_entry, dir_rm_entry, read_dir};
use crate::error::{FsError, Result};
use crate::inode::{find_free_slot, free_inode, get_inode, write_inode};
use crate::path::{file_name, locate, resolve_inode, resolve_parent};
use crate::{BlockDevice, DirEntry, FileType, Inode};

/// Creates a directory at `path` and returns its inode id.
pub fn make_directory(device: &impl BlockDevice, path: &str) -> Result<u8> {
    let name = file_name(path)?;
    let parent_block = resolve_parent(device, path)?;

    let inode_id = find_free_slot(device)?.ok_or(FsError::AllocationExhausted("inodes"))?;
    let block_id = find_free_block(device)?.ok_or(FsError::AllocationExhausted("blocks"))?;

    dir_add_entry(device, parent_block, &DirEntry::new(inode_id, name)?)?;
    write_inode(device, inode_id, &Inode::directory(block_id))?;
    device.write_block(block_id as usize, &[0u8; BLOCK_SIZE])?;
    mark(device, block_id as usize)?;

    debug!("[file] mkdir '{path}': parent block {parent_block}, inode {inode_id}, block {block_id}");
    Ok(inode_id)
}

/// Creates a data file holding `data` and returns its inode id.
/// Blocks are claimed lowest index first; the last one is zero-padded.
pub fn make_data_file(device: &impl BlockDevice, path: &str, data: &[u8]) -> Result<u8> {
    if data.is_empty() {
        return Err(FsError::EmptyFile);
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(FsError::FileTooLarge(data.len()));
    }
    let name = file_name(path)?;
    let parent_block = resolve_parent(device, path)?;

    let inode_id = find_free_slot(device)?.ok_or(FsError::AllocationExhausted("inodes"))?;
    let blocks = data
        .chunks(BLOCK_SIZE)
        .map(|_| alloc_block(device))
        .collect::<Result<Vec<u16>>>()?;

    write_inode(device, inode_id, &Inode::data_file(data.len(), blocks.clone()))?;
    dir_add_entry(device, parent_block, &DirEntry::new(inode_id, name)?)?;

    for (chunk, &block_id) in data.chunks(BLOCK_SIZE).zip(&blocks) {
        let mut buf = [0u8; BLOCK_SIZE];
        buf[..chunk.len()].copy_from_slice(chunk);
        device.write_block(block_id as usize, &buf)?;
    }

    debug!("[file] create '{path}': inode {inode_id}, {} bytes in blocks {blocks:?}", data.len());
    Ok(inode_id)
}

/// Reads the whole content of the data file at `path`.
pub fn read_file(device: &impl BlockDevice, path: &str) -> Result<Vec<u8>> {
    let inode = get_inode(device, resolve_inode(device, path)?)?;
    if inode.ftype != FileType::DataFile {
        return Err(FsError::NotADataFile(path.to_string()));
    }

    let size = inode.size as usize;
    let mut data = Vec::with_capacity(inode.blocks.len() * BLOCK_SIZE);
    let mut buf = [0u8; BLOCK_SIZE];
    for &block_id in &inode.blocks {
        device.read_block(block_id as usize, &mut buf)?;
        data.extend_from_slice(&buf);
    }
    data.truncate(size);
    Ok(data)
}

/// Deletes the data file or empty directory at `path`: its blocks, its
/// inode and its entry in the parent. Directories are emptied one entry at a
/// time by the caller, so that every step fits in a single snapshot.
pub fn delete(device: &impl BlockDevice, path: &str) -> Result<()> {
    let location = locate(device, path)?;
    let inode = get_inode(device, location.inode_id)?;
    if inode.is_dir() && !read_dir(device, inode.dir_block()?)?.is_empty() {
        return Err(FsError::NotEmpty(path.to_string()));
    }

    let mut blocks = inode.blocks.clone();
    blocks.sort_unstable();
    blocks.dedup();
    for &block_id in &blocks {
        unmark(device, block_id as usize)?;
    }
    free_inode(device, location.inode_id)?;
    dir_rm_entry(device, location.parent_block, location.inode_id)?;

    debug!("[file] delete '{path}': inode {}, blocks {blocks:?}", location.inode_id);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bitmap::is_free;
    use crate::superblock::format_fs;
    use crate::RamDisk;

    #[test]
    fn test_delete_refuses_populated_directory() {
        let rd = RamDisk::default();
        format_fs(&rd).unwrap();
        make_directory(&rd, "/d").unwrap();
        let file_id = make_data_file(&rd, "/d/f", &[1u8; 600]).unwrap();

        assert!(matches!(delete(&rd, "/d"), Err(FsError::NotEmpty(_))));
        assert_eq!(read_file(&rd, "/d/f").unwrap(), vec![1u8; 600]);

        delete(&rd, "/d/f").unwrap();
        assert!(get_inode(&rd, file_id).is_err());
        assert!(is_free(&rd, 12).unwrap());
        assert!(is_free(&rd, 13).unwrap());
        delete(&rd, "/d").unwrap();
        assert!(is_free(&rd, 11).unwrap());
        assert!(matches!(resolve_inode(&rd, "/d"), Err(FsError::FileNotFound(_))));
    }
}
