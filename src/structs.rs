//! On-disk records and their byte layouts. All integers are little-endian.

use crate::config::*;
use crate::error::{FsError, Result};

fn u16_at(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn u32_at(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

/// Block 0. Written once by format, checked by mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperBlock {
    pub magic: u32,
    pub num_blocks: u32,
    pub num_inodes: u32,
}

impl SuperBlock {
    pub fn new() -> Self {
        SuperBlock {
            magic: MAGIC,
            num_blocks: TOTAL_BLOCKS as u32,
            num_inodes: MAX_INODES as u32,
        }
    }

    pub fn encode(&self) -> [u8; BLOCK_SIZE] {
        let mut buf = [0u8; BLOCK_SIZE];
        buf[0..4].copy_from_slice(&self.magic.to_le_bytes());
        buf[4..8].copy_from_slice(&self.num_blocks.to_le_bytes());
        buf[8..12].copy_from_slice(&self.num_inodes.to_le_bytes());
        buf
    }

    pub fn decode(buf: &[u8; BLOCK_SIZE]) -> Self {
        SuperBlock {
            magic: u32_at(buf, 0),
            num_blocks: u32_at(buf, 4),
            num_inodes: u32_at(buf, 8),
        }
    }
}

impl Default for SuperBlock {
    fn default() -> Self {
        SuperBlock::new()
    }
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Directory = 0,
    DataFile = 1,
}

impl TryFrom<u32> for FileType {
    type Error = FsError;

    fn try_from(flag: u32) -> Result<Self> {
        match flag {
            0 => Ok(FileType::Directory),
            1 => Ok(FileType::DataFile),
            _ => Err(FsError::Corrupted("unknown inode type flag")),
        }
    }
}

/// One 32-byte inode record:
/// - size (4 bytes), for directories always BLOCK_SIZE
/// - type flag (4 bytes)
/// - 10 direct block pointers (2 bytes each), unused slots are 0
/// - number of pointers in use (2 bytes)
/// - reserved (2 bytes)
///
/// A record whose size is 0 is a free slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
    pub ftype: FileType,
    pub size: u32,
    pub blocks: Vec<u16>,
}

impl Inode {
    pub const FREE: [u8; INODE_SIZE] = [0; INODE_SIZE];

    pub fn directory(block_id: u16) -> Self {
        Inode {
            ftype: FileType::Directory,
            size: BLOCK_SIZE as u32,
            blocks: vec![block_id],
        }
    }

    pub fn data_file(size: usize, blocks: Vec<u16>) -> Self {
        Inode {
            ftype: FileType::DataFile,
            size: size as u32,
            blocks,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.ftype == FileType::Directory
    }

    /// The block holding a directory's entries.
    pub fn dir_block(&self) -> Result<u16> {
        self.blocks
            .first()
            .copied()
            .ok_or(FsError::Corrupted("directory without a data block"))
    }

    pub fn encode(&self) -> [u8; INODE_SIZE] {
        let mut raw = [0u8; INODE_SIZE];
        raw[0..4].copy_from_slice(&self.size.to_le_bytes());
        raw[4..8].copy_from_slice(&(self.ftype as u32).to_le_bytes());
        for (i, block_id) in self.blocks.iter().take(NUM_DIRECT_PTRS).enumerate() {
            raw[8 + i * 2..10 + i * 2].copy_from_slice(&block_id.to_le_bytes());
        }
        raw[28..30].copy_from_slice(&(self.blocks.len() as u16).to_le_bytes());
        raw
    }

    /// Decodes a record, `None` for a free slot.
    pub fn decode(raw: &[u8; INODE_SIZE]) -> Result<Option<Self>> {
        let size = u32_at(raw, 0);
        if size == 0 {
            return Ok(None);
        }
        let ftype = FileType::try_from(u32_at(raw, 4))?;
        let count = u16_at(raw, 28) as usize;
        if count == 0 || count > NUM_DIRECT_PTRS {
            return Err(FsError::Corrupted("inode block count out of range"));
        }
        if ftype == FileType::DataFile && count != blocks_for(size as usize) {
            return Err(FsError::Corrupted("inode block count disagrees with its size"));
        }
        let blocks = (0..count).map(|i| u16_at(raw, 8 + i * 2)).collect();
        Ok(Some(Inode { ftype, size, blocks }))
    }
}

/// Number of blocks needed for `len` bytes of file data.
pub fn blocks_for(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE)
}

/// A 32-byte directory entry: child inode id, then a null-terminated name.
/// An entry with inode id 0 is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    pub inode_id: u8,
    pub name: [u8; NAME_FIELD_LEN],
}

impl DirEntry {
    pub const NULL: Self = Self {
        inode_id: 0,
        name: [0; NAME_FIELD_LEN],
    };

    pub fn new(inode_id: u8, name: &str) -> Result<Self> {
        if name.is_empty() || name.contains(['\0', '/']) {
            return Err(FsError::InvalidPath(name.to_string()));
        }
        if name.len() > MAX_FILE_NAME_LEN {
            return Err(FsError::NameTooLong(name.to_string()));
        }
        let mut arr = [0; NAME_FIELD_LEN];
        arr[..name.len()].copy_from_slice(name.as_bytes());
        Ok(Self { inode_id, name: arr })
    }

    pub fn is_free(&self) -> bool {
        self.inode_id == 0
    }

    /// Name bytes up to the terminating null.
    pub fn name_bytes(&self) -> &[u8] {
        let end = self.name.iter().position(|&c| c == 0).unwrap_or(NAME_FIELD_LEN);
        &self.name[..end]
    }

    pub fn name_str(&self) -> String {
        String::from_utf8_lossy(self.name_bytes()).into_owned()
    }

    pub fn name_eq(&self, name: &str) -> bool {
        self.name_bytes() == name.as_bytes()
    }

    pub fn encode(&self) -> [u8; DIR_ENTRY_SIZE] {
        let mut raw = [0u8; DIR_ENTRY_SIZE];
        raw[0] = self.inode_id;
        raw[1..].copy_from_slice(&self.name);
        raw
    }

    pub fn decode(raw: &[u8; DIR_ENTRY_SIZE]) -> Self {
        let mut name = [0; NAME_FIELD_LEN];
        name.copy_from_slice(&raw[1..]);
        DirEntry {
            inode_id: raw[0],
            name,
        }
    }
}

/// Block 2, the single in-flight undo record.
///
/// Byte 0 holds the working flag, bytes 1..3 the parent block, byte 3 the
/// entry slot and byte 4 the inode id. The saved entry sits at 32..64 and the
/// saved inode record at 64..96.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetySnapshot {
    pub working: bool,
    pub parent_block: u16,
    pub slot: u8,
    pub inode_id: u8,
    pub saved_entry: [u8; DIR_ENTRY_SIZE],
    pub saved_inode: [u8; INODE_SIZE],
}

impl SafetySnapshot {
    pub fn encode(&self) -> [u8; BLOCK_SIZE] {
        let mut buf = [0u8; BLOCK_SIZE];
        buf[0] = self.working as u8;
        buf[1..3].copy_from_slice(&self.parent_block.to_le_bytes());
        buf[3] = self.slot;
        buf[4] = self.inode_id;
        buf[32..64].copy_from_slice(&self.saved_entry);
        buf[64..96].copy_from_slice(&self.saved_inode);
        buf
    }

    pub fn decode(buf: &[u8; BLOCK_SIZE]) -> Self {
        let mut saved_entry = [0u8; DIR_ENTRY_SIZE];
        saved_entry.copy_from_slice(&buf[32..64]);
        let mut saved_inode = [0u8; INODE_SIZE];
        saved_inode.copy_from_slice(&buf[64..96]);
        SafetySnapshot {
            working: buf[0] != 0,
            parent_block: u16_at(buf, 1),
            slot: buf[3],
            inode_id: buf[4],
            saved_entry,
            saved_inode,
        }
    }
}
