//! Common utilities for tests
#![allow(dead_code)]

use std::cell::Cell;
use std::io;

use llfs::{
    read_fbv, read_raw_inode, read_slots, BlockDevice, Error, Inode, RamDisk, Result, BLOCK_SIZE,
    MAX_INODES, NUM_RESERVED_BLOCKS, ROOT_BLOCK_ID, ROOT_INODE_ID, TOTAL_BLOCKS,
};

pub const ORANGE: &str = "\x1b[38;5;214m";
pub const RESET: &str = "\x1b[0m";

/// Provides a macro for logging messages during tests.
/// e.g. log!("placeholder") -> println!("[test] placeholder");
#[macro_export]
macro_rules! log {
    ($msg:expr $(, $($arg:tt)*)?) => {
        println!("{}[test] {}{}", crate::common::ORANGE, format!($msg $(, $($arg)*)?), crate::common::RESET)
    };
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A RamDisk that loses power after a fixed number of writes: every write
/// past the budget fails and changes nothing.
pub struct CrashDisk {
    inner: RamDisk,
    writes_left: Cell<usize>,
}

impl CrashDisk {
    pub fn new(inner: RamDisk, write_budget: usize) -> Self {
        CrashDisk {
            inner,
            writes_left: Cell::new(write_budget),
        }
    }

    pub fn crashed(&self) -> bool {
        self.writes_left.get() == 0
    }
}

impl BlockDevice for CrashDisk {
    fn num_blocks(&self) -> usize {
        self.inner.num_blocks()
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8; BLOCK_SIZE]) -> Result<()> {
        self.inner.read_block(block_id, buf)
    }

    fn write_block(&self, block_id: usize, buf: &[u8; BLOCK_SIZE]) -> Result<()> {
        let left = self.writes_left.get();
        if left == 0 {
            return Err(Error::Io(io::Error::new(io::ErrorKind::Other, "simulated power loss")));
        }
        self.writes_left.set(left - 1);
        self.inner.write_block(block_id, buf)
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Copy of one block of a RamDisk.
pub fn block(rd: &RamDisk, block_id: usize) -> Vec<u8> {
    rd.snapshot()[block_id * BLOCK_SIZE..(block_id + 1) * BLOCK_SIZE].to_vec()
}

/// The metadata an undo must restore exactly: the FBV, the inode table and
/// the given directory block.
pub fn metadata(rd: &RamDisk, dir_block: u16) -> Vec<Vec<u8>> {
    let mut blocks: Vec<Vec<u8>> = [1, 4, 5, 6, 7].iter().map(|&id| block(rd, id)).collect();
    blocks.push(block(rd, dir_block as usize));
    blocks
}

/// Walks the tree from the root and checks that it agrees with the inode
/// table and the FBV: every entry names an in-use inode, every in-use inode
/// has exactly one entry, and the used blocks are exactly the marked ones.
pub fn assert_consistent(rd: &RamDisk) {
    let mut referenced = vec![false; MAX_INODES];
    let mut used = vec![false; TOTAL_BLOCKS];
    used[..NUM_RESERVED_BLOCKS].fill(true);
    used[ROOT_BLOCK_ID as usize] = true;
    referenced[ROOT_INODE_ID as usize] = true;

    let mut pending = vec![ROOT_BLOCK_ID];
    while let Some(dir_block) = pending.pop() {
        for entry in read_slots(rd, dir_block).unwrap().into_iter().filter(|e| !e.is_free()) {
            let id = entry.inode_id as usize;
            assert!(!referenced[id], "inode {id} has a second entry '{}'", entry.name_str());
            referenced[id] = true;
            let inode = Inode::decode(&read_raw_inode(rd, entry.inode_id).unwrap())
                .unwrap()
                .unwrap_or_else(|| panic!("entry '{}' points at free inode {id}", entry.name_str()));
            for &block_id in &inode.blocks {
                assert!(!used[block_id as usize], "block {block_id} is claimed twice");
                used[block_id as usize] = true;
            }
            if inode.is_dir() {
                pending.push(inode.blocks[0]);
            }
        }
    }

    for id in 1..MAX_INODES {
        let in_use = Inode::decode(&read_raw_inode(rd, id as u8).unwrap()).unwrap().is_some();
        assert_eq!(in_use, referenced[id], "inode {id} in use but unreachable, or the reverse");
    }
    let fbv = read_fbv(rd).unwrap();
    for (block_id, &is_used) in used.iter().enumerate() {
        let free = fbv[block_id / 8] & (0x80 >> (block_id % 8)) != 0;
        assert_eq!(free, !is_used, "FBV disagrees about block {block_id}");
    }
}
