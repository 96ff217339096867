//! A small single-disk file system with an undo log.
//!
//! Linear layout on a 4096 x 512-byte disk:
//! - Block 0: Superblock
//! - Block 1: Free Block Vector
//! - Block 2: Safety Snapshot (in-flight undo record)
//! - Block 3: Free Block Vector backup
//! - Blocks 4-7: Inode Table (64 x 32 bytes)
//! - Blocks 8-9: Reserved
//! - Block 10: Root directory, then data blocks
//!
//! Layers (from bottom to top):
//! 1. Block Device: the medium, no caching above it.
//! 2. Bitmap: lowest-index-first block allocation.
//! 3. Inode: fixed table of file records, ten direct blocks each.
//! 4. Directory/Path: one block of 16 entries per directory, resolution from the root.
//! 5. Journal: single-slot undo record taken before every mutation.
//! 6. File: directory and data file creation, reads, single-node deletes.
//! 7. FileSystem: the single-owner handle tying it together.
//!
//! Operations are strictly sequential; the journal tracks one mutation at a time.

mod config;
mod block_dev;
mod disk;
mod structs;
mod bitmap;
mod superblock;
mod inode;
mod directory;
mod path;
mod journal;
mod file;
mod fs;
mod error;

pub use block_dev::BlockDevice;
pub use disk::{FileDisk, RamDisk};
pub use config::*;
pub use structs::*;
pub use superblock::{format_fs, read_superblock, write_superblock};
pub use inode::{find_free_slot, free_inode, get_inode, read_raw_inode, write_inode};
pub use bitmap::{find_free_block, is_free, mark, read_fbv, unmark};
pub use directory::{dir_lookup, read_raw_entry, read_slots};
pub use path::{locate, resolve_inode, resolve_parent, split, Location};
pub use journal::{begin, commit, read_snapshot, recover};
pub use fs::*;
pub use error::FsError as Error;
pub use error::Result;
