pub const MAGIC: u32 = 0xBEEF;

pub const BLOCK_SIZE: usize = 512;
pub const TOTAL_BLOCKS: usize = 4096;
pub const MAX_INODES: usize = 64;
pub const INODE_SIZE: usize = 32;
pub const INODES_PER_BLOCK: usize = BLOCK_SIZE / INODE_SIZE;

pub const SUPERBLOCK_ID: usize = 0;
pub const FBV_BLOCK_ID: usize = 1;
pub const SNAPSHOT_BLOCK_ID: usize = 2;
pub const FBV_BACKUP_BLOCK_ID: usize = 3;
pub const INODE_TABLE_START: usize = 4;
pub const INODE_TABLE_BLOCKS: usize = MAX_INODES / INODES_PER_BLOCK;
pub const NUM_RESERVED_BLOCKS: usize = 10; // Blocks 0-9, the last two are unused

pub const ROOT_INODE_ID: u8 = 1;
pub const ROOT_BLOCK_ID: u16 = 10;

pub const NUM_DIRECT_PTRS: usize = 10;
pub const MAX_FILE_SIZE: usize = NUM_DIRECT_PTRS * BLOCK_SIZE;

pub const DIR_ENTRY_SIZE: usize = 32;
pub const NUM_ENTRY_PER_BLOCK: usize = BLOCK_SIZE / DIR_ENTRY_SIZE;
pub const NAME_FIELD_LEN: usize = DIR_ENTRY_SIZE - 1; // Entry minus the inode byte
pub const MAX_FILE_NAME_LEN: usize = NAME_FIELD_LEN - 1; // Leaves room for the terminating null

pub const MAX_PATH_DEPTH: usize = 5;
