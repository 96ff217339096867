use log::{info, warn};

use crate::block_dev::read;
use crate::config::*;
use crate::directory::{dir_lookup, read_dir};
use crate::error::{FsError, Result};
use crate::inode::get_inode;
use crate::path::{file_name, resolve_inode, resolve_parent};
use crate::superblock::{format_fs, read_superblock};
use crate::{file, journal, BlockDevice, DirEntry, FileType, Inode, SuperBlock};

/// A mounted file system. The handle owns its device; every operation takes
/// `&mut self`, so at most one mutation is in flight at a time. Wrap the
/// whole handle in a lock to share it.
#[derive(Debug)]
pub struct FileSystem<D: BlockDevice> {
    device: D,
    superblock: SuperBlock,
}

impl<D: BlockDevice> FileSystem<D> {
    /// Wipes the device and lays out an empty file system.
    pub fn format(device: D) -> Result<Self> {
        let superblock = format_fs(&device)?;
        Ok(Self { device, superblock })
    }

    /// Opens an existing file system, rolling back any operation a previous
    /// run left uncommitted.
    pub fn mount(device: D) -> Result<Self> {
        let superblock = read_superblock(&device)?;
        let mut fs = Self { device, superblock };
        fs.recover()?;
        info!("mounted file system with {} blocks", superblock.num_blocks);
        Ok(fs)
    }

    /// Runs `op` between `begin` and `commit`. A failure that is not a device
    /// error is rolled back before it is returned; a device error leaves the
    /// snapshot pending for the next `recover`.
    ///
    /// The caller always gets the error `op` failed with. If the inline
    /// rollback itself fails, that failure is only logged and the snapshot
    /// stays pending, exactly as after a device error.
    fn transaction<T>(&mut self, path: &str, op: impl FnOnce(&D) -> Result<T>) -> Result<T> {
        journal::begin(&self.device, path)?;
        match op(&self.device) {
            Ok(value) => {
                journal::commit(&self.device)?;
                Ok(value)
            }
            Err(err) if err.is_device_error() => Err(err),
            Err(err) => {
                warn!("rolling back operation on '{path}': {err}");
                if let Err(rollback) = journal::recover(&self.device) {
                    warn!("rollback of '{path}' failed, left pending: {rollback}");
                }
                Err(err)
            }
        }
    }

    fn ensure_absent(&self, path: &str) -> Result<()> {
        let name = file_name(path)?;
        DirEntry::new(0, name)?;
        let parent_block = resolve_parent(&self.device, path)?;
        if dir_lookup(&self.device, parent_block, name)?.is_some() {
            return Err(FsError::AlreadyExists(path.to_string()));
        }
        Ok(())
    }

    /// Creates a directory. Returns its inode id.
    pub fn mkdir(&mut self, path: &str) -> Result<u8> {
        self.ensure_absent(path)?;
        let inode_id = self.transaction(path, |device| file::make_directory(device, path))?;
        info!("created directory '{path}' (inode {inode_id})");
        Ok(inode_id)
    }

    /// Creates a data file holding `data`. Returns its inode id.
    pub fn create(&mut self, path: &str, data: &[u8]) -> Result<u8> {
        if data.is_empty() {
            return Err(FsError::EmptyFile);
        }
        if data.len() > MAX_FILE_SIZE {
            return Err(FsError::FileTooLarge(data.len()));
        }
        self.ensure_absent(path)?;
        let inode_id = self.transaction(path, |device| file::make_data_file(device, path, data))?;
        info!("created data file '{path}' (inode {inode_id}, {} bytes)", data.len());
        Ok(inode_id)
    }

    /// Reads a whole data file.
    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        file::read_file(&self.device, path)
    }

    /// Deletes a data file, or a directory together with everything in it.
    ///
    /// A directory is emptied bottom-up, each descendant in a transaction of
    /// its own, before the directory itself goes. An interruption leaves a
    /// smaller but consistent tree.
    pub fn remove(&mut self, path: &str) -> Result<()> {
        // Resolve first so a missing path fails before the journal is touched.
        let inode = get_inode(&self.device, resolve_inode(&self.device, path)?)?;
        if inode.is_dir() {
            let parent = path.trim_end_matches('/');
            for entry in read_dir(&self.device, inode.dir_block()?)? {
                self.remove(&format!("{parent}/{}", entry.name_str()))?;
            }
        }
        self.transaction(path, |device| file::delete(device, path))?;
        info!("deleted '{path}'");
        Ok(())
    }

    /// Rolls back an uncommitted operation, if any. Returns whether anything
    /// was restored.
    pub fn recover(&mut self) -> Result<bool> {
        journal::recover(&self.device)
    }

    /// Whether an operation was begun and never committed.
    pub fn is_dirty(&self) -> Result<bool> {
        Ok(journal::read_snapshot(&self.device)?.working)
    }

    /// Creates a data file, then raises the working flag again, leaving the
    /// disk as if the process had died just before committing.
    pub fn simulate_write_crash(&mut self, path: &str, data: &[u8]) -> Result<u8> {
        let inode_id = self.create(path, data)?;
        journal::reopen(&self.device)?;
        warn!("simulated crash while creating '{path}'");
        Ok(inode_id)
    }

    /// Removes `path`, then raises the working flag again. Recovery restores
    /// `path` itself; for a directory, whatever was below it stays deleted.
    pub fn simulate_delete_crash(&mut self, path: &str) -> Result<()> {
        self.remove(path)?;
        journal::reopen(&self.device)?;
        warn!("simulated crash while deleting '{path}'");
        Ok(())
    }

    /// Inode id and record of a path. `"/"` is the root directory.
    pub fn stat(&self, path: &str) -> Result<(u8, Inode)> {
        let inode_id = if is_root(path) {
            ROOT_INODE_ID
        } else {
            resolve_inode(&self.device, path)?
        };
        Ok((inode_id, get_inode(&self.device, inode_id)?))
    }

    /// Live entries of a directory, in slot order.
    pub fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>> {
        let (_, inode) = self.stat(path)?;
        if inode.ftype != FileType::Directory {
            return Err(FsError::NotADirectory(path.to_string()));
        }
        read_dir(&self.device, inode.dir_block()?)
    }

    /// Hexdump of one block, 16 bytes per line.
    pub fn dump_block(&self, block_id: usize) -> Result<String> {
        let buf = read(&self.device, block_id)?;
        let mut out = String::new();
        for (i, line) in buf.chunks(16).enumerate() {
            out.push_str(&format!("Byte {:03}: ", i * 16));
            for b in line {
                out.push_str(&format!(" {b:02x}"));
            }
            out.push('\n');
        }
        Ok(out)
    }

    pub fn root_inode_id(&self) -> u8 {
        ROOT_INODE_ID
    }

    pub fn superblock(&self) -> &SuperBlock {
        &self.superblock
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }
}

fn is_root(path: &str) -> bool {
    !path.is_empty() && path.chars().all(|c| c == '/')
}
