mod common;

use llfs::*;

#[test]
fn test_disk_image_survives_reopen() {
    common::init_logger();
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("vdisk");

    {
        let disk = FileDisk::create(&image, TOTAL_BLOCKS).unwrap();
        let mut fs = FileSystem::format(disk).unwrap();
        fs.mkdir("/usr").unwrap();
        fs.mkdir("/bin").unwrap();
        fs.mkdir("/usr/resources").unwrap();
        fs.create("/usr/resources/foo", &[10u8; 512]).unwrap();
        fs.create("/bin/largeboi", &[10u8; 2048]).unwrap();
        fs.simulate_delete_crash("/bin/largeboi").unwrap();
    }
    assert_eq!(std::fs::metadata(&image).unwrap().len(), (TOTAL_BLOCKS * BLOCK_SIZE) as u64);

    let disk = FileDisk::open(&image).unwrap();
    let fs = FileSystem::mount(disk).unwrap();
    log!("Root block after recovery:\n{}", fs.dump_block(ROOT_BLOCK_ID as usize).unwrap());
    assert_eq!(fs.read("/usr/resources/foo").unwrap(), vec![10u8; 512]);
    assert_eq!(fs.read("/bin/largeboi").unwrap(), vec![10u8; 2048]);
}

#[test]
fn test_open_rejects_bad_image() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("truncated");
    std::fs::write(&image, vec![0u8; BLOCK_SIZE + 1]).unwrap();
    assert!(matches!(FileDisk::open(&image), Err(Error::Io(_))));
    assert!(matches!(FileDisk::open(dir.path().join("missing")), Err(Error::Io(_))));

    // Whole blocks, but not the full geometry.
    let short = dir.path().join("short");
    FileDisk::create(&short, 16).unwrap();
    assert!(matches!(FileDisk::open(&short), Err(Error::Io(_))));

    let full = dir.path().join("full");
    FileDisk::create(&full, TOTAL_BLOCKS).unwrap();
    assert_eq!(FileDisk::open(&full).unwrap().num_blocks(), TOTAL_BLOCKS);
}

#[test]
fn test_out_of_range_block() {
    let dir = tempfile::tempdir().unwrap();
    let disk = FileDisk::create(dir.path().join("small"), 16).unwrap();
    let mut buf = [0u8; BLOCK_SIZE];
    assert!(disk.read_block(15, &mut buf).is_ok());
    assert!(matches!(disk.read_block(16, &mut buf), Err(Error::InvalidBlockId(16))));
    assert!(matches!(disk.write_block(99, &buf), Err(Error::InvalidBlockId(99))));
}
