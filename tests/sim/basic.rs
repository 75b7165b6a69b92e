//! Basic syscall behaviour.

use fsconform::fs::{DeleteOpen, FsConfig, SimFs};
use fsconform::{Fd, FileSystem, Result, SysError};

#[test]
fn write_close_read_back() -> Result {
    let mut fs = SimFs::default();

    let fd = fs.create(b"data")?;
    assert_eq!(fs.write(fd, b"hello world")?, 11);
    fs.close(fd)?;

    let fd = fs.open(b"data")?;
    let mut buf = [0u8; 32];
    let n = fs.read(fd, &mut buf)?;
    assert_eq!(&buf[..n], b"hello world");

    // at the end now
    assert_eq!(fs.read(fd, &mut buf)?, 0);
    Ok(())
}

#[test]
fn handles_have_independent_cursors() -> Result {
    let mut fs = SimFs::default();

    let writer = fs.create(b"data")?;
    fs.write(writer, b"abcdef")?;

    let first = fs.open(b"data")?;
    let second = fs.open(b"data")?;

    let mut buf = [0u8; 3];
    fs.read(first, &mut buf)?;
    assert_eq!(&buf, b"abc");
    fs.read(first, &mut buf)?;
    assert_eq!(&buf, b"def");

    fs.read(second, &mut buf)?;
    assert_eq!(&buf, b"abc");
    Ok(())
}

#[test]
fn every_handle_is_fresh() -> Result {
    let mut fs = SimFs::default();

    let mut seen = Vec::new();
    for _ in 0..8 {
        let fd = fs.create(b"data")?;
        assert!(fd >= Fd(2));
        assert!(!seen.contains(&fd));
        seen.push(fd);
        fs.close(fd)?;
    }
    Ok(())
}

#[test]
fn closed_handles_are_rejected() -> Result {
    let mut fs = SimFs::default();

    let fd = fs.create(b"data")?;
    fs.close(fd)?;

    assert_eq!(fs.close(fd), Err(SysError::BadDescriptor(fd)));
    assert_eq!(fs.write(fd, b"x"), Err(SysError::BadDescriptor(fd)));
    assert_eq!(fs.read(fd, &mut [0; 1]), Err(SysError::BadDescriptor(fd)));
    Ok(())
}

#[test]
fn console_handles_are_not_files() {
    let mut fs = SimFs::default();

    assert_eq!(fs.close(Fd(0)), Err(SysError::BadDescriptor(Fd(0))));
    assert_eq!(fs.write(Fd(1), b"x"), Err(SysError::BadDescriptor(Fd(1))));
}

#[test]
fn delete_while_open() -> Result {
    let mut fs = SimFs::default();

    let fd = fs.create(b"data")?;
    fs.write(fd, b"still here")?;
    fs.delete(b"data")?;

    assert!(!fs.exists(b"data"));
    assert_eq!(fs.open(b"data"), Err(SysError::NotFound));

    // the handle outlives the name
    fs.close(fd)?;
    assert_eq!(fs.open_handles(), 0);
    Ok(())
}

#[test]
fn delete_missing() -> Result {
    let mut fs = SimFs::default();

    assert_eq!(fs.delete(b"missing"), Err(SysError::NotFound));

    let fd = fs.create(b"data")?;
    fs.close(fd)?;
    fs.delete(b"data")?;
    assert_eq!(fs.delete(b"data"), Err(SysError::NotFound));
    Ok(())
}

#[test]
fn delete_while_open_rejected() -> Result {
    let mut fs = FsConfig::default().delete_open(DeleteOpen::Reject).build();

    let fd = fs.create(b"data")?;
    assert_eq!(fs.delete(b"data"), Err(SysError::Busy));

    fs.close(fd)?;
    fs.delete(b"data")?;
    assert!(!fs.exists(b"data"));
    Ok(())
}

#[test]
fn recreate_after_delete_starts_empty() -> Result {
    let mut fs = SimFs::default();

    let fd = fs.create(b"data")?;
    fs.write(fd, b"old")?;
    fs.close(fd)?;
    fs.delete(b"data")?;

    let fd = fs.create(b"data")?;
    assert_eq!(fs.read(fd, &mut [0; 8])?, 0);
    assert_eq!(fs.content(b"data"), Some(Vec::new()));
    Ok(())
}

#[test]
fn name_limit() -> Result {
    let mut fs = SimFs::default();

    let longest = vec![b'a'; 255];
    let too_long = vec![b'a'; 256];

    fs.create(&longest)?;
    assert_eq!(
        fs.create(&too_long),
        Err(SysError::NameTooLong {
            len: 257,
            limit: 256
        })
    );
    assert!(matches!(fs.open(&too_long), Err(SysError::NameTooLong { .. })));
    assert!(matches!(fs.delete(&too_long), Err(SysError::NameTooLong { .. })));
    fs.delete(&longest)?;
    Ok(())
}
