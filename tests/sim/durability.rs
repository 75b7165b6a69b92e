//! Close as the flush point, and what survives a crash.

use fsconform::fs::{FsConfig, SimFs};
use fsconform::{FileSystem, Result, SysError};

#[test]
fn writes_are_durable_after_close() -> Result {
    let mut fs = SimFs::default();

    let fd = fs.create(b"data")?;
    fs.write(fd, b"durable")?;
    assert_eq!(fs.durable_content(b"data"), Some(&b""[..]));
    assert_eq!(fs.pending_ops(), 1);

    fs.close(fd)?;
    assert_eq!(fs.durable_content(b"data"), Some(&b"durable"[..]));
    assert_eq!(fs.pending_ops(), 0);
    Ok(())
}

#[test]
fn crash_loses_unclosed_writes() -> Result {
    let mut fs = SimFs::default();

    let fd = fs.create(b"kept")?;
    fs.write(fd, b"flushed")?;
    fs.close(fd)?;

    let fd = fs.create(b"lost")?;
    fs.write(fd, b"pending")?;

    fs.crash();

    assert_eq!(fs.content(b"kept"), Some(b"flushed".to_vec()));
    // the entry is durable, the data is not
    assert_eq!(fs.content(b"lost"), Some(Vec::new()));
    assert_eq!(fs.open_handles(), 0);
    assert_eq!(fs.close(fd), Err(SysError::BadDescriptor(fd)));
    Ok(())
}

#[test]
fn crash_reclaims_deleted_open_files() -> Result {
    let mut fs = SimFs::default();

    let fd = fs.create(b"data")?;
    fs.write(fd, b"orphan")?;
    fs.delete(b"data")?;

    fs.crash();

    assert!(!fs.exists(b"data"));
    fs.create(b"data")?;
    assert_eq!(fs.content(b"data"), Some(Vec::new()));
    Ok(())
}

#[test]
fn always_sync() -> Result {
    let mut fs = FsConfig::default().sync_probability(1.0).rng_seed(1).build();

    let fd = fs.create(b"data")?;
    fs.write(fd, b"synced")?;
    assert_eq!(fs.durable_content(b"data"), Some(&b"synced"[..]));

    fs.crash();
    assert_eq!(fs.content(b"data"), Some(b"synced".to_vec()));
    Ok(())
}

#[test]
fn exit_flushes_open_handles() -> Result {
    let mut fs = SimFs::default();

    let fd = fs.create(b"data")?;
    fs.write(fd, b"at exit")?;
    fs.exit(0);

    assert_eq!(fs.exit_status(), Some(0));
    assert_eq!(fs.durable_content(b"data"), Some(&b"at exit"[..]));
    assert_eq!(fs.open(b"data"), Err(SysError::Terminated));
    Ok(())
}
