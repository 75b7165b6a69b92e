//! Limits and injected failures.

use fsconform::fs::FsConfig;
use fsconform::{FileSystem, Result, SysError};

#[test]
fn open_file_limit() -> Result {
    let mut fs = FsConfig::default().max_open_files(2).build();

    let a = fs.create(b"a")?;
    fs.create(b"b")?;
    assert_eq!(fs.create(b"c"), Err(SysError::TooManyOpenFiles));
    assert_eq!(fs.open(b"a"), Err(SysError::TooManyOpenFiles));

    fs.close(a)?;
    fs.open(b"a")?;
    Ok(())
}

#[test]
fn capacity() -> Result {
    let mut fs = FsConfig::default().capacity(8).build();

    let fd = fs.create(b"data")?;
    assert_eq!(fs.write(fd, b"12345678")?, 8);
    assert_eq!(fs.write(fd, b"9"), Err(SysError::NoSpace));

    // space comes back once the file is gone
    fs.close(fd)?;
    fs.delete(b"data")?;
    let fd = fs.create(b"other")?;
    fs.write(fd, b"12345678")?;
    Ok(())
}

#[test]
fn io_errors() -> Result {
    let mut fs = FsConfig::default().io_error_probability(1.0).build();

    let fd = fs.create(b"data")?;
    assert_eq!(fs.write(fd, b"x"), Err(SysError::Io));
    assert_eq!(fs.read(fd, &mut [0; 1]), Err(SysError::Io));

    // metadata calls are unaffected
    fs.close(fd)?;
    fs.delete(b"data")?;
    Ok(())
}

#[test]
fn corruption_is_deterministic_per_seed() -> Result {
    let read_back = |seed| -> Result<Vec<u8>> {
        let mut fs = FsConfig::default()
            .corruption_probability(0.5)
            .rng_seed(seed)
            .build();

        let fd = fs.create(b"data")?;
        fs.write(fd, &[b'x'; 64])?;
        fs.close(fd)?;

        let mut out = Vec::new();
        for _ in 0..16 {
            let fd = fs.open(b"data")?;
            let mut buf = [0u8; 64];
            let n = fs.read(fd, &mut buf)?;
            out.extend_from_slice(&buf[..n]);
            fs.close(fd)?;
        }
        Ok(out)
    };

    let first = read_back(42)?;
    assert_eq!(first, read_back(42)?);
    assert!(first.iter().any(|b| *b != b'x'));
    Ok(())
}

#[test]
#[should_panic]
fn invalid_corruption_probability() {
    FsConfig::default().corruption_probability(1.5);
}
