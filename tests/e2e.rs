//! End-to-end scenarios exercising the filesystem through its public
//! surface, including the concurrent ones a single-threaded unit test can't
//! cover.

use std::sync::Arc;

use tfs::{Error, Filesystem, OpenFlags, MAX_OPEN_FILES};

#[test]
fn write_then_read_round_trip() {
    let fs = Filesystem::init().unwrap();
    let h = fs.open("/doc.txt", OpenFlags::CREAT).unwrap();
    let written = fs.write(h, b"the quick brown fox").unwrap();
    assert_eq!(written, 19);
    fs.close(h).unwrap();

    let h = fs.open("/doc.txt", OpenFlags::empty()).unwrap();
    let mut buf = [0u8; 19];
    assert_eq!(fs.read(h, &mut buf).unwrap(), 19);
    assert_eq!(&buf, b"the quick brown fox");
}

#[test]
fn truncate_on_open_yields_zero_byte_read() {
    let fs = Filesystem::init().unwrap();
    let h = fs.open("/log.txt", OpenFlags::CREAT).unwrap();
    fs.write(h, b"stale content that should disappear").unwrap();
    fs.close(h).unwrap();

    let h = fs.open("/log.txt", OpenFlags::TRUNC).unwrap();
    let mut buf = [0u8; 64];
    let n = fs.read(h, &mut buf).unwrap();
    assert_eq!(n, 0);
}

#[test]
fn open_missing_file_without_creat_fails() {
    let fs = Filesystem::init().unwrap();
    let err = fs.open("/nope.txt", OpenFlags::empty()).unwrap_err();
    assert!(matches!(err, Error::NotFound));
}

#[test]
fn two_handles_reading_same_file_see_identical_content() {
    let fs = Arc::new(Filesystem::init().unwrap());
    let h = fs.open("/shared.txt", OpenFlags::CREAT).unwrap();
    fs.write(h, b"identical bytes for every reader").unwrap();
    fs.close(h).unwrap();

    let fs_a = Arc::clone(&fs);
    let fs_b = Arc::clone(&fs);

    let reader = |fs: Arc<Filesystem>| {
        let h = fs.open("/shared.txt", OpenFlags::empty()).unwrap();
        let mut buf = [0u8; 32];
        fs.read(h, &mut buf).unwrap();
        fs.close(h).unwrap();
        buf
    };

    let t1 = std::thread::spawn(move || reader(fs_a));
    let t2 = std::thread::spawn(move || reader(fs_b));
    let a = t1.join().unwrap();
    let b = t2.join().unwrap();
    assert_eq!(a, b);
    assert_eq!(&a, b"identical bytes for every reader");
}

#[test]
fn concurrent_create_write_close_is_consistent() {
    let fs = Arc::new(Filesystem::init().unwrap());
    let threads: Vec<_> = (0..20)
        .map(|i| {
            let fs = Arc::clone(&fs);
            std::thread::spawn(move || {
                let path = format!("/file{i}.txt");
                let h = fs.open(&path, OpenFlags::CREAT | OpenFlags::TRUNC).unwrap();
                let payload = format!("contents of file {i}");
                let written = fs.write(h, payload.as_bytes()).unwrap();
                assert_eq!(written, payload.len());
                fs.close(h).unwrap();
                (path, payload)
            })
        })
        .collect();

    for t in threads {
        let (path, payload) = t.join().unwrap();
        let h = fs.open(&path, OpenFlags::empty()).unwrap();
        let mut buf = vec![0u8; payload.len()];
        assert_eq!(fs.read(h, &mut buf).unwrap(), payload.len());
        assert_eq!(buf, payload.as_bytes());
        fs.close(h).unwrap();
    }
}

#[test]
fn concurrent_create_truncate_write_on_same_path_is_consistent() {
    let fs = Arc::new(Filesystem::init().unwrap());
    let threads: Vec<_> = (0..20)
        .map(|i| {
            let fs = Arc::clone(&fs);
            std::thread::spawn(move || {
                let h = fs.open("/f1", OpenFlags::CREAT | OpenFlags::TRUNC).unwrap();
                let payload = format!("writer {i}");
                let written = fs.write(h, payload.as_bytes()).unwrap();
                assert_eq!(written, payload.len());
                fs.close(h).unwrap();
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }

    // Every thread races CREAT|TRUNC on the same path: exactly one inode
    // ends up bound to "/f1" (no duplicate entries, no leaked inode), and
    // its content is one writer's payload in full, never an interleaving of
    // two.
    let h = fs.open("/f1", OpenFlags::empty()).unwrap();
    let mut buf = vec![0u8; 64];
    let n = fs.read(h, &mut buf).unwrap();
    fs.close(h).unwrap();

    let content = std::str::from_utf8(&buf[..n]).unwrap();
    assert!(
        (0..20).any(|i| content == format!("writer {i}")),
        "unexpected content: {content:?}"
    );
}

#[test]
fn open_handle_count_never_exceeds_table_capacity() {
    let fs = Arc::new(Filesystem::init().unwrap());
    let h = fs.open("/contended.txt", OpenFlags::CREAT).unwrap();
    fs.close(h).unwrap();

    let attempts = MAX_OPEN_FILES * 3;
    let threads: Vec<_> = (0..attempts)
        .map(|_| {
            let fs = Arc::clone(&fs);
            std::thread::spawn(move || fs.open("/contended.txt", OpenFlags::empty()))
        })
        .collect();

    let mut live = Vec::new();
    for t in threads {
        if let Ok(h) = t.join().unwrap() {
            live.push(h);
        }
    }
    assert!(live.len() <= MAX_OPEN_FILES);
    for h in live {
        fs.close(h).unwrap();
    }
}
