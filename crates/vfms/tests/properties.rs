#![allow(unused_crate_dependencies, reason = "These are tests, not the main crate.")]

use oorandom::Rand32;

use vfms::{Error, ErrorKind, File, OpenMode, VirtualFileSystem};


const SEEDS: u64 = 64;

fn random_text(prng: &mut Rand32, max_len: u32) -> String {
    let len = prng.rand_range(0..max_len + 1);
    (0..len)
        .map(|_| {
            // Mix in some multi-byte characters, since offsets are in characters.
            match prng.rand_range(0..8) {
                0 => 'é',
                1 => '✓',
                _ => char::from(b'a' + prng.rand_range(0..26) as u8),
            }
        })
        .collect()
}

fn file_with(content: &str) -> File {
    let file = File::new("f.txt");
    file.open(OpenMode::WRITE).unwrap();
    file.write(content).unwrap();
    file.close().unwrap();
    file
}

#[test]
fn write_at_then_read_at_returns_inserted_data() {
    for seed in 0..SEEDS {
        let mut prng = Rand32::new(seed);
        let original = random_text(&mut prng, 20);
        let data = random_text(&mut prng, 10);
        let len = original.chars().count() as u32;
        let offset = prng.rand_range(0..len + 1) as usize;

        let file = file_with(&original);
        file.open("rw".parse().unwrap()).unwrap();
        file.write_at(offset, &data).unwrap();

        let read = file.read_at(offset, data.chars().count()).unwrap();
        assert_eq!(read, data, "seed {seed}");
        assert_eq!(file.size(), original.chars().count() + data.chars().count());

        // Insertion, not overwrite: the original content is still there around the insertion.
        let expected = original.chars().take(offset)
            .chain(data.chars())
            .chain(original.chars().skip(offset))
            .collect::<String>();
        assert_eq!(file.read().unwrap(), expected);
    }
}

#[test]
fn truncate_keeps_prefix() {
    for seed in 0..SEEDS {
        let mut prng = Rand32::new(seed);
        let original = random_text(&mut prng, 30);
        let len = original.chars().count();
        let size = prng.rand_range(0..len as u32 + 1) as usize;

        let file = file_with(&original);
        file.truncate(Some(size)).unwrap();
        assert_eq!(file.read().unwrap(), original.chars().take(size).collect::<String>());
    }
}

#[test]
fn truncate_open_file_fails() {
    let file = file_with("hello");
    file.open(OpenMode::READ).unwrap();

    let err = file.truncate(Some(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(file.read().unwrap(), "hello");
}

#[test]
fn create_then_get_for_many_names() {
    let vfs = VirtualFileSystem::new();

    for i in 0..32 {
        let name = format!("entry{i}");
        if i % 2 == 0 {
            vfs.create_file(&name).unwrap();
            assert_eq!(vfs.get_file(&name).unwrap().name(), name);
        } else {
            vfs.create_directory(&name).unwrap();
            assert_eq!(vfs.get_directory(&name).unwrap().name(), name);
        }

        assert_eq!(vfs.create_file(&name), Err(Error::AlreadyExists(name.clone())));
        assert_eq!(vfs.create_directory(&name), Err(Error::AlreadyExists(name.clone())));
        assert_eq!(vfs.get_file(&name).is_ok(), i % 2 == 0);
    }
}

#[test]
fn absolute_path_from_anywhere() {
    let vfs = VirtualFileSystem::new();
    for path in ["/a", "/a/b", "/a/b/c", "/x"] {
        let (parent, name) = path.rsplit_once('/').unwrap();
        vfs.change_directory(if parent.is_empty() { "/" } else { parent }).unwrap();
        vfs.create_directory(name).unwrap();
    }

    let target = vfs.change_directory("/a/b").unwrap().id();
    for start in ["/", "/a", "/a/b/c", "/x"] {
        vfs.change_directory(start).unwrap();
        assert_eq!(vfs.change_directory("/a/b").unwrap().id(), target);

        vfs.change_directory(start).unwrap();
        vfs.change_directory("/").unwrap();
        vfs.change_directory("a").unwrap();
        assert_eq!(vfs.change_directory("b").unwrap().id(), target);
    }
}

#[test]
fn bad_path_keeps_cursor() {
    let vfs = VirtualFileSystem::new();
    vfs.create_directory("a").unwrap();
    vfs.change_directory("a").unwrap();

    for path in ["missing", "/missing", "../a/missing", "/a/../nope/a"] {
        let err = vfs.change_directory(path).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(vfs.current_path(), "/a");
    }
}

#[test]
fn move_file_to_resolved_directory() {
    let vfs = VirtualFileSystem::new();
    vfs.create_directory("a").unwrap();
    vfs.change_directory("a").unwrap();
    vfs.create_directory("b").unwrap();
    vfs.create_file("f").unwrap();

    for (path, resolved) in [("b", "/a/b"), ("/", "/"), ("/a/b/..", "/a")] {
        let here = vfs.current_path();
        vfs.move_file("f", path).unwrap();
        assert_eq!(vfs.current_path(), here);
        assert!(vfs.get_file("f").is_err());

        vfs.change_directory(resolved).unwrap();
        assert!(vfs.get_file("f").is_ok());
    }
}

#[test]
fn full_block_map_rejects_write() {
    let vfs = VirtualFileSystem::with_block_map_dimensions(2, 2);
    vfs.create_file("f").unwrap();
    vfs.open_file("f", OpenMode::WRITE).unwrap();
    vfs.write_to_file("f", "abcd", None).unwrap();
    assert_eq!(vfs.calc_free_memory(), 0);

    let err = vfs.write_to_file("f", "x", None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    assert_eq!(err.to_string(), "Cannot write to file as memory is full");
    assert_eq!(vfs.get_file("f").unwrap().content(), "abcd");

    // Offset writes are checked against capacity too.
    assert!(vfs.write_to_file("f", "x", Some(0)).is_err());
}

#[test]
fn documented_session() {
    let vfs = VirtualFileSystem::new();
    vfs.create_directory("docs").unwrap();
    vfs.change_directory("docs").unwrap();
    vfs.create_file("notes.txt").unwrap();
    vfs.open_file("notes.txt", OpenMode::WRITE).unwrap();
    vfs.write_to_file("notes.txt", "hello", None).unwrap();
    assert_eq!(vfs.get_file("notes.txt").unwrap().size(), 5);

    assert_eq!(
        vfs.truncate_file("notes.txt", Some(1)),
        Err(Error::FileIsOpen("notes.txt".to_owned())),
    );

    vfs.close_file("notes.txt").unwrap();
    vfs.open_file("notes.txt", OpenMode::READ).unwrap();
    assert_eq!(vfs.read_from_file("notes.txt", None).unwrap(), "hello");
    assert_eq!(vfs.read_from_file("notes.txt", Some((1, 3))).unwrap(), "ell");
}
