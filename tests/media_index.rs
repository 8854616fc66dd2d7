use std::fs;

use filetime::{set_file_mtime, FileTime};
use memedb::media::index::{display_name, list_media, IndexError, MediaEntry};
use memedb::media::mime::MediaKind;
use memedb::votes::VoteCounts;

fn find<'a>(entries: &'a [MediaEntry], filename: &str) -> &'a MediaEntry {
    entries
        .iter()
        .find(|e| e.filename == filename)
        .unwrap_or_else(|| panic!("{filename} missing from listing"))
}

#[test]
fn listing_joins_files_with_vote_counts() {
    let dir = tempfile::tempdir().unwrap();
    let cat1 = dir.path().join("cat1.jpg");
    let cat2 = dir.path().join("cat2.mp4");
    fs::write(&cat1, b"jpeg bytes").unwrap();
    fs::write(&cat2, vec![0u8; 2048]).unwrap();
    set_file_mtime(&cat1, FileTime::from_unix_time(1_700_000_000, 0)).unwrap();
    set_file_mtime(&cat2, FileTime::from_unix_time(1_700_000_500, 0)).unwrap();

    let votes: VoteCounts = [("cat2.mp4".to_string(), 3)].into_iter().collect();
    let listing = list_media(dir.path(), &votes).unwrap();

    assert_eq!(listing.count, 2);
    assert_eq!(listing.entries.len(), 2);

    let first = find(&listing.entries, "cat1.jpg");
    assert_eq!(first.kind, MediaKind::Image);
    assert_eq!(first.vote_count, 0);
    assert_eq!(first.display_name, "cat1");
    assert_eq!(first.size_bytes, 10);
    assert_eq!(first.created_at.timestamp(), 1_700_000_000);

    let second = find(&listing.entries, "cat2.mp4");
    assert_eq!(second.kind, MediaKind::Video);
    assert_eq!(second.vote_count, 3);
    assert_eq!(second.size_bytes, 2048);
    assert!(second.created_at > first.created_at);
}

#[test]
fn listing_excludes_non_allow_listed_entries() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.png", "B.GIF", "c.webm", "notes.txt", "virus.exe", "movie.mkv", "noext"] {
        fs::write(dir.path().join(name), b"x").unwrap();
    }
    fs::create_dir(dir.path().join("folder.jpg")).unwrap();
    fs::write(dir.path().join("folder.jpg").join("nested.jpg"), b"x").unwrap();

    let listing = list_media(dir.path(), &VoteCounts::default()).unwrap();
    let mut names: Vec<_> = listing.entries.iter().map(|e| e.filename.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["B.GIF", "a.png", "c.webm"]);
}

#[test]
fn listing_has_exactly_one_entry_per_file() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..20 {
        fs::write(dir.path().join(format!("meme{i}.jpeg")), b"x").unwrap();
    }
    let listing = list_media(dir.path(), &VoteCounts::default()).unwrap();
    assert_eq!(listing.count, 20);
    for i in 0..20 {
        let name = format!("meme{i}.jpeg");
        assert_eq!(listing.entries.iter().filter(|e| e.filename == name).count(), 1);
    }
}

#[test]
fn listing_creates_missing_directory() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("memes");
    let listing = list_media(&dir, &VoteCounts::default()).unwrap();
    assert_eq!(listing.count, 0);
    assert!(dir.is_dir());

    // Idempotent on an existing directory.
    assert!(list_media(&dir, &VoteCounts::default()).is_ok());
}

#[test]
fn listing_fails_when_directory_unusable() {
    let root = tempfile::tempdir().unwrap();
    let not_a_dir = root.path().join("memes");
    fs::write(&not_a_dir, b"i am a file").unwrap();

    let err = list_media(&not_a_dir, &VoteCounts::default()).unwrap_err();
    assert!(matches!(err, IndexError::DirectoryRead { .. }));
    assert_eq!(err.to_string(), "Unable to read memes folder");
}

#[cfg(unix)]
#[test]
fn listing_skips_broken_non_media_symlink() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ok.png"), b"x").unwrap();
    std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("dangling.txt")).unwrap();

    let listing = list_media(dir.path(), &VoteCounts::default()).unwrap();
    assert_eq!(listing.count, 1);
}

#[test]
fn entry_serializes_with_client_field_names() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("cat.gif"), b"gif").unwrap();
    let votes: VoteCounts = [("cat.gif".to_string(), 7)].into_iter().collect();
    let listing = list_media(dir.path(), &votes).unwrap();

    let json = serde_json::to_value(&listing).unwrap();
    assert_eq!(json["count"], 1);
    let meme = &json["memes"][0];
    assert_eq!(meme["filename"], "cat.gif");
    assert_eq!(meme["name"], "cat");
    assert_eq!(meme["type"], "image");
    assert_eq!(meme["size"], 3);
    assert_eq!(meme["votes"], 7);
    assert!(meme["date"].is_string());
}

#[test]
fn display_name_strips_last_extension_only() {
    assert_eq!(display_name("cat.jpg"), "cat");
    assert_eq!(display_name("cat.final.JPG"), "cat.final");
    assert_eq!(display_name("funny cat (1).mp4"), "funny cat (1)");
}
