use super::*;
use crate::config::LibrarySettings;
use std::fs;
use tempfile::tempdir;

fn wav(dir: &Path, name: &str) -> Track {
    let p = dir.join(name);
    fs::write(&p, b"not a real wav").unwrap();
    Track::from_path(&p).unwrap()
}

#[test]
fn insert_positions_are_validated_before_mutation() {
    let dir = tempdir().unwrap();
    let mut store = PlaylistStore::new();
    let t = wav(dir.path(), "a.wav");

    assert!(matches!(
        store.insert(t.clone(), 1),
        Err(PlayerError::InvalidPosition { position: 1, len: 0 })
    ));
    assert!(store.is_empty());

    store.insert(t.clone(), 0).unwrap();
    store.insert(t, 1).unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn remove_rejects_out_of_range_without_mutation() {
    let dir = tempdir().unwrap();
    let mut store = PlaylistStore::new();
    store.push(wav(dir.path(), "a.wav"));

    assert!(matches!(
        store.remove(1),
        Err(PlayerError::InvalidIndex { index: 1, len: 1 })
    ));
    assert_eq!(store.len(), 1);

    let removed = store.remove(0).unwrap();
    assert_eq!(removed.display_name(), "a.wav");
    assert!(store.is_empty());
}

#[test]
fn move_track_reorders_with_remove_then_insert_semantics() {
    let dir = tempdir().unwrap();
    let mut store = PlaylistStore::new();
    for name in ["a.wav", "b.wav", "c.wav"] {
        store.push(wav(dir.path(), name));
    }

    store.move_track(0, 2).unwrap();
    let names: Vec<String> = store.entries().into_iter().map(|(_, n)| n).collect();
    assert_eq!(names, vec!["b.wav", "c.wav", "a.wav"]);

    assert!(store.move_track(3, 0).is_err());
    assert!(store.move_track(0, 3).is_err());
}

#[test]
fn entries_are_one_based_with_display_names() {
    let dir = tempdir().unwrap();
    let mut store = PlaylistStore::new();
    store.push(wav(dir.path(), "first%20take.wav"));
    store.push(wav(dir.path(), "second.wav"));

    assert_eq!(
        store.entries(),
        vec![(1, "first take.wav".to_string()), (2, "second.wav".to_string())]
    );
}

#[test]
fn duplicate_tracks_are_allowed() {
    let dir = tempdir().unwrap();
    let mut store = PlaylistStore::new();
    let t = wav(dir.path(), "a.wav");
    store.push(t.clone());
    store.push(t);
    assert_eq!(store.len(), 2);
}

#[test]
fn scan_directory_filters_and_sorts() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.WAV"), b"x").unwrap();
    fs::write(dir.path().join("A.mp3"), b"x").unwrap();
    fs::write(dir.path().join("skip.txt"), b"x").unwrap();

    let tracks = scan_directory(dir.path(), &LibrarySettings::default());
    let names: Vec<String> = tracks.iter().map(|t| t.display_name()).collect();
    assert_eq!(names, vec!["A.mp3", "b.WAV"]);
}

#[test]
fn index_after_remove_follows_renumber_rules() {
    // Removing the current track clears it.
    assert_eq!(index_after_remove(Some(2), 2), None);
    // Removing an earlier track shifts the current one down.
    assert_eq!(index_after_remove(Some(2), 0), Some(1));
    // Removing a later track leaves it alone.
    assert_eq!(index_after_remove(Some(2), 3), Some(2));
    assert_eq!(index_after_remove(None, 0), None);
}

#[test]
fn index_after_move_follows_renumber_rules() {
    // Moving the current track carries the index with it.
    assert_eq!(index_after_move(Some(1), 1, 3), Some(3));
    // Moving from before the current track past it shifts it down.
    assert_eq!(index_after_move(Some(2), 0, 2), Some(1));
    assert_eq!(index_after_move(Some(2), 0, 4), Some(1));
    // Moving from after the current track to at-or-before it shifts it up.
    assert_eq!(index_after_move(Some(2), 4, 1), Some(3));
    assert_eq!(index_after_move(Some(2), 4, 2), Some(3));
    // Disjoint moves leave it alone.
    assert_eq!(index_after_move(Some(0), 1, 2), Some(0));
    assert_eq!(index_after_move(None, 0, 1), None);
}

#[test]
fn renumbered_index_stays_in_bounds() {
    // Exhaustive check over a small list: after any single edit the index
    // is either None or a valid position in the shrunk/perturbed list.
    let len = 4usize;
    for current in 0..len {
        for removed in 0..len {
            match index_after_remove(Some(current), removed) {
                None => assert_eq!(current, removed),
                Some(i) => assert!(i < len - 1),
            }
        }
        for from in 0..len {
            for to in 0..len {
                let moved = index_after_move(Some(current), from, to).unwrap();
                assert!(moved < len);
            }
        }
    }
}
