//! Dictionary build/load/lookup round-trip, and on-disk `open()` via mmap.

use khmer_core::{dictionary, Dictionary, DictionaryError};
use std::io::Write;

fn words() -> Vec<(Vec<u8>, f32)> {
    vec![
        ("កង".as_bytes().to_vec(), 2.5),
        ("កងកម្លាំង".as_bytes().to_vec(), 1.0),
        ("រក្សា".as_bytes().to_vec(), 3.0),
        ("សន្តិសុខ".as_bytes().to_vec(), 4.0),
        ("ដុល្លារ".as_bytes().to_vec(), 2.0),
    ]
}

#[test]
fn builds_and_loads_from_owned_bytes() {
    let blob = dictionary::build(&words(), 8.0, 10.0);
    let dict = Dictionary::from_bytes(blob).unwrap();
    for (word, cost) in words() {
        assert_eq!(dict.lookup(&word), Some(cost));
    }
    assert_eq!(dict.lookup("មិនមាន".as_bytes()), None);
}

#[test]
fn opens_from_a_memory_mapped_file() {
    let blob = dictionary::build(&words(), 8.0, 10.0);
    let mut path = std::env::temp_dir();
    path.push(format!("khmer_dictionary_test_{}.kdict", std::process::id()));
    {
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&blob).unwrap();
    }

    let dict = Dictionary::open(&path).unwrap();
    assert_eq!(dict.lookup("កងកម្លាំង".as_bytes()), Some(1.0));

    std::fs::remove_file(&path).ok();
}

#[test]
fn open_reports_io_error_for_missing_file() {
    let err = Dictionary::open("/nonexistent/path/khmer.kdict").unwrap_err();
    assert!(matches!(err, khmer_core::OpenError::Io(_)));
}

#[test]
fn rejects_corrupted_blob() {
    let mut blob = dictionary::build(&words(), 8.0, 10.0);
    blob.truncate(16);
    let err = Dictionary::from_bytes(blob).unwrap_err();
    assert!(matches!(err, DictionaryError::Truncated { .. }));
}

#[test]
fn max_word_length_matches_longest_entry() {
    let dict = Dictionary::from_bytes(dictionary::build(&words(), 8.0, 10.0)).unwrap();
    let longest = words().iter().map(|(w, _)| w.len()).max().unwrap();
    assert_eq!(dict.max_word_length() as usize, longest);
}
