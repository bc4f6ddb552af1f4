//! Integration tests for the iniconf-core codec.
//!
//! These tests drive the reader and writer together through the public API,
//! using [`MemoryIo`] as the backing file system.

use std::path::Path;

use iniconf_core::{
    entry_id, CodecLimits, IniReader, IniWriter, MemoryIo, OrderedStore, Scalar, ScalarValue,
};

const PATH: &str = "settings.ini";

/// Writes `store` and reads it back into a fresh store.
fn write_then_read(
    limits: CodecLimits,
    store: &OrderedStore<ScalarValue>,
) -> (String, OrderedStore<ScalarValue>) {
    let io = MemoryIo::new();
    let path = Path::new(PATH);
    IniWriter::new(limits)
        .expect("limits must be valid")
        .write_store(&io, path, store)
        .expect("write must succeed");

    let mut reread = OrderedStore::new();
    IniReader::new(limits)
        .expect("limits must be valid")
        .parse_into(&io, path, &mut reread)
        .expect("read must succeed");
    (io.contents_string(path).unwrap_or_default(), reread)
}

fn pairs(store: &OrderedStore<ScalarValue>) -> Vec<(String, String)> {
    store
        .iter()
        .map(|(id, v)| (id.to_string(), v.as_string()))
        .collect()
}

#[test]
fn test_typed_values_survive_write_and_read() {
    // Arrange
    let mut store = OrderedStore::new();
    store.insert(entry_id("net", "port"), ScalarValue::new(24800u32));
    store.insert(entry_id("net", "offset"), ScalarValue::new(-42i32));
    store.insert(entry_id("net", "big"), ScalarValue::new(u64::MAX));
    store.insert(entry_id("ui", "scale"), ScalarValue::new(Scalar::double(1.23456, 3)));
    store.insert(entry_id("ui", "dark"), ScalarValue::new(true));
    store.insert(entry_id("ui", "title"), ScalarValue::new("hello  world"));

    // Act
    let (_, reread) = write_then_read(CodecLimits::default(), &store);

    // Assert
    let get = |s: &str, k: &str| reread.get(&entry_id(s, k)).expect("entry must exist");
    assert_eq!(get("net", "port").as_u32(), 24800);
    assert_eq!(get("net", "offset").as_i32(), -42);
    assert_eq!(get("net", "big").as_u64(), u64::MAX);
    assert!((get("ui", "scale").as_f64() - 1.235).abs() < 1e-9);
    assert!(get("ui", "dark").as_bool());
    assert_eq!(get("ui", "title").raw_text(), "hello  world");
    assert_eq!(pairs(&store), pairs(&reread));
}

#[test]
fn test_rendered_text_is_canonical() {
    let mut store = OrderedStore::new();
    store.insert(entry_id("b", "x"), ScalarValue::new(1));
    store.insert(entry_id("a", "y"), ScalarValue::new(false));

    let (text, _) = write_then_read(CodecLimits::default(), &store);

    assert_eq!(text, "[b]\nx=1\n\n[a]\ny=false\n");
}

#[test]
fn test_large_store_spans_many_chunks() {
    // Arrange – far more than one chunk at default limits
    let mut store = OrderedStore::new();
    for section in 0..20 {
        for key in 0..40 {
            store.insert(
                entry_id(&format!("section{section}"), &format!("key{key}")),
                ScalarValue::new(format!("value-{section}-{key}")),
            );
        }
    }

    // Act
    let (text, reread) = write_then_read(CodecLimits::default(), &store);

    // Assert
    assert!(text.len() > 5 * CodecLimits::default().chunk_size);
    assert_eq!(reread.len(), 800);
    assert_eq!(pairs(&store), pairs(&reread));
}

#[test]
fn test_small_limits_round_trip() {
    let limits = CodecLimits {
        chunk_size: 24,
        max_line_len: 20,
    };
    let mut store = OrderedStore::new();
    for i in 0..30 {
        store.insert(entry_id(&format!("s{}", i % 4), &format!("k{i}")), ScalarValue::new(i));
    }

    let (_, reread) = write_then_read(limits, &store);

    // Sections interleave, so the file repeats headers; every entry survives.
    assert_eq!(reread.len(), 30);
    for i in 0..30 {
        let id = entry_id(&format!("s{}", i % 4), &format!("k{i}"));
        assert_eq!(reread.get(&id).map(ScalarValue::as_i32), Some(i));
    }
}

#[test]
fn test_hand_edited_file_is_normalized_on_rewrite() {
    // Arrange – comments, odd spacing and junk lines
    let io = MemoryIo::new();
    let path = Path::new(PATH);
    io.insert(
        PATH,
        "; app settings\norphan=1\n[ net ]\n  port =  24800 # default\n[broken\nlost=1\n\
         [net]\nhost=example.org",
    );
    let mut store = OrderedStore::new();
    IniReader::new(CodecLimits::default())
        .unwrap()
        .parse_into(&io, path, &mut store)
        .unwrap();

    // Act
    IniWriter::new(CodecLimits::default())
        .unwrap()
        .write_store(&io, path, &store)
        .unwrap();

    // Assert
    assert_eq!(
        io.contents_string(path).unwrap(),
        "[net]\nport=24800\nhost=example.org\n"
    );
}
