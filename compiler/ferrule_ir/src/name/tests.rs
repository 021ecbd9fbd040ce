use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_name_layout() {
    let name = Name::new(5, 1000);
    assert_eq!(name.shard(), 5);
    assert_eq!(name.local(), 1000);
}

#[test]
fn test_name_empty() {
    assert_eq!(Name::EMPTY.shard(), 0);
    assert_eq!(Name::EMPTY.local(), 0);
    assert_eq!(Name::default(), Name::EMPTY);
}

#[test]
fn test_name_hash() {
    use std::collections::HashSet;
    let mut set = HashSet::new();
    set.insert(Name::new(0, 1));
    set.insert(Name::new(0, 1));
    set.insert(Name::new(0, 2));
    assert_eq!(set.len(), 2);
}

#[test]
fn test_name_raw_roundtrips_layout() {
    let name = Name::new(15, Name::MAX_LOCAL);
    assert_eq!(name.raw() >> 28, 15);
    assert_eq!(name.local(), Name::MAX_LOCAL as usize);
}
