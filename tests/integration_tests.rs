use rwshard::{Error, LockedMap, ShardMap, ShardMapBuilder};

#[test]
fn test_basic_set_get() {
    let map = ShardMap::with_shards(4).unwrap();

    map.set("a", 1);
    map.set("b", 2);
    map.set("a", 3);

    assert_eq!(map.len(), 2);
    assert_eq!(map.get_ok(&"a"), Some(3));
    assert_eq!(map.get_ok(&"c"), None);
    assert_eq!(map.get(&"c"), 0);
}

#[test]
fn test_set_is_idempotent() {
    let map = ShardMap::new();

    map.set("k", 5);
    map.set("k", 5);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&"k"), 5);
}

#[test]
fn test_set_if_not_exists() {
    let map = ShardMap::new();

    assert!(map.set_if_not_exists("k", "v1"));
    assert!(!map.set_if_not_exists("k", "v2"));
    assert_eq!(map.get(&"k"), "v1");
}

#[test]
fn test_swap() {
    let map = ShardMap::new();

    map.set("k", 10);
    assert_eq!(map.swap("k", 20), 10);
    assert_eq!(map.get(&"k"), 20);

    // Swapping an absent key returns the default and installs the value.
    assert_eq!(map.swap("fresh", 1), 0);
    assert_eq!(map.get_ok(&"fresh"), Some(1));
}

#[test]
fn test_delete_and_get() {
    let map = ShardMap::new();

    map.set("k", 7);
    assert_eq!(map.delete_and_get(&"k"), 7);
    assert!(!map.has(&"k"));
    assert_eq!(map.delete_and_get(&"k"), 0);
}

#[test]
fn test_delete_is_idempotent() {
    let map = ShardMap::new();

    map.set("k", 1);
    map.delete(&"k");
    map.delete(&"k");
    assert!(!map.has(&"k"));
    assert!(map.is_empty());
}

#[test]
fn test_remove_returns_option() {
    let map = ShardMap::new();

    map.set("key1", "value1");
    assert_eq!(map.remove(&"key1"), Some("value1"));
    assert_eq!(map.remove(&"key1"), None);
}

#[test]
fn test_update() {
    let map = ShardMap::new();

    map.set("counter", 0);
    map.update("counter", |v| v + 1);
    assert_eq!(map.get(&"counter"), 1);

    map.update("counter", |v| v + 10);
    assert_eq!(map.get(&"counter"), 11);
}

#[test]
fn test_update_identity_keeps_present_and_stores_default_for_absent() {
    let map: ShardMap<&str, i32> = ShardMap::new();

    // Present key: identity leaves the value and the size unchanged.
    map.set("present", 4);
    map.update("present", |v| v);
    assert_eq!(map.get_ok(&"present"), Some(4));
    assert_eq!(map.len(), 1);

    // Absent key: the result of f(default) is always stored.
    map.update("absent", |v| v);
    assert_eq!(map.get_ok(&"absent"), Some(0));
    assert!(map.has(&"absent"));
    assert_eq!(map.len(), 2);
}

#[test]
fn test_option_values_use_none_as_absent() {
    let map: ShardMap<u32, Option<String>> = ShardMap::new();

    map.set(1, Some("one".to_string()));
    assert_eq!(map.get(&1), Some("one".to_string()));
    assert_eq!(map.get(&2), None);
    assert_eq!(map.swap(2, Some("two".to_string())), None);
}

#[test]
fn test_len_and_is_empty() {
    let map = ShardMap::new();

    assert!(map.is_empty());
    assert_eq!(map.len(), 0);

    map.set("key1", "value1");
    assert!(!map.is_empty());
    assert_eq!(map.len(), 1);

    map.set("key2", "value2");
    assert_eq!(map.len(), 2);

    map.delete(&"key1");
    assert_eq!(map.len(), 1);
}

#[test]
fn test_keys() {
    let map = ShardMap::with_shards(8).unwrap();
    for i in 0..50 {
        map.set(i, i * 2);
    }

    let mut keys = map.keys();
    keys.sort_unstable();
    assert_eq!(keys, (0..50).collect::<Vec<_>>());
}

#[test]
fn test_keys_are_in_shard_order() {
    let map = ShardMap::with_shards(4).unwrap();
    for i in 0..40 {
        map.set(i, ());
    }

    let shards: Vec<usize> = map.keys().iter().map(|k| map.shard_index(k)).collect();
    assert!(shards.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_stats() {
    let map = ShardMap::with_shards(16).unwrap();

    map.set("key1", "value1");
    map.set("key2", "value2");
    map.get_ok(&"key1");
    map.delete(&"key1");

    let stats = map.stats();
    assert_eq!(stats.size, 1);
    assert_eq!(stats.shard_sizes.len(), 16);
    assert_eq!(stats.operations.len(), 16);

    let total_ops: u64 = stats
        .operations
        .iter()
        .map(|op| op.reads + op.writes + op.removes)
        .sum();
    if cfg!(feature = "metrics") {
        assert!(total_ops > 0);
    } else {
        assert_eq!(total_ops, 0);
    }
}

#[test]
fn test_builder() {
    let map = ShardMapBuilder::new()
        .shard_count(8)
        .unwrap()
        .capacity_per_shard(16)
        .build::<String, i32>()
        .unwrap();

    map.set("test".to_string(), 42);
    assert_eq!(map.get(&"test".to_string()), 42);
    assert_eq!(map.num_shards(), 8);
}

#[test]
fn test_builder_invalid_shard_count() {
    // Not a power of two
    assert_eq!(
        ShardMapBuilder::new().shard_count(7).unwrap_err(),
        Error::InvalidShardCount { requested: 7 }
    );

    // Zero coerces to the default
    assert!(ShardMapBuilder::new().shard_count(0).is_ok());
}

#[test]
fn test_with_shards() {
    assert_eq!(ShardMap::<u8, u8>::with_shards(0).unwrap().num_shards(), 256);
    assert_eq!(ShardMap::<u8, u8>::with_shards(1).unwrap().num_shards(), 1);
    assert!(ShardMap::<u8, u8>::with_shards(100).is_err());
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_shard_count_beyond_32_bit_hash_is_rejected() {
    assert_eq!(
        ShardMapBuilder::new().shard_count(1 << 33).unwrap_err(),
        Error::InvalidShardCount { requested: 1 << 33 }
    );
    assert!(ShardMap::<u8, u8>::with_shards(1 << 34).is_err());
}

#[test]
fn test_error_message() {
    let err = ShardMap::<u8, u8>::with_shards(6).unwrap_err();
    assert_eq!(err.to_string(), "shard count must be a power of two, got 6");
}

#[test]
fn test_shard_for_key_is_the_owning_shard() {
    let map = ShardMap::with_shards(8).unwrap();
    map.set("key", 1);

    let shard: &LockedMap<&str, i32> = map.shard_for_key(&"key");
    assert_eq!(shard.len(), 1);
    assert_eq!(shard.get_ok(&"key"), Some(1));
}

#[test]
fn test_locked_map_standalone() {
    let map = LockedMap::with_capacity(4);
    map.set("a".to_string(), 1);

    assert!(map.has(&"a".to_string()));
    assert_eq!(map.swap("a".to_string(), 2), 1);
    assert!(!map.is_empty());
    assert_eq!(map.delete_and_get(&"a".to_string()), 2);
    assert!(map.is_empty());
}
