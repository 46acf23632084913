//! One simple load test: concurrent writes, deletes and iteration, then verify state and introspection.

use rwshard::{CancelToken, IterResult, ShardMap};
use std::sync::Arc;
use std::thread;

#[test]
fn test_under_load_then_introspect() {
    let map = Arc::new(ShardMap::with_shards(64).unwrap());
    let mut handles = vec![];

    for t in 0..4 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for i in 0..2000 {
                let key = format!("t{}_k{}", t, i);
                map.set(key, i);
            }
            for i in 0..2000 {
                let key = format!("t{}_k{}", t, i);
                assert_eq!(map.delete_and_get(&key), i);
            }
        });
        handles.push(handle);
    }

    // Iterate in both modes while the writers run.
    for _ in 0..2 {
        let map = Arc::clone(&map);
        handles.push(thread::spawn(move || {
            for _ in 0..20 {
                map.for_each(|_, _| -> IterResult { Ok(()) }).unwrap();
                map.for_each_locked(|_, _| -> IterResult { Ok(()) }).unwrap();
                let cancel = CancelToken::new();
                let _ = map.iter(&cancel, 16).into_iter().take(50).count();
                cancel.cancel();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    let stats = map.stats();
    assert_eq!(stats.shard_sizes.iter().sum::<usize>(), 0);
}
