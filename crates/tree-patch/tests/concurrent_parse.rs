//! Parsing from several threads at once, starting with an unbuilt catalog.
//!
//! Kept in its own test binary so no other test has touched the catalog
//! before the threads race to build it.

use std::sync::Barrier;
use std::thread;

use tree_patch::{parse_bytes, type_system, Op, Operation, Path};
use tree_patch_codec::JsonCodec;

const THREADS: usize = 8;

const DOC: &[u8] = br#"[
    {"op": "add", "path": "/a", "value": {"n": 1}},
    {"op": "move", "path": "/b", "from": "/a"},
    {"op": "test", "path": "/b/n", "value": 1}
]"#;

#[test]
fn first_use_from_many_threads_agrees() {
    let barrier = Barrier::new(THREADS);
    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    let ops = parse_bytes(DOC, &JsonCodec::plain()).unwrap();
                    (ops, type_system())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let (first, system) = &results[0];
    assert_eq!(first.len(), 3);
    assert_eq!(first[1], Operation::new(Op::Move, Path::parse("/b")).with_from(Path::parse("/a")));
    for (ops, other) in &results[1..] {
        assert_eq!(ops, first);
        assert!(std::ptr::eq(*other, *system), "catalog built more than once");
    }
}
