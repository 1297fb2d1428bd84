//! Wildcard binding semantics, straight against the standard resolver.

use patchbay::{BindingResolver, Resolver};

#[test]
fn hash_matches_zero_or_more_segments() {
    let resolver = BindingResolver::new();
    assert!(resolver.compare("a.#", "a.b.c"));
    assert!(resolver.compare("#", "anything.at.all"));
    assert!(resolver.compare("a.#.d", "a.b.c.d"));
}

#[test]
fn star_matches_exactly_one_segment() {
    let resolver = BindingResolver::new();
    assert!(resolver.compare("a.*.c", "a.b.c"));
    assert!(!resolver.compare("a.*", "a.b.c"));
}

#[test]
fn literal_bindings_are_exact() {
    let resolver = BindingResolver::new();
    assert!(resolver.compare("a.b", "a.b"));
    assert!(!resolver.compare("a.b", "a.b.c"));
}

#[test]
fn wildcards_compose() {
    let resolver = BindingResolver::new();
    assert!(resolver.compare("*.#", "a.b.c"));
    assert!(resolver.compare("a.*.#", "a.b.c"));
    assert!(!resolver.compare("b.*.#", "a.b.c"));
}

#[test]
fn comparisons_survive_a_reset() {
    let resolver = BindingResolver::new();
    assert!(resolver.compare("a.#", "a.b"));
    resolver.reset();
    assert!(resolver.compare("a.#", "a.b"));
    assert!(!resolver.compare("a.b", "a.b.c"));
}
