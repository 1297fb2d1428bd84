//! The standard wildcard topic matcher.

use std::collections::HashMap;
use std::sync::Mutex;

use patchbay_core::Resolver;
use regex::Regex;

#[derive(Default)]
struct ResolverState {
    /// binding -> compiled matcher (`None` when compilation failed).
    compiled: HashMap<String, Option<Regex>>,
    /// topic -> binding -> outcome.
    outcomes: HashMap<String, HashMap<String, bool>>,
}

/// Compiles dot-segmented wildcard bindings into anchored regexes and
/// memoizes both the compilation and every match outcome.
///
/// Binding language: `*` matches exactly one segment, `#` matches zero or
/// more segments (including the separating dots), any other segment matches
/// itself literally. `"a.*.c"` matches `"a.b.c"` but not `"a.b.d.c"`;
/// `"a.#"` matches `"a.b"` and `"a.b.c"`.
///
/// Both caches grow without bound: there is no eviction, only the global
/// [`reset`](Resolver::reset), which clears them together under one lock.
pub struct BindingResolver {
    state: Mutex<ResolverState>,
}

impl BindingResolver {
    /// Creates a resolver with empty caches.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ResolverState::default()),
        }
    }

    /// Translates a binding into an anchored regex pattern.
    ///
    /// Segments after the first are preceded by `\.\b`, or by a bare `\b`
    /// when the previous segment was `#` (a `#` already consumed any
    /// trailing separators).
    fn translate(binding: &str) -> String {
        let mut pattern = String::from("^");
        let mut previous: Option<&str> = None;
        for segment in binding.split('.') {
            if let Some(prev) = previous {
                pattern.push_str(if prev == "#" { r"\b" } else { r"\.\b" });
            }
            match segment {
                "#" => pattern.push_str(r"[\s\S]*"),
                "*" => pattern.push_str("[^.]+"),
                literal => pattern.push_str(literal),
            }
            previous = Some(segment);
        }
        pattern.push('$');
        pattern
    }
}

impl Default for BindingResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver for BindingResolver {
    fn compare(&self, binding: &str, topic: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        if let Some(hit) = state.outcomes.get(topic).and_then(|m| m.get(binding)) {
            return *hit;
        }
        let matched = {
            let regex = state
                .compiled
                .entry(binding.to_string())
                .or_insert_with(|| match Regex::new(&Self::translate(binding)) {
                    Ok(regex) => Some(regex),
                    Err(err) => {
                        tracing::warn!(%binding, %err, "topic binding failed to compile");
                        None
                    }
                });
            regex.as_ref().is_some_and(|r| r.is_match(topic))
        };
        state
            .outcomes
            .entry(topic.to_string())
            .or_default()
            .insert(binding.to_string(), matched);
        matched
    }

    fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        state.compiled.clear();
        state.outcomes.clear();
    }
}
