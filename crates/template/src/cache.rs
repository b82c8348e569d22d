//! Memoization of compiled patterns.

use crate::error::Result;
use crate::pattern::{self, Pattern};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

/// Compile-once cache of [`Pattern`]s, keyed by the template text after
/// sub-template expansion.
///
/// Readers share the lock; a miss takes the write lock and compiles while
/// holding it, so concurrent misses for the same template compile once.
/// Entries live until [`clear`](Self::clear) is called on a configuration
/// reload.
#[derive(Debug, Default)]
pub struct PatternCache {
    patterns: RwLock<HashMap<String, Arc<Pattern>>>,
}
impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compiled pattern for `template`, compiling it on first use.
    pub fn get_or_compile(&self, template: &str, templates: &BTreeMap<String, String>) -> Result<Arc<Pattern>> {
        let expanded = pattern::expand(template, templates);
        if let Some(pattern) = self.patterns.read().unwrap_or_else(PoisonError::into_inner).get(&expanded) {
            return Ok(Arc::clone(pattern));
        }
        let mut patterns = self.patterns.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have compiled it while we waited for the lock.
        if let Some(pattern) = patterns.get(&expanded) {
            return Ok(Arc::clone(pattern));
        }
        let compiled = Arc::new(pattern::compile_expanded(&expanded)?);
        tracing::debug!(template = expanded.as_str(), "Compiled path pattern");
        patterns.insert(expanded, Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Forgets every compiled pattern.
    pub fn clear(&self) {
        self.patterns.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub fn len(&self) -> usize {
        self.patterns.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiles_once() {
        let cache = PatternCache::new();
        let templates = BTreeMap::new();
        let a = cache.get_or_compile("%Y/%m", &templates).unwrap();
        let b = cache.get_or_compile("%Y/%m", &templates).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keyed_on_expanded_text() {
        let cache = PatternCache::new();
        let year = BTreeMap::from([("date".to_string(), "%Y".to_string())]);
        let month = BTreeMap::from([("date".to_string(), "%m".to_string())]);
        let a = cache.get_or_compile("%date", &year).unwrap();
        let b = cache.get_or_compile("%date", &month).unwrap();
        assert_ne!(a, b);
        // Same text once expanded, so it's the same entry.
        let c = cache.get_or_compile("%Y", &BTreeMap::new()).unwrap();
        assert!(Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = PatternCache::new();
        assert!(cache.get_or_compile("\"open", &BTreeMap::new()).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = PatternCache::new();
        cache.get_or_compile("%Y", &BTreeMap::new()).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
