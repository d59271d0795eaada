//! Process-wide interning of identifier text.
//!
//! Identifiers repeat constantly across files, and the parser retains them in the syntax tree,
//! so sharing one allocation per distinct name is a cheap win. The pool holds weak references:
//! entries whose last token died can be reclaimed, and the table itself is swept periodically so
//! it does not grow without bound over long sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use once_cell::sync::Lazy;

static IDENT_POOL: Lazy<Mutex<HashMap<Box<str>, Weak<str>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

// Sweep dead entries whenever the table grows past another multiple of this.
const SWEEP_INTERVAL: usize = 1024;

/// Returns the shared copy of `text`, inserting it if no live copy exists.
///
/// Safe to call from any number of threads; lexers for independent files share one pool.
pub fn intern(text: &str) -> Arc<str> {
    let mut pool = match IDENT_POOL.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(entry) = pool.get(text) {
        if let Some(live) = entry.upgrade() {
            return live;
        }
    }
    let shared: Arc<str> = Arc::from(text);
    pool.insert(Box::from(text), Arc::downgrade(&shared));
    if pool.len() % SWEEP_INTERVAL == 0 {
        pool.retain(|_, entry| entry.strong_count() > 0);
    }
    shared
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_shares_storage() {
        let a = intern("configure_make");
        let b = intern("configure_make");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(&*a, "configure_make");
    }

    #[test]
    fn distinct_text_is_distinct() {
        let a = intern("srcs");
        let b = intern("deps");
        assert_ne!(&*a, &*b);
    }

    #[test]
    fn reclaimed_names_can_be_interned_again() {
        let first = intern("short_lived_name");
        drop(first);
        let second = intern("short_lived_name");
        assert_eq!(&*second, "short_lived_name");
    }
}
