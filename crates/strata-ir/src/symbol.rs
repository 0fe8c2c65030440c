//! Process-wide interned names.
//!
//! Dialect names, op names and attribute keys are compared on every pattern
//! match, so they are interned once into a shared `lasso` table and passed
//! around as 4-byte keys.

use std::fmt;
use std::sync::LazyLock;

use lasso::{Rodeo, Spur};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};

static TABLE: LazyLock<RwLock<Rodeo>> = LazyLock::new(|| RwLock::new(Rodeo::default()));

/// An interned name such as `hl`, `cond_br` or `kind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Spur);

impl Symbol {
    pub fn new(text: &'static str) -> Self {
        Self::lookup_or(text, |table| table.get_or_intern_static(text))
    }

    /// Intern a name built at runtime, e.g. `i32` from a width.
    pub fn from_dynamic(text: &str) -> Self {
        Self::lookup_or(text, |table| table.get_or_intern(text))
    }

    // Most names are already interned, so only a miss takes the write lock.
    fn lookup_or(text: &str, insert: impl FnOnce(&mut Rodeo) -> Spur) -> Self {
        let guard = TABLE.upgradable_read();
        let existing = guard.get(text);
        if let Some(key) = existing {
            return Symbol(key);
        }
        let mut table = RwLockUpgradableReadGuard::upgrade(guard);
        Symbol(insert(&mut table))
    }

    /// Borrow the text. Nested calls are fine: the lock is taken recursively.
    pub fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let table = TABLE.read_recursive();
        f(table.resolve(&self.0))
    }
}

impl From<&'static str> for Symbol {
    fn from(text: &'static str) -> Self {
        Symbol::new(text)
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.with_str(|text| text == other)
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<Symbol> for &str {
    fn eq(&self, other: &Symbol) -> bool {
        other == self
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|text| f.write_str(text))
    }
}

/// Define zero-argument functions returning fixed symbols.
///
/// ```
/// strata_ir::symbols! {
///     ATTR_KIND => "kind",
/// }
///
/// assert_eq!(ATTR_KIND(), "kind");
/// ```
#[macro_export]
macro_rules! symbols {
    ($($(#[$meta:meta])* $name:ident => $text:literal),* $(,)?) => {
        $(
            $(#[$meta])*
            #[allow(non_snake_case)]
            #[inline]
            pub fn $name() -> $crate::Symbol {
                $crate::Symbol::new($text)
            }
        )*
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_and_dynamic_names_agree() {
        let width = 1;
        assert_eq!(Symbol::new("i1"), Symbol::from_dynamic(&format!("i{width}")));
        assert_ne!(Symbol::new("scope"), Symbol::new("scope_ret"));
    }

    #[test]
    fn compares_with_text_both_ways() {
        let sym = Symbol::new("cond_br");
        assert!(sym == "cond_br");
        assert!("cond_br" == sym);
        assert_eq!(sym.to_string(), "cond_br");
    }

    #[test]
    fn with_str_nests() {
        let dialect = Symbol::new("ll");
        let name = Symbol::new("br");
        let full = dialect.with_str(|d| name.with_str(|n| format!("{d}.{n}")));
        assert_eq!(full, "ll.br");
    }
}
