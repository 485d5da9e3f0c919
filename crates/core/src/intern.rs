//! Symbol interning.
//!
//! A `Symbol` is an interned name, equal to another `Symbol` exactly when
//! they name the same string. Strings are stored once in a table and
//! referenced everywhere else by a small `Copy` handle, so `Symbol`
//! equality, hashing, and use as an environment-binding key are all O(1)
//! handle comparisons rather than string comparisons.

use ahash::AHashMap;

/// Interned handle for a symbol name.
///
/// `u32` keeps `Value` small; four billion distinct symbol names is far more
/// than any real program will intern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Builds a `Symbol` from a raw handle without going through an
    /// `Interner`. Only meaningful in tests that check structural behaviour
    /// (binding/lookup/aliasing) and never resolve the symbol back to text.
    #[cfg(test)]
    pub(crate) fn from_raw(id: u32) -> Self {
        Self(id)
    }
}

/// Bidirectional string/handle table.
///
/// One `Interner` is shared by every `Env` and `Value` in a single
/// interpreter instance; symbols interned against one table are meaningless
/// against another.
#[derive(Debug, Default)]
pub struct Interner {
    by_name: AHashMap<Box<str>, Symbol>,
    names: Vec<Box<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `name`, returning the existing handle if already interned.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = Symbol(self.names.len().try_into().expect("symbol table overflow"));
        let boxed: Box<str> = name.into();
        self.by_name.insert(boxed.clone(), id);
        self.names.push(boxed);
        id
    }

    /// Resolves a handle back to its string. Panics on a foreign/invalid handle,
    /// which indicates an implementation bug (mixing symbols across interners).
    #[must_use]
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.names[sym.index()]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
