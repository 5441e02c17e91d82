use indexmap::IndexMap;
use std::{borrow::Borrow, fmt, hash::Hash, ops};

/// Returns `true` if the character may appear in a simple SMT-LIB symbol.
pub fn is_symbol_character(ch: char) -> bool {
    match ch {
        ch if ch.is_ascii_alphanumeric() => true,
        '+' | '-' | '/' | '*' | '=' | '%' | '?' | '!' | '.' | '$' | '_' | '~' | '&' | '^' | '<'
        | '>' | '@' => true,

        // `'` is not a symbol character in SMT-LIB, but it is appended to bound variables when
        // they are renamed apart. Accepting it means printed formulas can be read back
        '\'' => true,
        _ => false,
    }
}

/// A stack of scopes, each mapping keys to values. Lookups search the scopes from the innermost
/// to the outermost, so inner bindings shadow outer ones.
#[derive(Debug)]
pub struct HashMapStack<K, V> {
    scopes: Vec<IndexMap<K, V>>,
}

impl<K, V> HashMapStack<K, V> {
    pub fn new() -> Self {
        Self { scopes: vec![IndexMap::new()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    pub fn pop_scope(&mut self) {
        match self.scopes.len() {
            0 => unreachable!(),
            1 => panic!("trying to pop last scope in `HashMapStack`"),
            _ => {
                self.scopes.pop();
            }
        }
    }
}

impl<K: Eq + Hash, V> HashMapStack<K, V> {
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.scopes.iter().rev().find_map(|scope| scope.get(key))
    }

    pub fn insert(&mut self, key: K, value: V) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(key, value);
        }
    }
}

impl<K, V> Default for HashMapStack<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// An inclusive range of accepted values, where either end may be open. Used to describe the
/// expected number of arguments in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range<T = usize>(Option<T>, Option<T>);

impl<T: PartialOrd> Range<T> {
    pub fn contains(&self, n: T) -> bool {
        self.0.as_ref().map_or(true, |bound| n >= *bound)
            && self.1.as_ref().map_or(true, |bound| n <= *bound)
    }
}

impl<T: fmt::Display + PartialEq> fmt::Display for Range<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Range(Some(a), Some(b)) if a == b => write!(f, "{}", a),
            Range(Some(a), Some(b)) => write!(f, "between {} and {}", a, b),
            Range(Some(a), None) => write!(f, "at least {}", a),
            Range(None, Some(b)) => write!(f, "up to {}", b),
            Range(None, None) => write!(f, "any number of"),
        }
    }
}

impl From<usize> for Range {
    fn from(n: usize) -> Self {
        Self(Some(n), Some(n))
    }
}

impl From<ops::Range<usize>> for Range {
    fn from(r: ops::Range<usize>) -> Self {
        Self(Some(r.start), Some(r.end - 1))
    }
}

impl From<ops::RangeFrom<usize>> for Range {
    fn from(r: ops::RangeFrom<usize>) -> Self {
        Self(Some(r.start), None)
    }
}
