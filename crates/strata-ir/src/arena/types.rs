//! Locations, attributes, and the type/path interners.

use std::collections::HashMap;
use std::hash::Hash;

use cranelift_entity::{EntityRef, PrimaryMap};
use smallvec::SmallVec;

use super::refs::{PathRef, TypeRef};
use crate::location::Span;
use crate::symbol::Symbol;

/// Source location attached to ops, blocks and regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub path: PathRef,
    pub span: Span,
}

impl Location {
    pub const fn new(path: PathRef, span: Span) -> Self {
        Self { path, span }
    }
}

/// Constant payloads carried by operations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    Bool(bool),
    /// Signless integer bits; the width comes from the result type.
    IntBits(u64),
    Symbol(Symbol),
}

impl Attribute {
    pub fn as_symbol(&self) -> Option<Symbol> {
        if let Attribute::Symbol(sym) = self {
            Some(*sym)
        } else {
            None
        }
    }
}

impl From<bool> for Attribute {
    fn from(flag: bool) -> Self {
        Attribute::Bool(flag)
    }
}

impl From<i64> for Attribute {
    fn from(n: i64) -> Self {
        Attribute::IntBits(n as u64)
    }
}

impl From<Symbol> for Attribute {
    fn from(sym: Symbol) -> Self {
        Attribute::Symbol(sym)
    }
}

/// A type is a `dialect.name` pair with optional type parameters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeData {
    pub dialect: Symbol,
    pub name: Symbol,
    pub params: SmallVec<[TypeRef; 2]>,
}

impl TypeData {
    pub fn new(dialect: Symbol, name: Symbol) -> Self {
        Self {
            dialect,
            name,
            params: SmallVec::new(),
        }
    }
}

/// Hash-consing table: equal values share one key.
struct Interner<K: EntityRef, V> {
    entries: PrimaryMap<K, V>,
    lookup: HashMap<V, K>,
}

impl<K: EntityRef, V: Clone + Eq + Hash> Interner<K, V> {
    fn new() -> Self {
        Self {
            entries: PrimaryMap::new(),
            lookup: HashMap::new(),
        }
    }

    fn intern(&mut self, value: V) -> K {
        if let Some(&key) = self.lookup.get(&value) {
            return key;
        }
        let key = self.entries.push(value.clone());
        self.lookup.insert(value, key);
        key
    }
}

/// Interned types of one [`IrContext`](super::IrContext).
pub struct TypeInterner(Interner<TypeRef, TypeData>);

impl TypeInterner {
    pub fn new() -> Self {
        Self(Interner::new())
    }

    pub fn intern(&mut self, data: TypeData) -> TypeRef {
        self.0.intern(data)
    }

    /// Intern a parameterless `dialect.name` type.
    pub fn named(&mut self, dialect: &'static str, name: &str) -> TypeRef {
        self.intern(TypeData::new(
            Symbol::new(dialect),
            Symbol::from_dynamic(name),
        ))
    }

    pub fn get(&self, ty: TypeRef) -> &TypeData {
        &self.0.entries[ty]
    }

    /// `core.i<width>`.
    pub fn int(&mut self, width: u32) -> TypeRef {
        self.named("core", &format!("i{width}"))
    }

    /// `core.i1`, the type every branch condition ends up with.
    pub fn bool(&mut self) -> TypeRef {
        self.int(1)
    }

    /// Width of a `core.i<N>` type. Anything else, including `core.i`
    /// without digits and `i<N>` outside `core`, has none.
    pub fn integer_width(&self, ty: TypeRef) -> Option<u32> {
        let data = self.get(ty);
        if data.dialect != Symbol::new("core") || !data.params.is_empty() {
            return None;
        }
        data.name.with_str(|name| {
            let digits = name.strip_prefix('i')?;
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse::<u32>().ok().filter(|&width| width > 0)
        })
    }

    pub fn is_bool(&self, ty: TypeRef) -> bool {
        self.integer_width(ty) == Some(1)
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Interned source file names.
pub struct PathInterner(Interner<PathRef, String>);

impl PathInterner {
    pub fn new() -> Self {
        Self(Interner::new())
    }

    pub fn intern(&mut self, path: impl Into<String>) -> PathRef {
        self.0.intern(path.into())
    }

    pub fn get(&self, path: PathRef) -> &str {
        &self.0.entries[path]
    }
}

impl Default for PathInterner {
    fn default() -> Self {
        Self::new()
    }
}
