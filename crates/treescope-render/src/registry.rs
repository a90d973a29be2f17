#![forbid(unsafe_code)]

//! Type-dispatch registry.
//!
//! Handlers are registered per [`TypeKey`]. A lookup tries the key itself,
//! then its declared supertypes breadth-first, then the universal
//! [`TypeKey::object`] entry. Integrations are setup functions that populate a
//! registry; [`Registry::ensure_initialized`] runs each one at most once.

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::handler::NodeHandler;

/// Name of the type every lookup ends at.
pub const OBJECT_TYPE: &str = "object";

/// Registry key naming a value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(Rc<str>);

impl TypeKey {
    #[must_use]
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self(name.into())
    }

    /// The root of every supertype chain.
    #[must_use]
    pub fn object() -> Self {
        Self::new(OBJECT_TYPE)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named setup step that adds handlers and type declarations.
#[derive(Debug, Clone, Copy)]
pub struct Integration {
    pub name: &'static str,
    pub setup: fn(&mut Registry),
}

/// Handlers, supertype declarations, and immutable types.
#[derive(Default)]
pub struct Registry {
    handlers: FxHashMap<TypeKey, Rc<dyn NodeHandler>>,
    supertypes: FxHashMap<TypeKey, Vec<TypeKey>>,
    immutable: FxHashSet<TypeKey>,
    initialized: FxHashSet<&'static str>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `key`, returning the handler it replaces.
    pub fn register(
        &mut self,
        key: impl Into<TypeKey>,
        handler: impl NodeHandler + 'static,
    ) -> Option<Rc<dyn NodeHandler>> {
        self.handlers.insert(key.into(), Rc::new(handler))
    }

    /// Declare direct supertypes of `key`, searched in the given order.
    pub fn declare_supertypes<I>(&mut self, key: impl Into<TypeKey>, supertypes: I)
    where
        I: IntoIterator,
        I::Item: Into<TypeKey>,
    {
        let entry = self.supertypes.entry(key.into()).or_default();
        for supertype in supertypes {
            let supertype = supertype.into();
            if !entry.contains(&supertype) {
                entry.push(supertype);
            }
        }
    }

    /// Treat values of `key` (and its subtypes) as safe to share.
    pub fn mark_immutable(&mut self, key: impl Into<TypeKey>) {
        self.immutable.insert(key.into());
    }

    /// Whether `key` or one of its supertypes was marked immutable.
    #[must_use]
    pub fn is_immutable(&self, key: &TypeKey) -> bool {
        self.ancestry(key).iter().any(|k| self.immutable.contains(k))
    }

    /// The handler for `key`: direct match, then supertypes breadth-first,
    /// then `object`.
    #[must_use]
    pub fn lookup(&self, key: &TypeKey) -> Option<&dyn NodeHandler> {
        let object = TypeKey::object();
        self.ancestry(key)
            .iter()
            .chain(std::iter::once(&object))
            .find_map(|k| self.handlers.get(k))
            .map(|h| h.as_ref())
    }

    /// Every handler that applies to a value with `keys`, in fallback order.
    #[must_use]
    pub fn resolve(&self, keys: &[TypeKey]) -> Vec<&dyn NodeHandler> {
        let mut order: Vec<TypeKey> = Vec::new();
        for key in keys {
            for k in self.ancestry(key) {
                if !order.contains(&k) {
                    order.push(k);
                }
            }
        }
        let object = TypeKey::object();
        if !order.contains(&object) {
            order.push(object);
        }
        order
            .iter()
            .filter_map(|k| self.handlers.get(k))
            .map(|h| h.as_ref())
            .collect()
    }

    /// Run each integration not yet run on this registry. Returns how many ran.
    pub fn ensure_initialized(&mut self, integrations: &[Integration]) -> usize {
        let mut ran = 0;
        for integration in integrations {
            if self.initialized.insert(integration.name) {
                (integration.setup)(self);
                treescope_core::debug!(integration = integration.name, "registry integration set up");
                ran += 1;
            }
        }
        ran
    }

    /// Whether the named integration has run.
    #[must_use]
    pub fn is_initialized(&self, name: &str) -> bool {
        self.initialized.contains(name)
    }

    // `key` followed by its declared supertypes, breadth-first, without repeats.
    fn ancestry(&self, key: &TypeKey) -> Vec<TypeKey> {
        let mut seen = vec![key.clone()];
        let mut queue = VecDeque::from([key.clone()]);
        while let Some(current) = queue.pop_front() {
            for supertype in self.supertypes.get(&current).into_iter().flatten() {
                if !seen.contains(supertype) {
                    seen.push(supertype.clone());
                    queue.push_back(supertype.clone());
                }
            }
        }
        seen
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<&str> = self.handlers.keys().map(TypeKey::name).collect();
        handlers.sort_unstable();
        let mut initialized: Vec<&str> = self.initialized.iter().copied().collect();
        initialized.sort_unstable();
        f.debug_struct("Registry")
            .field("handlers", &handlers)
            .field("supertypes", &self.supertypes.len())
            .field("immutable", &self.immutable.len())
            .field("initialized", &initialized)
            .finish()
    }
}
