//! Service registration storage.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptors::DependencyRef;
use crate::error::DiResult;
use crate::key::Key;
use crate::lifetime::Lifetime;

#[cfg(feature = "once-cell")]
use once_cell::sync::OnceCell;

pub(crate) use crate::provider::ResolverContext;

/// Type-erased, thread-safe storage for a resolved instance.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// A single registration: lifetime, constructor, and declared dependencies.
pub(crate) struct Registration {
    pub(crate) lifetime: Lifetime,
    pub(crate) ctor: Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>,
    pub(crate) impl_type_id: Option<TypeId>,
    pub(crate) impl_type_name: Option<&'static str>,
    pub(crate) dependencies: Vec<DependencyRef>,
    /// Additional keys this registration is also reachable under.
    pub(crate) as_types: Vec<Key>,

    #[cfg(feature = "once-cell")]
    pub(crate) single_runtime: Option<OnceCell<AnyArc>>,
    #[cfg(not(feature = "once-cell"))]
    pub(crate) single_runtime: Option<Arc<std::sync::Mutex<Option<AnyArc>>>>,

    /// Assigned during `Registry::finalize`; `None` until then for Scoped lifetime.
    pub(crate) scoped_slot: Option<usize>,
}

impl Registration {
    pub(crate) fn new(
        lifetime: Lifetime,
        ctor: Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>,
        dependencies: Vec<DependencyRef>,
    ) -> Self {
        let single_runtime = match lifetime {
            Lifetime::Singleton => {
                #[cfg(feature = "once-cell")]
                {
                    Some(OnceCell::new())
                }
                #[cfg(not(feature = "once-cell"))]
                {
                    Some(Arc::new(std::sync::Mutex::new(None)))
                }
            }
            _ => None,
        };

        Self {
            lifetime,
            ctor,
            impl_type_id: None,
            impl_type_name: None,
            dependencies,
            as_types: Vec::new(),
            single_runtime,
            scoped_slot: None,
        }
    }

    /// Single-flight memoized access to this registration's Singleton slot.
    /// `f` runs at most once; a failed construction leaves the slot empty so
    /// a later resolution attempt can retry.
    pub(crate) fn get_or_init_singleton(
        &self,
        f: impl FnOnce() -> DiResult<AnyArc>,
    ) -> DiResult<AnyArc> {
        let cell = self
            .single_runtime
            .as_ref()
            .expect("get_or_init_singleton called on a non-Singleton registration");

        #[cfg(feature = "once-cell")]
        {
            cell.get_or_try_init(f).cloned()
        }
        #[cfg(not(feature = "once-cell"))]
        {
            let mut guard = cell.lock().unwrap();
            if let Some(existing) = guard.as_ref() {
                return Ok(existing.clone());
            }
            let value = f()?;
            *guard = Some(value.clone());
            Ok(value)
        }
    }
}

/// Identity of a registered node for dependency-graph and registration-order
/// bookkeeping. Distinct from `Key` only in that group members — which share
/// a single `Key` — get a disambiguating index.
#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) enum Node {
    Single(Key),
    GroupMember(Key, usize),
}

impl Node {
    pub(crate) fn display_name(&self) -> &'static str {
        match self {
            Node::Single(k) => k.display_name(),
            Node::GroupMember(k, _) => k.display_name(),
        }
    }
}

/// Registry holding every registration for a `ServiceCollection`.
pub(crate) struct Registry {
    /// Unkeyed and named registrations.
    pub(crate) entries: HashMap<Key, Registration>,
    /// `AsTypes` aliases: alias key -> primary key. Aliases share the
    /// primary's constructor and cache slot; they never cause re-invocation.
    pub(crate) aliases: HashMap<Key, Key>,
    /// Group registrations, keyed by the group's identity key, in registration order.
    pub(crate) groups: HashMap<Key, Vec<Registration>>,
    /// Global registration order, used for deterministic topological sort tie-breaking.
    pub(crate) order: Vec<Node>,
    /// Total scoped slots assigned by `finalize`.
    pub(crate) scoped_count: usize,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
            aliases: HashMap::new(),
            groups: HashMap::new(),
            order: Vec::new(),
            scoped_count: 0,
        }
    }

    /// Inserts or replaces an unkeyed/named registration.
    pub(crate) fn insert(&mut self, key: Key, registration: Registration) {
        for alias in &registration.as_types {
            self.aliases.insert(alias.clone(), key.clone());
        }
        if self.entries.insert(key.clone(), registration).is_none() {
            self.order.push(Node::Single(key));
        }
    }

    /// Appends a registration to the named group's ordered member list.
    pub(crate) fn insert_group_member(&mut self, group_key: Key, registration: Registration) {
        let members = self.groups.entry(group_key.clone()).or_default();
        let index = members.len();
        members.push(registration);
        self.order.push(Node::GroupMember(group_key, index));
    }

    pub(crate) fn get(&self, key: &Key) -> Option<&Registration> {
        self.entries.get(key).or_else(|| {
            self.aliases
                .get(key)
                .and_then(|primary| self.entries.get(primary))
        })
    }

    pub(crate) fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(key) || self.aliases.contains_key(key)
    }

    pub(crate) fn get_group(&self, group_key: &Key) -> Option<&Vec<Registration>> {
        self.groups.get(group_key)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Key, &Registration)> {
        self.entries.iter()
    }

    /// Every group member paired with its group's identity key, in no particular order.
    pub(crate) fn group_entries(&self) -> impl Iterator<Item = (&Key, &Registration)> {
        self.groups
            .iter()
            .flat_map(|(group_key, members)| members.iter().map(move |reg| (group_key, reg)))
    }

    pub(crate) fn node_registration(&self, node: &Node) -> Option<&Registration> {
        match node {
            Node::Single(key) => self.entries.get(key),
            Node::GroupMember(group_key, index) => {
                self.groups.get(group_key).and_then(|v| v.get(*index))
            }
        }
    }

    /// Assigns scoped slot indices across every registration, in registration order.
    pub(crate) fn finalize(&mut self) {
        let mut next_slot = 0usize;
        for node in &self.order {
            let reg = match node {
                Node::Single(key) => self.entries.get_mut(key),
                Node::GroupMember(group_key, index) => self
                    .groups
                    .get_mut(group_key)
                    .and_then(|v| v.get_mut(*index)),
            };
            if let Some(reg) = reg {
                if reg.lifetime == Lifetime::Scoped {
                    reg.scoped_slot = Some(next_slot);
                    next_slot += 1;
                }
            }
        }
        self.scoped_count = next_slot;
    }
}
