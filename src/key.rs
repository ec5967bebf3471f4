//! Resolution key types for the dependency injection container.

use std::any::TypeId;

use crate::error::{DiError, DiResult};

/// Rejects a name or group discriminator containing a backtick: backtick is
/// reserved for diagnostic rendering of keys and descriptors, so it cannot
/// appear inside one without corrupting those messages.
pub(crate) fn validate_discriminator(kind: &'static str, value: &'static str) -> DiResult<()> {
    if value.contains('`') {
        Err(DiError::Registration(format!(
            "{kind} `{value}` must not contain a backtick"
        )))
    } else {
        Ok(())
    }
}

/// Identity of a registration in the container: `(Type, Key?, Group?)`.
///
/// A `Key` is unique within a Provider; the registry maps each `Key` to a
/// `Descriptor` (or, for group keys, to an ordered list of descriptors).
/// `Named` and `Group` variants are mutually exclusive by construction —
/// there is no variant carrying both a name and a group.
///
/// # Examples
///
/// ```rust
/// use keelwork_di::{ServiceCollection, Resolver};
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(42u32);
/// services.add_named_singleton("config_port", 8080u32);
///
/// let provider = services.build().unwrap();
/// assert_eq!(*provider.get_required::<u32>(), 42);
/// assert_eq!(*provider.get_named_required::<u32>("config_port"), 8080);
/// ```
#[derive(Debug, Clone)]
pub enum Key {
    /// Concrete type, unkeyed, ungrouped.
    Type(TypeId, &'static str),
    /// Concrete type with a discriminator name.
    TypeNamed(TypeId, &'static str, &'static str),
    /// Concrete type belonging to a named group.
    TypeGroup(TypeId, &'static str, &'static str),
    /// Trait object, unkeyed, ungrouped.
    Trait(&'static str),
    /// Trait object with a discriminator name.
    TraitNamed(&'static str, &'static str),
    /// Trait object belonging to a named group.
    TraitGroup(&'static str, &'static str),
}

impl Key {
    /// Human-readable type or trait name for diagnostics.
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::TypeNamed(_, name, _) => name,
            Key::TypeGroup(_, name, _) => name,
            Key::Trait(name) => name,
            Key::TraitNamed(name, _) => name,
            Key::TraitGroup(name, _) => name,
        }
    }

    /// The discriminator name for keyed registrations, or `None`.
    pub fn service_name(&self) -> Option<&'static str> {
        match self {
            Key::TypeNamed(_, _, name) => Some(name),
            Key::TraitNamed(_, name) => Some(name),
            _ => None,
        }
    }

    /// The group name for grouped registrations, or `None`.
    pub fn group_name(&self) -> Option<&'static str> {
        match self {
            Key::TypeGroup(_, _, group) => Some(group),
            Key::TraitGroup(_, group) => Some(group),
            _ => None,
        }
    }

    /// Whether this key identifies a group collection rather than a single value.
    pub fn is_group(&self) -> bool {
        self.group_name().is_some()
    }

    /// The `TypeId` backing a concrete-type key, or `None` for trait keys
    /// (traits have no `TypeId`; decoration is TypeId-keyed and so only
    /// applies to concrete-type registrations).
    pub(crate) fn type_id(&self) -> Option<TypeId> {
        match self {
            Key::Type(id, ..) | Key::TypeNamed(id, ..) | Key::TypeGroup(id, ..) => Some(*id),
            Key::Trait(..) | Key::TraitNamed(..) | Key::TraitGroup(..) => None,
        }
    }

    /// The key naming only the group identity `(Type, Group)`, dropping any
    /// per-member distinction — used to look up the ordered descriptor list.
    pub fn group_key(&self) -> Option<Key> {
        match self {
            Key::TypeGroup(id, name, group) => Some(Key::TypeGroup(*id, name, group)),
            Key::TraitGroup(name, group) => Some(Key::TraitGroup(name, group)),
            _ => None,
        }
    }
}

// Hot path: TypeId-only comparison for concrete types.
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::TypeNamed(a, _, name_a), Key::TypeNamed(b, _, name_b)) => {
                a == b && name_a == name_b
            }
            (Key::TypeGroup(a, _, group_a), Key::TypeGroup(b, _, group_b)) => {
                a == b && group_a == group_b
            }
            (Key::Trait(a), Key::Trait(b)) => a == b,
            (Key::TraitNamed(a, name_a), Key::TraitNamed(b, name_b)) => {
                a == b && name_a == name_b
            }
            (Key::TraitGroup(a, group_a), Key::TraitGroup(b, group_b)) => {
                a == b && group_a == group_b
            }
            _ => false,
        }
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;

        fn rank(k: &Key) -> u8 {
            match k {
                Key::Type(..) => 0,
                Key::TypeNamed(..) => 1,
                Key::TypeGroup(..) => 2,
                Key::Trait(..) => 3,
                Key::TraitNamed(..) => 4,
                Key::TraitGroup(..) => 5,
            }
        }

        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a.cmp(b),
            (Key::TypeNamed(a, _, name_a), Key::TypeNamed(b, _, name_b)) => {
                a.cmp(b).then_with(|| name_a.cmp(name_b))
            }
            (Key::TypeGroup(a, _, group_a), Key::TypeGroup(b, _, group_b)) => {
                a.cmp(b).then_with(|| group_a.cmp(group_b))
            }
            (Key::Trait(a), Key::Trait(b)) => a.cmp(b),
            (Key::TraitNamed(a, name_a), Key::TraitNamed(b, name_b)) => {
                a.cmp(b).then_with(|| name_a.cmp(name_b))
            }
            (Key::TraitGroup(a, group_a), Key::TraitGroup(b, group_b)) => {
                a.cmp(b).then_with(|| group_a.cmp(group_b))
            }
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::TypeNamed(id, _, name) => {
                1u8.hash(state);
                id.hash(state);
                name.hash(state);
            }
            Key::TypeGroup(id, _, group) => {
                2u8.hash(state);
                id.hash(state);
                group.hash(state);
            }
            Key::Trait(name) => {
                3u8.hash(state);
                name.hash(state);
            }
            Key::TraitNamed(name, named) => {
                4u8.hash(state);
                name.hash(state);
                named.hash(state);
            }
            Key::TraitGroup(name, group) => {
                5u8.hash(state);
                name.hash(state);
                group.hash(state);
            }
        }
    }
}

/// Builds a `Key::Type` for `T`.
#[inline(always)]
pub fn key_of_type<T: 'static>() -> Key {
    Key::Type(std::any::TypeId::of::<T>(), std::any::type_name::<T>())
}

/// Builds a `Key::TypeNamed` for `T` discriminated by `name`.
#[inline(always)]
pub fn key_of_named<T: 'static>(name: &'static str) -> Key {
    Key::TypeNamed(std::any::TypeId::of::<T>(), std::any::type_name::<T>(), name)
}

/// Builds a `Key::TypeGroup` for `T` belonging to `group`.
#[inline(always)]
pub fn key_of_group<T: 'static>(group: &'static str) -> Key {
    Key::TypeGroup(std::any::TypeId::of::<T>(), std::any::type_name::<T>(), group)
}
