//! Principals and attribute resolution.
//!
//! A principal answers two kinds of questions: "is flag `x` set?" and "which
//! groups does relation `x` hold?". Answers come from an ordered list of
//! resolvers: the principal's own attributes first, then each registered
//! extension. The first resolver that knows the attribute wins.

use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

/// A collection of group identifiers under one relation attribute.
pub type GroupSet = BTreeSet<String>;

/// The value of a principal attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum AttributeValue {
    /// A boolean attribute such as `is_staff`.
    Flag(bool),
    /// A relation attribute such as `leagues`.
    Groups(GroupSet),
}

/// Resolves principal attributes by name.
///
/// `None` means the source does not know the attribute. Asking for a flag that
/// is stored as groups (or the reverse) is also `None`.
pub trait AttributeSource {
    fn flag(&self, name: &str) -> Option<bool>;

    fn groups(&self, name: &str) -> Option<Cow<'_, GroupSet>>;
}

impl<T: AttributeSource + ?Sized> AttributeSource for &T {
    fn flag(&self, name: &str) -> Option<bool> {
        (**self).flag(name)
    }

    fn groups(&self, name: &str) -> Option<Cow<'_, GroupSet>> {
        (**self).groups(name)
    }
}

impl<T: AttributeSource + ?Sized> AttributeSource for Arc<T> {
    fn flag(&self, name: &str) -> Option<bool> {
        (**self).flag(name)
    }

    fn groups(&self, name: &str) -> Option<Cow<'_, GroupSet>> {
        (**self).groups(name)
    }
}

impl<T: AttributeSource + ?Sized> AttributeSource for Box<T> {
    fn flag(&self, name: &str) -> Option<bool> {
        (**self).flag(name)
    }

    fn groups(&self, name: &str) -> Option<Cow<'_, GroupSet>> {
        (**self).groups(name)
    }
}

/// A map-backed attribute source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Attributes {
    values: BTreeMap<String, AttributeValue>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.values.insert(name.into(), AttributeValue::Flag(value));
        self
    }

    #[must_use]
    pub fn with_groups<I, S>(mut self, name: impl Into<String>, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let groups = groups.into_iter().map(Into::into).collect();
        self.values
            .insert(name.into(), AttributeValue::Groups(groups));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }
}

impl AttributeSource for Attributes {
    fn flag(&self, name: &str) -> Option<bool> {
        match self.values.get(name)? {
            AttributeValue::Flag(value) => Some(*value),
            AttributeValue::Groups(_) => None,
        }
    }

    fn groups(&self, name: &str) -> Option<Cow<'_, GroupSet>> {
        match self.values.get(name)? {
            AttributeValue::Groups(groups) => Some(Cow::Borrowed(groups)),
            AttributeValue::Flag(_) => None,
        }
    }
}

type Resolver = Arc<dyn AttributeSource + Send + Sync>;

/// The actor a visibility decision is made for.
///
/// Cloning is cheap: resolvers are shared.
#[derive(Clone)]
pub struct Principal {
    id: String,
    resolvers: Vec<Resolver>,
}

impl Principal {
    /// Constructs a principal whose own attributes are `attributes`.
    pub fn new(id: impl Into<String>, attributes: Attributes) -> Self {
        Self::from_source(id, attributes)
    }

    /// Constructs a principal backed by an arbitrary primary resolver.
    pub fn from_source<S>(id: impl Into<String>, source: S) -> Self
    where
        S: AttributeSource + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            resolvers: vec![Arc::new(source)],
        }
    }

    /// A principal with no attributes. Only `all` rules grant it visibility.
    pub fn anonymous() -> Self {
        Self::new("anonymous", Attributes::new())
    }

    /// Registers a one-to-one extension, searched after every resolver already registered.
    #[must_use]
    pub fn with_extension<S>(mut self, extension: S) -> Self
    where
        S: AttributeSource + Send + Sync + 'static,
    {
        self.resolvers.push(Arc::new(extension));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of resolvers, the principal's own attributes included.
    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }
}

impl AttributeSource for Principal {
    fn flag(&self, name: &str) -> Option<bool> {
        self.resolvers.iter().find_map(|resolver| resolver.flag(name))
    }

    fn groups(&self, name: &str) -> Option<Cow<'_, GroupSet>> {
        self.resolvers
            .iter()
            .find_map(|resolver| resolver.groups(name))
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

/// Field types that can designate a record's owner.
///
/// Used by `#[visibility(owner = field)]`. An absent owner disables `share_*` rules.
pub trait OwnerRef {
    fn owner_ref(&self) -> Option<&dyn AttributeSource>;
}

macro_rules! impl_owner_ref {
    ($($ty:ty),* $(,)?) => {
        $(
            impl OwnerRef for $ty {
                fn owner_ref(&self) -> Option<&dyn AttributeSource> {
                    Some(self)
                }
            }

            impl OwnerRef for Option<$ty> {
                fn owner_ref(&self) -> Option<&dyn AttributeSource> {
                    self.as_ref().map(|owner| owner as &dyn AttributeSource)
                }
            }
        )*
    };
}

impl_owner_ref!(
    Principal,
    Attributes,
    Arc<Principal>,
    Box<Principal>,
    Arc<Attributes>,
);
