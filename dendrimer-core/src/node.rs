use indexmap::IndexMap;

use crate::value::Scalar;

/// Reserved attribute key for a node's display name.
///
/// The encoder skips it unless asked to include it, and the reconciler
/// routes writes to it through [`Monomer::set_name`].
pub const NAME_KEY: &str = "name";

/// Error writing an attribute through [`Monomer::set`].
#[derive(Debug, thiserror::Error)]
pub enum AttrError {
    #[error("cannot convert value for attribute `{0}`")]
    TypeMismatch(String),
    #[error("attribute `{0}` is read-only")]
    Unwritable(String),
}

/// Description of one declared attribute of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSpec {
    pub name: String,
    pub readable: bool,
    pub writable: bool,
}

impl AttrSpec {
    pub fn new(name: impl Into<String>, readable: bool, writable: bool) -> Self {
        AttrSpec {
            name: name.into(),
            readable,
            writable,
        }
    }
}

/// A monomer is one node of a dendrimer tree.
///
/// The trait is the per-node capability interface the encoder and
/// reconciler operate through: attribute enumeration and get/set by name,
/// plus ordered child access. Implement it by hand or with
/// `#[derive(Monomer)]`, delegating shared state to a [`Backbone`] field.
///
/// Each node exclusively owns its children, so the structure is a tree by
/// construction: no cycles, at most one parent.
pub trait Monomer: std::fmt::Debug {
    /// Type tag identifying the node's concrete kind. Always non-empty.
    fn type_tag(&self) -> &str;

    /// Display name. May be empty; when non-empty it becomes the node's
    /// key in an encoded document.
    fn name(&self) -> &str;

    fn set_name(&mut self, name: &str);

    /// Declared attributes, in declaration order. Does not include the
    /// reserved `name` attribute or the open/dynamic mapping.
    fn attributes(&self) -> Vec<AttrSpec>;

    /// Reads a declared or dynamic attribute by name.
    fn get(&self, name: &str) -> Option<Scalar>;

    /// Writes an attribute by name.
    ///
    /// Declared attributes coerce the scalar to the field's type and fail
    /// with [`AttrError::TypeMismatch`] when the value does not fit, or
    /// [`AttrError::Unwritable`] when the attribute is read-only. Names
    /// outside the declared set land in the open/dynamic mapping and never
    /// fail.
    fn set(&mut self, name: &str, value: Scalar) -> Result<(), AttrError>;

    /// The open/dynamic attribute mapping, in insertion order.
    fn dynamic_attributes(&self) -> &IndexMap<String, Scalar>;

    /// Children, in order.
    fn children(&self) -> &[Box<dyn Monomer>];

    fn children_mut(&mut self) -> &mut Vec<Box<dyn Monomer>>;

    /// Appends a child, transferring ownership to this node.
    fn attach(&mut self, child: Box<dyn Monomer>);
}

/// Common per-node state: display name, children, and the open/dynamic
/// attribute mapping.
///
/// Node types embed one `Backbone` field and delegate the corresponding
/// [`Monomer`] methods to it; `#[derive(Monomer)]` generates exactly that
/// delegation for the field marked `#[monomer(backbone)]`.
#[derive(Debug, Default)]
pub struct Backbone {
    name: String,
    children: Vec<Box<dyn Monomer>>,
    dynamic: IndexMap<String, Scalar>,
}

impl Backbone {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backbone with a display name already set.
    pub fn named(name: impl Into<String>) -> Self {
        Backbone {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn children(&self) -> &[Box<dyn Monomer>] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Box<dyn Monomer>> {
        &mut self.children
    }

    pub fn attach(&mut self, child: Box<dyn Monomer>) {
        self.children.push(child);
    }

    pub fn dynamic_attributes(&self) -> &IndexMap<String, Scalar> {
        &self.dynamic
    }

    /// Reads a dynamic attribute.
    pub fn get_dynamic(&self, name: &str) -> Option<Scalar> {
        self.dynamic.get(name).cloned()
    }

    /// Inserts or overwrites a dynamic attribute.
    pub fn set_dynamic(&mut self, name: &str, value: Scalar) {
        self.dynamic.insert(name.to_string(), value);
    }
}

/// Conversion between a typed attribute field and a [`Scalar`].
///
/// Implemented for the primitive field types the derive macro supports.
/// `from_scalar` is deliberately narrow: integers range-check through
/// `i64`, floats additionally accept integers, and nothing parses from
/// text.
pub trait AttrValue: Sized {
    fn to_scalar(&self) -> Scalar;
    fn from_scalar(scalar: &Scalar) -> Option<Self>;
}

impl AttrValue for bool {
    fn to_scalar(&self) -> Scalar {
        Scalar::Bool(*self)
    }

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl AttrValue for String {
    fn to_scalar(&self) -> Scalar {
        Scalar::Text(self.clone())
    }

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

macro_rules! impl_attr_value_int {
    ($t:ty) => {
        impl AttrValue for $t {
            fn to_scalar(&self) -> Scalar {
                Scalar::Int(*self as i64)
            }

            fn from_scalar(scalar: &Scalar) -> Option<Self> {
                match scalar {
                    Scalar::Int(i) => <$t>::try_from(*i).ok(),
                    _ => None,
                }
            }
        }
    };
}

impl_attr_value_int!(i8);
impl_attr_value_int!(i16);
impl_attr_value_int!(i32);
impl_attr_value_int!(i64);
impl_attr_value_int!(u8);
impl_attr_value_int!(u16);
impl_attr_value_int!(u32);

macro_rules! impl_attr_value_float {
    ($t:ty) => {
        impl AttrValue for $t {
            fn to_scalar(&self) -> Scalar {
                Scalar::Float(*self as f64)
            }

            fn from_scalar(scalar: &Scalar) -> Option<Self> {
                match scalar {
                    Scalar::Float(x) => Some(*x as $t),
                    Scalar::Int(i) => Some(*i as $t),
                    _ => None,
                }
            }
        }
    };
}

impl_attr_value_float!(f32);
impl_attr_value_float!(f64);

impl<T: AttrValue> AttrValue for Option<T> {
    fn to_scalar(&self) -> Scalar {
        match self {
            Some(inner) => inner.to_scalar(),
            None => Scalar::Null,
        }
    }

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::Null => Some(None),
            other => T::from_scalar(other).map(Some),
        }
    }
}
