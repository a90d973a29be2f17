#![forbid(unsafe_code)]

//! Dynamic values.
//!
//! [`Value`] is the object graph handed to the renderer. Containers are
//! reference counted, so the same list can appear twice in a tree, and lists,
//! dicts, and records are mutable after construction, so a value can contain
//! itself.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smallvec::{SmallVec, smallvec};
use treescope_parts::ObjectId;

use crate::array::ArrayAdapter;
use crate::registry::TypeKey;

/// Type key shared by every array value, after the adapter's own type.
pub const ARRAY_TYPE: &str = "array";

/// A named record with ordered fields.
pub struct Record {
    type_name: String,
    fields: RefCell<Vec<(String, Value)>>,
}

impl Record {
    /// Qualified type name, e.g. `geometry.Point`.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Snapshot of the fields.
    #[must_use]
    pub fn fields(&self) -> Vec<(String, Value)> {
        self.fields.borrow().clone()
    }
}

/// A value to render.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<RefCell<Vec<Value>>>),
    Tuple(Rc<[Value]>),
    Dict(Rc<RefCell<Vec<(Value, Value)>>>),
    Record(Rc<Record>),
    Array(Rc<dyn ArrayAdapter>),
}

impl Value {
    #[must_use]
    pub fn bool(value: bool) -> Self {
        Self::Bool(value)
    }

    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::Int(value)
    }

    #[must_use]
    pub fn float(value: f64) -> Self {
        Self::Float(value)
    }

    #[must_use]
    pub fn str(value: impl Into<Rc<str>>) -> Self {
        Self::Str(value.into())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::List(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Tuple(items.into_iter().collect())
    }

    pub fn dict(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Self::Dict(Rc::new(RefCell::new(entries.into_iter().collect())))
    }

    pub fn record<N>(type_name: impl Into<String>, fields: impl IntoIterator<Item = (N, Value)>) -> Self
    where
        N: Into<String>,
    {
        Self::Record(Rc::new(Record {
            type_name: type_name.into(),
            fields: RefCell::new(fields.into_iter().map(|(n, v)| (n.into(), v)).collect()),
        }))
    }

    pub fn array(adapter: impl ArrayAdapter + 'static) -> Self {
        Self::Array(Rc::new(adapter))
    }

    /// Append to a list. Returns `false` for other values.
    pub fn push(&self, item: Value) -> bool {
        match self {
            Self::List(items) => {
                items.borrow_mut().push(item);
                true
            }
            _ => false,
        }
    }

    /// Add a dict entry. Returns `false` for other values.
    pub fn insert(&self, key: Value, value: Value) -> bool {
        match self {
            Self::Dict(entries) => {
                entries.borrow_mut().push((key, value));
                true
            }
            _ => false,
        }
    }

    /// Set (or add) a record field. Returns `false` for other values.
    pub fn set_field(&self, name: &str, value: Value) -> bool {
        let Self::Record(record) = self else {
            return false;
        };
        let mut fields = record.fields.borrow_mut();
        match fields.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => fields.push((name.to_string(), value)),
        }
        true
    }

    /// The registry key of this value's type.
    #[must_use]
    pub fn type_key(&self) -> TypeKey {
        match self {
            Self::None => TypeKey::from("NoneType"),
            Self::Bool(_) => TypeKey::from("bool"),
            Self::Int(_) => TypeKey::from("int"),
            Self::Float(_) => TypeKey::from("float"),
            Self::Str(_) => TypeKey::from("str"),
            Self::List(_) => TypeKey::from("list"),
            Self::Tuple(_) => TypeKey::from("tuple"),
            Self::Dict(_) => TypeKey::from("dict"),
            Self::Record(record) => TypeKey::from(record.type_name()),
            Self::Array(adapter) => TypeKey::from(adapter.type_name()),
        }
    }

    /// Keys to resolve handlers for, most specific first.
    #[must_use]
    pub fn type_keys(&self) -> SmallVec<[TypeKey; 2]> {
        match self {
            Self::Array(_) => smallvec![self.type_key(), TypeKey::from(ARRAY_TYPE)],
            _ => smallvec![self.type_key()],
        }
    }

    /// Identity of shared, mutable containers; `None` for plain data.
    #[must_use]
    pub fn identity(&self) -> Option<ObjectId> {
        match self {
            Self::List(items) => Some(ObjectId::of(items)),
            Self::Dict(entries) => Some(ObjectId::of(entries)),
            Self::Record(record) => Some(ObjectId::of(record)),
            Self::Array(adapter) => Some(ObjectId::of(adapter)),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    // Containers print their size only; a cyclic value must not recurse.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(b) => write!(f, "Bool({})", b),
            Self::Int(i) => write!(f, "Int({})", i),
            Self::Float(x) => write!(f, "Float({})", x),
            Self::Str(s) => write!(f, "Str({:?})", s),
            Self::List(items) => write!(f, "List(len={})", items.borrow().len()),
            Self::Tuple(items) => write!(f, "Tuple(len={})", items.len()),
            Self::Dict(entries) => write!(f, "Dict(len={})", entries.borrow().len()),
            Self::Record(record) => write!(f, "Record({})", record.type_name()),
            Self::Array(adapter) => write!(f, "Array({})", adapter.type_name()),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let list = Value::list([Value::int(1)]);
        let alias = list.clone();
        assert_eq!(list.identity(), alias.identity());
        assert!(alias.push(Value::int(2)));
        let Value::List(items) = &list else {
            unreachable!()
        };
        assert_eq!(items.borrow().len(), 2);
    }

    #[test]
    fn plain_data_has_no_identity() {
        assert_eq!(Value::int(3).identity(), None);
        assert_eq!(Value::str("x").identity(), None);
        assert_eq!(Value::tuple([Value::None]).identity(), None);
    }

    #[test]
    fn self_reference_debug_does_not_recurse() {
        let list = Value::list([]);
        list.push(list.clone());
        assert_eq!(format!("{:?}", list), "List(len=1)");
    }

    #[test]
    fn set_field_replaces_or_appends() {
        let point = Value::record("geometry.Point", [("x", Value::int(1))]);
        assert!(point.set_field("x", Value::int(5)));
        assert!(point.set_field("y", Value::int(6)));
        let Value::Record(record) = &point else {
            unreachable!()
        };
        let names: Vec<String> = record.fields().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["x", "y"]);
        assert!(!Value::int(1).set_field("x", Value::None));
        assert_eq!(point.type_key().name(), "geometry.Point");
    }
}
