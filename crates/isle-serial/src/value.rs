//! Value graph model
//!
//! Aggregates are shared handles: cloning an `Array`, `Object` or `Signal`
//! clones the handle, not the contents, so identity (and therefore aliasing
//! and cycles) survives. Mutation goes through `&self`.

use indexmap::IndexMap;
use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// A node of the value graph
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Big integer (tag `b`)
    BigInt(i128),
    /// Byte buffer (tag `u8a`)
    Bytes(Vec<u8>),
    /// Reactive cell (tag `s`)
    Signal(Signal),
    Array(Array),
    Object(Object),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_signal(&self) -> Option<&Signal> {
        match self {
            Value::Signal(s) => Some(s),
            _ => None,
        }
    }

    /// Whether two values are the same aggregate (never true for scalars)
    pub fn same_identity(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Signal(a), Value::Signal(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Structural equality that terminates on cyclic graphs.
    ///
    /// Signals compare by their current value. Object key order is ignored.
    pub fn deep_eq(&self, other: &Value) -> bool {
        let mut assumed = HashSet::new();
        deep_eq_inner(self, other, &mut assumed)
    }
}

fn deep_eq_inner(a: &Value, b: &Value, assumed: &mut HashSet<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::BigInt(x), Value::BigInt(y)) => x == y,
        (Value::Bytes(x), Value::Bytes(y)) => x == y,
        (Value::Signal(x), Value::Signal(y)) => {
            if !assumed.insert((x.addr(), y.addr())) {
                return true;
            }
            deep_eq_inner(&x.get(), &y.get(), assumed)
        }
        (Value::Array(x), Value::Array(y)) => {
            if !assumed.insert((x.addr(), y.addr())) {
                return true;
            }
            let (x, y) = (x.to_vec(), y.to_vec());
            x.len() == y.len() && x.iter().zip(&y).all(|(a, b)| deep_eq_inner(a, b, assumed))
        }
        (Value::Object(x), Value::Object(y)) => {
            if !assumed.insert((x.addr(), y.addr())) {
                return true;
            }
            let (x, y) = (x.entries(), y.entries());
            x.len() == y.len()
                && x.iter().all(|(key, a)| {
                    y.iter()
                        .find(|(other, _)| other == key)
                        .is_some_and(|(_, b)| deep_eq_inner(a, b, assumed))
                })
        }
        _ => false,
    }
}

/// Shared, mutable array handle
#[derive(Clone, Default)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(items)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Element at `index` (a handle clone for aggregates)
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.0.borrow_mut().push(value.into());
    }

    /// Overwrite an existing slot; `false` if out of bounds
    pub fn set(&self, index: usize, value: impl Into<Value>) -> bool {
        match self.0.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Snapshot of the elements
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    pub fn borrow(&self) -> Ref<'_, Vec<Value>> {
        self.0.borrow()
    }

    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

/// Shared, mutable, insertion-ordered object handle
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<IndexMap<String, Value>>>);

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().contains_key(key)
    }

    /// Insert or overwrite, returning the previous value
    pub fn insert(&self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.0.borrow_mut().insert(key.to_string(), value.into())
    }

    /// Remove a key, keeping the order of the remaining entries
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().shift_remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().keys().cloned().collect()
    }

    /// Snapshot of the entries in insertion order
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Shallow copy: a new identity holding the same entries
    pub fn shallow_clone(&self) -> Object {
        Self(Rc::new(RefCell::new(self.0.borrow().clone())))
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

/// Reactive cell handle seeded with a value
#[derive(Clone)]
pub struct Signal(Rc<RefCell<Value>>);

impl Signal {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(Rc::new(RefCell::new(value.into())))
    }

    /// Current value
    pub fn get(&self) -> Value {
        self.0.borrow().clone()
    }

    pub fn set(&self, value: impl Into<Value>) {
        *self.0.borrow_mut() = value.into();
    }

    pub fn ptr_eq(&self, other: &Signal) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Array::from_vec(items))
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl From<Signal> for Value {
    fn from(s: Signal) -> Self {
        Value::Signal(s)
    }
}

thread_local! {
    /// Aggregates currently being formatted, so cycles print as `<cycle>`
    static FORMATTING: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

fn guarded(addr: usize, f: &mut fmt::Formatter<'_>, body: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result) -> fmt::Result {
    let entered = FORMATTING.with(|set| set.borrow_mut().insert(addr));
    if !entered {
        return f.write_str("<cycle>");
    }
    let result = body(f);
    FORMATTING.with(|set| set.borrow_mut().remove(&addr));
    result
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        guarded(self.addr(), f, |f| f.debug_list().entries(self.to_vec()).finish())
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        guarded(self.addr(), f, |f| f.debug_map().entries(self.entries()).finish())
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        guarded(self.addr(), f, |f| f.debug_tuple("Signal").field(&self.get()).finish())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::BigInt(n) => write!(f, "{n}n"),
            Value::Bytes(b) => write!(f, "Bytes({b:?})"),
            Value::Signal(s) => s.fmt(f),
            Value::Array(a) => a.fmt(f),
            Value::Object(o) => o.fmt(f),
        }
    }
}
