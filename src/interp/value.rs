//! Runtime values for the interpreter
//!
//! Values are reference-counted and immutable except for instance fields,
//! which live behind a `RefCell` so that field assignment works through a
//! shared handle. The [`ValueRef`] handle distinguishes an actual `None`
//! value from the absence of a value (the null handle a statement with no
//! result produces).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ast::Stmt;

/// Name of the constructor method.
pub const INIT_METHOD: &str = "__init__";
/// Name of the stringification hook.
pub const STR_METHOD: &str = "__str__";
/// Name of the equality hook.
pub const EQ_METHOD: &str = "__eq__";
/// Name of the ordering hook.
pub const LT_METHOD: &str = "__lt__";
/// Name of the addition hook.
pub const ADD_METHOD: &str = "__add__";
/// Implicit receiver parameter.
pub const SELF: &str = "self";

/// A scope: names bound to value handles.
pub type Closure = FxHashMap<String, ValueRef>;

/// Runtime value
pub enum Value {
    /// The `None` singleton
    None,
    /// 64-bit signed integer
    Number(i64),
    /// Boolean, printed as `True`/`False`
    Bool(bool),
    /// Immutable byte string; the bytes are never decoded or validated
    String(Vec<u8>),
    /// A user-defined class
    Class(Rc<Class>),
    /// An object of a user-defined class
    Instance(Instance),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::String(s) => write!(f, "{:?}", String::from_utf8_lossy(s)),
            Value::Class(class) => write!(f, "Class {}", class.name()),
            Value::Instance(instance) => write!(f, "<{} object>", instance.class().name()),
        }
    }
}

/// Handle to a runtime value.
///
/// Either holds a shared reference to a value or is *null*: the result of a
/// statement that produces nothing. Null prints as `None` and is falsy, but
/// it is distinguishable from the `None` value and may not be used where an
/// actual value is required (arithmetic, method dispatch).
#[derive(Clone, Debug)]
pub struct ValueRef(Option<Rc<Value>>);

impl ValueRef {
    /// Allocate a handle owning `value`.
    pub fn own(value: Value) -> ValueRef {
        ValueRef(Some(Rc::new(value)))
    }

    /// A second handle aliasing the same value.
    pub fn share(&self) -> ValueRef {
        ValueRef(self.0.clone())
    }

    /// The null handle.
    pub fn none() -> ValueRef {
        ValueRef(None)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn get(&self) -> Option<&Value> {
        self.0.as_deref()
    }

    pub fn as_number(&self) -> Option<i64> {
        match self.get() {
            Some(Value::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.get() {
            Some(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self.get() {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self.get() {
            Some(Value::Instance(instance)) => Some(instance),
            _ => None,
        }
    }
}

/// Truthiness: non-zero numbers, `True`, and non-empty strings are truthy.
/// Everything else, including `None`, classes, instances and the null
/// handle, is falsy.
pub fn is_true(value: &ValueRef) -> bool {
    match value.get() {
        Some(Value::Number(n)) => *n != 0,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        _ => false,
    }
}

/// A named method: formal parameters (excluding `self`) and a body.
#[derive(Debug)]
pub struct Method {
    pub name: String,
    pub formal_params: Vec<String>,
    pub body: Stmt,
}

/// A user-defined class: a method table and an optional parent.
///
/// Classes are immutable once built and shared behind `Rc` for the
/// lifetime of the program.
#[derive(Debug)]
pub struct Class {
    name: String,
    methods: FxHashMap<String, Method>,
    parent: Option<Rc<Class>>,
}

impl Class {
    /// Build a class. When two methods share a name, the first declared
    /// one wins.
    pub fn new(name: String, methods: Vec<Method>, parent: Option<Rc<Class>>) -> Class {
        let mut table = FxHashMap::default();
        for method in methods {
            table.entry(method.name.clone()).or_insert(method);
        }
        Class {
            name,
            methods: table,
            parent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a method by name, searching the parent chain. Returns the
    /// first match; a subclass method shadows its parent's regardless of
    /// arity.
    pub fn method(&self, name: &str) -> Option<&Method> {
        match self.methods.get(name) {
            Some(method) => Some(method),
            None => self.parent.as_ref().and_then(|parent| parent.method(name)),
        }
    }
}

/// A runtime object: its class and its own field scope.
///
/// Fields are not declared anywhere; they come into existence on first
/// assignment, typically inside `__init__`.
#[derive(Debug)]
pub struct Instance {
    class: Rc<Class>,
    fields: RefCell<Closure>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Instance {
        Instance {
            class,
            fields: RefCell::new(Closure::default()),
        }
    }

    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    /// A shared alias of the named field, if bound.
    pub fn field(&self, name: &str) -> Option<ValueRef> {
        self.fields.borrow().get(name).map(ValueRef::share)
    }

    /// Bind or rebind a field.
    pub fn set_field(&self, name: &str, value: ValueRef) {
        self.fields.borrow_mut().insert(name.to_string(), value);
    }

    /// True iff method lookup finds `name` with exactly `argc` formal
    /// parameters.
    pub fn has_method(&self, name: &str, argc: usize) -> bool {
        self.class
            .method(name)
            .is_some_and(|method| method.formal_params.len() == argc)
    }
}
