//! Access to fields and methods of objects that live in a foreign (JVM-style) object runtime.
//!
//! Platform bindings that talk to such a runtime resolve field and method ids by name and type
//! signature. Resolving ids is slow, so a [`Field`] or [`Method`] resolves them once per class
//! and reuses them for every instance of that class.

use crate::error::{Error, Result};
use core::cell::RefCell;
use core::fmt;
use core::hash::Hash;
use core::marker::PhantomData;
use core::ops::Deref;
use std::collections::HashMap;

/// How long a reference keeps a foreign object alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// Valid until control returns to the foreign runtime.
    Local,
    /// Valid until released.
    Persistent,
}

/// A value read from or written to a foreign field.
#[derive(Debug, Clone, PartialEq)]
pub enum ForeignValue {
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

/// The foreign runtime.
pub trait ForeignEnv {
    type Object: Clone + fmt::Debug;
    type Class: Clone + Eq + Hash + fmt::Debug;
    type FieldId: Copy + fmt::Debug;
    type MethodId: Copy + fmt::Debug;

    fn class_of(&self, object: &Self::Object) -> Self::Class;

    fn class_name(&self, class: &Self::Class) -> String;

    /// Resolves a field by name and type signature.
    fn field_id(&self, class: &Self::Class, name: &str, signature: &str) -> Option<Self::FieldId>;

    fn get_field(&self, object: &Self::Object, field: Self::FieldId) -> ForeignValue;

    fn set_field(&self, object: &Self::Object, field: Self::FieldId, value: ForeignValue);

    /// Resolves a method by name and signature, e.g. `(I)V`.
    fn method_id(&self, class: &Self::Class, name: &str, signature: &str)
        -> Option<Self::MethodId>;

    /// Calls a method. Returns `None` for `void` methods.
    fn call_method(
        &self,
        object: &Self::Object,
        method: Self::MethodId,
        args: &[ForeignValue],
    ) -> Option<ForeignValue>;

    /// Creates a new reference of the given kind to the object.
    fn new_reference(&self, object: &Self::Object, kind: ReferenceKind) -> Self::Object;

    fn release_reference(&self, object: &Self::Object, kind: ReferenceKind);
}

/// Rust types with a foreign field representation.
pub trait JavaType: Sized {
    /// The type signature, e.g. `I` for `int`.
    const SIGNATURE: &'static str;

    fn into_value(self) -> ForeignValue;

    fn from_value(value: ForeignValue) -> Option<Self>;
}

macro_rules! java_type {
    ($($ty:ty => $variant:ident, $sig:expr;)+) => {
        $(
            impl JavaType for $ty {
                const SIGNATURE: &'static str = $sig;

                fn into_value(self) -> ForeignValue {
                    ForeignValue::$variant(self)
                }

                fn from_value(value: ForeignValue) -> Option<Self> {
                    match value {
                        ForeignValue::$variant(value) => Some(value),
                        _ => None,
                    }
                }
            }
        )+
    };
}

java_type! {
    bool => Boolean, "Z";
    i8 => Byte, "B";
    u16 => Char, "C";
    i16 => Short, "S";
    i32 => Int, "I";
    i64 => Long, "J";
    f32 => Float, "F";
    f64 => Double, "D";
    String => String, "Ljava/lang/String;";
}

/// A typed field of a foreign class.
///
/// Field ids are cached per class; any number of objects of the same class share one lookup.
pub struct Field<E: ForeignEnv, T: JavaType> {
    name: &'static str,
    ids: RefCell<HashMap<E::Class, E::FieldId>>,
    _type: PhantomData<T>,
}

impl<E: ForeignEnv, T: JavaType> Field<E, T> {
    pub fn new(name: &'static str) -> Field<E, T> {
        Field {
            name,
            ids: RefCell::new(HashMap::new()),
            _type: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of classes the field id has been resolved for.
    pub fn cached_classes(&self) -> usize {
        self.ids.borrow().len()
    }

    /// Returns the field id for the class, resolving it on first use.
    pub fn id(&self, env: &E, class: &E::Class) -> Result<E::FieldId> {
        if let Some(id) = self.ids.borrow().get(class) {
            return Ok(*id);
        }

        let id = env
            .field_id(class, self.name, T::SIGNATURE)
            .ok_or_else(|| Error::FieldNotFound {
                class: env.class_name(class),
                name: self.name.to_string(),
                signature: T::SIGNATURE.to_string(),
            })?;
        tracing::trace!(field = self.name, ?class, "resolved foreign field id");
        self.ids.borrow_mut().insert(class.clone(), id);
        Ok(id)
    }

    pub fn get(&self, env: &E, object: &E::Object) -> Result<T> {
        let id = self.id(env, &env.class_of(object))?;
        T::from_value(env.get_field(object, id)).ok_or_else(|| Error::FieldType {
            name: self.name.to_string(),
            signature: T::SIGNATURE.to_string(),
        })
    }

    pub fn set(&self, env: &E, object: &E::Object, value: T) -> Result<()> {
        let id = self.id(env, &env.class_of(object))?;
        env.set_field(object, id, value.into_value());
        Ok(())
    }
}

impl<E: ForeignEnv, T: JavaType> fmt::Debug for Field<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("signature", &T::SIGNATURE)
            .field("cached_classes", &self.cached_classes())
            .finish()
    }
}

/// A method of a foreign class.
///
/// Like field ids, method ids are cached per class.
pub struct Method<E: ForeignEnv> {
    name: &'static str,
    signature: &'static str,
    ids: RefCell<HashMap<E::Class, E::MethodId>>,
}

impl<E: ForeignEnv> Method<E> {
    pub fn new(name: &'static str, signature: &'static str) -> Method<E> {
        Method {
            name,
            signature,
            ids: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the method id for the class, resolving it on first use.
    pub fn id(&self, env: &E, class: &E::Class) -> Result<E::MethodId> {
        if let Some(id) = self.ids.borrow().get(class) {
            return Ok(*id);
        }

        let id = env
            .method_id(class, self.name, self.signature)
            .ok_or_else(|| Error::MethodNotFound {
                class: env.class_name(class),
                name: self.name.to_string(),
                signature: self.signature.to_string(),
            })?;
        tracing::trace!(method = self.name, ?class, "resolved foreign method id");
        self.ids.borrow_mut().insert(class.clone(), id);
        Ok(id)
    }

    pub fn call(
        &self,
        env: &E,
        object: &E::Object,
        args: &[ForeignValue],
    ) -> Result<Option<ForeignValue>> {
        let id = self.id(env, &env.class_of(object))?;
        Ok(env.call_method(object, id, args))
    }
}

impl<E: ForeignEnv> fmt::Debug for Method<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("cached_classes", &self.ids.borrow().len())
            .finish()
    }
}

/// A reference to a foreign object that is released when dropped.
pub struct Reference<'env, E: ForeignEnv> {
    env: &'env E,
    object: E::Object,
    kind: ReferenceKind,
}

impl<'env, E: ForeignEnv> Reference<'env, E> {
    /// Takes ownership of an existing reference of the given kind.
    pub fn adopt(env: &'env E, object: E::Object, kind: ReferenceKind) -> Self {
        Reference { env, object, kind }
    }

    /// Creates a new reference of the given kind.
    pub fn new(env: &'env E, object: &E::Object, kind: ReferenceKind) -> Self {
        let object = env.new_reference(object, kind);
        Reference { env, object, kind }
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// Creates a persistent reference to the same object.
    pub fn to_persistent(&self) -> Reference<'env, E> {
        Reference::new(self.env, &self.object, ReferenceKind::Persistent)
    }
}

impl<'env, E: ForeignEnv> Deref for Reference<'env, E> {
    type Target = E::Object;

    fn deref(&self) -> &E::Object {
        &self.object
    }
}

impl<'env, E: ForeignEnv> Drop for Reference<'env, E> {
    fn drop(&mut self) {
        self.env.release_reference(&self.object, self.kind);
    }
}

impl<'env, E: ForeignEnv> fmt::Debug for Reference<'env, E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Reference")
            .field("object", &self.object)
            .field("kind", &self.kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    /// Objects are numbers; class `Point` has int `x`, string `label` and `void scale(int)`.
    #[derive(Default)]
    struct FakeEnv {
        classes: HashMap<u32, &'static str>,
        values: RefCell<HashMap<(u32, usize), ForeignValue>>,
        lookups: Cell<usize>,
        live_refs: RefCell<HashMap<ReferenceKind, usize>>,
    }

    const FIELDS: &[(&str, &str, &str)] = &[
        ("Point", "x", "I"),
        ("Point", "label", "Ljava/lang/String;"),
        ("Other", "x", "I"),
    ];

    impl FakeEnv {
        fn new() -> FakeEnv {
            let mut env = FakeEnv::default();
            env.classes.insert(1, "Point");
            env.classes.insert(2, "Point");
            env.classes.insert(3, "Other");
            env
        }

        fn live(&self, kind: ReferenceKind) -> usize {
            self.live_refs.borrow().get(&kind).cloned().unwrap_or(0)
        }
    }

    impl ForeignEnv for FakeEnv {
        type Object = u32;
        type Class = &'static str;
        type FieldId = usize;
        type MethodId = usize;

        fn class_of(&self, object: &u32) -> &'static str {
            self.classes[object]
        }

        fn class_name(&self, class: &&'static str) -> String {
            class.to_string()
        }

        fn field_id(&self, class: &&'static str, name: &str, signature: &str) -> Option<usize> {
            self.lookups.set(self.lookups.get() + 1);
            FIELDS
                .iter()
                .position(|&(c, n, s)| c == *class && n == name && s == signature)
        }

        fn get_field(&self, object: &u32, field: usize) -> ForeignValue {
            self.values
                .borrow()
                .get(&(*object, field))
                .cloned()
                .unwrap_or(ForeignValue::Int(0))
        }

        fn set_field(&self, object: &u32, field: usize, value: ForeignValue) {
            self.values.borrow_mut().insert((*object, field), value);
        }

        fn method_id(&self, class: &&'static str, name: &str, signature: &str) -> Option<usize> {
            self.lookups.set(self.lookups.get() + 1);
            if *class == "Point" && name == "scale" && signature == "(I)V" {
                Some(0)
            } else {
                None
            }
        }

        fn call_method(
            &self,
            object: &u32,
            _method: usize,
            args: &[ForeignValue],
        ) -> Option<ForeignValue> {
            let factor = match args {
                [ForeignValue::Int(factor)] => *factor,
                _ => panic!("scale takes one int"),
            };
            let x = match self.get_field(object, 0) {
                ForeignValue::Int(x) => x,
                _ => 0,
            };
            self.set_field(object, 0, ForeignValue::Int(x * factor));
            None
        }

        fn new_reference(&self, object: &u32, kind: ReferenceKind) -> u32 {
            *self.live_refs.borrow_mut().entry(kind).or_insert(0) += 1;
            *object
        }

        fn release_reference(&self, _object: &u32, kind: ReferenceKind) {
            *self.live_refs.borrow_mut().entry(kind).or_insert(0) -= 1;
        }
    }

    #[test]
    fn field_ids_are_cached_per_class() {
        let env = FakeEnv::new();
        let x: Field<FakeEnv, i32> = Field::new("x");

        x.set(&env, &1, 5).unwrap();
        x.set(&env, &2, 7).unwrap();
        assert_eq!(x.get(&env, &1).unwrap(), 5);
        assert_eq!(x.get(&env, &2).unwrap(), 7);
        assert_eq!(env.lookups.get(), 1);

        x.set(&env, &3, 9).unwrap();
        assert_eq!(env.lookups.get(), 2);
        assert_eq!(x.cached_classes(), 2);
    }

    #[test]
    fn string_fields() {
        let env = FakeEnv::new();
        let label: Field<FakeEnv, String> = Field::new("label");
        label.set(&env, &1, "hello".to_string()).unwrap();
        assert_eq!(label.get(&env, &1).unwrap(), "hello");
    }

    #[test]
    fn missing_fields_and_wrong_types() {
        let env = FakeEnv::new();
        let x_as_long: Field<FakeEnv, i64> = Field::new("x");
        match x_as_long.get(&env, &1) {
            Err(Error::FieldNotFound {
                class,
                name,
                signature,
            }) => {
                assert_eq!(class, "Point");
                assert_eq!(name, "x");
                assert_eq!(signature, "J");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let label: Field<FakeEnv, String> = Field::new("label");
        env.set_field(&2, 1, ForeignValue::Int(3));
        assert!(matches!(label.get(&env, &2), Err(Error::FieldType { .. })));
    }

    #[test]
    fn methods_are_resolved_once_per_class() {
        let env = FakeEnv::new();
        let x: Field<FakeEnv, i32> = Field::new("x");
        let scale: Method<FakeEnv> = Method::new("scale", "(I)V");
        x.set(&env, &1, 3).unwrap();
        x.set(&env, &2, 4).unwrap();
        let lookups = env.lookups.get();

        assert_eq!(scale.call(&env, &1, &[ForeignValue::Int(2)]), Ok(None));
        assert_eq!(scale.call(&env, &2, &[ForeignValue::Int(5)]), Ok(None));
        assert_eq!(env.lookups.get(), lookups + 1);
        assert_eq!(x.get(&env, &1).unwrap(), 6);
        assert_eq!(x.get(&env, &2).unwrap(), 20);

        assert_eq!(
            scale.call(&env, &3, &[ForeignValue::Int(2)]),
            Err(Error::MethodNotFound {
                class: "Other".to_string(),
                name: "scale".to_string(),
                signature: "(I)V".to_string(),
            })
        );
    }

    #[test]
    fn references_are_released_on_drop() {
        let env = FakeEnv::new();
        {
            let local = Reference::new(&env, &1, ReferenceKind::Local);
            assert_eq!(*local, 1);
            let persistent = local.to_persistent();
            assert_eq!(persistent.kind(), ReferenceKind::Persistent);
            assert_eq!(env.live(ReferenceKind::Local), 1);
            assert_eq!(env.live(ReferenceKind::Persistent), 1);
            drop(local);
            assert_eq!(env.live(ReferenceKind::Local), 0);
            assert_eq!(*persistent, 1);
        }
        assert_eq!(env.live(ReferenceKind::Persistent), 0);
    }

    #[test]
    fn adopted_references_are_released_too() {
        let env = FakeEnv::new();
        let raw = env.new_reference(&2, ReferenceKind::Local);
        assert_eq!(env.live(ReferenceKind::Local), 1);

        let adopted = Reference::adopt(&env, raw, ReferenceKind::Local);
        assert_eq!(*adopted, 2);
        drop(adopted);
        assert_eq!(env.live(ReferenceKind::Local), 0);
    }
}
