use crate::traits::Instance;

///
/// ObjectValue
///
/// Uniform view of an embedded or referenced member, whatever wrapper it is
/// stored behind. `#[derive(Mapped)]` implements it for the mapped type
/// itself; the wrappers below forward to it.
///

pub trait ObjectValue {
    fn as_object(&self) -> Option<&dyn Instance>;

    fn as_object_mut(&mut self) -> Option<&mut dyn Instance>;

    /// Reset to the null sentinel; false when the wrapper cannot be null.
    fn clear_object(&mut self) -> bool {
        false
    }
}

impl<T: ObjectValue> ObjectValue for Option<T> {
    fn as_object(&self) -> Option<&dyn Instance> {
        self.as_ref().and_then(ObjectValue::as_object)
    }

    fn as_object_mut(&mut self) -> Option<&mut dyn Instance> {
        self.as_mut().and_then(ObjectValue::as_object_mut)
    }

    fn clear_object(&mut self) -> bool {
        *self = None;
        true
    }
}

impl<T: ObjectValue> ObjectValue for Box<T> {
    fn as_object(&self) -> Option<&dyn Instance> {
        (**self).as_object()
    }

    fn as_object_mut(&mut self) -> Option<&mut dyn Instance> {
        (**self).as_object_mut()
    }
}
