//! Type-erased registry entries for initialized feature slices.
//!
//! The server registers every slice once at startup and handlers look them up
//! by type; see `fhub_kernel::server::ApiState`.

use std::any::{Any, TypeId, type_name};
use std::fmt::Debug;

/// Marker trait for slice handles that can be shared across threads.
pub trait FeatureSlice: Any + Debug + Send + Sync {
    /// Helper to allow downcasting from the trait object.
    fn as_any(&self) -> &dyn Any;

    /// Short name used in startup logs and diagnostics.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// An initialized slice together with its concrete type.
#[derive(Debug)]
pub struct InitializedSlice {
    pub id: TypeId,
    pub name: &'static str,
    pub state: Box<dyn FeatureSlice>,
}

impl InitializedSlice {
    pub fn new<T: FeatureSlice>(state: T) -> Self {
        Self { id: TypeId::of::<T>(), name: state.name(), state: Box::new(state) }
    }

    /// Borrows the slice as `T` if that is its concrete type.
    #[must_use]
    pub fn downcast<T: FeatureSlice>(&self) -> Option<&T> {
        self.state.as_any().downcast_ref::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Rates(u8);

    impl FeatureSlice for Rates {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Other;

    impl FeatureSlice for Other {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn downcast_matches_concrete_type_only() {
        let slice = InitializedSlice::new(Rates(7));
        assert_eq!(slice.id, TypeId::of::<Rates>());
        assert!(slice.name.ends_with("Rates"));
        assert_eq!(slice.downcast::<Rates>().map(|r| r.0), Some(7));
        assert!(slice.downcast::<Other>().is_none());
    }
}
