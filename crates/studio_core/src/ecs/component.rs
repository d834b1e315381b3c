//! Component trait

/// Trait for component data attached to entities.
///
/// `TYPE_NAME` is the stable key the component store uses for the type. It
/// must be unique among registered components; it does not depend on type
/// addresses, so it survives crossing dynamic library boundaries.
pub trait Component: Clone + 'static + Send + Sync {
    /// Unique, stable name for this component type
    const TYPE_NAME: &'static str;
}
