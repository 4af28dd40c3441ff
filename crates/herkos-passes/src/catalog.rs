//! Read-only view of the passes a tool can select.

/// Enumerates selectable pass identifiers.
///
/// Queried once, when [`OptimizationOptions`](crate::OptimizationOptions) is
/// constructed; passes added to the catalog afterwards are not selectable
/// through that instance.
pub trait PassCatalog {
    /// Pass identifiers, in the order their directives should be listed.
    fn registered_names(&self) -> Vec<String>;

    /// Human-readable description of a pass, used as its help text.
    fn describe(&self, name: &str) -> String;
}
