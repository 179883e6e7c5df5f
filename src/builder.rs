use crate::Registry;

/// Which registry the parameters of a resolver are resolved from when the
/// binding was found in a parent registry.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub enum DependencyScope {
    /// Parameters are resolved from the registry that initiated the
    /// resolution, so a child can replace the dependencies of a binding it
    /// inherits from its parent.
    #[default]
    Initiating,
    /// Parameters are resolved from the registry that holds the binding.
    /// A parent singleton then never depends on which child created it.
    Declaring,
}

/// A builder for a [`Registry`].
///
/// ```
/// use runtime_container::{DependencyScope, Registry};
///
/// let parent = Registry::new();
///
/// let mut builder = Registry::builder();
/// builder.label("requests");
/// builder.parent(parent.clone());
/// builder.dependency_scope(DependencyScope::Declaring);
///
/// let registry = builder.build();
/// assert_eq!("requests", registry.label());
/// assert!(registry.parent().is_some());
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    label: Option<String>,
    parent: Option<Registry>,
    dependency_scope: DependencyScope,
}

impl RegistryBuilder {
    /// Sets the label the registry uses in its log events.
    pub fn label(&mut self, label: &str) -> &mut Self {
        self.label = Some(label.to_owned());
        self
    }

    /// Sets the registry that lookups fall back to when no local binding
    /// matches.
    pub fn parent(&mut self, parent: Registry) -> &mut Self {
        self.parent = Some(parent);
        self
    }

    /// Sets which registry the parameters of inherited bindings are resolved
    /// from.
    pub fn dependency_scope(&mut self, scope: DependencyScope) -> &mut Self {
        self.dependency_scope = scope;
        self
    }

    /// Builds the registry.
    #[must_use]
    pub fn build(self) -> Registry {
        let label = self.label.unwrap_or_else(|| match self.parent {
            Some(ref parent) => format!("{}/child", parent.label()),
            None => "root".to_owned(),
        });

        Registry::new_from_parts(label, self.parent, self.dependency_scope)
    }
}
