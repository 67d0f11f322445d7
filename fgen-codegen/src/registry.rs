//! Generator registry.
//!
//! Generators are listed statically; nothing is discovered at runtime. The
//! pipeline runs them in ascending [`priority`](GeneratorDescriptor::priority),
//! registration order breaking ties.

use eyre::{Result, bail};

use crate::{generator::Generator, generators::BUILTIN};

/// How to create a generator, and when to run it.
#[derive(Clone, Copy)]
pub struct GeneratorDescriptor {
    pub name: &'static str,
    pub priority: i32,
    pub factory: fn() -> Box<dyn Generator>,
}

impl GeneratorDescriptor {
    pub const fn new(name: &'static str, priority: i32, factory: fn() -> Box<dyn Generator>) -> Self {
        Self {
            name,
            priority,
            factory,
        }
    }

    /// A fresh generator instance.
    pub fn instantiate(&self) -> Box<dyn Generator> {
        (self.factory)()
    }
}

impl std::fmt::Debug for GeneratorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorDescriptor")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Ordered set of generator descriptors.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    descriptors: Vec<GeneratorDescriptor>,
}

impl Registry {
    /// A registry with no generators.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The generators shipped with fgen.
    pub fn builtin() -> Self {
        let mut descriptors = BUILTIN.to_vec();
        descriptors.sort_by_key(|d| d.priority);
        Self { descriptors }
    }

    /// Add a generator.
    ///
    /// # Errors
    ///
    /// Returns an error if a generator with the same name is registered.
    pub fn register(&mut self, descriptor: GeneratorDescriptor) -> Result<()> {
        if self.get(descriptor.name).is_some() {
            bail!("generator `{}` is already registered", descriptor.name);
        }
        self.descriptors.push(descriptor);
        self.descriptors.sort_by_key(|d| d.priority);
        Ok(())
    }

    /// Builder form of [`register`](Registry::register).
    pub fn with(mut self, descriptor: GeneratorDescriptor) -> Result<Self> {
        self.register(descriptor)?;
        Ok(self)
    }

    /// Descriptors in execution order.
    pub fn descriptors(&self) -> &[GeneratorDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, name: &str) -> Option<&GeneratorDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors.iter().map(|d| d.name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
