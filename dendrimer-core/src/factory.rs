use indexmap::IndexMap;

use crate::node::Monomer;

/// Error type for factory operations.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("no creator registered for type key `{0}`")]
    NoCreator(String),
}

type Creator = Box<dyn Fn() -> Box<dyn Monomer>>;

/// Registry of type-key to zero-argument node constructors.
///
/// Consulted by the reconciler as a last resort, when a document entry
/// matches no existing child. Populated by the caller up front and passed
/// explicitly into every reconcile call; the algorithm never mutates it.
#[derive(Default)]
pub struct Factory {
    creators: IndexMap<String, Creator>,
}

impl Factory {
    /// Creates an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor under the given type key, replacing any
    /// previous registration.
    pub fn register<F>(&mut self, key: impl Into<String>, creator: F)
    where
        F: Fn() -> Box<dyn Monomer> + 'static,
    {
        self.creators.insert(key.into(), Box::new(creator));
    }

    /// Registers `T::default()` as the constructor for the given type key.
    pub fn register_default<T>(&mut self, key: impl Into<String>)
    where
        T: Monomer + Default + 'static,
    {
        self.register(key, || Box::new(T::default()) as Box<dyn Monomer>);
    }

    /// Checks whether a constructor is registered for the key.
    pub fn contains(&self, key: &str) -> bool {
        self.creators.contains_key(key)
    }

    /// Registered type keys, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.creators.keys().map(String::as_str)
    }

    /// Creates a new node for the key.
    pub fn create(&self, key: &str) -> Result<Box<dyn Monomer>, FactoryError> {
        match self.creators.get(key) {
            Some(creator) => Ok(creator()),
            None => Err(FactoryError::NoCreator(key.to_string())),
        }
    }
}

impl std::fmt::Debug for Factory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("keys", &self.creators.keys().collect::<Vec<_>>())
            .finish()
    }
}
