//! Named factory registry
//!
//! Maps a string key to a factory function so callers can pick an
//! implementation at runtime (for example from a command-line flag). The
//! registry is thread-safe so it can be held in a `static`.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::warn;

/// Factory function producing a boxed implementation from its arguments
pub type Factory<A, T> = fn(A) -> Box<T>;

/// Thread-safe registry mapping names to factory functions
pub struct Registry<A, T: ?Sized> {
    factories: Mutex<HashMap<String, Factory<A, T>>>,
}

impl<A, T: ?Sized> Registry<A, T> {
    pub fn new() -> Self {
        Self {
            factories: Mutex::new(HashMap::new()),
        }
    }

    /// Register a factory under `name`
    ///
    /// Registering an existing name replaces the previous factory.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use engine_core::registry::Registry;
    /// trait Greeter {
    ///     fn greet(&self) -> String;
    /// }
    ///
    /// struct Polite(String);
    ///
    /// impl Greeter for Polite {
    ///     fn greet(&self) -> String {
    ///         format!("Good day, {}", self.0)
    ///     }
    /// }
    ///
    /// let registry: Registry<String, dyn Greeter> = Registry::new();
    /// registry.register("polite", |name| Box::new(Polite(name)) as Box<dyn Greeter>);
    ///
    /// let greeter = registry.create("polite", "Ada".to_string()).unwrap();
    /// assert_eq!(greeter.greet(), "Good day, Ada");
    /// ```
    pub fn register(&self, name: &str, factory: Factory<A, T>) {
        let mut factories = self.factories.lock().unwrap();
        if factories.contains_key(name) {
            warn!("Overriding existing registration for '{}'", name);
        }
        factories.insert(name.to_string(), factory);
    }

    /// Create a new instance by name
    ///
    /// Returns `None` if nothing is registered under `name`.
    pub fn create(&self, name: &str, args: A) -> Option<Box<T>> {
        let factory = {
            let factories = self.factories.lock().unwrap();
            factories.get(name).copied()
        };
        factory.map(|factory| factory(args))
    }

    /// All registered names, sorted
    pub fn list(&self) -> Vec<String> {
        let factories = self.factories.lock().unwrap();
        let mut names: Vec<String> = factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_registered(&self, name: &str) -> bool {
        let factories = self.factories.lock().unwrap();
        factories.contains_key(name)
    }
}

impl<A, T: ?Sized> Default for Registry<A, T> {
    fn default() -> Self {
        Self::new()
    }
}
