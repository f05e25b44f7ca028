//! Ordered, named handler chain backing each lifecycle phase.

use std::fmt;
use std::sync::Arc;

/// Priority given to handlers subscribed without one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Name and ordering of a handler registration.
///
/// Strings convert into a subscription with [`DEFAULT_PRIORITY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    name: String,
    priority: i32,
}

impl Subscription {
    /// Create a subscription with the default priority.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: DEFAULT_PRIORITY,
        }
    }

    /// Set priority (lower runs first).
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority_value(&self) -> i32 {
        self.priority
    }
}

impl From<&str> for Subscription {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Subscription {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

struct RegisteredHook<H: ?Sized> {
    subscription: Subscription,
    handler: Arc<H>,
}

/// Handlers for one phase, ordered by priority and then subscription order.
pub struct HookChain<H: ?Sized> {
    hooks: Vec<RegisteredHook<H>>,
}

impl<H: ?Sized> HookChain<H> {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Register a handler.
    pub fn register(&mut self, subscription: Subscription, handler: Arc<H>) {
        self.hooks.push(RegisteredHook {
            subscription,
            handler,
        });

        // Stable sort keeps subscription order within a priority
        self.hooks.sort_by_key(|h| h.subscription.priority);
    }

    /// Remove handlers by name, returning how many were removed.
    pub fn unregister(&mut self, name: &str) -> usize {
        let before = self.hooks.len();
        self.hooks.retain(|h| h.subscription.name != name);
        before - self.hooks.len()
    }

    /// Handler names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.hooks
            .iter()
            .map(|h| h.subscription.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Iterate `(name, handler)` pairs in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &H)> {
        self.hooks
            .iter()
            .map(|h| (h.subscription.name.as_str(), h.handler.as_ref()))
    }
}

impl<H: ?Sized> Default for HookChain<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized> fmt::Debug for HookChain<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Handler = dyn Fn() -> u32 + Send + Sync;

    #[test]
    fn test_chain_ordering() {
        let mut chain: HookChain<Handler> = HookChain::new();
        chain.register(Subscription::new("b"), Arc::new(|| 2u32));
        chain.register(Subscription::new("c"), Arc::new(|| 3u32));
        chain.register(Subscription::new("a").priority(1), Arc::new(|| 1u32));

        assert_eq!(chain.names(), vec!["a", "b", "c"]);
        let results: Vec<u32> = chain.iter().map(|(_, h)| h()).collect();
        assert_eq!(results, vec![1, 2, 3]);
    }

    #[test]
    fn test_chain_unregister() {
        let mut chain: HookChain<Handler> = HookChain::default();
        chain.register("dup".into(), Arc::new(|| 1u32));
        chain.register("dup".into(), Arc::new(|| 2u32));
        chain.register("keep".into(), Arc::new(|| 3u32));

        assert_eq!(chain.unregister("dup"), 2);
        assert_eq!(chain.len(), 1);
        assert_eq!(format!("{:?}", chain), r#"["keep"]"#);
    }
}
