//! Directive handler registry.
//!
//! Handlers are registered by name with a kind and a priority. The engine
//! runs them in ascending priority; equal priorities keep registration order.

use std::fmt;

use crate::context::DirectiveMatch;
use crate::error::{HandlerError, RegistryError};
use crate::scan::is_valid_name;

/// Default handler priority.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Forms a directive is recognized in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// Single line only.
    Inline,
    /// `::end`-terminated block only.
    Block,
    /// Both forms; the inline rewrite runs first.
    Both,
}

impl DirectiveKind {
    /// Whether the inline rewrite applies.
    #[must_use]
    pub fn runs_inline(self) -> bool {
        matches!(self, Self::Inline | Self::Both)
    }

    /// Whether the block rewrite applies.
    #[must_use]
    pub fn runs_block(self) -> bool {
        matches!(self, Self::Block | Self::Both)
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inline => "inline",
            Self::Block => "block",
            Self::Both => "both",
        })
    }
}

/// Handler for a directive.
///
/// Closures and plain functions with the signature
/// `Fn(&DirectiveMatch<'_>) -> Result<String, HandlerError>` implement this
/// trait, so most handlers never name it.
///
/// # Thread Safety
///
/// Handlers are `Send + Sync`: a registry is built once and shared by every
/// document pass, possibly across threads.
///
/// # Example
///
/// ```
/// use mg_directives::{DirectiveHandler, DirectiveMatch, HandlerError};
///
/// struct Kbd;
///
/// impl DirectiveHandler for Kbd {
///     fn handle(&self, m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
///         Ok(format!("<kbd>{}</kbd>", m.args))
///     }
/// }
/// ```
pub trait DirectiveHandler: Send + Sync {
    /// Convert a match into replacement text.
    fn handle(&self, m: &DirectiveMatch<'_>) -> Result<String, HandlerError>;
}

impl<F> DirectiveHandler for F
where
    F: Fn(&DirectiveMatch<'_>) -> Result<String, HandlerError> + Send + Sync,
{
    fn handle(&self, m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
        self(m)
    }
}

/// Options for [`HandlerRegistry::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Recognized forms. Default: [`DirectiveKind::Block`].
    pub kind: DirectiveKind,
    /// Lower runs earlier. Default: [`DEFAULT_PRIORITY`].
    pub priority: i32,
}

impl Default for RegisterOptions {
    fn default() -> Self {
        Self {
            kind: DirectiveKind::Block,
            priority: DEFAULT_PRIORITY,
        }
    }
}

impl RegisterOptions {
    /// Inline-only options with default priority.
    #[must_use]
    pub fn inline() -> Self {
        Self {
            kind: DirectiveKind::Inline,
            ..Self::default()
        }
    }

    /// Block-only options with default priority.
    #[must_use]
    pub fn block() -> Self {
        Self::default()
    }

    /// Options for both forms with default priority.
    #[must_use]
    pub fn both() -> Self {
        Self {
            kind: DirectiveKind::Both,
            ..Self::default()
        }
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// A registered directive.
pub struct Registration {
    name: String,
    kind: DirectiveKind,
    priority: i32,
    handler: Box<dyn DirectiveHandler>,
}

impl Registration {
    /// Directive name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recognized forms.
    #[must_use]
    pub fn kind(&self) -> DirectiveKind {
        self.kind
    }

    /// Execution priority.
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Run the handler.
    pub fn invoke(&self, m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
        self.handler.handle(m)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of directive registrations.
///
/// # Example
///
/// ```
/// use mg_directives::{DirectiveMatch, HandlerRegistry, RegisterOptions};
///
/// let mut registry = HandlerRegistry::new();
/// registry
///     .add("kbd", RegisterOptions::inline(), |m: &DirectiveMatch<'_>| {
///         Ok(format!("<kbd>{}</kbd>", m.args))
///     })
///     .unwrap();
///
/// assert!(registry.contains("kbd"));
/// ```
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    entries: Vec<Registration>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler function or closure.
    ///
    /// Registering an existing name replaces the previous registration but
    /// keeps its original position in registration order.
    pub fn add<F>(
        &mut self,
        name: impl Into<String>,
        options: RegisterOptions,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&DirectiveMatch<'_>) -> Result<String, HandlerError> + Send + Sync + 'static,
    {
        self.add_handler(name, options, handler)
    }

    /// Register a [`DirectiveHandler`] implementation.
    pub fn add_handler<H: DirectiveHandler + 'static>(
        &mut self,
        name: impl Into<String>,
        options: RegisterOptions,
        handler: H,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(RegistryError::InvalidName(name));
        }
        if name == "end" {
            return Err(RegistryError::ReservedName);
        }

        let registration = Registration {
            name,
            kind: options.kind,
            priority: options.priority,
            handler: Box::new(handler),
        };

        match self.entries.iter().position(|r| r.name == registration.name) {
            Some(idx) => {
                tracing::debug!(directive = %registration.name, "Replacing directive handler");
                self.entries[idx] = registration;
            }
            None => self.entries.push(registration),
        }
        Ok(())
    }

    /// All registrations in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &Registration> {
        self.entries.iter()
    }

    /// Registrations in execution order: ascending priority, ties in
    /// registration order.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Registration> {
        let mut sorted: Vec<&Registration> = self.entries.iter().collect();
        // `sort_by_key` is stable.
        sorted.sort_by_key(|r| r.priority);
        sorted
    }

    /// Look up a registration by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Registration> {
        self.entries.iter().find(|r| r.name == name)
    }

    /// Check whether a name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PageData;

    fn constant(text: &'static str) -> impl Fn(&DirectiveMatch<'_>) -> Result<String, HandlerError> {
        move |_: &DirectiveMatch<'_>| Ok(text.to_owned())
    }

    #[test]
    fn test_default_options() {
        let options = RegisterOptions::default();
        assert_eq!(options.kind, DirectiveKind::Block);
        assert_eq!(options.priority, 100);
    }

    #[test]
    fn test_add_and_get() {
        let mut registry = HandlerRegistry::new();
        registry
            .add("note", RegisterOptions::inline().with_priority(5), constant("x"))
            .unwrap();

        let reg = registry.get("note").unwrap();
        assert_eq!(reg.name(), "note");
        assert_eq!(reg.kind(), DirectiveKind::Inline);
        assert_eq!(reg.priority(), 5);
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_rejects_invalid_names() {
        let mut registry = HandlerRegistry::new();
        assert_eq!(
            registry.add("9lives", RegisterOptions::default(), constant("")),
            Err(RegistryError::InvalidName("9lives".to_owned()))
        );
        assert!(registry.add("a b", RegisterOptions::default(), constant("")).is_err());
        assert!(registry.add("", RegisterOptions::default(), constant("")).is_err());
        assert_eq!(
            registry.add("end", RegisterOptions::default(), constant("")),
            Err(RegistryError::ReservedName)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_last_write_wins_keeps_position() {
        let mut registry = HandlerRegistry::new();
        registry.add("a", RegisterOptions::default(), constant("first")).unwrap();
        registry.add("b", RegisterOptions::default(), constant("b")).unwrap();
        registry
            .add("a", RegisterOptions::inline(), constant("second"))
            .unwrap();

        let names: Vec<_> = registry.entries().map(Registration::name).collect();
        assert_eq!(names, vec!["a", "b"]);

        let page = PageData::new();
        let m = DirectiveMatch::inline("a", "", "", &page);
        let reg = registry.get("a").unwrap();
        assert_eq!(reg.kind(), DirectiveKind::Inline);
        assert_eq!(reg.invoke(&m).unwrap(), "second");
    }

    #[test]
    fn test_sorted_is_stable() {
        let mut registry = HandlerRegistry::new();
        registry
            .add("late", RegisterOptions::default().with_priority(20), constant(""))
            .unwrap();
        registry
            .add("generic", RegisterOptions::default().with_priority(10), constant(""))
            .unwrap();
        registry
            .add("specific", RegisterOptions::default().with_priority(10), constant(""))
            .unwrap();
        registry
            .add("first", RegisterOptions::default().with_priority(-1), constant(""))
            .unwrap();

        let names: Vec<_> = registry.sorted().into_iter().map(Registration::name).collect();
        assert_eq!(names, vec!["first", "generic", "specific", "late"]);
    }

    #[test]
    fn test_trait_handler() {
        struct Upper;

        impl DirectiveHandler for Upper {
            fn handle(&self, m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
                Ok(m.args.to_uppercase())
            }
        }

        let mut registry = HandlerRegistry::new();
        registry
            .add_handler("upper", RegisterOptions::inline(), Upper)
            .unwrap();

        let page = PageData::new();
        let m = DirectiveMatch::inline("upper", "hi", "::upper hi", &page);
        assert_eq!(registry.get("upper").unwrap().invoke(&m).unwrap(), "HI");
    }

    #[test]
    fn test_kind_flags() {
        assert!(DirectiveKind::Inline.runs_inline());
        assert!(!DirectiveKind::Inline.runs_block());
        assert!(DirectiveKind::Both.runs_inline());
        assert!(DirectiveKind::Both.runs_block());
        assert_eq!(DirectiveKind::Both.to_string(), "both");
    }
}
