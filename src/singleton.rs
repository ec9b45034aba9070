//! Lazily built, process-wide instances.
//!
//! # Design Decisions
//! - The factory runs at most once; concurrent first callers block until it
//!   finishes
//! - The outcome is cached either way: a failed build is never retried
//! - `const fn new` so a holder can live in a `static`

use std::fmt;
use std::sync::OnceLock;

/// Holder that builds its value on first access.
///
/// ```
/// use elog::singleton::Singleton;
///
/// static ANSWER: Singleton<u32, String> = Singleton::new(|| Ok(42));
///
/// assert_eq!(ANSWER.get(), Ok(&42));
/// ```
pub struct Singleton<T, E, F = fn() -> Result<T, E>> {
    cell: OnceLock<Result<T, E>>,
    factory: F,
}

impl<T, E, F> Singleton<T, E, F>
where
    F: Fn() -> Result<T, E>,
{
    pub const fn new(factory: F) -> Self {
        Self {
            cell: OnceLock::new(),
            factory,
        }
    }

    /// The shared instance, or the error its construction produced.
    pub fn get(&self) -> Result<&T, &E> {
        self.cell.get_or_init(|| (self.factory)()).as_ref()
    }

    /// Whether the factory has already run.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: fmt::Debug, E: fmt::Debug, F> fmt::Debug for Singleton<T, E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Singleton").field("value", &self.cell.get()).finish()
    }
}
