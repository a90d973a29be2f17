#![forbid(unsafe_code)]

//! Single-assignment memo cells.
//!
//! A [`Memo`] is either unevaluated (holding a thunk) or evaluated (holding
//! the cached value). The thunk runs at most once, on the first call to
//! [`Memo::force`]; every later read returns the cached value.
//!
//! # Example
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use treescope_core::Memo;
//!
//! let calls = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&calls);
//! let memo = Memo::new(move || {
//!     counter.set(counter.get() + 1);
//!     "expensive".to_string()
//! });
//!
//! assert!(memo.get().is_none());
//! assert_eq!(memo.force(), "expensive");
//! assert_eq!(memo.force(), "expensive");
//! assert_eq!(calls.get(), 1);
//! ```

use std::cell::{Cell, LazyCell};
use std::fmt;
use std::rc::Rc;

type Thunk<T> = Box<dyn FnOnce() -> T>;

/// A lazily evaluated value computed at most once.
pub struct Memo<T> {
    cell: LazyCell<T, Thunk<T>>,
    evaluated: Rc<Cell<bool>>,
}

impl<T: 'static> Memo<T> {
    /// Create an unevaluated cell from a thunk.
    pub fn new<F>(thunk: F) -> Self
    where
        F: FnOnce() -> T + 'static,
    {
        let evaluated = Rc::new(Cell::new(false));
        let flag = Rc::clone(&evaluated);
        let thunk: Thunk<T> = Box::new(move || {
            let value = thunk();
            flag.set(true);
            value
        });
        Self {
            cell: LazyCell::new(thunk),
            evaluated,
        }
    }
}

impl<T> Memo<T> {
    /// Evaluate the thunk if needed and return the cached value.
    pub fn force(&self) -> &T {
        LazyCell::force(&self.cell)
    }

    /// Return the value if it has already been computed, without computing it.
    pub fn get(&self) -> Option<&T> {
        if self.evaluated.get() {
            Some(LazyCell::force(&self.cell))
        } else {
            None
        }
    }

    /// Whether the thunk has run.
    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        self.evaluated.get()
    }
}

impl<T: fmt::Debug> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("Memo").field(value).finish(),
            None => f.write_str("Memo(<unevaluated>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thunk_runs_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let memo = Memo::new(move || {
            counter.set(counter.get() + 1);
            41 + 1
        });
        assert!(!memo.is_evaluated());
        assert_eq!(*memo.force(), 42);
        assert_eq!(*memo.force(), 42);
        assert_eq!(memo.get(), Some(&42));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn get_does_not_evaluate() {
        let memo = Memo::new(|| 7u8);
        assert_eq!(memo.get(), None);
        assert!(!memo.is_evaluated());
    }

    #[test]
    fn debug_shows_state() {
        let memo = Memo::new(|| 1u32);
        assert_eq!(format!("{memo:?}"), "Memo(<unevaluated>)");
        memo.force();
        assert_eq!(format!("{memo:?}"), "Memo(1)");
    }
}
