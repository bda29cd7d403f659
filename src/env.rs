//! Symbol & Environment: a stack of frames, used identically by the
//! analyzer (payload is a `Symbol`, carrying a type) and the evaluator
//! (payload is a `Binding`, carrying a runtime value).
//!
//! Frames are reference-counted so that cloning an `Environment` — the
//! mechanism behind capturing a lexical environment at function-value
//! creation time — is O(1) and does not disturb the frame stack of the
//! environment it was cloned from. `enter`/`leave` only ever grow or shrink
//! *this* environment's own view of the stack; the shared frames underneath
//! are mutated through interior mutability, which is exactly what makes a
//! `let` in an enclosing scope visible to, and mutable from, a closure that
//! captured it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

type Frame<T> = Rc<RefCell<HashMap<String, T>>>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("cannot pop the root frame")]
    PoppedRoot,
    #[error("'{0}' is already declared in this scope")]
    DuplicateInFrame(String),
}

#[derive(Clone)]
pub struct Environment<T: Clone> {
    frames: im::Vector<Frame<T>>,
}

impl<T: Clone> Environment<T> {
    /// A fresh environment with only the root frame.
    pub fn new() -> Self {
        let mut frames = im::Vector::new();
        frames.push_back(Rc::new(RefCell::new(HashMap::new())));
        Self { frames }
    }

    /// Number of frames currently on the stack; 1 means "at the root".
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Pushes a fresh, empty frame.
    pub fn enter(&mut self) {
        self.frames.push_back(Rc::new(RefCell::new(HashMap::new())));
    }

    /// Pops the top frame, releasing all of its bindings. Fails if this
    /// would pop the root frame.
    pub fn leave(&mut self) -> Result<(), EnvError> {
        if self.frames.len() <= 1 {
            return Err(EnvError::PoppedRoot);
        }
        self.frames.pop_back();
        Ok(())
    }

    /// Declares `name` in the top frame. Redeclaring a name already present
    /// in the *same* frame is an error; shadowing a name from an outer frame
    /// is not.
    pub fn set(&self, name: impl Into<String>, value: T) -> Result<(), EnvError> {
        let name = name.into();
        let top = self.frames.back().expect("root frame is never absent");
        let mut top = top.borrow_mut();
        if top.contains_key(&name) {
            return Err(EnvError::DuplicateInFrame(name));
        }
        top.insert(name, value);
        Ok(())
    }

    /// Overwrites an existing binding for `name`, searching top-down.
    /// Returns `false` if no frame declares `name`.
    pub fn assign(&self, name: &str, value: T) -> bool {
        for frame in self.frames.iter().rev() {
            let mut frame = frame.borrow_mut();
            if let Some(slot) = frame.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        false
    }

    /// Looks up `name`, searching top-down.
    pub fn get(&self, name: &str) -> Option<T> {
        for frame in self.frames.iter().rev() {
            if let Some(value) = frame.borrow().get(name) {
                return Some(value.clone());
            }
        }
        None
    }

    /// Snapshot of the top frame's bindings, for diagnostics/tooling (e.g.
    /// populating `Symbol::Fn::vars` after analyzing a function body).
    pub fn top_frame_entries(&self) -> Vec<(String, T)> {
        let top = self.frames.back().expect("root frame is never absent");
        top.borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<T: Clone> Default for Environment<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadowing_and_restore() {
        let mut env: Environment<i32> = Environment::new();
        env.set("x", 1).unwrap();
        env.enter();
        env.set("x", 2).unwrap();
        assert_eq!(env.get("x"), Some(2));
        env.leave().unwrap();
        assert_eq!(env.get("x"), Some(1));
    }

    #[test]
    fn duplicate_in_same_frame_is_error() {
        let env: Environment<i32> = Environment::new();
        env.set("x", 1).unwrap();
        assert_eq!(
            env.set("x", 2),
            Err(EnvError::DuplicateInFrame("x".to_string()))
        );
    }

    #[test]
    fn cannot_pop_root() {
        let mut env: Environment<i32> = Environment::new();
        assert_eq!(env.leave(), Err(EnvError::PoppedRoot));
    }

    #[test]
    fn captured_clone_does_not_see_later_frame_pushes() {
        let mut base: Environment<i32> = Environment::new();
        base.set("g", 10).unwrap();
        let captured = base.clone();
        base.enter();
        base.set("local", 1).unwrap();
        assert_eq!(captured.depth(), 1);
        assert_eq!(captured.get("local"), None);
        assert_eq!(captured.get("g"), Some(10));
    }

    #[test]
    fn mutation_through_shared_frame_is_visible_across_clones() {
        let mut base: Environment<i32> = Environment::new();
        base.set("g", 1).unwrap();
        let captured = base.clone();
        assert!(base.assign("g", 2));
        assert_eq!(captured.get("g"), Some(2));
    }
}
