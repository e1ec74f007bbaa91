//! Lexical scope stack
//!
//! One frame per open block. Lookup walks from the innermost frame outward.

use crate::typeck::Ty;
use std::collections::HashMap;

/// A single scope frame
#[derive(Debug, Clone, Default)]
pub struct Scope {
    symbols: HashMap<String, Ty>,
}

/// Stack of scope frames. The bottom (global) frame is never popped.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    /// A stack holding only the global frame
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Number of open frames, the global frame included
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Declare `name` in the innermost frame. Returns `false` if it is
    /// already declared there; the existing binding is kept.
    pub fn declare(&mut self, name: &str, ty: Ty) -> bool {
        let Some(scope) = self.scopes.last_mut() else {
            return false;
        };
        if scope.symbols.contains_key(name) {
            return false;
        }
        scope.symbols.insert(name.to_string(), ty);
        true
    }

    /// Look up a variable by name
    pub fn lookup(&self, name: &str) -> Option<&Ty> {
        // Search from innermost to outermost scope
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name))
    }

    /// Check if a variable exists in current scope
    pub fn declared_in_current(&self, name: &str) -> bool {
        self.scopes
            .last()
            .map_or(false, |scope| scope.symbols.contains_key(name))
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_scope_is_dropped_on_pop() {
        let mut scopes = ScopeStack::new();
        scopes.push_scope();
        assert!(scopes.declare("y", Ty::Int));
        assert_eq!(scopes.lookup("y"), Some(&Ty::Int));
        scopes.pop_scope();
        assert_eq!(scopes.lookup("y"), None);
    }

    #[test]
    fn test_shadowing_resolves_innermost() {
        let mut scopes = ScopeStack::new();
        scopes.declare("x", Ty::Int);
        scopes.push_scope();
        assert!(scopes.lookup("x").is_some());
        assert!(!scopes.declared_in_current("x"));
        scopes.declare("x", Ty::Str);
        assert_eq!(scopes.lookup("x"), Some(&Ty::Str));
        scopes.pop_scope();
        assert_eq!(scopes.lookup("x"), Some(&Ty::Int));
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        let mut scopes = ScopeStack::new();
        assert!(scopes.declare("g", Ty::Graph));
        assert!(!scopes.declare("g", Ty::Node));
        assert_eq!(scopes.lookup("g"), Some(&Ty::Graph));
    }

    #[test]
    fn test_global_frame_survives_pop() {
        let mut scopes = ScopeStack::new();
        scopes.declare("g", Ty::Graph);
        scopes.pop_scope();
        assert_eq!(scopes.depth(), 1);
        assert!(scopes.lookup("g").is_some());
    }
}
