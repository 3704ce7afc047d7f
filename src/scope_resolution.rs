//! Nested binding scopes used by the parser to give every binder a
//! uniquifier. Scopes live in an arena and refer to their parent by index.

use std::collections::HashMap;

use crate::box_tree_impl::box_tree_ast::{Identifier, Uniquifier};

/// Handle to a scope inside a `ScopeArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

// A single scope: the uniquifiers assigned by binders in this scope, and the
// enclosing scope (`None` only for the root).
#[derive(Debug)]
struct ScopeRecord {
    ident_uniquifiers: HashMap<String, Uniquifier>,
    parent: Option<ScopeId>,
}

/// Owns every scope created while parsing one top-level expression.
#[derive(Debug)]
pub struct ScopeArena {
    scopes: Vec<ScopeRecord>,
}

impl Default for ScopeArena {
    fn default() -> Self {
        return Self::new();
    }
}

impl ScopeArena {
    /// Creates an arena holding only an empty root scope.
    pub fn new() -> Self {
        return ScopeArena {
            scopes: vec![ScopeRecord {
                ident_uniquifiers: HashMap::new(),
                parent: None,
            }],
        };
    }

    /// The root scope. Nothing is ever bound in it by the parser, so names
    /// that resolve this far are free.
    pub fn root(&self) -> ScopeId {
        return ScopeId(0);
    }

    /// Returns a new empty scope nested inside `parent`.
    pub fn create_child(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(ScopeRecord {
            ident_uniquifiers: HashMap::new(),
            parent: Some(parent),
        });

        return ScopeId(self.scopes.len() - 1);
    }

    /// Looks `name` up in `scope` and then in each enclosing scope. Returns
    /// 0 if no scope on the chain binds it.
    pub fn get_uniquifier(&self, scope: ScopeId, name: &str) -> Uniquifier {
        let mut curr_scope = Some(scope);

        while let Some(ScopeId(scope_idx)) = curr_scope {
            let scope_record = &self.scopes[scope_idx];

            if let Some(uniquifier) = scope_record.ident_uniquifiers.get(name) {
                return *uniquifier;
            }

            curr_scope = scope_record.parent;
        }

        return 0;
    }

    /// Declares a binder for `name` in `scope`. The binder gets one more than
    /// the uniquifier `name` currently resolves to, so it differs from every
    /// binder of the same name that encloses it or that came before it in
    /// this scope.
    pub fn create_ident(&mut self, scope: ScopeId, name: &str) -> Identifier {
        let uniquifier = self.get_uniquifier(scope, name) + 1;

        let ScopeId(scope_idx) = scope;
        self.scopes[scope_idx]
            .ident_uniquifiers
            .insert(String::from(name), uniquifier);

        return Identifier::new(name, uniquifier);
    }

    /// Resolves a reference to `name` from `scope` without declaring
    /// anything.
    pub fn get_ident(&self, scope: ScopeId, name: &str) -> Identifier {
        return Identifier::new(name, self.get_uniquifier(scope, name));
    }
}
