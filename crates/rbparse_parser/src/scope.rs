//! Local variable scopes.
//!
//! Method, class and module bodies start a fresh set of locals. Blocks and
//! lambdas see the locals of their enclosing scope, which is why a local
//! read records how many block scopes it crossed.

use rbparse_core::OrderedSet;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// An enclosing scope supplied by the caller, for eval-style parsing.
    Eval,
    /// The program itself.
    Top,
    Def,
    Class,
    Module,
    SingletonClass,
    Block,
    Lambda,
}

impl ScopeKind {
    /// Whether names from enclosing scopes are visible through this one.
    fn is_transparent(self) -> bool {
        matches!(self, ScopeKind::Eval | ScopeKind::Top | ScopeKind::Block | ScopeKind::Lambda)
    }
}

#[derive(Debug)]
struct Scope<'a> {
    kind: ScopeKind,
    locals: OrderedSet<&'a str>,
    /// The method declared `...` in its parameters.
    forwarding: bool,
}

#[derive(Debug, Default)]
pub struct ScopeStack<'a> {
    scopes: Vec<Scope<'a>>,
}

impl<'a> ScopeStack<'a> {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn push(&mut self, kind: ScopeKind) {
        trace!(?kind, depth = self.scopes.len(), "push scope");
        self.scopes.push(Scope {
            kind,
            locals: OrderedSet::new(),
            forwarding: false,
        });
    }

    /// Pop the innermost scope, returning its locals in binding order.
    pub fn pop(&mut self) -> Vec<&'a str> {
        match self.scopes.pop() {
            Some(scope) => {
                trace!(kind = ?scope.kind, locals = scope.locals.len(), "pop scope");
                scope.locals.as_slice().to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Bind `name` in the innermost scope. Returns `false` if it was
    /// already bound there.
    pub fn add_local(&mut self, name: &'a str) -> bool {
        match self.scopes.last_mut() {
            Some(scope) => scope.locals.insert(name),
            None => false,
        }
    }

    /// The number of block scopes between the innermost scope and the one
    /// binding `name`, or `None` if `name` is not a visible local.
    pub fn resolve(&self, name: &str) -> Option<u32> {
        let mut depth = 0;
        for scope in self.scopes.iter().rev() {
            if scope.locals.contains(&name) {
                return Some(depth);
            }
            if !scope.kind.is_transparent() {
                return None;
            }
            depth += 1;
        }
        None
    }

    /// Record that the nearest enclosing method accepts `...`.
    pub fn mark_forwarding(&mut self) {
        if let Some(scope) = self.scopes.iter_mut().rev().find(|scope| scope.kind == ScopeKind::Def) {
            scope.forwarding = true;
        }
    }

    /// Whether `...` may be passed along here: the nearest enclosing method,
    /// looking through blocks only, declared `...`.
    pub fn forwarding_allowed(&self) -> bool {
        for scope in self.scopes.iter().rev() {
            match scope.kind {
                ScopeKind::Block | ScopeKind::Lambda => continue,
                ScopeKind::Def => return scope.forwarding,
                _ => return false,
            }
        }
        false
    }

    /// Whether the innermost non-block scope is a method body.
    pub fn in_def(&self) -> bool {
        self.nearest_opaque() == Some(ScopeKind::Def)
    }

    /// Whether the innermost non-block scope is a class or module body.
    pub fn in_class_body(&self) -> bool {
        matches!(
            self.nearest_opaque(),
            Some(ScopeKind::Class | ScopeKind::Module | ScopeKind::SingletonClass)
        )
    }

    /// Whether the innermost scope is the program scope.
    pub fn is_top_level(&self) -> bool {
        self.scopes.last().map_or(true, |scope| scope.kind == ScopeKind::Top)
    }

    fn nearest_opaque(&self) -> Option<ScopeKind> {
        self.scopes
            .iter()
            .rev()
            .map(|scope| scope.kind)
            .find(|kind| !matches!(kind, ScopeKind::Block | ScopeKind::Lambda))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_scopes_see_outer_locals() {
        let mut scopes = ScopeStack::new();
        scopes.push(ScopeKind::Top);
        scopes.add_local("a");
        scopes.push(ScopeKind::Block);
        scopes.add_local("b");
        scopes.push(ScopeKind::Block);
        assert_eq!(scopes.resolve("a"), Some(2));
        assert_eq!(scopes.resolve("b"), Some(1));
        assert_eq!(scopes.resolve("c"), None);
        assert_eq!(scopes.pop(), Vec::<&str>::new());
        assert_eq!(scopes.pop(), vec!["b"]);
    }

    #[test]
    fn test_def_scope_hides_outer_locals() {
        let mut scopes = ScopeStack::new();
        scopes.push(ScopeKind::Top);
        scopes.add_local("a");
        scopes.push(ScopeKind::Def);
        assert_eq!(scopes.resolve("a"), None);
        assert!(scopes.in_def());
    }

    #[test]
    fn test_forwarding_is_per_method() {
        let mut scopes = ScopeStack::new();
        scopes.push(ScopeKind::Top);
        scopes.push(ScopeKind::Def);
        assert!(!scopes.forwarding_allowed());
        scopes.mark_forwarding();
        scopes.push(ScopeKind::Block);
        assert!(scopes.forwarding_allowed());
        scopes.pop();
        scopes.push(ScopeKind::Def);
        assert!(!scopes.forwarding_allowed());
        scopes.pop();
        assert!(scopes.forwarding_allowed());
    }

    #[test]
    fn test_locals_keep_binding_order() {
        let mut scopes = ScopeStack::new();
        scopes.push(ScopeKind::Top);
        assert!(scopes.add_local("z"));
        assert!(scopes.add_local("a"));
        assert!(!scopes.add_local("z"));
        assert_eq!(scopes.pop(), vec!["z", "a"]);
    }
}
