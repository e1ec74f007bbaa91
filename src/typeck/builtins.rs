//! Function table and the built-in runtime surface

use crate::typeck::Ty;
use std::collections::HashMap;

/// Where a function comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FnKind {
    /// Provided by the runtime prelude under the same name
    Builtin,
    /// Defined in the program being compiled
    User,
}

/// A function signature
#[derive(Debug, Clone, PartialEq)]
pub struct FnSig {
    pub params: Vec<Ty>,
    pub ret: Ty,
    pub kind: FnKind,
}

impl FnSig {
    pub fn builtin(params: Vec<Ty>, ret: Ty) -> Self {
        Self {
            params,
            ret,
            kind: FnKind::Builtin,
        }
    }

    pub fn user(params: Vec<Ty>, ret: Ty) -> Self {
        Self {
            params,
            ret,
            kind: FnKind::User,
        }
    }
}

/// Every built-in with its signature
pub fn builtin_signatures() -> Vec<(&'static str, FnSig)> {
    use Ty::*;
    let node_list = || Ty::list_of(Node);

    vec![
        ("create_graph", FnSig::builtin(vec![], Graph)),
        ("add_node", FnSig::builtin(vec![Graph, Str], Node)),
        ("add_arc", FnSig::builtin(vec![Graph, Node, Node, Int], Arc)),
        ("remove_node", FnSig::builtin(vec![Graph, Node], Bool)),
        ("remove_arc", FnSig::builtin(vec![Graph, Arc], Bool)),
        ("get_nodes", FnSig::builtin(vec![Graph], node_list())),
        ("get_arcs", FnSig::builtin(vec![Graph], Ty::list_of(Arc))),
        ("find_path", FnSig::builtin(vec![Graph, Node, Node], node_list())),
        ("is_connected", FnSig::builtin(vec![Graph, Node, Node], Bool)),
        ("print", FnSig::builtin(vec![Str], Void)),
        ("println", FnSig::builtin(vec![Str], Void)),
        ("write", FnSig::builtin(vec![Str], Void)),
        ("read_line", FnSig::builtin(vec![], Str)),
        ("read_int", FnSig::builtin(vec![], Int)),
        ("abs", FnSig::builtin(vec![Int], Int)),
        ("sqrt", FnSig::builtin(vec![Float], Float)),
        ("pow", FnSig::builtin(vec![Float, Float], Float)),
        ("len", FnSig::builtin(vec![Ty::bare_list()], Int)),
        ("to_string", FnSig::builtin(vec![Int], Str)),
        ("node_id", FnSig::builtin(vec![Node], Str)),
        ("arc_weight", FnSig::builtin(vec![Arc], Int)),
    ]
}

/// Why a function could not be added to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefineError {
    Builtin,
    Duplicate,
}

/// Global function namespace: built-ins plus user functions registered so far
#[derive(Debug, Clone)]
pub struct FunctionTable {
    functions: HashMap<String, FnSig>,
}

impl FunctionTable {
    /// A table seeded with the built-ins
    pub fn with_builtins() -> Self {
        let functions = builtin_signatures()
            .into_iter()
            .map(|(name, sig)| (name.to_string(), sig))
            .collect();
        Self { functions }
    }

    pub fn lookup(&self, name: &str) -> Option<&FnSig> {
        self.functions.get(name)
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        matches!(self.lookup(name), Some(sig) if sig.kind == FnKind::Builtin)
    }

    /// Register a user function
    pub fn define(&mut self, name: &str, sig: FnSig) -> Result<(), DefineError> {
        match self.functions.get(name) {
            Some(existing) if existing.kind == FnKind::Builtin => Err(DefineError::Builtin),
            Some(_) => Err(DefineError::Duplicate),
            None => {
                self.functions.insert(name.to_string(), sig);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_seeded() {
        let table = FunctionTable::with_builtins();
        let sig = table.lookup("add_arc").unwrap();
        assert_eq!(sig.params, vec![Ty::Graph, Ty::Node, Ty::Node, Ty::Int]);
        assert_eq!(sig.ret, Ty::Arc);
        assert!(table.is_builtin("find_path"));
        assert!(table.lookup("shortest_path").is_none());
    }

    #[test]
    fn test_define_rejects_builtin_and_duplicate() {
        let mut table = FunctionTable::with_builtins();
        assert_eq!(
            table.define("println", FnSig::user(vec![], Ty::Void)),
            Err(DefineError::Builtin)
        );
        assert_eq!(table.define("helper", FnSig::user(vec![Ty::Int], Ty::Int)), Ok(()));
        assert_eq!(
            table.define("helper", FnSig::user(vec![], Ty::Void)),
            Err(DefineError::Duplicate)
        );
        assert!(!table.is_builtin("helper"));
    }
}
