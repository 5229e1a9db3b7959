//! The symbol table.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::phase::PhaseSet;
use crate::types::VclType;

use super::defs::{Symbol, SymbolKind};

/// All top-level symbols, one insertion-ordered map per namespace.
///
/// Backends and directors share a namespace; every other kind has its own.
/// Iteration order is declaration order, which fixes the order of the
/// unused-symbol sweep.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    acls: IndexMap<SmolStr, Symbol>,
    backends: IndexMap<SmolStr, Symbol>,
    tables: IndexMap<SmolStr, Symbol>,
    subroutines: IndexMap<SmolStr, Symbol>,
    penaltyboxes: IndexMap<SmolStr, Symbol>,
    ratecounters: IndexMap<SmolStr, Symbol>,
}

macro_rules! namespace_accessors {
    ($field:ident, $declare:ident, $get:ident, $mark:ident, $iter:ident) => {
        /// Declares a symbol in this namespace. Returns the previous
        /// declaration if the name is already taken.
        pub fn $declare(&mut self, symbol: Symbol) -> Option<Symbol> {
            self.$field.insert(symbol.name.clone(), symbol)
        }

        /// Looks up a symbol without touching its used flag.
        #[must_use]
        pub fn $get(&self, name: &str) -> Option<&Symbol> {
            self.$field.get(name)
        }

        /// Looks up a symbol and marks it used.
        pub fn $mark(&mut self, name: &str) -> Option<&Symbol> {
            let symbol = self.$field.get_mut(name)?;
            symbol.used = true;
            Some(symbol)
        }

        /// Iterates this namespace in declaration order.
        pub fn $iter(&self) -> impl Iterator<Item = &Symbol> {
            self.$field.values()
        }
    };
}

impl SymbolTable {
    /// Creates an empty symbol table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    namespace_accessors!(acls, declare_acl, acl, use_acl, acls);
    namespace_accessors!(backends, declare_backend, backend, use_backend, backends);
    namespace_accessors!(tables, declare_table, table, use_table, tables);
    namespace_accessors!(
        subroutines,
        declare_subroutine,
        subroutine,
        use_subroutine,
        subroutines
    );
    namespace_accessors!(
        penaltyboxes,
        declare_penaltybox,
        penaltybox,
        use_penaltybox,
        penaltyboxes
    );
    namespace_accessors!(
        ratecounters,
        declare_ratecounter,
        ratecounter,
        use_ratecounter,
        ratecounters
    );

    /// Returns the declared value type of a table.
    #[must_use]
    pub fn table_value_type(&self, name: &str) -> Option<VclType> {
        match self.table(name)?.kind {
            SymbolKind::Table { value_type } => Some(value_type),
            _ => None,
        }
    }

    /// Returns a subroutine's declared return type, if the subroutine
    /// exists. The outer `Option` is existence; the inner is the type.
    #[must_use]
    pub fn subroutine_return_type(&self, name: &str) -> Option<Option<VclType>> {
        match self.subroutine(name)?.kind {
            SymbolKind::Subroutine { return_type, .. } => Some(return_type),
            _ => None,
        }
    }

    /// Returns a subroutine's resolved phase set.
    #[must_use]
    pub fn subroutine_phases(&self, name: &str) -> Option<PhaseSet> {
        match self.subroutine(name)?.kind {
            SymbolKind::Subroutine { phases, .. } => Some(phases),
            _ => None,
        }
    }

    /// Replaces a subroutine's phase set during inference. Returns true if
    /// the set changed.
    pub fn set_subroutine_phases(&mut self, name: &str, new_phases: PhaseSet) -> bool {
        if let Some(symbol) = self.subroutines.get_mut(name) {
            if let SymbolKind::Subroutine { phases, .. } = &mut symbol.kind {
                let changed = *phases != new_phases;
                *phases = new_phases;
                return changed;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use text_size::TextRange;

    fn sym(name: &str, kind: SymbolKind) -> Symbol {
        Symbol::new(name, kind, SmolStr::default(), TextRange::default())
    }

    #[test]
    fn test_duplicate_detection_per_namespace() {
        let mut table = SymbolTable::new();
        assert!(table.declare_acl(sym("example", SymbolKind::Acl)).is_none());
        assert!(table.declare_acl(sym("example", SymbolKind::Acl)).is_some());
        // Same name in a different namespace is fine.
        assert!(table
            .declare_backend(sym("example", SymbolKind::Backend))
            .is_none());
    }

    #[test]
    fn test_used_flag() {
        let mut table = SymbolTable::new();
        table.declare_backend(sym("origin", SymbolKind::Backend));
        assert!(!table.backend("origin").unwrap().used);
        table.use_backend("origin");
        assert!(table.backend("origin").unwrap().used);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut table = SymbolTable::new();
        table.declare_acl(sym("zz", SymbolKind::Acl));
        table.declare_acl(sym("aa", SymbolKind::Acl));
        let names: Vec<_> = table.acls().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["zz", "aa"]);
    }

    #[test]
    fn test_directors_share_backend_namespace() {
        let mut table = SymbolTable::new();
        table.declare_backend(sym("pool", SymbolKind::Backend));
        assert!(table
            .declare_backend(sym("pool", SymbolKind::Director))
            .is_some());
    }
}
