// ABOUTME: Symbol tables, scoped shadowing, and per-call stack frames

use crate::value::Expression;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// The outcome of looking a name up in a single `SymbolTable`, distinguishing
/// "never bound here" from "explicitly bound to nothing" (`put_empty`) — the
/// latter must stop a `StackFrame`'s locals→closure→dynamics search rather
/// than fall through to an outer binding.
pub enum Lookup {
    Absent,
    Empty,
    Present(Expression),
}

/// A flat name→value table. Entries may be present-with-a-value,
/// present-but-empty (shadowing an outer binding with "nothing"), or absent.
#[derive(Debug, Default)]
pub struct SymbolTable {
    bindings: HashMap<String, Option<Expression>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            bindings: HashMap::new(),
        }
    }

    pub fn put(&mut self, name: impl Into<String>, value: Expression) {
        self.bindings.insert(name.into(), Some(value));
    }

    pub fn put_empty(&mut self, name: impl Into<String>) {
        self.bindings.insert(name.into(), None);
    }

    pub fn lookup(&self, name: &str) -> Lookup {
        match self.bindings.get(name) {
            None => Lookup::Absent,
            Some(None) => Lookup::Empty,
            Some(Some(value)) => Lookup::Present(value.clone()),
        }
    }

    pub fn get(&self, name: &str) -> Option<Expression> {
        match self.lookup(name) {
            Lookup::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_ref(&self, name: &str) -> Option<&Expression> {
        self.bindings.get(name).and_then(|v| v.as_ref())
    }

    /// Raw variant used internally by `Scope` to record shadow state:
    /// `None` means the name had no entry at all (vs. `Some(None)` meaning
    /// it was present-but-empty).
    pub fn raw_lookup(&self, name: &str) -> Option<Option<Expression>> {
        self.bindings.get(name).cloned()
    }

    pub fn delete(&mut self, name: &str) -> Option<Expression> {
        self.bindings.remove(name).flatten()
    }

    pub fn for_each(&self, mut f: impl FnMut(&str, Option<&Expression>)) {
        for (name, value) in &self.bindings {
            f(name, value.as_ref());
        }
    }

    pub fn count(&self) -> usize {
        self.bindings.len()
    }
}

/// A stack-discipline mutation record over a shared `SymbolTable`. `put`
/// remembers whatever was in the table for that name before the first write
/// this scope made to it; dropping the scope restores every touched name to
/// its pre-scope state (or deletes it, if it had none).
pub struct Scope {
    table: Rc<RefCell<SymbolTable>>,
    shadow: HashMap<String, Option<Option<Expression>>>,
}

impl Scope {
    pub fn new(table: Rc<RefCell<SymbolTable>>) -> Self {
        Scope {
            table,
            shadow: HashMap::new(),
        }
    }

    pub fn put(&mut self, name: impl Into<String>, value: Expression) {
        let name = name.into();
        self.remember(&name);
        self.table.borrow_mut().put(name, value);
    }

    pub fn put_empty(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.remember(&name);
        self.table.borrow_mut().put_empty(name);
    }

    fn remember(&mut self, name: &str) {
        if !self.shadow.contains_key(name) {
            let prior = self.table.borrow().raw_lookup(name);
            self.shadow.insert(name.to_string(), prior);
        }
    }

    pub fn is_scoped(&self, name: &str) -> bool {
        self.shadow.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Expression> {
        self.table.borrow().get(name)
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        let mut table = self.table.borrow_mut();
        for (name, prior) in self.shadow.drain() {
            match prior {
                Some(Some(value)) => table.put(name, value),
                Some(None) => table.put_empty(name),
                None => {
                    table.delete(&name);
                }
            }
        }
    }
}

/// A call's activation record. Resolution order on `get` is locals →
/// captured closure → interpreter-wide dynamics (§4.5). `set` (plain `put`)
/// writes straight through to the dynamic table so it survives the frame's
/// pop; `put_dynamic` goes through this frame's own `Scope` over that same
/// table, so it is undone when the frame is dropped.
pub struct StackFrame {
    pub function_name: String,
    locals: SymbolTable,
    closure: Rc<HashMap<String, Expression>>,
    dynamic_table: Rc<RefCell<SymbolTable>>,
    dynamic_scope: Scope,
}

impl StackFrame {
    pub fn new(
        function_name: impl Into<String>,
        closure: Rc<HashMap<String, Expression>>,
        dynamic_table: Rc<RefCell<SymbolTable>>,
    ) -> Self {
        StackFrame {
            function_name: function_name.into(),
            locals: SymbolTable::new(),
            closure,
            dynamic_scope: Scope::new(dynamic_table.clone()),
            dynamic_table,
        }
    }

    pub fn get(&self, name: &str) -> Option<Expression> {
        match self.locals.lookup(name) {
            Lookup::Present(value) => return Some(value),
            Lookup::Empty => return None,
            Lookup::Absent => {}
        }
        if let Some(value) = self.closure.get(name) {
            return Some(value.clone());
        }
        self.dynamic_table.borrow().get(name)
    }

    /// Global assignment semantics: writes straight into the dynamic table.
    pub fn put(&mut self, name: impl Into<String>, value: Expression) {
        self.dynamic_table.borrow_mut().put(name, value);
    }

    pub fn put_local(&mut self, name: impl Into<String>, value: Expression) {
        self.locals.put(name, value);
    }

    pub fn put_dynamic(&mut self, name: impl Into<String>, value: Expression) {
        self.dynamic_scope.put(name, value);
    }

    pub fn locals(&self) -> &SymbolTable {
        &self.locals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Rc<RefCell<SymbolTable>> {
        Rc::new(RefCell::new(SymbolTable::new()))
    }

    #[test]
    fn scope_restores_prior_value_on_drop() {
        let t = table();
        t.borrow_mut().put("x", Expression::Int(1));
        {
            let mut scope = Scope::new(t.clone());
            scope.put("x", Expression::Int(2));
            assert_eq!(t.borrow().get("x"), Some(Expression::Int(2)));
        }
        assert_eq!(t.borrow().get("x"), Some(Expression::Int(1)));
    }

    #[test]
    fn scope_deletes_name_absent_before_entry() {
        let t = table();
        {
            let mut scope = Scope::new(t.clone());
            scope.put("y", Expression::Int(9));
            assert_eq!(t.borrow().get("y"), Some(Expression::Int(9)));
        }
        assert!(matches!(t.borrow().lookup("y"), Lookup::Absent));
    }

    #[test]
    fn nested_scopes_restore_in_reverse_order() {
        let t = table();
        t.borrow_mut().put("x", Expression::Int(1));
        {
            let mut outer = Scope::new(t.clone());
            outer.put("x", Expression::Int(2));
            {
                let mut inner = Scope::new(t.clone());
                inner.put("x", Expression::Int(3));
                assert_eq!(t.borrow().get("x"), Some(Expression::Int(3)));
            }
            assert_eq!(t.borrow().get("x"), Some(Expression::Int(2)));
        }
        assert_eq!(t.borrow().get("x"), Some(Expression::Int(1)));
    }

    #[test]
    fn frame_resolution_order_locals_then_closure_then_dynamic() {
        let dynamic = table();
        dynamic.borrow_mut().put("x", Expression::Int(100));
        let mut closure = HashMap::new();
        closure.insert("x".to_string(), Expression::Int(10));
        let mut frame = StackFrame::new("f", Rc::new(closure), dynamic.clone());

        assert_eq!(frame.get("x"), Some(Expression::Int(10)));
        frame.put_local("x", Expression::Int(1));
        assert_eq!(frame.get("x"), Some(Expression::Int(1)));
    }

    #[test]
    fn frame_put_is_global_and_survives_pop() {
        let dynamic = table();
        {
            let mut frame = StackFrame::new("f", Rc::new(HashMap::new()), dynamic.clone());
            frame.put("g", Expression::Int(7));
        }
        assert_eq!(dynamic.borrow().get("g"), Some(Expression::Int(7)));
    }

    #[test]
    fn frame_put_dynamic_is_torn_down_on_pop() {
        let dynamic = table();
        {
            let mut frame = StackFrame::new("f", Rc::new(HashMap::new()), dynamic.clone());
            frame.put_dynamic("tmp", Expression::Int(7));
            assert_eq!(frame.get("tmp"), Some(Expression::Int(7)));
        }
        assert!(matches!(dynamic.borrow().lookup("tmp"), Lookup::Absent));
    }
}
