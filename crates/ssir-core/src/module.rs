//! Module: an ordered collection of functions sharing one type table.

use indexmap::IndexMap;

use crate::builder::Builder;
use crate::error::CoreError;
use crate::function::Function;
use crate::type_table::{TypeId, TypeTable};

/// A module-level global declaration (external functions and data referenced
/// through `Value::Global`).
#[derive(Debug, Clone)]
pub struct Global {
    pub name: String,
    pub ty: TypeId,
    pub external: bool,
}

/// An ordered collection of functions, addressable by name.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub types: TypeTable,
    functions: IndexMap<String, Function>,
    globals: IndexMap<String, Global>,
}

impl Module {
    pub fn new() -> Self {
        Module {
            types: TypeTable::new(),
            functions: IndexMap::new(),
            globals: IndexMap::new(),
        }
    }

    /// Adds a function definition. Names are unique within the module.
    pub fn add_function(&mut self, function: Function) -> Result<(), CoreError> {
        if self.functions.contains_key(function.name()) {
            return Err(CoreError::DuplicateFunction {
                name: function.name().to_string(),
            });
        }
        self.functions.insert(function.name().to_string(), function);
        Ok(())
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn get_function_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.functions.get_mut(name)
    }

    /// Functions in insertion order.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    /// Declares a global (external by default).
    pub fn declare_global(&mut self, name: &str, ty: TypeId) {
        self.globals.insert(
            name.to_string(),
            Global { name: name.to_string(), ty, external: true },
        );
    }

    pub fn get_global(&self, name: &str) -> Option<&Global> {
        self.globals.get(name)
    }

    /// Globals in insertion order.
    pub fn globals(&self) -> impl Iterator<Item = &Global> {
        self.globals.values()
    }

    /// A builder positioned inside one of this module's functions, borrowing
    /// the module's type table alongside it.
    pub fn builder(&mut self, name: &str) -> Result<Builder<'_>, CoreError> {
        let Module { types, functions, .. } = self;
        let func = functions
            .get_mut(name)
            .ok_or_else(|| CoreError::FunctionNotFound { name: name.to_string() })?;
        Ok(Builder::new(func, types))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn functions_are_ordered_and_named() {
        let mut module = Module::new();
        module
            .add_function(Function::new("first", vec![], TypeId::VOID))
            .unwrap();
        module
            .add_function(Function::new("second", vec![], TypeId::VOID))
            .unwrap();

        let names: Vec<&str> = module.functions().map(Function::name).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(module.get_function("first").is_some());
        assert!(module.get_function("third").is_none());
    }

    #[test]
    fn duplicate_function_rejected() {
        let mut module = Module::new();
        module
            .add_function(Function::new("f", vec![], TypeId::VOID))
            .unwrap();
        assert!(matches!(
            module.add_function(Function::new("f", vec![], TypeId::VOID)),
            Err(CoreError::DuplicateFunction { .. })
        ));
    }

    #[test]
    fn globals_are_declared_once() {
        let mut module = Module::new();
        let fty = module.types.function(TypeId::FLOAT32, vec![TypeId::FLOAT32], false);
        module.declare_global("external", fty);
        assert!(module.get_global("external").unwrap().external);
    }
}
