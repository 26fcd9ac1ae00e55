pub mod bindings;
pub mod catalog;
pub mod instances;
