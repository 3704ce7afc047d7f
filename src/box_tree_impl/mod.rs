//! Parser and program execution code that represents expressions as a tree
//! where each node owns its children via `Box` smart pointers.

pub mod box_tree_ast;
pub mod box_tree_execution;
pub mod box_tree_recursive_descent_parsing;
