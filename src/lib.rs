//! This crate contains code for a simple lambda calculus interpreter that
//! alpha-renames every binder once, at parse time.

pub mod box_tree_impl;
pub mod end_to_end;
pub mod lexical_analysis;
pub mod scope_resolution;
