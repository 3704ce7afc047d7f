//! Data structures to represent lambda calculus expressions, and some utility
//! functions to display and compare them.

/// Distinguishes binders that share a name. Free variables carry 0.
pub type Uniquifier = u64;

/// A variable name together with the uniquifier of the binder it refers to.
/// Two identifiers denote the same binding site iff both fields are equal.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Identifier {
    pub name: String,
    pub uniquifier: Uniquifier,
}

impl Identifier {
    pub fn new(name: &str, uniquifier: Uniquifier) -> Self {
        return Identifier {
            name: String::from(name),
            uniquifier,
        };
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}_{}", self.name, self.uniquifier);
    }
}

/// Represents a lambda-calculus expression.
///
/// Children are owned through `Box`, so cloning an `ExprNode` duplicates the
/// whole tree and no two trees ever share a node.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ExprNode {
    /// `\x1 x2 ... xn. fn_body`, which means the same as
    /// `\x1. \x2. ... \xn. fn_body`. `formal_params` is never empty and never
    /// repeats a name.
    FnDef {
        formal_params: Vec<Identifier>,
        fn_body: Box<ExprNode>,
    },
    FnApp {
        fn_body: Box<ExprNode>,
        actual_arg: Box<ExprNode>,
    },
    Var {
        ident: Identifier,
    },
}

impl ExprNode {
    pub fn var(ident: Identifier) -> Self {
        return ExprNode::Var { ident };
    }

    pub fn fn_def(formal_params: Vec<Identifier>, fn_body: ExprNode) -> Self {
        return ExprNode::FnDef {
            formal_params,
            fn_body: Box::new(fn_body),
        };
    }

    pub fn fn_app(fn_body: ExprNode, actual_arg: ExprNode) -> Self {
        return ExprNode::FnApp {
            fn_body: Box::new(fn_body),
            actual_arg: Box::new(actual_arg),
        };
    }

    /// Duplicates the entire tree.
    pub fn deep_copy(&self) -> ExprNode {
        return self.clone();
    }

    /// Renders the tree with every identifier suffixed by its uniquifier.
    pub fn dump_to_string(&self) -> String {
        return expr_node_to_string(self);
    }
}

// Helper function to produce a string representation of an ExprNode.
fn expr_node_to_string_helper(expr_node: &ExprNode, string_so_far: &mut String) {
    match expr_node {
        ExprNode::Var { ident } => {
            string_so_far.push_str(ident.to_string().as_str());
        }
        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => {
            // A function def in function position would otherwise swallow
            // the argument into its body.
            let first_needs_parens = matches!(**fn_body, ExprNode::FnDef { .. });

            // Application is left-associative, and a function def would
            // swallow anything that follows this application.
            let second_needs_parens = matches!(
                **actual_arg,
                ExprNode::FnDef { .. } | ExprNode::FnApp { .. }
            );

            if first_needs_parens {
                string_so_far.push('(');
                expr_node_to_string_helper(fn_body, string_so_far);
                string_so_far.push(')');
            } else {
                expr_node_to_string_helper(fn_body, string_so_far);
            }

            string_so_far.push(' ');

            if second_needs_parens {
                string_so_far.push('(');
                expr_node_to_string_helper(actual_arg, string_so_far);
                string_so_far.push(')');
            } else {
                expr_node_to_string_helper(actual_arg, string_so_far);
            }
        }
        ExprNode::FnDef {
            formal_params,
            fn_body,
        } => {
            let rendered_params: Vec<String> = formal_params
                .iter()
                .map(|formal_param| formal_param.to_string())
                .collect();

            string_so_far.push_str(format!("\\{}. ", rendered_params.join(" ")).as_str());
            expr_node_to_string_helper(fn_body, string_so_far);
        }
    };
}

// Converts an expr node to a string.
pub fn expr_node_to_string(expr_node: &ExprNode) -> String {
    let mut out_string = String::new();
    expr_node_to_string_helper(expr_node, &mut out_string);
    return out_string;
}

// Display trait implementation for ExprNode using expr_node_to_string function.
impl std::fmt::Display for ExprNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}", expr_node_to_string(self).as_str());
    }
}

// Walks both trees in lockstep. `bindings` pairs up the binders of `left`
// and `right` that enclose the current position, innermost last.
fn alpha_equivalent_helper<'a>(
    left: &'a ExprNode,
    right: &'a ExprNode,
    bindings: &mut Vec<(&'a Identifier, &'a Identifier)>,
) -> bool {
    match (left, right) {
        (ExprNode::Var { ident: left_ident }, ExprNode::Var { ident: right_ident }) => {
            let left_binding = bindings
                .iter()
                .rposition(|(left_binder, _)| *left_binder == left_ident);
            let right_binding = bindings
                .iter()
                .rposition(|(_, right_binder)| *right_binder == right_ident);

            match (left_binding, right_binding) {
                (Some(left_idx), Some(right_idx)) => return left_idx == right_idx,
                (None, None) => return left_ident == right_ident,
                _ => return false,
            }
        }

        (
            ExprNode::FnApp {
                fn_body: left_fn_body,
                actual_arg: left_actual_arg,
            },
            ExprNode::FnApp {
                fn_body: right_fn_body,
                actual_arg: right_actual_arg,
            },
        ) => {
            return alpha_equivalent_helper(left_fn_body, right_fn_body, bindings)
                && alpha_equivalent_helper(left_actual_arg, right_actual_arg, bindings);
        }

        (
            ExprNode::FnDef {
                formal_params: left_params,
                fn_body: left_fn_body,
            },
            ExprNode::FnDef {
                formal_params: right_params,
                fn_body: right_fn_body,
            },
        ) => {
            if left_params.len() != right_params.len() {
                return false;
            }

            let bindings_len = bindings.len();
            bindings.extend(left_params.iter().zip(right_params.iter()));

            let bodies_equivalent = alpha_equivalent_helper(left_fn_body, right_fn_body, bindings);

            bindings.truncate(bindings_len);
            return bodies_equivalent;
        }

        _ => return false,
    }
}

/// Checks whether two expressions are equal up to a consistent renaming of
/// their bound identifiers. Free identifiers must match exactly.
pub fn alpha_equivalent(left: &ExprNode, right: &ExprNode) -> bool {
    let mut bindings = Vec::new();
    return alpha_equivalent_helper(left, right, &mut bindings);
}
