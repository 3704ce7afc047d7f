//! Substitution and beta reduction over the box-tree program representation.

use tracing::{debug, warn};

use crate::box_tree_impl::box_tree_ast::{ExprNode, Identifier};

/// Replaces every free occurrence of `target` in `expr_body` with its own
/// fresh copy of `var_value`.
///
/// Uniquifiers are fixed at parse time, so this is a plain equality test on
/// identifiers and never needs alpha conversion. A function def that binds
/// `target` itself is copied unchanged.
pub fn replace(expr_body: &ExprNode, target: &Identifier, var_value: &ExprNode) -> ExprNode {
    match expr_body {
        // Substitute into variable.
        ExprNode::Var { ident } => {
            if ident == target {
                return var_value.deep_copy();
            }
            return expr_body.deep_copy();
        }

        // Substitute onto function application.
        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => {
            return ExprNode::fn_app(
                replace(fn_body, target, var_value),
                replace(actual_arg, target, var_value),
            );
        }

        // Substitute onto function definition, unless one of its formal
        // params shadows the target.
        ExprNode::FnDef {
            formal_params,
            fn_body,
        } => {
            if formal_params.contains(target) {
                return expr_body.deep_copy();
            }

            return ExprNode::fn_def(formal_params.clone(), replace(fn_body, target, var_value));
        }
    };
}

/// Performs a single reduction pass over `expr_body`.
///
/// An application whose function side is written as a function def is
/// beta-reduced, consuming that def's first formal param. Any other
/// application has both sides evaluated independently and is not looked at
/// again, so a function side that only becomes a function def during this
/// pass stays unreduced until the next pass. Function defs keep their formal
/// params and have their bodies evaluated.
pub fn eval_step(expr_body: &ExprNode) -> ExprNode {
    match expr_body {
        ExprNode::Var { .. } => {
            return expr_body.deep_copy();
        }

        ExprNode::FnDef {
            formal_params,
            fn_body,
        } => {
            return ExprNode::fn_def(formal_params.clone(), eval_step(fn_body));
        }

        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => {
            match &**fn_body {
                // The function being applied is a function definition, so
                // we are at a redex.
                ExprNode::FnDef {
                    formal_params,
                    fn_body: defined_fn,
                } => {
                    // The parser never builds a function def without formal
                    // params. A hand-built one behaves like its body.
                    let Some((first_param, remaining_params)) = formal_params.split_first()
                    else {
                        return ExprNode::fn_app(defined_fn.deep_copy(), actual_arg.deep_copy());
                    };

                    let reduced_body = replace(defined_fn, first_param, actual_arg);

                    if remaining_params.is_empty() {
                        return reduced_body;
                    }

                    return ExprNode::fn_def(remaining_params.to_vec(), reduced_body);
                }

                // The function being applied is not a function definition,
                // so evaluate both sides on their own.
                _ => {
                    return ExprNode::fn_app(eval_step(fn_body), eval_step(actual_arg));
                }
            }
        }
    };
}

/// The result of repeatedly applying `eval_step`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NormalizationOutcome {
    pub expr: ExprNode,
    /// Number of passes that changed the expression.
    pub steps: usize,
    /// Whether a pass left the expression unchanged before the step limit
    /// was reached.
    pub converged: bool,
}

/// Applies `eval_step` until a pass no longer changes the expression, or
/// until `max_steps` changing passes have been made.
///
/// A term that reduces to itself, such as `(\x. x x) (\x. x x)`, counts as
/// converged. Terms that keep growing never converge, so callers should pick
/// a finite `max_steps` for untrusted input.
pub fn normalize(expr_body: &ExprNode, max_steps: usize) -> NormalizationOutcome {
    let mut curr_expr = expr_body.deep_copy();

    for steps in 0..max_steps {
        let next_expr = eval_step(&curr_expr);

        if next_expr == curr_expr {
            return NormalizationOutcome {
                expr: curr_expr,
                steps,
                converged: true,
            };
        }

        debug!(step = steps + 1, expr = %next_expr, "reduction pass");
        curr_expr = next_expr;
    }

    // One more pass tells us whether the last allowed step happened to land
    // on a fixed point.
    let converged = eval_step(&curr_expr) == curr_expr;

    if !converged {
        warn!(max_steps, "normalization stopped at step limit");
    }

    return NormalizationOutcome {
        expr: curr_expr,
        steps: max_steps,
        converged,
    };
}

#[cfg(test)]
mod tests {
    use crate::box_tree_impl::box_tree_ast::alpha_equivalent;
    use crate::box_tree_impl::box_tree_recursive_descent_parsing::Parser;

    use super::*;

    // Parses a single expression, failing the test on any error.
    fn parse_one(program_str: &str) -> ExprNode {
        let mut parser = Parser::new(program_str).expect("Unable to start parser.");
        return parser.parse().expect("Unable to parse program string.");
    }

    fn var(name: &str, uniquifier: u64) -> ExprNode {
        return ExprNode::var(Identifier::new(name, uniquifier));
    }

    // Runs one pass on each program and checks the rendered result.
    fn run_eval_step_test(programs_and_expected_outputs: Vec<(&str, &str)>) {
        for (program_str, expected_output) in programs_and_expected_outputs {
            let eval_result = eval_step(&parse_one(program_str));
            assert_eq!(
                eval_result.to_string(),
                expected_output,
                "eval_step of {}",
                program_str
            );
        }
    }

    // Test if replace substitutes matching identifiers only.
    #[test]
    fn test_replace_matches_uniquifier() {
        // x_1 (x_0 x_1)
        let expr_body = ExprNode::fn_app(var("x", 1), ExprNode::fn_app(var("x", 0), var("x", 1)));
        let replaced = replace(&expr_body, &Identifier::new("x", 1), &var("a", 0));

        assert_eq!(replaced.to_string(), "a_0 (x_0 a_0)");
    }

    // Test if replace leaves a function def alone when it binds the target.
    #[test]
    fn test_replace_stops_at_shadowing_def() {
        let expr_body = ExprNode::fn_def(
            vec![Identifier::new("y", 1), Identifier::new("x", 1)],
            var("x", 1),
        );
        let replaced = replace(&expr_body, &Identifier::new("x", 1), &var("a", 0));

        assert_eq!(replaced, expr_body);
    }

    // Test if replace descends into function defs that do not bind the
    // target.
    #[test]
    fn test_replace_descends_into_def() {
        let expr_body = ExprNode::fn_def(
            vec![Identifier::new("y", 1)],
            ExprNode::fn_app(var("x", 1), var("y", 1)),
        );
        let replaced = replace(&expr_body, &Identifier::new("x", 1), &var("a", 0));

        assert_eq!(replaced.to_string(), r"\y_1. a_0 y_1");
    }

    // Test if eval_step on a redex is exactly replace on its body.
    #[test]
    fn test_eval_step_matches_replace() {
        let program_strs = vec![r"(\x. x y x) (\z. z)", r"(\x. \y. y x) (f g)", r"(\x. w) q"];

        for program_str in program_strs {
            let expr_body = parse_one(program_str);

            let ExprNode::FnApp { fn_body, actual_arg } = &expr_body else {
                panic!("Expected an application for {}", program_str);
            };
            let ExprNode::FnDef {
                formal_params,
                fn_body: defined_fn,
            } = &**fn_body
            else {
                panic!("Expected a function def for {}", program_str);
            };

            assert_eq!(
                eval_step(&expr_body),
                replace(defined_fn, &formal_params[0], actual_arg)
            );
        }
    }

    // Test eval_step on a few simple programs.
    #[test]
    fn test_eval_step_simple() {
        run_eval_step_test(vec![
            (r"(\x. x y) (\z. z)", r"(\z_1. z_1) y_0"),
            (r"a b c", r"a_0 b_0 c_0"),
            (r"\x. (\y. y) x", r"\x_1. x_1"),
            (r"(\x. x) (\y. y) (\z. z)", r"(\y_1. y_1) (\z_1. z_1)"),
            (r"f ((\x. x) a)", r"f_0 a_0"),
        ]);
    }

    // Test if a function side that only becomes a function def during the
    // pass is left unreduced.
    #[test]
    fn test_eval_step_is_single_pass() {
        let expr_body = parse_one(r"(\x. x) (\y. y) (\z. z)");

        let first_pass = eval_step(&expr_body);
        assert_eq!(first_pass.to_string(), r"(\y_1. y_1) (\z_1. z_1)");

        let second_pass = eval_step(&first_pass);
        assert_eq!(second_pass.to_string(), r"\z_1. z_1");
    }

    // Test if a multi-binder def consumes one binder per application and
    // agrees with the nested form.
    #[test]
    fn test_eval_step_multi_binder() {
        let sugared = parse_one(r"(\x y. x) a b");
        let nested = parse_one(r"(\x. \y. x) a b");

        // The first pass reduces the inner redex, the second consumes the
        // remaining binder.
        let sugared_result = eval_step(&eval_step(&sugared));
        let nested_result = eval_step(&eval_step(&nested));

        assert_eq!(sugared_result.to_string(), r"a_0");
        assert!(alpha_equivalent(&sugared_result, &nested_result));

        let partially_applied = eval_step(&parse_one(r"(\x y z. y) a"));
        assert_eq!(partially_applied.to_string(), r"\y_1 z_1. y_1");
    }

    // Test if substituted copies are independent of the argument and of
    // each other.
    #[test]
    fn test_eval_step_duplicates_argument() {
        let expr_body = parse_one(r"(\x. x x) (f g)");
        let reduced = eval_step(&expr_body);

        assert_eq!(reduced.to_string(), r"f_0 g_0 (f_0 g_0)");
        assert_eq!(expr_body.to_string(), r"(\x_1. x_1 x_1) (f_0 g_0)");
    }

    // Test if shadowed binders survive substitution without capture.
    #[test]
    fn test_eval_step_no_capture() {
        // The argument y refers to the outer y, and the inner \y. binds a
        // different y.
        let expr_body = parse_one(r"\y. (\x. \y. x y) y");
        let reduced = eval_step(&expr_body);

        assert_eq!(reduced.to_string(), r"\y_1. \y_2. y_1 y_2");
    }

    // Test normalize on addition with numbers in Church encoding.
    #[test]
    fn test_normalize_church_addition() {
        let plus = r"(\m n f x. m f (n f x))";
        let one = r"(\f x. f x)";
        let two = r"(\f x. f (f x))";
        let program_str = format!("{} {} {}", plus, one, two);

        let outcome = normalize(&parse_one(program_str.as_str()), 100);
        let three = parse_one(r"\f x. f (f (f x))");

        assert!(outcome.converged);
        assert!(outcome.steps > 1);
        assert!(alpha_equivalent(&outcome.expr, &three));
    }

    // Test if normalize returns terms already in normal form unchanged.
    #[test]
    fn test_normalize_fixed_point() {
        let expr_body = parse_one(r"\x. f x");
        let outcome = normalize(&expr_body, 10);

        assert_eq!(
            outcome,
            NormalizationOutcome {
                expr: expr_body,
                steps: 0,
                converged: true,
            }
        );
    }

    // Test if normalize gives up on a term that keeps growing.
    #[test]
    fn test_normalize_step_limit() {
        let growing = parse_one(r"(\x. x x x) (\x. x x x)");
        let outcome = normalize(&growing, 25);

        assert!(!outcome.converged);
        assert_eq!(outcome.steps, 25);
        assert_ne!(outcome.expr, growing);
    }

    // Test if a term that reduces to itself counts as a fixed point.
    #[test]
    fn test_normalize_self_reproducing_term() {
        let omega = parse_one(r"(\x. x x) (\x. x x)");
        let outcome = normalize(&omega, 25);

        assert!(outcome.converged);
        assert_eq!(outcome.steps, 0);
        assert_eq!(outcome.expr, omega);
    }
}
