//! Recursive descent parser that constructs lambda-calculus expressions in the
//! box-tree representation, pulling tokens from a `Tokenizer` and resolving
//! every identifier against a chain of scopes as it goes.

use tracing::debug;

use crate::box_tree_impl::box_tree_ast::{ExprNode, Identifier};
use crate::lexical_analysis::{LexicalError, Token, Tokenizer};
use crate::scope_resolution::{ScopeArena, ScopeId};

/// Represents a parsing error.
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum ParseError {
    /// No grammar rule matched at the current token. Used to choose between
    /// alternatives and never returned from `Parser::parse`.
    #[error("no expression starts at the current token")]
    NotFound,

    #[error("expected at least one identifier after `\\`, found {found}")]
    MissingFormalParam { found: Token },

    #[error("identifier `{name}` is declared twice in the same function def")]
    DuplicateFormalParam { name: String },

    #[error("expected `.` after formal params, found {found}")]
    ExpectedDot { found: Token },

    #[error("expected an expression after `.`, found {found}")]
    ExpectedFnBody { found: Token },

    #[error("expected an expression after `(`, found {found}")]
    ExpectedParenthesizedExpr { found: Token },

    #[error("expected `)`, found {found}")]
    ExpectedClosingParen { found: Token },

    #[error("unexpected token {found} where an expression should start")]
    UnexpectedToken { found: Token },

    /// There is nothing left to parse. Signals normal completion.
    #[error("end of input")]
    EndOfInput,

    #[error("fatal tokenizer error: {0}")]
    Lexical(#[from] LexicalError),
}

impl ParseError {
    /// Whether the error leaves the token stream unusable.
    pub fn is_fatal(&self) -> bool {
        return matches!(self, ParseError::Lexical(_));
    }

    /// Whether the error comes from source text that breaks the grammar.
    pub fn is_syntax_error(&self) -> bool {
        return !matches!(
            self,
            ParseError::NotFound | ParseError::EndOfInput | ParseError::Lexical(_)
        );
    }
}

/// Parses one top-level expression per call to `parse`.
///
/// Grammar, with a fresh child scope opened by every `expr`:
///
/// ```text
/// expr        := fn_def | application
/// application := atom (atom | fn_def)*
/// atom        := IDENTIFIER | '(' expr ')'
/// fn_def      := '\' IDENTIFIER+ '.' expr
/// ```
///
/// A function def may appear unparenthesized as the last argument of an
/// application, so `f \x. x` is `f` applied to `\x. x`.
#[derive(Debug)]
pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    scopes: ScopeArena,
    finished: bool,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `source` and scans its first token.
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        let mut tokenizer = Tokenizer::new(source);
        tokenizer.advance()?;

        return Ok(Parser {
            tokenizer,
            scopes: ScopeArena::new(),
            finished: false,
        });
    }

    /// Parses the next expression. Blank lines before it are skipped, and
    /// `ParseError::EndOfInput` is returned once nothing is left.
    pub fn parse(&mut self) -> Result<ExprNode, ParseError> {
        while *self.tokenizer.peek() == Token::NewLine {
            self.advance()?;
        }

        if *self.tokenizer.peek() == Token::EndOfFile {
            return Err(ParseError::EndOfInput);
        }

        // Every top-level expression gets its own scope tree.
        self.scopes = ScopeArena::new();
        let root = self.scopes.root();

        match self.try_expr_rule(root) {
            Ok(expr_node) => {
                debug!(expr = %expr_node, "parsed expression");
                return Ok(expr_node);
            }

            Err(ParseError::NotFound) => {
                return Err(ParseError::UnexpectedToken {
                    found: self.tokenizer.peek().clone(),
                });
            }

            Err(parse_error) => {
                return Err(parse_error);
            }
        }
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.tokenizer.advance()?;
        return Ok(());
    }

    // The current token, for error reports.
    fn found(&self) -> Token {
        return self.tokenizer.peek().clone();
    }

    /// Tries to parse according to the production `e -> lambda | non_lam`,
    /// inside a new child of `scope`.
    fn try_expr_rule(&mut self, scope: ScopeId) -> Result<ExprNode, ParseError> {
        let child_scope = self.scopes.create_child(scope);

        match self.try_fn_def_rule(child_scope) {
            Err(ParseError::NotFound) => return self.try_application_rule(child_scope),
            fn_def_result => return fn_def_result,
        }
    }

    /// Tries to parse an expression that looks like
    /// `\[IDENTIFIER]+.[EXPR]`, declaring the formal params in `scope`.
    fn try_fn_def_rule(&mut self, scope: ScopeId) -> Result<ExprNode, ParseError> {
        if *self.tokenizer.peek() != Token::Backslash {
            return Err(ParseError::NotFound);
        }
        self.advance()?;

        let mut formal_params: Vec<Identifier> = Vec::new();

        while let Token::Identifier(name) = self.tokenizer.peek() {
            let name = name.clone();

            if formal_params
                .iter()
                .any(|formal_param| formal_param.name == name)
            {
                return Err(ParseError::DuplicateFormalParam { name });
            }

            formal_params.push(self.scopes.create_ident(scope, name.as_str()));
            self.advance()?;
        }

        if formal_params.is_empty() {
            return Err(ParseError::MissingFormalParam {
                found: self.found(),
            });
        }

        if *self.tokenizer.peek() != Token::Dot {
            return Err(ParseError::ExpectedDot {
                found: self.found(),
            });
        }
        self.advance()?;

        let fn_body = match self.try_expr_rule(scope) {
            Err(ParseError::NotFound) => {
                return Err(ParseError::ExpectedFnBody {
                    found: self.found(),
                });
            }
            fn_body_result => fn_body_result?,
        };

        return Ok(ExprNode::fn_def(formal_params, fn_body));
    }

    /// Tries to parse chains of function applications, folding them so that
    /// application is left-associative. A single atom is returned as-is.
    fn try_application_rule(&mut self, scope: ScopeId) -> Result<ExprNode, ParseError> {
        // Try to parse at least one atom.
        let mut out_expr = self.try_atom_rule(scope)?;

        // Keep parsing terms until one fails to start. Errors from a term
        // that did start are passed on.
        loop {
            match self.try_atom_or_fn_def_rule(scope) {
                Ok(next_term) => {
                    out_expr = ExprNode::fn_app(out_expr, next_term);
                }

                Err(ParseError::NotFound) => {
                    break;
                }

                Err(parse_error) => {
                    return Err(parse_error);
                }
            }
        }

        return Ok(out_expr);
    }

    /// Tries to parse an argument of an application: an atom, or otherwise a
    /// function def in its own child scope.
    fn try_atom_or_fn_def_rule(&mut self, scope: ScopeId) -> Result<ExprNode, ParseError> {
        match self.try_atom_rule(scope) {
            Err(ParseError::NotFound) => {
                let child_scope = self.scopes.create_child(scope);
                return self.try_fn_def_rule(child_scope);
            }
            atom_result => return atom_result,
        }
    }

    /// Tries to parse according to the production `atom -> (e) | v`.
    fn try_atom_rule(&mut self, scope: ScopeId) -> Result<ExprNode, ParseError> {
        match self.try_var_expr_rule(scope) {
            Err(ParseError::NotFound) => return self.try_parenthesis_expr_rule(scope),
            var_result => return var_result,
        }
    }

    /// Tries to parse an expression that looks like `[IDENTIFIER]`, resolving
    /// it to the innermost binder of that name.
    fn try_var_expr_rule(&mut self, scope: ScopeId) -> Result<ExprNode, ParseError> {
        let Token::Identifier(name) = self.tokenizer.peek() else {
            return Err(ParseError::NotFound);
        };

        let ident = self.scopes.get_ident(scope, name.as_str());
        self.advance()?;

        return Ok(ExprNode::var(ident));
    }

    /// Tries to parse an expression that looks like `([EXPR])`.
    fn try_parenthesis_expr_rule(&mut self, scope: ScopeId) -> Result<ExprNode, ParseError> {
        if *self.tokenizer.peek() != Token::LeftParen {
            return Err(ParseError::NotFound);
        }
        self.advance()?;

        let expr_node = match self.try_expr_rule(scope) {
            Err(ParseError::NotFound) => {
                return Err(ParseError::ExpectedParenthesizedExpr {
                    found: self.found(),
                });
            }
            expr_result => expr_result?,
        };

        if *self.tokenizer.peek() != Token::RightParen {
            return Err(ParseError::ExpectedClosingParen {
                found: self.found(),
            });
        }
        self.advance()?;

        return Ok(expr_node);
    }
}

/// Yields each top-level expression in turn. Iteration ends at the end of
/// input or right after the first error.
impl<'a> Iterator for Parser<'a> {
    type Item = Result<ExprNode, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.parse() {
            Ok(expr_node) => return Some(Ok(expr_node)),

            Err(ParseError::EndOfInput) => {
                self.finished = true;
                return None;
            }

            Err(parse_error) => {
                self.finished = true;
                return Some(Err(parse_error));
            }
        }
    }
}
