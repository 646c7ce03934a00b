//! Lowering expressions into rules.
use thiserror::Error;

use crate::expr::{BinaryOp, Expr, MetaOp, UnaryOp};
use crate::meta;
use crate::problem::Problem;
use crate::word::{self, Word};

/// Possible errors while lowering an expression.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("empty variable name")]
    EmptyName,
    #[error("illegal variable name: {0}")]
    IllegalName(String),
    #[error("variable number out of range: {0}")]
    NumberOutOfRange(i64),
    #[error("pointer target must be a number")]
    PointerTarget,
}

/// The number of the named variable a name denotes.
///
/// A single letter maps to that letter's character code; `?n` maps to `n`.
pub fn var_number(name: &str) -> Result<i64, CompileError> {
    let mut chars = name.chars();
    match chars.next() {
        None => Err(CompileError::EmptyName),
        Some(first) if first.is_ascii_alphabetic() => Ok(first as i64),
        Some('?') => chars
            .as_str()
            .parse::<i64>()
            .map_err(|_| CompileError::IllegalName(name.to_string())),
        Some(_) => Err(CompileError::IllegalName(name.to_string())),
    }
}

/// The canonical name of a numbered variable, inverse of [`var_number`] where possible.
pub fn var_name(number: i64) -> String {
    if number >= 1 && number <= 255 && (number as u8).is_ascii_alphabetic() {
        ((number as u8) as char).to_string()
    } else {
        format!("?{}", number)
    }
}

fn checked_number(problem: &Problem, number: i64) -> Result<usize, CompileError> {
    if number < 1 || number >= problem.config().max_vars as i64 {
        Err(CompileError::NumberOutOfRange(number))
    } else {
        Ok(number as usize)
    }
}

/// Lower an expression into the problem, returning the bit-slice holding its value.
///
/// Comparison and logic operators yield two-bit `00`/`01` slices; arithmetic yields slices as
/// wide as needed. Meta operators solve sub-problems and fold their result back into `problem`.
pub fn lower(expr: &Expr, problem: &mut Problem) -> Result<Word, CompileError> {
    match expr {
        Expr::Var(name) => {
            let number = checked_number(problem, var_number(name)?)?;
            Ok(problem.named_word(number))
        }
        Expr::Num(value) => Ok(word::constant(problem, *value)),
        Expr::Pointer(target) => match **target {
            Expr::Num(number) => {
                let number = checked_number(problem, number)?;
                Ok(problem.named_word(number))
            }
            _ => Err(CompileError::PointerTarget),
        },
        Expr::Unary(UnaryOp::Not, operand) => {
            let operand = lower(operand, problem)?;
            Ok(word::not(&operand))
        }
        Expr::Unary(UnaryOp::Neg, operand) => {
            let operand = lower(operand, problem)?;
            Ok(word::negate(problem, &operand))
        }
        Expr::Constrain(operand) => {
            let word = lower(operand, problem)?;
            word::constrain_eq(problem, &word, 1);
            Ok(word)
        }
        Expr::Count(operand) => meta::count(problem, operand),
        Expr::Meta(MetaOp::Eval, left, right) => meta::eval(problem, left, right),
        Expr::Meta(MetaOp::Ind, left, right) => meta::indirect(problem, left, right),
        Expr::Meta(MetaOp::Min, left, right) => meta::min(problem, left, right),
        Expr::Meta(MetaOp::Max, left, right) => meta::max(problem, left, right),
        Expr::Binary(op, left, right) => {
            let left = lower(left, problem)?;
            let right = lower(right, problem)?;
            Ok(match op {
                BinaryOp::Add => word::add(problem, &left, &right),
                BinaryOp::Mul => word::mul(problem, &left, &right),
                BinaryOp::Div => word::div(problem, &left, &right),
                BinaryOp::Mod => word::rem(problem, &left, &right),
                BinaryOp::And => word::and(problem, &left, &right),
                BinaryOp::Or => word::or(problem, &left, &right),
                BinaryOp::Xor => word::xor(problem, &left, &right),
                BinaryOp::Eq => word::eq(problem, &left, &right),
                BinaryOp::Implies => word::implies(problem, &left, &right),
                BinaryOp::Lt => word::lt(problem, &left, &right),
                BinaryOp::Gt => word::lt(problem, &right, &left),
            })
        }
    }
}

/// Wrap a top-level expression in its implicit constraint.
///
/// Value producing roots are constrained to equal the reserved variable `?1`, boolean roots are
/// constrained to 1 directly, and explicit `@` roots are left alone.
pub fn wrap_top_level(expr: Expr) -> Expr {
    let value_producing = match &expr {
        Expr::Constrain(_) => return expr,
        Expr::Var(_) | Expr::Pointer(_) | Expr::Num(_) | Expr::Count(_) => true,
        Expr::Meta(MetaOp::Eval, _, _)
        | Expr::Meta(MetaOp::Min, _, _)
        | Expr::Meta(MetaOp::Max, _, _) => true,
        Expr::Unary(UnaryOp::Neg, _) => true,
        Expr::Binary(BinaryOp::Add, _, _)
        | Expr::Binary(BinaryOp::Mul, _, _)
        | Expr::Binary(BinaryOp::Div, _, _)
        | Expr::Binary(BinaryOp::Mod, _, _) => true,
        Expr::Unary(UnaryOp::Not, _) | Expr::Meta(MetaOp::Ind, _, _) | Expr::Binary(..) => false,
    };
    if value_producing {
        Expr::Constrain(Box::new(Expr::Binary(
            BinaryOp::Eq,
            Box::new(Expr::Var("?1".to_string())),
            Box::new(expr),
        )))
    } else {
        Expr::Constrain(Box::new(expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::Config;
    use crate::expr::ExprParser;
    use crate::solver::Solver;

    fn parse_one(input: &str) -> Expr {
        ExprParser::new(input)
            .parse()
            .expect("parse error")
            .expect("empty input")
    }

    #[test]
    fn variable_names() {
        assert_eq!(var_number("a"), Ok(97));
        assert_eq!(var_number("A"), Ok(65));
        assert_eq!(var_number("?12"), Ok(12));
        assert_eq!(var_number(""), Err(CompileError::EmptyName));
        assert!(var_number("5").is_err());
        assert!(var_number("?x").is_err());

        assert_eq!(var_name(97), "a");
        assert_eq!(var_name(12), "?12");
        assert_eq!(var_name(-3), "?-3");
    }

    #[test]
    fn wrapping() {
        assert_eq!(
            wrap_top_level(parse_one("+ a b")).to_string(),
            "@ = ?1 + a b"
        );
        assert_eq!(wrap_top_level(parse_one("< a 3")).to_string(), "@ < a 3");
        assert_eq!(wrap_top_level(parse_one("@ < a 3")).to_string(), "@ < a 3");
        assert_eq!(wrap_top_level(parse_one("7")).to_string(), "@ = ?1 7");
        assert_eq!(wrap_top_level(parse_one("! a")).to_string(), "@ ! a");
        assert_eq!(wrap_top_level(parse_one("- a")).to_string(), "@ = ?1 - a");
    }

    #[test]
    fn out_of_range_variables_fail() {
        let mut problem = Problem::new(&Config::default());
        let expr = parse_one("? 0");
        assert_eq!(
            lower(&expr, &mut problem),
            Err(CompileError::NumberOutOfRange(0))
        );
        let expr = parse_one("? 1000");
        assert_eq!(
            lower(&expr, &mut problem),
            Err(CompileError::NumberOutOfRange(1000))
        );
    }

    #[test]
    fn pointer_needs_a_number() {
        let mut problem = Problem::new(&Config::default());
        let expr = parse_one("? + 1 2");
        assert_eq!(lower(&expr, &mut problem), Err(CompileError::PointerTarget));
    }

    #[test]
    fn pointer_aliases_named_variable() {
        // ?97 and a are the same variable.
        let mut problem = Problem::new(&Config::default());
        let by_pointer = lower(&parse_one("? 97"), &mut problem).unwrap();
        let by_name = lower(&parse_one("a"), &mut problem).unwrap();
        assert_eq!(by_pointer.lits(), by_name.lits());
    }

    #[test]
    fn constrained_equality_pins_the_variable() {
        let mut problem = Problem::new(&Config {
            word_width: 5,
            ..Config::default()
        });
        let expr = wrap_top_level(parse_one("= a 9"));
        let top = lower(&expr, &mut problem).unwrap();
        assert_eq!(top.len(), 2);

        let mut solver = Solver::new(&problem.solver_rules());
        assert!(solver.next_solution());
        let a = problem.lookup_word(97).unwrap();
        assert_eq!(crate::word::read_value(&solver, &a), 9);
        assert!(!solver.next_solution());
    }
}
