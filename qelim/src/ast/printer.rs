//! Printing of formulas and terms as SMT-LIB s-expressions.

use super::{Atom, Formula, Monomial, Polynomial, Problem};
use crate::{parser::Token, utils::is_symbol_character};
use num_rational::BigRational;
use num_traits::{One, Signed};
use std::{borrow::Cow, fmt};

fn write_s_expr<H, T>(f: &mut fmt::Formatter, head: H, tail: &[T]) -> fmt::Result
where
    H: fmt::Display,
    T: fmt::Display,
{
    write!(f, "({}", head)?;
    for e in tail {
        write!(f, " {}", e)?;
    }
    write!(f, ")")
}

pub(crate) fn quote_symbol(symbol: &str) -> Cow<'_, str> {
    use crate::parser::Reserved;
    use std::str::FromStr;

    // Any symbol that is empty, starts with a digit, is a reserved word, or contains characters
    // that are not allowed in simple symbols must be quoted
    let needs_quoting = symbol.is_empty()
        || symbol.starts_with(|c: char| c.is_ascii_digit())
        || Reserved::from_str(symbol).is_ok()
        || symbol.chars().any(|c| !is_symbol_character(c));
    if needs_quoting {
        Cow::Owned(format!("|{}|", symbol))
    } else {
        Cow::Borrowed(symbol)
    }
}

/// Displays a rational number as an SMT-LIB term, e.g. `3`, `(- 3)` or `(/ 1 2)`.
struct Rational<'a>(&'a BigRational);

impl fmt::Display for Rational<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let r = self.0;
        if r.is_negative() {
            return write!(f, "(- {})", Rational(&-r));
        }
        if r.is_integer() {
            write!(f, "{}", r.numer())
        } else {
            write!(f, "(/ {} {})", r.numer(), r.denom())
        }
    }
}

/// Displays a single term `c * m` of a polynomial.
struct Term<'a>(&'a Monomial, &'a BigRational);

impl fmt::Display for Term<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Term(monomial, coefficient) = *self;
        if monomial.is_one() {
            return write!(f, "{}", Rational(coefficient));
        }
        let mut factors: Vec<Cow<str>> = Vec::new();
        if !coefficient.abs().is_one() {
            factors.push(Cow::Owned(Rational(&coefficient.abs()).to_string()));
        }
        for (x, e) in monomial.factors() {
            for _ in 0..e {
                factors.push(quote_symbol(x));
            }
        }
        let product = match factors.as_slice() {
            [single] => single.to_string(),
            [first, rest @ ..] => {
                let mut s = format!("(* {}", first);
                for factor in rest {
                    s.push(' ');
                    s.push_str(factor);
                }
                s.push(')');
                s
            }
            [] => unreachable!("a non-constant monomial has at least one factor"),
        };
        if coefficient.is_negative() {
            write!(f, "(- {})", product)
        } else {
            write!(f, "{}", product)
        }
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let terms: Vec<_> = self.terms().map(|(m, c)| Term(m, c)).collect();
        match terms.as_slice() {
            [] => write!(f, "0"),
            [single] => write!(f, "{}", single),
            all => write_s_expr(f, "+", all),
        }
    }
}

impl fmt::Debug for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Debug for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", Term(self, &BigRational::one()))
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Atom::Binary(r, lhs, rhs) => write_s_expr(f, r, &[lhs, rhs]),
            Atom::AtLeast(k) => write!(f, "(card>= {})", k),
            Atom::FewerThan(k) => write!(f, "(card< {})", k),
        }
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Formula::Bool(b) => write!(f, "{}", b),
            Formula::Atom(a) => write!(f, "{}", a),
            Formula::Not(inner) => write_s_expr(f, "not", &[inner]),
            Formula::And(args) => write_s_expr(f, "and", args),
            Formula::Or(args) => write_s_expr(f, "or", args),
            Formula::Implies(a, b) => write_s_expr(f, "=>", &[a, b]),
            Formula::Equivalent(a, b) => write_s_expr(f, "=", &[a, b]),

            // Binders are printed without sorts, since formulas don't track them
            Formula::Quant(q, x, body) => write!(f, "({} ({}) {})", q, quote_symbol(x), body),
        }
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::OpenParen => write!(f, "("),
            Token::CloseParen => write!(f, ")"),
            Token::Symbol(s) => write!(f, "{}", quote_symbol(s)),
            Token::Keyword(k) => write!(f, ":{}", k),
            Token::Numeral(n) => write!(f, "{}", n),
            Token::Decimal(r) => write!(f, "{}", Rational(r)),
            Token::String(s) => write!(f, "\"{}\"", s.replace('"', "\"\"")),
            Token::ReservedWord(r) => write!(f, "{}", r),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(logic) = &self.logic {
            writeln!(f, "(set-logic {})", logic)?;
        }
        for name in &self.sort_declarations {
            writeln!(f, "(declare-sort {} 0)", quote_symbol(name))?;
        }
        for (name, sort) in &self.declarations {
            writeln!(f, "(declare-fun {} () {})", quote_symbol(name), sort)?;
        }
        for assertion in &self.assertions {
            writeln!(f, "(assert {})", assertion)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use num_rational::BigRational;

    fn poly(terms: &[(i64, &str)]) -> Polynomial {
        terms.iter().fold(Polynomial::zero(), |acc, (c, x)| {
            let term = if x.is_empty() {
                Polynomial::from(*c)
            } else {
                Polynomial::var(x).scale(&BigRational::from_integer((*c).into()))
            };
            acc + term
        })
    }

    #[test]
    fn test_polynomials() {
        let cases = [
            (poly(&[]), "0"),
            (poly(&[(-3, "")]), "(- 3)"),
            (poly(&[(1, "x")]), "x"),
            (poly(&[(-1, "x")]), "(- x)"),
            (poly(&[(2, "y"), (1, "z"), (2, "")]), "(+ (* 2 y) z 2)"),
            (poly(&[(-1, "y"), (-1, "z"), (1, "")]), "(+ (- y) (- z) 1)"),
        ];
        for (p, expected) in cases {
            assert_eq!(expected, p.to_string());
        }

        let half = Polynomial::var("x").scale(&BigRational::new(1.into(), 2.into()));
        assert_eq!("(* (/ 1 2) x)", half.to_string());
        let square = Polynomial::var("x") * Polynomial::var("x") * Polynomial::var("y");
        assert_eq!("(* x x y)", square.to_string());
    }

    #[test]
    fn test_formulas() {
        let x = Polynomial::var("x");
        let f = Formula::exists(
            "x",
            Formula::And(vec![
                Formula::Atom(Atom::with_zero(Relation::Le, x.clone())),
                Formula::Atom(Atom::with_zero(Relation::Ne, x)),
                Formula::Atom(Atom::AtLeast(3)),
            ]),
        );
        assert_eq!(
            "(exists (x) (and (<= x 0) (distinct x 0) (card>= 3)))",
            f.to_string()
        );
        assert_eq!("(not false)", Formula::not(Formula::FALSE).to_string());
        assert_eq!("|x y|", Polynomial::var("x y").to_string());
    }

    #[test]
    fn test_tokens() {
        use crate::parser::Token;

        assert_eq!("|exists|", Token::Symbol("exists".into()).to_string());
        assert_eq!(":named", Token::Keyword("named".into()).to_string());
        assert_eq!("\"a \"\"quote\"\"\"", Token::String("a \"quote\"".into()).to_string());
        assert_eq!("(/ 1 2)", Token::Decimal(BigRational::new(1.into(), 2.into())).to_string());
        assert_eq!("EOF", Token::Eof.to_string());
    }
}
