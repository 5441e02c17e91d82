//! Exact multivariate polynomials with rational coefficients.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::{
    cmp::Ordering,
    collections::{btree_map::Entry, BTreeMap, BTreeSet},
    ops,
};

/// A variable name.
pub type Var = String;

/// A power product of variables, such as `x^2 y`. The empty product is the monomial `1`.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Monomial(BTreeMap<Var, u32>);

impl Monomial {
    pub fn one() -> Self {
        Self::default()
    }

    pub fn var(name: &str) -> Self {
        Self(BTreeMap::from([(name.to_owned(), 1)]))
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    /// The total degree of the monomial.
    pub fn degree(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn exponent(&self, x: &str) -> u32 {
        self.0.get(x).copied().unwrap_or(0)
    }

    /// Iterates over the variables and their exponents, ordered by variable name.
    pub fn factors(&self) -> impl Iterator<Item = (&Var, u32)> {
        self.0.iter().map(|(x, e)| (x, *e))
    }

    pub fn vars(&self) -> impl Iterator<Item = &Var> {
        self.0.keys()
    }

    /// Returns the monomial with every occurrence of `x` removed.
    pub fn without(&self, x: &str) -> Self {
        let mut inner = self.0.clone();
        inner.remove(x);
        Self(inner)
    }

    fn mul(&self, other: &Self) -> Self {
        let mut inner = self.0.clone();
        for (x, e) in &other.0 {
            *inner.entry(x.clone()).or_insert(0) += e;
        }
        Self(inner)
    }
}

/// Monomials are ordered by total degree, and then lexicographically, with variables that come
/// first alphabetically being more significant. This is the order used to find the leading term
/// of a polynomial.
impl Ord for Monomial {
    fn cmp(&self, other: &Self) -> Ordering {
        self.degree().cmp(&other.degree()).then_with(|| {
            let vars: BTreeSet<&Var> = self.0.keys().chain(other.0.keys()).collect();
            vars.into_iter()
                .map(|x| self.exponent(x).cmp(&other.exponent(x)))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }
}

impl PartialOrd for Monomial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A polynomial, represented as a map from monomials to their non-zero coefficients.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Polynomial(BTreeMap<Monomial, BigRational>);

impl Polynomial {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn var(name: &str) -> Self {
        Self::term(Monomial::var(name), BigRational::one())
    }

    pub fn constant(value: BigRational) -> Self {
        Self::term(Monomial::one(), value)
    }

    /// Constructs the polynomial `coefficient * monomial`.
    pub fn term(monomial: Monomial, coefficient: BigRational) -> Self {
        let mut result = Self::zero();
        result.add_term(monomial, coefficient);
        result
    }

    fn add_term(&mut self, monomial: Monomial, coefficient: BigRational) {
        if coefficient.is_zero() {
            return;
        }
        match self.0.entry(monomial) {
            Entry::Vacant(e) => {
                e.insert(coefficient);
            }
            Entry::Occupied(mut e) => {
                *e.get_mut() += coefficient;
                if e.get().is_zero() {
                    e.remove();
                }
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// If the polynomial has no variables, returns its value.
    pub fn constant_value(&self) -> Option<BigRational> {
        match self.0.iter().next_back() {
            None => Some(BigRational::zero()),
            Some((m, c)) if m.is_one() => Some(c.clone()),
            Some(_) => None,
        }
    }

    /// If the polynomial is exactly a variable, returns the variable name.
    pub fn as_var(&self) -> Option<&Var> {
        let mut terms = self.0.iter();
        match (terms.next(), terms.next()) {
            (Some((m, c)), None) if c.is_one() && m.degree() == 1 => m.vars().next(),
            _ => None,
        }
    }

    /// Iterates over the terms in decreasing monomial order, so the leading term comes first.
    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &BigRational)> {
        self.0.iter().rev()
    }

    pub fn leading_coefficient(&self) -> Option<&BigRational> {
        self.0.values().next_back()
    }

    /// A polynomial is positive if its leading coefficient is positive.
    pub fn is_positive(&self) -> bool {
        self.leading_coefficient().is_some_and(Signed::is_positive)
    }

    pub fn is_negative(&self) -> bool {
        self.leading_coefficient().is_some_and(Signed::is_negative)
    }

    pub fn degree(&self) -> u32 {
        self.0.keys().map(Monomial::degree).max().unwrap_or(0)
    }

    pub fn is_linear(&self) -> bool {
        self.degree() <= 1
    }

    pub fn vars(&self) -> BTreeSet<Var> {
        self.0.keys().flat_map(Monomial::vars).cloned().collect()
    }

    pub fn contains_var(&self, x: &str) -> bool {
        self.0.keys().any(|m| m.exponent(x) > 0)
    }

    /// The coefficient of the monomial `x` (of degree one). For linear polynomials, this is the
    /// coefficient of `x`.
    pub fn coefficient(&self, x: &str) -> BigRational {
        self.0
            .get(&Monomial::var(x))
            .cloned()
            .unwrap_or_else(BigRational::zero)
    }

    /// Returns the polynomial with every term that mentions `x` removed.
    pub fn without(&self, x: &str) -> Self {
        let inner = self
            .0
            .iter()
            .filter(|(m, _)| m.exponent(x) == 0)
            .map(|(m, c)| (m.clone(), c.clone()))
            .collect();
        Self(inner)
    }

    pub fn scale(&self, factor: &BigRational) -> Self {
        if factor.is_zero() {
            return Self::zero();
        }
        Self(self.0.iter().map(|(m, c)| (m.clone(), c * factor)).collect())
    }

    pub fn pow(&self, exponent: u32) -> Self {
        let mut result = Self::from(1);
        for _ in 0..exponent {
            result = result * self.clone();
        }
        result
    }

    /// Replaces every occurrence of `x` by `value`.
    pub fn substitute(&self, x: &str, value: &Polynomial) -> Self {
        let mut result = Self::zero();
        for (m, c) in &self.0 {
            let e = m.exponent(x);
            if e == 0 {
                result.add_term(m.clone(), c.clone());
            } else {
                result = result + Self::term(m.without(x), c.clone()) * value.pow(e);
            }
        }
        result
    }

    /// Scales the polynomial by a positive factor so that all coefficients become integers with
    /// no common divisor. The signs of the coefficients are preserved.
    pub fn primitive(&self) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        let denominators = self
            .0
            .values()
            .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()));
        let denominators = BigRational::from_integer(denominators);
        let gcd = self
            .0
            .values()
            .map(|c| (c * &denominators).to_integer())
            .fold(BigInt::zero(), |acc, n| acc.gcd(&n));
        let factor = denominators / BigRational::from_integer(gcd);
        self.scale(&factor)
    }

    /// Reduces every coefficient into the range `[0, modulus)`. Returns `None` if some coefficient
    /// is not an integer.
    pub fn reduce_mod(&self, modulus: &BigInt) -> Option<Self> {
        let mut result = Self::zero();
        for (m, c) in &self.0 {
            if !c.is_integer() {
                return None;
            }
            let reduced = c.to_integer().mod_floor(modulus);
            result.add_term(m.clone(), BigRational::from_integer(reduced));
        }
        Some(result)
    }

    /// Compares polynomials by degree, with higher degrees coming first, and then term by term
    /// starting from the leading term.
    pub fn cmp_by_degree(&self, other: &Self) -> Ordering {
        other
            .degree()
            .cmp(&self.degree())
            .then_with(|| self.terms().cmp(other.terms()))
    }
}

impl From<BigRational> for Polynomial {
    fn from(value: BigRational) -> Self {
        Self::constant(value)
    }
}

impl From<BigInt> for Polynomial {
    fn from(value: BigInt) -> Self {
        Self::constant(BigRational::from_integer(value))
    }
}

impl From<i64> for Polynomial {
    fn from(value: i64) -> Self {
        Self::from(BigInt::from(value))
    }
}

impl From<i32> for Polynomial {
    fn from(value: i32) -> Self {
        Self::from(i64::from(value))
    }
}

impl ops::Add for Polynomial {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        for (m, c) in rhs.0 {
            self.add_term(m, c);
        }
        self
    }
}

impl ops::Neg for Polynomial {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.into_iter().map(|(m, c)| (m, -c)).collect())
    }
}

impl ops::Sub for Polynomial {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl ops::Mul for Polynomial {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut result = Self::zero();
        for (m1, c1) in &self.0 {
            for (m2, c2) in &rhs.0 {
                result.add_term(m1.mul(m2), c1 * c2);
            }
        }
        result
    }
}
