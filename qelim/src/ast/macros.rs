/// Implements `FromStr` and `Display` for an enum, given a table mapping each variant to its
/// SMT-LIB spelling.
///
/// The generated `FromStr` implementation has `()` as its error type, since the caller usually
/// wants to try a different interpretation of the symbol when the lookup fails.
macro_rules! impl_str_conversion_traits {
    ($enum_name:ident { $($variant:ident: $str:literal),* $(,)? }) => {
        impl std::str::FromStr for $enum_name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($str => Ok($enum_name::$variant),)*
                    _ => Err(()),
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                let s = match self {
                    $($enum_name::$variant => $str,)*
                };
                write!(f, "{}", s)
            }
        }
    }
}

/// Builds an atom `lhs REL rhs` from anything convertible into polynomials. This is mostly used
/// in tests, where writing out `Atom::Binary` with explicit conversions gets noisy.
///
/// ```ignore
/// let a = atom!(<= x 1);
/// let b = atom!(= (x) (y));
/// ```
#[cfg(test)]
macro_rules! atom {
    (@rel =) => { $crate::ast::Relation::Eq };
    (@rel !=) => { $crate::ast::Relation::Ne };
    (@rel <) => { $crate::ast::Relation::Lt };
    (@rel <=) => { $crate::ast::Relation::Le };
    (@rel >) => { $crate::ast::Relation::Gt };
    (@rel >=) => { $crate::ast::Relation::Ge };
    (@term $name:ident) => { $crate::ast::Polynomial::var(stringify!($name)) };
    (@term $value:literal) => { $crate::ast::Polynomial::from($value as i64) };
    (@term ($e:expr)) => { $crate::ast::Polynomial::from($e) };
    ($rel:tt $lhs:tt $rhs:tt) => {
        $crate::ast::Formula::Atom($crate::ast::Atom::Binary(
            atom!(@rel $rel),
            atom!(@term $lhs),
            atom!(@term $rhs),
        ))
    };
}
