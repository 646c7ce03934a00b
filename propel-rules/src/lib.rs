//! Rule data types used by the Propel propagation solver.

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! lit {
    ($x:expr) => {
        $crate::lit::Lit::from_number($x)
    };
}

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! var {
    ($x:expr) => {
        $crate::lit::Var::from_number($x)
    };
}

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! lits {
    ( $( $x:expr ),* ) => { [ $( $crate::lit!( $x ) ),* ] };
    ( $( $x:expr ),* , ) => { $crate::lits! [ $( $x ),* ] };
}

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! vars {
    ( $( $x:expr ),* ) => { [ $( $crate::var!( $x ) ),* ] };
    ( $( $x:expr ),* , ) => { $crate::vars! [ $( $x ),* ] };
}

/// Shortcut for tests
///
/// `rules![1, 2 => 3; -3 => -1;]` builds a [`rules::RuleSet`] with one rule per `;` separated
/// entry, each `lhs => rhs` with comma separated signed literal numbers on both sides.
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! rules {
    ( $( $( $l:expr ),* => $( $r:expr ),* );* ; ) => {
        {
            let mut rule_set = $crate::rules::RuleSet::new();
            $(
                rule_set.add_rule(
                    (&[ $( $crate::lit!( $l ) ),* ] as &[$crate::lit::Lit]).iter().cloned(),
                    (&[ $( $crate::lit!( $r ) ),* ] as &[$crate::lit::Lit]).iter().cloned(),
                );
            )*
            rule_set
        }
    };
}

pub mod lit;
pub mod rules;

pub use lit::{Lit, Var};
pub use rules::{Rule, RuleSet};
