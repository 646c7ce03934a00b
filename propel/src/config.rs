//! Compiler configuration.

/// Configurable parameters used while compiling expressions into rules.
#[derive(Clone, Debug)]
pub struct Config {
    /// Width of integer variables in bits, sign bit included. (Default: 9)
    pub word_width: usize,

    /// Maximum number of solutions enumerated per problem, including the sub-problems solved by
    /// meta operators. (Default: 100)
    pub max_solutions: usize,

    /// Capacity of the named variable table; variable numbers must stay below this. (Default: 1000)
    pub max_vars: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            word_width: 9,
            max_solutions: 100,
            max_vars: 1000,
        }
    }
}
