//! Colored literal markers.
use propel_rules::{Lit, Var};

/// Marker color.
///
/// 0 means the literal is free, positive colors mark the search depth that assigned the literal.
/// Treated as a depth counter; widen the type before worrying about overflow.
pub type Color = i32;

/// Color reserved for speculative trial propagations during forced move detection.
///
/// It never collides with the positive colors of real assignments.
pub const TRIAL_COLOR: Color = -1;

/// Current partial solution as a color per literal code.
#[derive(Default)]
pub struct Assignment {
    markers: Vec<Color>,
}

impl Assignment {
    /// Reinitialize for a new variable count, with all literals free.
    pub fn set_var_count(&mut self, count: usize) {
        self.markers.clear();
        self.markers.resize(2 * count, 0);
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.markers.len() / 2
    }

    /// The color of a literal, 0 when free.
    pub fn color(&self, lit: Lit) -> Color {
        self.markers[lit.code()]
    }

    /// Stamp a color on a literal.
    pub fn set_color(&mut self, lit: Lit, color: Color) {
        self.markers[lit.code()] = color;
    }

    /// Mark a literal as free again.
    pub fn clear(&mut self, lit: Lit) {
        self.markers[lit.code()] = 0;
    }

    /// Whether the literal is in the current solution, under any color.
    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.markers[lit.code()] != 0
    }

    /// Whether neither polarity of the variable is assigned.
    pub fn var_is_free(&self, var: Var) -> bool {
        !self.lit_is_true(var.positive()) && !self.lit_is_true(var.negative())
    }

    /// Whether no literal at all is assigned.
    pub fn all_free(&self) -> bool {
        self.markers.iter().all(|&color| color == 0)
    }
}
