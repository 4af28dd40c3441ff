//! Optimize/shrink level pair.

/// How hard to optimize, and how much to favour code size.
///
/// No upper bound is enforced here; interpreting large values is up to the
/// engine's default pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizationLevel {
    pub optimize: u32,
    pub shrink: u32,
}

impl OptimizationLevel {
    pub fn new(optimize: u32, shrink: u32) -> Self {
        Self { optimize, shrink }
    }

    /// Sets both levels at once, as the `-O` shortcuts do.
    pub fn set(&mut self, optimize: u32, shrink: u32) {
        self.optimize = optimize;
        self.shrink = shrink;
    }
}
