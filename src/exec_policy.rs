//! Knobs that select between equivalent algorithms.

/// How multiple levels are quantified.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum QuantifyAlgorithm {
    /// `Singleton` if at most one level of the diagram is affected, `Simultaneous` otherwise.
    #[default]
    Auto,
    /// One sweep (and reduction) per level, starting from the deepest.
    Singleton,
    /// A single sweep that quantifies all levels at once.
    Simultaneous,
}

#[derive(Debug, Clone)]
pub struct ExecPolicy {
    pub quantify: QuantifyAlgorithm,
    /// Whether non-monotone substitutions on BDDs may rebuild the diagram bottom-up. If not, they
    /// fail with an error.
    pub replace_rebuild: bool,
}

impl Default for ExecPolicy {
    fn default() -> Self {
        Self {
            quantify: QuantifyAlgorithm::Auto,
            replace_rebuild: true,
        }
    }
}

impl ExecPolicy {
    /// Whether `affected` quantified levels should be handled one at a time.
    pub(crate) fn quantify_singleton(&self, affected: usize) -> bool {
        match self.quantify {
            QuantifyAlgorithm::Auto => affected <= 1,
            QuantifyAlgorithm::Singleton => true,
            QuantifyAlgorithm::Simultaneous => false,
        }
    }
}
