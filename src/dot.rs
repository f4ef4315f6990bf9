//! Decision diagram to DOT (Graphviz) conversion.
//!
//! The generated DOT output follows these conventions:
//! - **Terminal nodes** are rendered as squares at the bottom (sink rank)
//! - **Internal nodes** are rendered as circles, one rank per level
//! - **Edges**: solid lines are high (then) edges, dashed lines are low (else) edges
//! - The **root** is a rectangle at the top (source rank)
//!
//! The negation flag and shift of a handle are applied, so the output shows the function the
//! handle represents rather than the stored file.
//!
//! # Examples
//!
//! ```
//! use levelized_bdd::bdd::Bdd;
//!
//! let f = &Bdd::ithvar(1) & &Bdd::ithvar(2);
//! let dot = f.to_dot().unwrap();
//! assert!(dot.starts_with("graph {"));
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::dd::DecisionDiagram;
use crate::node::Node;
use crate::policy::DdPolicy;
use crate::ptr::Ptr;
use crate::types::Level;

/// Configuration options for DOT output generation.
///
/// ```
/// use levelized_bdd::dot::DotConfig;
/// use levelized_bdd::zdd::Zdd;
///
/// let config = DotConfig {
///     node_shape: "ellipse",
///     use_html_labels: false,
///     ..DotConfig::default()
/// };
/// let dot = Zdd::powerset([0, 1]).to_dot_with_config(&config).unwrap();
/// assert!(dot.contains("ellipse"));
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for internal nodes (default: "circle")
    pub node_shape: &'static str,
    /// Shape for terminal nodes (default: "square")
    pub terminal_shape: &'static str,
    /// Shape for the root label (default: "rect")
    pub root_shape: &'static str,
    /// Style for high (then) edges (default: "solid")
    pub high_edge_style: &'static str,
    /// Style for low (else) edges (default: "dashed")
    pub low_edge_style: &'static str,
    /// Whether to use HTML labels for subscripts (default: true)
    pub use_html_labels: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "circle",
            terminal_shape: "square",
            root_shape: "rect",
            high_edge_style: "solid",
            low_edge_style: "dashed",
            use_html_labels: true,
        }
    }
}

fn dot_name(p: Ptr) -> String {
    if p.is_terminal() {
        format!("{}", p.value() as u8)
    } else {
        format!("n{}_{}", p.level(), p.id())
    }
}

impl<P: DdPolicy> DecisionDiagram<P> {
    /// Converts the diagram to DOT format.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the diagram to DOT format with custom configuration.
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "graph {{")?;
        writeln!(dot, "node [shape={}, fixedsize=true];", config.node_shape)?;

        writeln!(dot, "{{ rank=sink")?;
        writeln!(dot, "0 [shape={}, label=\"0\"];", config.terminal_shape)?;
        writeln!(dot, "1 [shape={}, label=\"1\"];", config.terminal_shape)?;
        writeln!(dot, "}}")?;

        let nodes: Vec<Node> = if self.is_terminal() {
            Vec::new()
        } else {
            self.nodes_top_down().collect()
        };

        let mut levels = BTreeMap::<Level, Vec<Ptr>>::new();
        for n in &nodes {
            levels.entry(n.level()).or_default().push(n.uid);
        }
        for (level, uids) in &levels {
            writeln!(dot, "{{ rank=same")?;
            let label = if config.use_html_labels {
                format!("<x<SUB>{}</SUB>>", level)
            } else {
                format!("\"x{}\"", level)
            };
            for &uid in uids {
                writeln!(dot, "{} [label={}];", dot_name(uid), label)?;
            }
            writeln!(dot, "}}")?;
        }

        for n in &nodes {
            writeln!(
                dot,
                "{} -- {} [style={}];",
                dot_name(n.uid),
                dot_name(n.high),
                config.high_edge_style
            )?;
            writeln!(
                dot,
                "{} -- {} [style={}];",
                dot_name(n.uid),
                dot_name(n.low),
                config.low_edge_style
            )?;
        }

        writeln!(dot, "{{ rank=source")?;
        writeln!(dot, "r [shape={}, label=\"{}\"];", config.root_shape, P::NAME)?;
        writeln!(dot, "}}")?;
        writeln!(dot, "r -- {};", dot_name(self.root()))?;

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
