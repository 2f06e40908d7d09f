//! Output of strategy profiles.

use std::io::Write;

use crate::nash::number::Scalar;
use crate::nash::profile::MixedProfile;

/// Receives labelled profiles as solvers produce them.
pub trait ProfileRenderer {
    /// Emit one profile. An empty label means an ordinary equilibrium.
    fn render<T: Scalar>(&mut self, profile: &MixedProfile<T>, label: &str) -> std::io::Result<()>;

    /// Called after every approximation iteration, whether or not the
    /// iterate is rendered.
    fn progress(&mut self, _iteration: usize) {}
}

/// Writes one comma-separated line per profile: the label, then every
/// probability of player 1, player 2, ...
///
/// ```text
/// NE,1/2,1/2,1/2,1/2
/// convex-1,1,0,1,0
/// ```
#[derive(Debug)]
pub struct CsvRenderer<W: Write> {
    out: W,
    decimals: usize,
}

impl<W: Write> CsvRenderer<W> {
    /// Render to `out`, printing floats with `decimals` digits.
    pub fn new(out: W, decimals: usize) -> Self {
        Self { out, decimals }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ProfileRenderer for CsvRenderer<W> {
    fn render<T: Scalar>(&mut self, profile: &MixedProfile<T>, label: &str) -> std::io::Result<()> {
        let label = if label.is_empty() { "NE" } else { label };
        let mut fields = vec![label.to_string()];
        fields.extend(profile.render(self.decimals));
        writeln!(self.out, "{}", fields.join(","))?;
        self.out.flush()
    }
}

/// Keeps rendered rows in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRenderer {
    decimals: usize,
    rows: Vec<(String, Vec<String>)>,
}

impl MemoryRenderer {
    /// Collect rows, printing floats with `decimals` digits.
    pub fn new(decimals: usize) -> Self {
        Self {
            decimals,
            rows: Vec::new(),
        }
    }

    /// `(label, probabilities)` in the order received.
    pub fn rows(&self) -> &[(String, Vec<String>)] {
        &self.rows
    }

    /// Labels in the order received.
    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|(label, _)| label.as_str()).collect()
    }
}

impl ProfileRenderer for MemoryRenderer {
    fn render<T: Scalar>(&mut self, profile: &MixedProfile<T>, label: &str) -> std::io::Result<()> {
        let label = if label.is_empty() { "NE" } else { label };
        self.rows.push((label.to_string(), profile.render(self.decimals)));
        Ok(())
    }
}
