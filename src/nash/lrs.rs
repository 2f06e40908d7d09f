//! Vertex enumeration delegated to the external `lrs` program.
//!
//! Each polytope is written in lrs's H-representation (one inequality
//! `b + a·x ≥ 0` per line), lrs is run on it, and the vertices of its
//! V-representation output are read back as exact rationals.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use log::{debug, info};
use num_rational::BigRational;

use crate::nash::error::SolveError;
use crate::nash::number::{parse_rational, Scalar};
use crate::nash::polytope::{BestResponsePolytope, VertexEnumerator, VertexSet};

/// Runs `lrs` as a subprocess for each polytope.
#[derive(Debug, Clone)]
pub struct LrsEnumerator {
    program: PathBuf,
}

impl Default for LrsEnumerator {
    fn default() -> Self {
        Self::new("lrs")
    }
}

impl LrsEnumerator {
    /// Use the given executable (a name on `PATH` or a full path).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The executable this enumerator runs.
    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    fn run(&self, input: &str) -> Result<String, SolveError> {
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SolveError::DelegateFailure(format!("cannot start {}: {}", self.program.display(), e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .map_err(|e| SolveError::DelegateFailure(format!("cannot write input: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| SolveError::DelegateFailure(format!("lrs did not finish: {}", e)))?;
        if !output.status.success() {
            return Err(SolveError::DelegateFailure(format!(
                "lrs exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| SolveError::DelegateFailure(format!("output is not UTF-8: {}", e)))
    }
}

impl<T: Scalar> VertexEnumerator<T> for LrsEnumerator {
    fn name(&self) -> &'static str {
        "lrs"
    }

    fn vertices(&self, polytope: &BestResponsePolytope<T>) -> Result<VertexSet<T>, SolveError> {
        let input = h_representation(polytope)?;
        debug!("lrs input for player {}:\n{}", polytope.player() + 1, input);

        let output = self.run(&input)?;
        let vertices = parse_v_representation(&output, polytope.dimension())?;
        info!(
            "lrs found {} vertices for player {}",
            vertices.len(),
            polytope.player() + 1
        );

        let mut points: Vec<Vec<T>> = Vec::with_capacity(vertices.len());
        for vertex in vertices {
            let point: Vec<T> = vertex.iter().map(T::from_rational).collect();
            if !points.iter().any(|p| p.iter().zip(&point).all(|(a, b)| a.approx_eq(b))) {
                points.push(point);
            }
        }
        Ok(VertexSet {
            points,
            bases_visited: 0,
        })
    }
}

/// Write a polytope as an lrs H-representation.
///
/// Rows are the opponent inequalities `1 - c·x ≥ 0` followed by the
/// non-negativity constraints `x_i ≥ 0`.
pub fn h_representation<T: Scalar>(polytope: &BestResponsePolytope<T>) -> Result<String, SolveError> {
    let dim = polytope.dimension();
    let rows = polytope.num_constraints() + dim;

    let mut out = format!(
        "player{}\nH-representation\nbegin\n{} {} rational\n",
        polytope.player() + 1,
        rows,
        dim + 1
    );

    for row in polytope.constraints() {
        let mut line = vec!["1".to_string()];
        for coeff in row {
            let exact = coeff.to_rational().ok_or_else(|| {
                SolveError::Arithmetic(format!("coefficient {} has no exact value", coeff))
            })?;
            line.push((-exact).to_string());
        }
        out.push_str(&line.join(" "));
        out.push('\n');
    }

    for i in 0..dim {
        let line: Vec<&str> = std::iter::once("0")
            .chain((0..dim).map(|k| if k == i { "1" } else { "0" }))
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }

    out.push_str("end\n");
    Ok(out)
}

/// Read the vertices from lrs V-representation output.
///
/// Lines starting with `*` are comments. Within `begin` / `end`, a line
/// starting with `1` is a vertex; a line starting with `0` is a ray, which a
/// best-response polytope cannot have.
pub fn parse_v_representation(output: &str, dim: usize) -> Result<Vec<Vec<BigRational>>, SolveError> {
    let mut vertices = Vec::new();
    let mut in_body = false;
    let mut saw_end = false;

    for line in output.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('*') {
            continue;
        }
        if !in_body {
            if line == "begin" {
                in_body = true;
            }
            continue;
        }
        if line == "end" {
            saw_end = true;
            break;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.last() == Some(&"rational") {
            continue;
        }
        match tokens.first() {
            Some(&"1") => {}
            Some(&"0") => {
                return Err(SolveError::DelegateFailure(format!(
                    "unexpected ray in output: {}",
                    line
                )))
            }
            _ => {
                return Err(SolveError::DelegateFailure(format!(
                    "unrecognized output line: {}",
                    line
                )))
            }
        }
        if tokens.len() != dim + 1 {
            return Err(SolveError::DelegateFailure(format!(
                "expected {} coordinates, found {} in: {}",
                dim,
                tokens.len() - 1,
                line
            )));
        }

        let vertex: Option<Vec<BigRational>> = tokens[1..].iter().map(|t| parse_rational(t)).collect();
        match vertex {
            Some(v) => vertices.push(v),
            None => {
                return Err(SolveError::DelegateFailure(format!(
                    "unparseable coordinate in: {}",
                    line
                )))
            }
        }
    }

    if !saw_end {
        return Err(SolveError::DelegateFailure(
            "output has no complete V-representation".to_string(),
        ));
    }
    Ok(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games;
    use crate::nash::number::ratio;

    const COORDINATION_OUTPUT: &str = "\
*lrs:lrslib v.7.2 2022.3.6(64bit,lrslong.h,hybrid arithmetic)
*Input taken from file /dev/stdin
player1
V-representation
begin
***** 3 rational
 1  0  0
 1  1/2  0
 1  1/3  1/3
 1  0  1/2
end
*Totals: vertices=4 rays=0 bases=4 integer_vertices=1
";

    #[test]
    fn test_h_representation_layout() {
        let game = games::coordination();
        let [p, _] = BestResponsePolytope::<BigRational>::pair(&game).unwrap();
        let text = h_representation(&p).unwrap();
        assert_eq!(
            text,
            "player1\nH-representation\nbegin\n4 3 rational\n1 -2 -1\n1 -1 -2\n0 1 0\n0 0 1\nend\n"
        );
    }

    #[test]
    fn test_parse_vertices() {
        let vertices = parse_v_representation(COORDINATION_OUTPUT, 2).unwrap();
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[2], vec![ratio(1, 3), ratio(1, 3)]);
    }

    #[test]
    fn test_parse_rejects_rays_and_garbage() {
        let ray = "V-representation\nbegin\n***** 3 rational\n 0 1 0\nend\n";
        assert!(matches!(
            parse_v_representation(ray, 2),
            Err(SolveError::DelegateFailure(_))
        ));

        let truncated = "V-representation\nbegin\n***** 3 rational\n 1 1/2 0\n";
        assert!(matches!(
            parse_v_representation(truncated, 2),
            Err(SolveError::DelegateFailure(_))
        ));

        let wrong_width = "begin\n 1 1/2\nend\n";
        assert!(parse_v_representation(wrong_width, 2).is_err());

        let junk = "begin\n 1 x y\nend\n";
        assert!(parse_v_representation(junk, 2).is_err());
    }

    #[test]
    fn test_missing_program_is_a_delegate_failure() {
        let game = games::coordination();
        let [p, _] = BestResponsePolytope::<BigRational>::pair(&game).unwrap();
        let lrs = LrsEnumerator::new("/nonexistent/lrs-binary");
        assert!(matches!(
            lrs.vertices(&p),
            Err(SolveError::DelegateFailure(_))
        ));
    }
}
