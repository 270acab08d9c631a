//! DIMACS CNF export of a [`Model`].

use super::Model;
use itertools::Itertools;
use std::path::Path;

impl Model {
    /// Renders every clause added so far in DIMACS CNF format.
    #[must_use]
    pub fn to_dimacs(&self) -> String {
        let mut out = format!("p cnf {} {}\n", self.num_vars(), self.num_clauses());
        for clause in self.formula.iter() {
            let lits = clause.iter().map(|lit| lit.to_dimacs()).join(" ");
            if lits.is_empty() {
                out.push_str("0\n");
            } else {
                out.push_str(&lits);
                out.push_str(" 0\n");
            }
        }
        out
    }

    /// Writes [`Model::to_dimacs`] to `path`.
    ///
    /// # Errors
    ///
    /// If the file cannot be written.
    pub fn write_dimacs(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.to_dimacs())?;
        log::info!("DIMACS written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimacs_header_and_clauses() {
        let mut model = Model::new();
        let a = model.new_bool();
        let b = model.new_bool();
        model.add_clause(&[a, !b]);

        let dimacs = model.to_dimacs();
        let lines: Vec<&str> = dimacs.lines().collect();
        // constant-true unit clause comes first
        assert_eq!(lines, vec!["p cnf 3 2", "1 0", "2 -3 0"]);
    }
}
