//! Cardinality constraints over plain literals.

use super::{Model, Term};
use itertools::Itertools;
use std::ops::RangeInclusive;
use varisat::Lit;

/// Below this many literals the pairwise encoding is smaller than the ladder.
const PAIRWISE_LIMIT: usize = 8;

impl Model {
    /// At least one of `lits` is true.
    pub fn at_least_one(&mut self, lits: &[Lit]) {
        self.add_guarded(None, lits);
    }

    /// Pairwise for short lists, sequential counter (ladder) otherwise.
    pub fn at_most_one(&mut self, lits: &[Lit]) {
        if lits.len() <= PAIRWISE_LIMIT {
            for (&a, &b) in lits.iter().tuple_combinations() {
                self.add_clause(&[!a, !b]);
            }
            return;
        }

        // s[i] holds when one of lits[..=i] is true
        let ladder = self.new_bools(lits.len() - 1);
        for (i, &lit) in lits.iter().enumerate() {
            if i < ladder.len() {
                self.implies(lit, ladder[i]);
            }
            if i > 0 {
                self.add_clause(&[!lit, !ladder[i - 1]]);
                if i < ladder.len() {
                    self.implies(ladder[i - 1], ladder[i]);
                }
            }
        }
    }

    /// Exactly one of `lits` is true.
    pub fn exactly_one(&mut self, lits: &[Lit]) {
        self.at_least_one(lits);
        self.at_most_one(lits);
    }

    /// Number of true literals lies in `bounds`.
    pub fn count(&mut self, lits: &[Lit], bounds: RangeInclusive<u32>) {
        let terms: Vec<Term> = lits.iter().map(|&lit| Term::single(lit, 1)).collect();
        self.sum(&terms, bounds);
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Assignment, Model, SearchLimit, SolutionCallback};
    use varisat::Lit;

    struct Count(Vec<Lit>);

    impl SolutionCallback for Count {
        type Solution = usize;

        fn on_solution(&mut self, assignment: &Assignment) -> usize {
            self.0.iter().filter(|&&l| assignment.value(l)).count()
        }
    }

    fn enumerate(model: &mut Model, xs: &[Lit]) -> Vec<usize> {
        let mut callback = Count(xs.to_vec());
        model.collect(xs, SearchLimit::All, &mut callback).unwrap()
    }

    #[test]
    fn test_exactly_one_pairwise_and_ladder() {
        for n in [3, 12] {
            let mut model = Model::new();
            let xs = model.new_bools(n);
            model.exactly_one(&xs);
            let counts = enumerate(&mut model, &xs);
            assert_eq!(counts.len(), n);
            assert!(counts.iter().all(|&c| c == 1));
        }
    }

    #[test]
    fn test_at_most_one_allows_none() {
        let mut model = Model::new();
        let xs = model.new_bools(10);
        model.at_most_one(&xs);
        let counts = enumerate(&mut model, &xs);
        assert_eq!(counts.len(), 11);
        assert!(counts.iter().all(|&c| c <= 1));
    }

    #[test]
    fn test_count_range() {
        let mut model = Model::new();
        let xs = model.new_bools(5);
        model.count(&xs, 2..=3);
        let counts = enumerate(&mut model, &xs);
        // C(5,2) + C(5,3)
        assert_eq!(counts.len(), 20);
        assert!(counts.iter().all(|&c| (2..=3).contains(&c)));
    }
}
