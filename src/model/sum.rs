//! Bounded linear sums over one-hot integer terms.
//!
//! The encoding is a layered reachability table: after term `i`, the state literal
//! for total `t` is implied whenever the prefix sum of the first `i` terms equals `t`.
//! Implications only run forwards, so the literal of the real total is always
//! true and bounds are enforced by forbidding the out-of-range states.

use super::{Assignment, Model};
use smallvec::{smallvec, SmallVec};
use std::ops::RangeInclusive;
use varisat::Lit;

/// Mutually exclusive weighted options; contributes 0 when none of them holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Term(SmallVec<[(Lit, u32); 8]>);

impl Term {
    /// `weight` when `lit` is true, 0 otherwise.
    #[must_use]
    pub fn single(lit: Lit, weight: u32) -> Self {
        Self(smallvec![(lit, weight)])
    }

    /// A one-hot integer: `lits[i]` stands for the value `weight(i)`.
    pub fn one_hot(lits: &[Lit], weight: impl Fn(usize) -> u32) -> Self {
        lits.iter()
            .enumerate()
            .map(|(i, &lit)| (lit, weight(i)))
            .filter(|&(_, w)| w > 0)
            .collect()
    }

    /// The `(literal, weight)` options.
    pub fn options(&self) -> &[(Lit, u32)] {
        &self.0
    }

    fn evaluate(&self, assignment: &Assignment) -> u32 {
        self.0
            .iter()
            .filter(|&&(lit, _)| assignment.value(lit))
            .map(|&(_, w)| w)
            .sum()
    }
}

impl FromIterator<(Lit, u32)> for Term {
    fn from_iter<I: IntoIterator<Item = (Lit, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// State literals of the final layer of a sum, indexed by total.
#[derive(Debug, Clone)]
pub struct SumOutputs {
    terms: Vec<Term>,
    outputs: Vec<Option<Lit>>,
}

impl SumOutputs {
    /// Literal implied when the total equals `total`, if that total is reachable.
    #[must_use]
    pub fn output(&self, total: u32) -> Option<Lit> {
        self.outputs.get(total as usize).copied().flatten()
    }

    /// Reachable `(total, literal)` pairs in increasing order.
    pub fn outputs(&self) -> impl Iterator<Item = (u32, Lit)> + '_ {
        self.outputs
            .iter()
            .enumerate()
            .filter_map(|(t, lit)| lit.map(|lit| (t as u32, lit)))
    }

    pub(crate) fn at_least(&self, total: u32) -> impl Iterator<Item = Lit> + '_ {
        self.outputs().filter(move |&(t, _)| t >= total).map(|(_, lit)| lit)
    }

    /// Recomputes the total directly from the term literals.
    #[must_use]
    pub fn evaluate(&self, assignment: &Assignment) -> u32 {
        self.terms.iter().map(|term| term.evaluate(assignment)).sum()
    }
}

impl Model {
    /// Total of `terms` lies in `bounds`.
    pub fn sum(&mut self, terms: &[Term], bounds: RangeInclusive<u32>) -> SumOutputs {
        self.sum_if(None, terms, bounds)
    }

    /// Like [`Model::sum`], but the bounds only apply while `guard` holds.
    pub fn sum_if(
        &mut self,
        guard: Option<Lit>,
        terms: &[Term],
        bounds: RangeInclusive<u32>,
    ) -> SumOutputs {
        let (lo, hi) = (*bounds.start() as usize, *bounds.end() as usize);
        let mut layer: Vec<Option<Lit>> = vec![None; hi + 1];
        layer[0] = Some(self.constant(true));

        for term in terms {
            let mut next: Vec<Option<Lit>> = vec![None; hi + 1];
            let states: Vec<(usize, Lit)> = layer
                .iter()
                .enumerate()
                .filter_map(|(t, s)| s.map(|s| (t, s)))
                .collect();

            for (total, state) in states {
                let stay = *next[total].get_or_insert_with(|| self.new_bool());
                let mut clause: SmallVec<[Lit; 16]> = smallvec![!state, stay];
                clause.extend(term.options().iter().map(|&(lit, _)| lit));
                self.add_clause(&clause);

                for &(lit, weight) in term.options() {
                    let reached = total + weight as usize;
                    if reached > hi {
                        self.add_guarded(guard, &[!state, !lit]);
                    } else {
                        let out = *next[reached].get_or_insert_with(|| self.new_bool());
                        self.add_clause(&[!state, !lit, out]);
                    }
                }
            }
            layer = next;
        }

        let mut feasible = false;
        for (total, out) in layer.iter().enumerate() {
            let Some(out) = *out else { continue };
            if total < lo {
                self.add_guarded(guard, &[!out]);
            } else {
                feasible = true;
            }
        }
        if !feasible {
            self.add_guarded(guard, &[]);
        }

        SumOutputs {
            terms: terms.to_vec(),
            outputs: layer,
        }
    }
}
