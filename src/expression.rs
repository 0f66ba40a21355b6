//! Symbolic linear expressions over registered unknowns.
//!
//! End moments are kept as ordered lists of terms until the unknowns are
//! solved; equilibrium equations are the same lists with like terms collected.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::numeric::{CompensatedSum, CANCELLATION_RATIO};

/// Physical meaning of an unknown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unknown {
    /// Rotation of a joint.
    Rotation(NodeIndex),
    /// Horizontal translation shared by every node of a sway group, numbered from one.
    Sway(usize),
}

/// Dense index of a registered unknown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnknownId(pub usize);

/// Allocates a stable index and display name for every unknown of one analysis.
#[derive(Clone, Debug, Default)]
pub struct UnknownRegistry {
    entries: Vec<(Unknown, String)>,
    lookup: HashMap<Unknown, UnknownId>,
}

impl UnknownRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an unknown, returning the existing id when already present.
    pub fn register(&mut self, unknown: Unknown, name: impl Into<String>) -> UnknownId {
        if let Some(id) = self.lookup.get(&unknown) {
            return *id;
        }
        let id = UnknownId(self.entries.len());
        self.entries.push((unknown, name.into()));
        self.lookup.insert(unknown, id);
        id
    }

    /// Id of a registered unknown.
    #[must_use]
    pub fn id(&self, unknown: Unknown) -> Option<UnknownId> {
        self.lookup.get(&unknown).copied()
    }

    /// Display name of a registered unknown, e.g. `THETA_B` or `DELTA_1`.
    #[must_use]
    pub fn name(&self, id: UnknownId) -> Option<&str> {
        self.entries.get(id.0).map(|(_, name)| name.as_str())
    }

    /// Meaning of a registered unknown.
    #[must_use]
    pub fn unknown(&self, id: UnknownId) -> Option<Unknown> {
        self.entries.get(id.0).map(|(unknown, _)| *unknown)
    }

    /// Number of registered unknowns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over ids with their meaning and name, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (UnknownId, Unknown, &str)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, (unknown, name))| (UnknownId(index), *unknown, name.as_str()))
    }
}

/// What a term multiplies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// The constant pseudo-unknown `c`, always worth one.
    Constant,
    /// A registered unknown.
    Unknown(UnknownId),
}

/// Coefficient paired with a symbol.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// Multiplier.
    pub coefficient: f64,
    /// Multiplied symbol.
    pub symbol: Symbol,
}

/// Ordered sum of terms, `c + Σ coefficient·unknown`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    terms: Vec<Term>,
}

impl LinearExpr {
    /// Empty expression, worth zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expression holding a single constant.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        let mut expr = Self::new();
        expr.push_constant(value);
        expr
    }

    /// Append a constant term.
    pub fn push_constant(&mut self, value: f64) {
        self.terms.push(Term {
            coefficient: value,
            symbol: Symbol::Constant,
        });
    }

    /// Append a term in an unknown.
    pub fn push_unknown(&mut self, coefficient: f64, id: UnknownId) {
        self.terms.push(Term {
            coefficient,
            symbol: Symbol::Unknown(id),
        });
    }

    /// Append every term of `other`.
    pub fn extend_from(&mut self, other: &Self) {
        self.terms.extend_from_slice(&other.terms);
    }

    /// Append every term of `other` multiplied by `factor`.
    pub fn extend_scaled(&mut self, other: &Self, factor: f64) {
        self.terms.extend(other.terms.iter().map(|term| Term {
            coefficient: term.coefficient * factor,
            symbol: term.symbol,
        }));
    }

    /// Terms in insertion order.
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Substitute unknown values, indexed by [`UnknownId`], and sum.
    ///
    /// Unknowns without a value count as zero.
    #[must_use]
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|term| match term.symbol {
                Symbol::Constant => term.coefficient,
                Symbol::Unknown(id) => term.coefficient * values.get(id.0).copied().unwrap_or(0.0),
            })
            .collect::<CompensatedSum>()
            .value()
    }

    /// Human readable form using registered names, e.g. `30 + 2.5e4*THETA_B`.
    #[must_use]
    pub fn render(&self, registry: &UnknownRegistry) -> String {
        let mut out = String::new();
        for (index, term) in self.terms.iter().enumerate() {
            let (sign, magnitude) = if term.coefficient < 0.0 {
                ("-", -term.coefficient)
            } else {
                ("+", term.coefficient)
            };
            if index == 0 {
                if sign == "-" {
                    out.push('-');
                }
            } else {
                let _ = write!(out, " {sign} ");
            }
            match term.symbol {
                Symbol::Constant => {
                    let _ = write!(out, "{magnitude}");
                }
                Symbol::Unknown(id) => {
                    let name = registry.name(id).unwrap_or("?");
                    let _ = write!(out, "{magnitude}*{name}");
                }
            }
        }
        if out.is_empty() {
            out.push('0');
        }
        out
    }

    /// Group like terms into an [`Equation`] reading `expression = 0`.
    ///
    /// Coefficients are summed with compensation. A coefficient is dropped when
    /// it cancels to rounding noise relative to the largest contribution to it.
    #[must_use]
    pub fn collect(&self) -> Equation {
        let mut constant = CompensatedSum::new();
        let mut grouped: BTreeMap<UnknownId, (CompensatedSum, f64)> = BTreeMap::new();
        for term in &self.terms {
            match term.symbol {
                Symbol::Constant => constant.add(term.coefficient),
                Symbol::Unknown(id) => {
                    let entry = grouped.entry(id).or_default();
                    entry.0.add(term.coefficient);
                    entry.1 = entry.1.max(term.coefficient.abs());
                }
            }
        }
        let coefficients = grouped
            .into_iter()
            .filter_map(|(id, (sum, largest))| {
                let value = sum.value();
                (value.abs() > CANCELLATION_RATIO * largest).then_some((id, value))
            })
            .collect();
        Equation {
            constant: constant.value(),
            coefficients,
        }
    }
}

/// Collected linear equation `constant + Σ coefficient·unknown = 0`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Equation {
    /// Constant term.
    pub constant: f64,
    /// Sparse coefficients keyed by unknown.
    pub coefficients: BTreeMap<UnknownId, f64>,
}

impl Equation {
    /// Whether the equation still involves any unknown.
    #[must_use]
    pub fn has_unknowns(&self) -> bool {
        !self.coefficients.is_empty()
    }

    /// Left-hand side evaluated at `values`.
    #[must_use]
    pub fn residual(&self, values: &[f64]) -> f64 {
        let mut sum = CompensatedSum::new();
        sum.add(self.constant);
        for (id, coefficient) in &self.coefficients {
            sum.add(coefficient * values.get(id.0).copied().unwrap_or(0.0));
        }
        sum.value()
    }
}
