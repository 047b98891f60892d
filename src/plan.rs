// Scaffolding plan module
//
// A plan is a compact string of operation codes, each followed by a repeat
// count: `E3B1` runs Ezra three times and then Bridger once. Parsing happens
// once, before any stage runs, and the resulting `Plan` is read-only for the
// rest of the run.

use crate::defaults;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[cfg(test)]
#[path = "plan_test.rs"]
mod plan_test;

/// Scaffolding operation selected by a plan code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// `B`: graph-based full reassembly (Bridger)
    GraphScaffold,
    /// `E`: incremental contig extension (Ezra)
    IncrementalScaffold,
}

impl OperationKind {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'B' => Some(OperationKind::GraphScaffold),
            'E' => Some(OperationKind::IncrementalScaffold),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            OperationKind::GraphScaffold => 'B',
            OperationKind::IncrementalScaffold => 'E',
        }
    }

    /// Name of the scaffolder backing this operation
    pub fn tool_name(self) -> &'static str {
        match self {
            OperationKind::GraphScaffold => "Bridger",
            OperationKind::IncrementalScaffold => "Ezra",
        }
    }
}

/// One plan entry: run `kind` `repeat` times in a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub kind: OperationKind,
    pub repeat: u32, // 1..=MAX_REPEAT
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("empty scaffolding plan")]
    Empty,
    #[error("invalid operation in scaffolding plan: {op} ({plan})")]
    InvalidOperation { op: char, plan: String },
    #[error("missing operation count after '{op}' in scaffolding plan ({plan})")]
    MissingCount { op: char, plan: String },
    #[error("invalid operation count in scaffolding plan: {count} ({plan})")]
    InvalidCount { count: String, plan: String },
}

/// Validated, ordered scaffolding plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    /// Parse a plan string of the form `(<opcode><digits>)+`
    ///
    /// Opcodes are `E` and `B`; every count must be an integer in `1..=9`.
    /// Whitespace and separators are rejected as invalid operations.
    pub fn parse(plan: &str) -> Result<Self, PlanError> {
        if plan.is_empty() {
            return Err(PlanError::Empty);
        }

        let mut steps = Vec::new();
        let mut chars = plan.chars().peekable();

        while let Some(op) = chars.next() {
            let kind = OperationKind::from_code(op).ok_or_else(|| PlanError::InvalidOperation {
                op,
                plan: plan.to_string(),
            })?;

            let mut digits = String::new();
            while let Some(&c) = chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                digits.push(c);
                chars.next();
            }

            if digits.is_empty() {
                return Err(PlanError::MissingCount {
                    op,
                    plan: plan.to_string(),
                });
            }

            // Overlong digit runs fail to parse and are reported like any other bad count
            let repeat = match digits.parse::<u32>() {
                Ok(n) if (1..=defaults::MAX_REPEAT).contains(&n) => n,
                _ => {
                    return Err(PlanError::InvalidCount {
                        count: digits,
                        plan: plan.to_string(),
                    });
                }
            };

            steps.push(Step { kind, repeat });
        }

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// True when any step needs the one-time reads-vs-reads overlaps
    pub fn requires_read_overlaps(&self) -> bool {
        self.uses(OperationKind::GraphScaffold)
    }

    pub fn uses(&self, kind: OperationKind) -> bool {
        self.steps.iter().any(|s| s.kind == kind)
    }

    /// Number of scaffolding iterations the plan expands to
    pub fn total_iterations(&self) -> u32 {
        self.steps.iter().map(|s| s.repeat).sum()
    }

    /// Expand the plan into `(iteration, kind)` pairs, iterations counted from 1
    pub fn iterations(&self) -> impl Iterator<Item = (u32, OperationKind)> + '_ {
        self.steps
            .iter()
            .flat_map(|s| std::iter::repeat(s.kind).take(s.repeat as usize))
            .zip(1u32..)
            .map(|(kind, iteration)| (iteration, kind))
    }
}

impl FromStr for Plan {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Plan::parse(s)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "{}{}", step.kind.code(), step.repeat)?;
        }
        Ok(())
    }
}
