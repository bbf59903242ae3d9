use std::fmt::Display;

use tracing::trace;

use crate::{
    automaton::Automaton, convert::GeneralizedAutomaton, pda::PushdownAutomaton,
    regex::RegexNode,
};

/// Label of the entry that every trace starts with.
pub const PLACEHOLDER_LABEL: &str = "Initialized";

/// The intermediate object captured by a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    /// A finite automaton, e.g. the partial DFA of the subset construction.
    Automaton(Automaton),
    /// An automaton whose edges are labeled with regular expressions, used by state elimination.
    Generalized(GeneralizedAutomaton),
    /// A pushdown automaton.
    Pushdown(PushdownAutomaton),
    /// A regular expression.
    Regex(RegexNode),
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Snapshot::Automaton(a) => write!(f, "{a}"),
            Snapshot::Generalized(g) => write!(f, "{g}"),
            Snapshot::Pushdown(p) => write!(f, "{p}"),
            Snapshot::Regex(r) => write!(f, "{r}"),
        }
    }
}

impl From<Automaton> for Snapshot {
    fn from(value: Automaton) -> Self {
        Snapshot::Automaton(value)
    }
}

impl From<GeneralizedAutomaton> for Snapshot {
    fn from(value: GeneralizedAutomaton) -> Self {
        Snapshot::Generalized(value)
    }
}

impl From<PushdownAutomaton> for Snapshot {
    fn from(value: PushdownAutomaton) -> Self {
        Snapshot::Pushdown(value)
    }
}

impl From<RegexNode> for Snapshot {
    fn from(value: RegexNode) -> Self {
        Snapshot::Regex(value)
    }
}

/// A single step of a conversion: a short label, an explanation and the state after the step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    label: String,
    explanation: String,
    snapshot: Option<Snapshot>,
}

impl TraceEntry {
    /// Creates an entry.
    pub fn new<L: Into<String>, E: Into<String>>(
        label: L,
        explanation: E,
        snapshot: Option<Snapshot>,
    ) -> Self {
        Self {
            label: label.into(),
            explanation: explanation.into(),
            snapshot,
        }
    }

    /// The short label of the step.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// A human readable explanation of what happened in this step.
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// The object after this step, if there is one.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }
}

/// The ordered history of a conversion. Entry `0` is always a placeholder without snapshot, so
/// that entry `i` is the state after step `i` for all `i >= 1`. Traces are only built through a
/// [`TraceRecorder`] and cannot be modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTrace {
    entries: Vec<TraceEntry>,
}

impl StepTrace {
    /// All entries, including the placeholder.
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Iterates over all entries, including the placeholder.
    pub fn iter(&self) -> std::slice::Iter<'_, TraceEntry> {
        self.entries.iter()
    }

    /// Number of entries, including the placeholder.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false, a trace contains at least the placeholder.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry recorded in step `step`.
    pub fn get(&self, step: usize) -> Option<&TraceEntry> {
        self.entries.get(step)
    }

    /// The last entry, which holds the final result for all engines.
    pub fn last(&self) -> Option<&TraceEntry> {
        self.entries.last()
    }

    /// Iterates over the labels of all entries.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.label())
    }

    /// Appends `other` to `self`, separated by a delimiter entry without snapshot. The
    /// placeholder of `other` is dropped, so the result again has exactly one placeholder.
    pub fn then<L: Into<String>, E: Into<String>>(
        mut self,
        label: L,
        explanation: E,
        other: StepTrace,
    ) -> StepTrace {
        self.entries.push(TraceEntry::new(label, explanation, None));
        self.entries.extend(other.entries.into_iter().skip(1));
        self
    }
}

impl<'a> IntoIterator for &'a StepTrace {
    type Item = &'a TraceEntry;
    type IntoIter = std::slice::Iter<'a, TraceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Display for StepTrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            writeln!(f, "Step {i}: {}", entry.label)?;
            writeln!(f, "    {}", entry.explanation)?;
        }
        Ok(())
    }
}

/// Collects the entries of a [`StepTrace`] while a conversion runs. Each engine owns its own
/// recorder and hands it out as an immutable trace once it is done.
#[derive(Debug, Clone)]
pub struct TraceRecorder {
    entries: Vec<TraceEntry>,
}

impl TraceRecorder {
    /// Creates a recorder that holds only the placeholder entry, whose explanation describes the
    /// conversion that is about to run.
    pub fn new<E: Into<String>>(explanation: E) -> Self {
        Self {
            entries: vec![TraceEntry::new(PLACEHOLDER_LABEL, explanation, None)],
        }
    }

    /// Records a step together with the object after the step.
    pub fn record<L, E, S>(&mut self, label: L, explanation: E, snapshot: S)
    where
        L: Into<String>,
        E: Into<String>,
        S: Into<Snapshot>,
    {
        self.push(TraceEntry::new(label, explanation, Some(snapshot.into())));
    }

    fn push(&mut self, entry: TraceEntry) {
        trace!(
            "step {}: {} ({})",
            self.entries.len(),
            entry.label,
            entry.explanation
        );
        self.entries.push(entry);
    }

    /// Number of entries recorded so far, including the placeholder.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false, a recorder contains at least the placeholder.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finishes recording.
    pub fn finish(self) -> StepTrace {
        StepTrace {
            entries: self.entries,
        }
    }
}
