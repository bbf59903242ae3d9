use tracing::debug;

use crate::{
    automaton::{Automaton, Kind, TransitionMap},
    math::IndexedSet,
    trace::{StepTrace, TraceRecorder},
    ConversionError,
};

/// Views the DFA `dfa` as an NFA. The input must satisfy the DFA invariants, every transition
/// `δ(q, a) = p` then becomes `δ(q, a) = {p}`. States, start and accepting states are kept.
///
/// The trace consists of copying the states, widening the transitions and a completion entry.
pub fn dfa_to_nfa(dfa: &Automaton) -> Result<(Automaton, StepTrace), ConversionError> {
    dfa.validate_deterministic()?;
    debug!("widening DFA with {} states into an NFA", dfa.size());

    let mut recorder = TraceRecorder::new(
        "Converting a DFA to an NFA is straightforward since every DFA is already an NFA. \
         We just need to ensure the transition function has the right format.",
    );

    let skeleton = Automaton::from_parts(
        Kind::Nfa,
        dfa.states().cloned().collect::<IndexedSet<_>>(),
        dfa.alphabet().clone(),
        TransitionMap::new(),
        dfa.start().clone(),
        dfa.accepting().clone(),
    );
    recorder.record(
        "Copy states and start/accepting states",
        "All DFA states become NFA states with the same names and properties.",
        skeleton,
    );

    let nfa = dfa.clone().with_kind(Kind::Nfa);
    recorder.record(
        "Convert transitions to NFA format",
        format!(
            "Each DFA transition δ(q, a) = p becomes an NFA transition δ(q, a) = {{p}}, \
             single destinations become singleton sets. {} transitions were converted.",
            dfa.transition_count()
        ),
        nfa.clone(),
    );
    recorder.record(
        "NFA conversion complete",
        "The resulting NFA is equivalent to the original DFA. No additional nondeterminism \
         was introduced.",
        nfa.clone(),
    );
    Ok((nfa, recorder.finish()))
}
