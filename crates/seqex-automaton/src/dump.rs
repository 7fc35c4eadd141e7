//! Human-readable NFA dump.
//!
//! One line per state, the start state marked with `>`:
//!
//! ```text
//! >0  group-start 0 -> 1
//!  1  node text="a" -> 2
//! ```

use std::fmt::Write as _;

use seqex_core::Colors;

use crate::nfa::Nfa;
use crate::state::StateKind;

pub fn dump<T>(nfa: &Nfa<T>, colors: Colors) -> String {
    let c = colors;
    let width = nfa.len().saturating_sub(1).to_string().len();
    let mut out = String::new();

    for (i, state) in nfa.states().iter().enumerate() {
        let marker = if i == nfa.start().index() { '>' } else { ' ' };
        write!(out, "{marker}{i:>width$}  {}{}{}", c.blue, state.kind.label(), c.reset).ok();

        match &state.kind {
            StateKind::Node(p) => write!(out, " {}{p:?}{}", c.green, c.reset),
            StateKind::MultiNode { predicate, .. } => {
                write!(out, " {}{predicate:?}{}", c.green, c.reset)
            }
            StateKind::Repeat {
                body,
                min,
                max,
                greedy,
                ..
            } => {
                let max = max.map(|m| m.to_string()).unwrap_or_default();
                let lazy = if *greedy { "" } else { "?" };
                write!(out, " {{{min},{max}}}{lazy} body {body}")
            }
            StateKind::BackRef { group, .. } => write!(out, " \\{group}"),
            StateKind::GroupStart(g) | StateKind::GroupEnd(g) => write!(out, " {g}"),
            StateKind::Value(v) => write!(out, " {}{v}{}", c.green, c.reset),
            StateKind::ConjEnd { child, .. } => write!(out, " {child}"),
            StateKind::Split
            | StateKind::ConjStart { .. }
            | StateKind::SeqStart
            | StateKind::SeqEnd
            | StateKind::Match => Ok(()),
        }
        .ok();

        if !state.next.is_empty() {
            let next: Vec<String> = state.next.iter().map(|s| s.to_string()).collect();
            write!(out, " {}-> {}{}", c.dim, next.join(", "), c.reset).ok();
        }
        out.push('\n');
    }
    out
}
