//! Human-readable ATN dumps for debugging and snapshot tests.
//!
//! The format is line-oriented and stable: one block per state with its
//! outgoing transitions in priority order, followed by the side tables
//! that are non-empty. Symbols render as `t<n>` tags for parser
//! machines (token names when a vocabulary is supplied) and as quoted
//! characters for lexer machines.

use std::fmt::Write;

use super::{Atn, LabelKind, MachineKind, State, StateKind, TransitionKind};
use crate::interval::IntervalSet;

/// Configurable printer for [`Atn`] dumps.
pub struct AtnPrinter<'a> {
    atn: &'a Atn,
    vocabulary: Option<&'a [String]>,
    show_unreachable: bool,
}

impl<'a> AtnPrinter<'a> {
    pub fn new(atn: &'a Atn) -> Self {
        Self { atn, vocabulary: None, show_unreachable: false }
    }

    /// Render parser symbols with token names instead of `t<n>` tags.
    pub fn with_vocabulary(mut self, names: &'a [String]) -> Self {
        self.vocabulary = Some(names);
        self
    }

    /// Also print states unreachable from any rule or mode. Collapsing
    /// optimizations strand fragment states; by default they stay
    /// hidden.
    pub fn show_unreachable(mut self, show: bool) -> Self {
        self.show_unreachable = show;
        self
    }

    /// Render the dump to a string.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    fn format(&self, w: &mut String) -> std::fmt::Result {
        let atn = self.atn;
        writeln!(w, "{} atn", atn.machine().name())?;

        if atn.rule_count() > 0 {
            writeln!(w)?;
            writeln!(w, "rules:")?;
            for (rule, name, bounds) in atn.rules() {
                writeln!(w, "  {rule} {name}: {} → {}", bounds.start, bounds.stop)?;
            }
        }

        if atn.modes().next().is_some() {
            writeln!(w)?;
            writeln!(w, "modes:")?;
            for (name, token_start) in atn.modes() {
                writeln!(w, "  {name}: {token_start}")?;
            }
        }

        let reachable = atn.reachable();
        writeln!(w)?;
        writeln!(w, "states:")?;
        for state in atn.states() {
            let live = reachable[state.id().index()];
            if !live && !self.show_unreachable {
                continue;
            }
            self.format_state(w, state, live)?;
        }

        if !atn.decisions().is_empty() {
            writeln!(w)?;
            write!(w, "decisions:")?;
            for id in atn.decisions() {
                write!(w, " {id}")?;
            }
            writeln!(w)?;
        }

        if !atn.labels().is_empty() {
            writeln!(w)?;
            writeln!(w, "labels:")?;
            for label in atn.labels() {
                let suffix = match label.kind {
                    LabelKind::Label => "",
                    LabelKind::ListLabel => "[]",
                };
                writeln!(w, "  {} {}{} → {}", label.rule, label.name, suffix, label.state)?;
            }
        }

        if !atn.predicates().is_empty() {
            writeln!(w)?;
            writeln!(w, "predicates:")?;
            for (index, pred) in atn.predicates().iter().enumerate() {
                writeln!(w, "  p{index} {} {{{}}}", pred.rule, pred.body)?;
            }
        }

        if !atn.actions().is_empty() {
            writeln!(w)?;
            writeln!(w, "actions:")?;
            for (index, action) in atn.actions().iter().enumerate() {
                writeln!(w, "  a{index} {} {{{}}}", action.rule, action.body)?;
            }
        }

        if !atn.commands().is_empty() {
            writeln!(w)?;
            writeln!(w, "commands:")?;
            for set in atn.commands() {
                write!(w, "  {} alt {}:", set.rule, set.alt)?;
                for (i, command) in set.commands.iter().enumerate() {
                    if i > 0 {
                        write!(w, ",")?;
                    }
                    write!(w, " {command}")?;
                }
                writeln!(w)?;
            }
        }

        Ok(())
    }

    fn format_state(&self, w: &mut String, state: &State, live: bool) -> std::fmt::Result {
        write!(w, "  {} {}", state.id(), self.state_tag(state.kind()))?;
        if let Some(decision) = state.decision() {
            write!(w, " {decision}")?;
        }
        if state.is_non_greedy() {
            write!(w, " !greedy")?;
        }
        if !live {
            write!(w, " ✗")?;
        }
        if state.is_open() {
            writeln!(w, " → ∅")?;
            return Ok(());
        }
        writeln!(w)?;
        for t in state.transitions() {
            write!(w, "    {} → {}", self.edge_label(&t.kind), t.target)?;
            if let TransitionKind::Rule { follow, .. } = t.kind {
                write!(w, " ret {follow}")?;
            }
            writeln!(w)?;
        }
        Ok(())
    }

    fn state_tag(&self, kind: StateKind) -> String {
        match kind {
            StateKind::RuleStart { rule } | StateKind::RuleStop { rule } => {
                let name = self
                    .atn
                    .rule_name(rule)
                    .map(str::to_string)
                    .unwrap_or_else(|| rule.to_string());
                format!("{}({name})", kind.name())
            }
            StateKind::TokenStart { mode } => {
                let name = self
                    .atn
                    .mode_name(mode)
                    .map(str::to_string)
                    .unwrap_or_else(|| mode.to_string());
                format!("tokenStart({name})")
            }
            other => other.name().to_string(),
        }
    }

    fn edge_label(&self, kind: &TransitionKind) -> String {
        match kind {
            TransitionKind::Epsilon => "ε".to_string(),
            TransitionKind::Atom { symbol } => self.symbol(*symbol),
            TransitionKind::Range { lo, hi } => {
                format!("{}..{}", self.symbol(*lo), self.symbol(*hi))
            }
            TransitionKind::Set { set, complement } => self.set_label(set, *complement),
            TransitionKind::Rule { rule, .. } => {
                let name = self
                    .atn
                    .rule_name(*rule)
                    .map(str::to_string)
                    .unwrap_or_else(|| rule.to_string());
                format!("call({name})")
            }
            TransitionKind::Predicate { index } => format!("pred(p{index})"),
            TransitionKind::Action { index } => format!("act(a{index})"),
            TransitionKind::Wildcard => "any".to_string(),
        }
    }

    fn symbol(&self, symbol: u32) -> String {
        match self.atn.machine() {
            MachineKind::Lexer => quoted_char(symbol),
            MachineKind::Parser => self.token_tag(symbol),
        }
    }

    fn token_tag(&self, symbol: u32) -> String {
        if let Some(names) = self.vocabulary
            && let Some(name) = names.get(symbol as usize)
        {
            return name.clone();
        }
        format!("t{symbol}")
    }

    fn set_label(&self, set: &IntervalSet, complement: bool) -> String {
        let prefix = if complement { "~" } else { "" };
        match self.atn.machine() {
            MachineKind::Lexer => {
                let mut out = format!("{prefix}[");
                for iv in set.iter() {
                    if iv.lo == iv.hi {
                        out.push_str(&class_char(iv.lo));
                    } else {
                        out.push_str(&class_char(iv.lo));
                        out.push('-');
                        out.push_str(&class_char(iv.hi));
                    }
                }
                out.push(']');
                out
            }
            MachineKind::Parser => {
                let mut out = format!("{prefix}{{");
                for (i, iv) in set.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    if iv.lo == iv.hi {
                        out.push_str(&self.token_tag(iv.lo));
                    } else {
                        out.push_str(&self.token_tag(iv.lo));
                        out.push('-');
                        out.push_str(&self.token_tag(iv.hi));
                    }
                }
                out.push('}');
                out
            }
        }
    }
}

/// Quoted character for atom and range labels.
fn quoted_char(symbol: u32) -> String {
    match char::from_u32(symbol) {
        Some('\n') => "'\\n'".to_string(),
        Some('\r') => "'\\r'".to_string(),
        Some('\t') => "'\\t'".to_string(),
        Some('\\') => "'\\\\'".to_string(),
        Some('\'') => "'\\''".to_string(),
        Some(c) if !c.is_control() => format!("'{c}'"),
        _ => format!("U+{symbol:04X}"),
    }
}

/// Bare character for character-class labels.
fn class_char(symbol: u32) -> String {
    match char::from_u32(symbol) {
        Some('\n') => "\\n".to_string(),
        Some('\r') => "\\r".to_string(),
        Some('\t') => "\\t".to_string(),
        Some('\\') => "\\\\".to_string(),
        Some(']') => "\\]".to_string(),
        Some('-') => "\\-".to_string(),
        Some(c) if !c.is_control() => c.to_string(),
        _ => format!("U+{symbol:04X}"),
    }
}

impl Atn {
    /// Printer with default settings.
    pub fn printer(&self) -> AtnPrinter<'_> {
        AtnPrinter::new(self)
    }

    /// Render with default settings.
    pub fn dump(&self) -> String {
        self.printer().dump()
    }
}
