//! Textual rendering of state changes

use vchain_core::{AnimationState, Catalog, ChatRole};

/// Display names of the cosmetic specialist agents
pub(crate) const AGENT_NAMES: [&str; 3] = ["Agente Jurídico", "Agente Criativo", "Agente Analítico"];

/// Lines describing what changed between two published states
pub(crate) fn describe_change(
    catalog: &Catalog,
    prev: &AnimationState,
    next: &AnimationState,
) -> Vec<String> {
    let mut lines = Vec::new();

    if next.beam_active && !prev.beam_active {
        lines.push(">> feixe de entrada disparado".to_string());
    }

    if next.paused != prev.paused {
        lines.push(if next.paused { "|| pausado" } else { "|> retomado" }.to_string());
    }

    if next.current_step != prev.current_step {
        for index in skipped_steps(prev, next) {
            if let Some(step) = catalog.step(index) {
                lines.push(format!(
                    "[{}/{}] {} ({} ms)",
                    index + 1,
                    catalog.len(),
                    step.description,
                    step.duration_ms
                ));
            }
        }
        if let Some((index, step)) = next.current_step.and_then(|i| catalog.step(i).map(|s| (i, s))) {
            lines.push(format!(
                "[{}/{}] {} ({} ms)",
                index + 1,
                catalog.len(),
                step.description,
                step.duration_ms
            ));
            if let Some(details) = &step.details {
                lines.push(format!("      {details}"));
            }
            for packet in next.packets.iter().filter(|p| !prev.packets.iter().any(|q| q.id == p.id)) {
                lines.push(format!(
                    "      {} {} -> {} {}",
                    packet.id,
                    packet.from,
                    packet.to,
                    packet.label.as_deref().unwrap_or_default()
                ));
            }
        }
    }

    if next.agent_selector_visible && !prev.agent_selector_visible {
        lines.push("      selecionando especialista...".to_string());
    }
    if let Some(agent) = next.selected_agent.filter(|a| prev.selected_agent != Some(*a)) {
        let name = AGENT_NAMES
            .get(usize::from(agent.get()))
            .copied()
            .unwrap_or("Agente");
        lines.push(format!("      especialista escolhido: {name}"));
    }

    if next.chat_history.len() > prev.chat_history.len() {
        for entry in &next.chat_history[prev.chat_history.len()..] {
            let who = match entry.role {
                ChatRole::User => "você",
                ChatRole::Ai => "mente",
            };
            lines.push(format!("<{who}> {}", entry.text));
        }
    }

    lines
}

/// Steps entered between two published states that neither state shows
fn skipped_steps(prev: &AnimationState, next: &AnimationState) -> std::ops::Range<usize> {
    match (prev.current_step, next.current_step) {
        (Some(p), Some(n)) if p < n => p + 1..n,
        (None, Some(n)) if next.simulating => 0..n,
        _ => 0..0,
    }
}

/// Whether the completion line for the current run has been written
///
/// Watch updates coalesce, so the `simulating` flag alone can miss a run
/// that started and finished between two observations.
pub(crate) fn run_finished(state: &AnimationState, transcript_start: usize, completion: &str) -> bool {
    state
        .chat_history
        .get(transcript_start..)
        .is_some_and(|entries| {
            entries
                .iter()
                .any(|e| e.role == ChatRole::Ai && e.text == completion)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vchain_core::{ChatEntry, Command, Effect, Engine};

    fn fire_first(engine: &mut Engine, effects: Vec<Effect>) -> Vec<Effect> {
        let timer = effects
            .into_iter()
            .find_map(|e| match e {
                Effect::Schedule(t) => Some(t),
                Effect::Cancel(_) => None,
            })
            .unwrap();
        engine.dispatch(Command::Fire(timer))
    }

    #[test]
    fn start_prints_beam_and_user_line() {
        let mut engine = Engine::builtin().with_seed(1);
        let before = engine.snapshot();
        engine.dispatch(Command::Start("Qual o lucro?".into()));
        let lines = describe_change(engine.catalog(), &before, engine.state());
        assert_eq!(
            lines,
            vec![
                ">> feixe de entrada disparado".to_string(),
                "<você> Qual o lucro?".to_string(),
            ]
        );
    }

    #[test]
    fn step_prints_header_and_new_packets() {
        let mut engine = Engine::builtin().with_seed(1);
        let beam = engine.dispatch(Command::Start("x".into()));
        let step0 = fire_first(&mut engine, beam);
        let before = engine.snapshot();
        fire_first(&mut engine, step0);

        let lines = describe_change(engine.catalog(), &before, engine.state());
        assert_eq!(lines[0], "[2/9] 2. UI -> AGENTES (1500 ms)");
        assert!(lines.iter().any(|l| l.contains("pkt-0 layer6 -> layer5 Raw Prompt")));
    }

    #[test]
    fn no_change_prints_nothing() {
        let engine = Engine::builtin();
        assert!(describe_change(engine.catalog(), engine.state(), engine.state()).is_empty());
    }

    #[test]
    fn coalesced_steps_still_get_headers() {
        let mut engine = Engine::builtin().with_seed(1);
        let beam = engine.dispatch(Command::Start("x".into()));
        let step0 = fire_first(&mut engine, beam);
        let before = engine.snapshot();
        let step1 = fire_first(&mut engine, step0);
        fire_first(&mut engine, step1);

        let headers: Vec<String> = describe_change(engine.catalog(), &before, engine.state())
            .into_iter()
            .filter(|l| l.starts_with('['))
            .collect();
        assert_eq!(
            headers,
            vec![
                "[2/9] 2. UI -> AGENTES (1500 ms)".to_string(),
                "[3/9] 3. SELEÇÃO DE ESPECIALISTA (3500 ms)".to_string(),
            ]
        );
    }

    #[test]
    fn finished_only_after_completion_line() {
        let mut state = Engine::builtin().snapshot();
        let start = state.chat_history.len();
        assert!(!run_finished(&state, start, "pronto"));

        state.chat_history.push(ChatEntry::user("pronto"));
        assert!(!run_finished(&state, start, "pronto"));

        state.chat_history.push(ChatEntry::ai("pronto"));
        assert!(run_finished(&state, start, "pronto"));
    }

    #[test]
    fn earlier_completion_does_not_end_a_new_run() {
        let mut state = Engine::builtin().snapshot();
        state.chat_history.push(ChatEntry::ai("pronto"));
        let start = state.chat_history.len();
        assert!(!run_finished(&state, start, "pronto"));
    }
}
