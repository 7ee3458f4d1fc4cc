use pretty_assertions::assert_eq;
use std::time::Duration;
use vchain_core::{ChatEntry, Cue, NodeId, TimerSlot, DEFAULT_COMPLETION, DEFAULT_GREETING};
use vchain_test_utils::{seeded_driver, tiny_driver, RecordingCues};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_worked_example_reaches_agent_reveal() {
    let mut driver = seeded_driver(11);
    driver.start("Qual o lucro?");

    let state = driver.state();
    assert_eq!(
        state.chat_history,
        vec![ChatEntry::ai(DEFAULT_GREETING), ChatEntry::user("Qual o lucro?")]
    );
    assert_eq!(state.input_message, "Qual o lucro?");
    assert!(state.beam_active);

    // Beam lands at 1000 ms: step 0 at the surface, no packets
    driver.advance(ms(1000));
    assert_eq!(driver.state().current_step, Some(0));
    assert_eq!(driver.state().active_node, Some(NodeId::new("layer6")));
    assert!(driver.state().packets.is_empty());

    // Step 1 at 2500 ms: one packet layer6 -> layer5
    driver.advance(ms(1500));
    let state = driver.state();
    assert_eq!(state.current_step, Some(1));
    assert_eq!(state.packets.len(), 1);
    assert_eq!(state.packets[0].from, "layer6");
    assert_eq!(state.packets[0].to, "layer5");
    assert!(state.is_edge_active(&NodeId::new("layer6"), &NodeId::new("layer5")));

    // Step 2 at 4000 ms: picker shown, nothing chosen yet
    driver.advance(ms(1500));
    assert_eq!(driver.state().current_step, Some(2));
    assert!(driver.state().agent_selector_visible);
    assert_eq!(driver.state().selected_agent, None);

    // Reveal 1500 ms later
    driver.advance(ms(1500));
    let agent = driver.state().selected_agent.unwrap();
    assert!(agent.get() < 3);
    assert_eq!(driver.state().current_step, Some(2));

    // Step 3 at 7500 ms hides the picker
    driver.advance(ms(2000));
    assert_eq!(driver.state().current_step, Some(3));
    assert!(!driver.state().agent_selector_visible);
}

#[test]
fn test_full_run_completes_with_completion_line() {
    let mut driver = seeded_driver(2);
    driver.start("Qual o lucro?");
    driver.advance(ms(18_999));
    assert!(driver.state().simulating);
    assert_eq!(driver.state().current_step, Some(8));

    driver.advance(ms(1));
    let state = driver.state();
    assert!(!state.simulating);
    assert_eq!(state.current_step, None);
    assert_eq!(state.last_chat(), Some(&ChatEntry::ai(DEFAULT_COMPLETION)));
    assert_eq!(driver.pending(TimerSlot::Advance), 0);
}

#[test]
fn test_packets_arrive_and_disappear() {
    let mut driver = seeded_driver(2);
    driver.start("x");
    driver.advance(ms(2500));
    assert_eq!(driver.state().packets.len(), 1);

    // 50 frames to reach 100, the 51st removes it
    driver.advance(ms(16 * 50));
    assert_eq!(driver.state().packets[0].progress, 100.0);
    driver.advance(ms(16));
    assert!(driver.state().packets.is_empty());
}

#[test]
fn test_pause_freezes_packets_and_step() {
    let mut driver = seeded_driver(2);
    driver.start("x");
    driver.advance(ms(2600));
    driver.toggle_pause();
    let frozen = driver.state().packets.clone();
    assert_eq!(driver.pending(TimerSlot::Advance), 0);

    driver.advance(ms(10_000));
    assert_eq!(driver.state().packets, frozen);
    assert_eq!(driver.state().current_step, Some(1));

    driver.toggle_pause();
    assert_eq!(driver.state().current_step, Some(2));
    assert_eq!(driver.pending(TimerSlot::Advance), 1);
}

#[test]
fn test_pause_during_picker_still_reveals() {
    let mut driver = seeded_driver(4);
    driver.start("x");
    driver.advance(ms(4100));
    driver.toggle_pause();
    assert_eq!(driver.pending(TimerSlot::Reveal), 1);

    driver.advance(ms(2000));
    assert!(driver.state().selected_agent.is_some());
    assert_eq!(driver.state().current_step, Some(2));
}

#[test]
fn test_reset_at_any_point_yields_idle() {
    for at in [0, 500, 1000, 2600, 4100, 6000, 12_000, 18_999, 25_000] {
        let mut driver = seeded_driver(at);
        driver.start("Qual o lucro?");
        driver.advance(ms(at));
        driver.reset();

        assert!(driver.state().is_idle(), "reset at {at} ms");
        assert_eq!(driver.pending_total(), 0, "timers left after reset at {at} ms");
        assert_eq!(driver.state().selected_agent, None);

        let transcript = driver.state().chat_history.clone();
        driver.advance(ms(30_000));
        assert!(driver.state().is_idle(), "late timer fired after reset at {at} ms");
        assert_eq!(driver.state().chat_history, transcript);
    }
}

#[test]
fn test_restart_after_completion() {
    let mut driver = seeded_driver(8);
    driver.start("um");
    driver.run_until_idle(Duration::from_secs(60)).unwrap();
    driver.start("dois");
    assert!(driver.state().simulating);
    assert_eq!(driver.state().last_chat(), Some(&ChatEntry::user("dois")));
    assert_eq!(driver.state().selected_agent, None);
}

#[test]
fn test_tiny_catalog_plays_cues() {
    let cues = RecordingCues::new();
    let mut driver = tiny_driver(1, cues.clone());
    driver.start("oi");
    let elapsed = driver.run_until_idle(Duration::from_secs(10)).unwrap();
    assert!(elapsed >= ms(3100));

    assert_eq!(cues.count(Cue::Beam), 1);
    assert_eq!(cues.count(Cue::Blip), 3);
    // One for the reveal, one for completion
    assert_eq!(cues.count(Cue::Success), 2);
    assert_eq!(cues.played().first(), Some(&Cue::Beam));
}

#[test]
fn test_failing_cues_do_not_disturb_the_run() {
    let cues = RecordingCues::failing();
    let mut driver = tiny_driver(1, cues.clone());
    driver.start("oi");
    driver.run_until_idle(Duration::from_secs(10)).unwrap();
    assert_eq!(driver.state().last_chat(), Some(&ChatEntry::ai(DEFAULT_COMPLETION)));
    assert!(!cues.played().is_empty());
}

#[test]
fn test_node_selection_mid_run_is_overwritten_by_next_step() {
    let mut driver = seeded_driver(3);
    driver.start("x");
    driver.advance(ms(1100));
    driver.dispatch(vchain_core::Command::SelectNode(Some(NodeId::new("sub_rag"))));
    assert_eq!(driver.state().active_node, Some(NodeId::new("sub_rag")));

    driver.advance(ms(1500));
    assert_eq!(driver.state().active_node, Some(NodeId::new("layer5")));
}
