//! Animation state store
//!
//! Owns the single [`AnimationState`] value. The sequencer and the motion
//! updater mutate it through the crate-private entry points below; outside
//! callers get read access plus [`AnimationStore::select_node`].

use crate::types::{
    AgentIndex, AnimationState, ChatEntry, NodeId, Packet, PacketId, PacketSpawn, PACKET_COLOR,
};

#[derive(Debug, Clone)]
pub struct AnimationStore {
    state: AnimationState,
    next_packet_id: u64,
}

impl AnimationStore {
    /// Store seeded with the transcript greeting
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            state: AnimationState::new(greeting),
            next_packet_id: 0,
        }
    }

    /// Read access to the full state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    /// Owned copy of the state
    #[must_use]
    pub fn snapshot(&self) -> AnimationState {
        self.state.clone()
    }

    /// Set or clear the inspected node; valid at any time, including mid-run
    pub fn select_node(&mut self, id: Option<NodeId>) {
        self.state.active_node = id;
    }

    pub(crate) fn begin_run(&mut self, input: &str) {
        let s = &mut self.state;
        s.simulating = true;
        s.paused = false;
        s.input_message = input.to_string();
        s.chat_history.push(ChatEntry::user(input));
        s.packets.clear();
        s.beam_active = true;
        s.current_step = None;
        s.active_node = None;
        s.agent_selector_visible = false;
        s.selected_agent = None;
    }

    pub(crate) fn end_beam(&mut self) {
        self.state.beam_active = false;
    }

    pub(crate) fn finish_run(&mut self, completion: &str) {
        let s = &mut self.state;
        s.simulating = false;
        s.current_step = None;
        s.chat_history.push(ChatEntry::ai(completion));
    }

    pub(crate) fn show_agent_selector(&mut self, step: usize, focus: NodeId) {
        let s = &mut self.state;
        s.current_step = Some(step);
        s.agent_selector_visible = true;
        s.selected_agent = None;
        s.active_node = Some(focus);
    }

    pub(crate) fn reveal_agent(&mut self, agent: AgentIndex) {
        self.state.selected_agent = Some(agent);
    }

    /// Enter a regular step, spawning one packet per descriptor
    pub(crate) fn enter_step(&mut self, step: usize, focus: NodeId, spawns: &[PacketSpawn]) {
        self.state.agent_selector_visible = false;
        self.state.current_step = Some(step);
        self.state.active_node = Some(focus);
        for spawn in spawns {
            let id = self.allocate_packet_id();
            self.state.packets.push(Packet {
                id,
                from: spawn.from.clone(),
                to: spawn.to.clone(),
                progress: 0.0,
                label: Some(spawn.label.clone()),
                color: PACKET_COLOR.to_string(),
                complete: false,
            });
        }
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.state.paused = paused;
    }

    /// Back to idle defaults; the transcript and input text survive
    pub(crate) fn reset(&mut self) {
        let s = &mut self.state;
        s.simulating = false;
        s.paused = false;
        s.current_step = None;
        s.packets.clear();
        s.active_node = None;
        s.beam_active = false;
        s.agent_selector_visible = false;
        s.selected_agent = None;
    }

    pub(crate) fn packets_mut(&mut self) -> &mut Vec<Packet> {
        &mut self.state.packets
    }

    fn allocate_packet_id(&mut self) -> PacketId {
        let id = PacketId(self.next_packet_id);
        self.next_packet_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(from: &str, to: &str) -> PacketSpawn {
        PacketSpawn {
            from: from.into(),
            to: to.into(),
            label: format!("{from}->{to}"),
        }
    }

    #[test]
    fn packet_ids_stay_unique_across_resets() {
        let mut store = AnimationStore::new("hi");
        store.enter_step(0, "a".into(), &[spawn("a", "b"), spawn("b", "c")]);
        store.reset();
        store.enter_step(1, "c".into(), &[spawn("c", "d")]);
        let ids: Vec<_> = store.state().packets.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![PacketId(2)]);
    }

    #[test]
    fn begin_run_records_input_and_clears_packets() {
        let mut store = AnimationStore::new("hi");
        store.enter_step(0, "a".into(), &[spawn("a", "b")]);
        store.begin_run("Qual o lucro?");
        let s = store.state();
        assert!(s.simulating && s.beam_active);
        assert!(s.packets.is_empty());
        assert_eq!(s.input_message, "Qual o lucro?");
        assert_eq!(s.last_chat(), Some(&ChatEntry::user("Qual o lucro?")));
    }

    #[test]
    fn select_node_is_independent_of_run_state() {
        let mut store = AnimationStore::new("hi");
        store.select_node(Some("layer3".into()));
        assert_eq!(store.state().active_node, Some(NodeId::new("layer3")));
        store.begin_run("x");
        store.select_node(Some("layer1".into()));
        assert!(store.state().simulating);
        store.select_node(None);
        assert_eq!(store.state().active_node, None);
    }

    #[test]
    fn reset_keeps_transcript() {
        let mut store = AnimationStore::new("hi");
        store.begin_run("x");
        store.show_agent_selector(2, "layer5".into());
        store.reset();
        assert!(store.state().is_idle());
        assert_eq!(store.state().chat_history.len(), 2);
    }
}
