//! Per-frame packet motion

use crate::store::AnimationStore;

/// Packets at or below this progress are still in flight
pub const ARRIVAL_PROGRESS: f64 = 100.0;

/// Advances every live packet by a fixed increment per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketMotion {
    step: f64,
}

impl PacketMotion {
    pub fn new(step: f64) -> Self {
        Self { step }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Apply one frame. Returns whether the state changed.
    ///
    /// Paused stores and stores without packets are left untouched. Packets
    /// that pass [`ARRIVAL_PROGRESS`] are dropped from the live set.
    pub fn tick(&self, store: &mut AnimationStore) -> bool {
        if store.state().paused || store.state().packets.is_empty() {
            return false;
        }
        let packets = store.packets_mut();
        for packet in packets.iter_mut() {
            packet.progress += self.step;
        }
        let before = packets.len();
        packets.retain(|p| p.progress <= ARRIVAL_PROGRESS);
        if packets.len() != before {
            tracing::trace!(arrived = before - packets.len(), "packets delivered");
        }
        true
    }
}

impl Default for PacketMotion {
    fn default() -> Self {
        Self::new(2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PacketSpawn;

    fn store_with_packet() -> AnimationStore {
        let mut store = AnimationStore::new("hi");
        store.enter_step(
            1,
            "layer5".into(),
            &[PacketSpawn {
                from: "layer6".into(),
                to: "layer5".into(),
                label: "Raw Prompt".into(),
            }],
        );
        store
    }

    #[test]
    fn empty_store_is_untouched() {
        let mut store = AnimationStore::new("hi");
        let before = store.snapshot();
        assert!(!PacketMotion::default().tick(&mut store));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn paused_store_freezes_packets() {
        let mut store = store_with_packet();
        store.set_paused(true);
        assert!(!PacketMotion::default().tick(&mut store));
        assert_eq!(store.state().packets[0].progress, 0.0);
    }

    #[test]
    fn packet_is_removed_once_past_arrival() {
        let mut store = store_with_packet();
        let motion = PacketMotion::default();
        // 0 -> 100 takes 50 frames and the packet is still live at exactly 100.
        for _ in 0..50 {
            assert!(motion.tick(&mut store));
        }
        assert_eq!(store.state().packets[0].progress, 100.0);
        motion.tick(&mut store);
        assert!(store.state().packets.is_empty());
    }
}
