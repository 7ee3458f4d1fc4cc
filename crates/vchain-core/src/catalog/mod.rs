//! Static diagram and timeline tables
//!
//! A [`Catalog`] is validated once at load time: every node a step or a
//! connection refers to must exist, so the sequencer never meets an unknown
//! node mid-run.

mod builtin;

use crate::error::CatalogError;
use crate::types::{AnimationState, Layer, NodeId, TimelineStep};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Serialized form of a catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub layers: Vec<Layer>,
    pub timeline: Vec<TimelineStep>,
}

/// Validated, immutable node set and timeline
#[derive(Debug, Clone)]
pub struct Catalog {
    layers: Vec<Layer>,
    timeline: Vec<TimelineStep>,
    index: HashMap<NodeId, usize>,
    graph: DiGraphMap<usize, ()>,
}

impl Catalog {
    /// Validate and build a catalog
    ///
    /// # Errors
    /// Returns the first [`CatalogError`] found: duplicate ids, dangling
    /// connections, unknown step nodes or packet endpoints, steps without
    /// active nodes, or an empty timeline.
    pub fn new(layers: Vec<Layer>, timeline: Vec<TimelineStep>) -> Result<Self, CatalogError> {
        Self::validate(&layers, &timeline)?;
        let catalog = Self::assemble(layers, timeline);
        tracing::debug!(
            nodes = catalog.layers.len(),
            edges = catalog.graph.edge_count(),
            steps = catalog.timeline.len(),
            "catalog validated"
        );
        Ok(catalog)
    }

    /// The built-in value-chain diagram and its nine-step script
    ///
    /// Assembled without validation; [`Catalog::try_builtin`] checks the same tables.
    #[must_use]
    pub fn builtin() -> Self {
        Self::assemble(builtin::layers(), builtin::timeline())
    }

    /// The built-in tables, validated like any loaded catalog
    ///
    /// # Errors
    /// Any [`CatalogError`] the tables raise.
    pub fn try_builtin() -> Result<Self, CatalogError> {
        Self::new(builtin::layers(), builtin::timeline())
    }

    fn validate(layers: &[Layer], timeline: &[TimelineStep]) -> Result<(), CatalogError> {
        let mut ids = HashSet::with_capacity(layers.len());
        for layer in layers {
            if !ids.insert(&layer.id) {
                return Err(CatalogError::DuplicateNode(layer.id.clone()));
            }
        }
        for layer in layers {
            if let Some(to) = layer.connections.iter().find(|to| !ids.contains(to)) {
                return Err(CatalogError::UnknownConnection {
                    from: layer.id.clone(),
                    to: to.clone(),
                });
            }
        }

        if timeline.is_empty() {
            return Err(CatalogError::EmptyTimeline);
        }
        for (step_index, step) in timeline.iter().enumerate() {
            if step.active_nodes.is_empty() {
                return Err(CatalogError::EmptyActiveNodes { step: step_index });
            }
            if let Some(node) = step.active_nodes.iter().find(|n| !ids.contains(n)) {
                return Err(CatalogError::UnknownStepNode {
                    step: step_index,
                    node: node.clone(),
                });
            }
            for spawn in &step.packets {
                for endpoint in [&spawn.from, &spawn.to] {
                    if !ids.contains(endpoint) {
                        return Err(CatalogError::UnknownPacketEndpoint {
                            step: step_index,
                            node: endpoint.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Index the nodes and build the connection graph; unknown targets are skipped
    fn assemble(layers: Vec<Layer>, timeline: Vec<TimelineStep>) -> Self {
        let mut index = HashMap::with_capacity(layers.len());
        for (i, layer) in layers.iter().enumerate() {
            index.entry(layer.id.clone()).or_insert(i);
        }

        let mut graph = DiGraphMap::new();
        for i in 0..layers.len() {
            graph.add_node(i);
        }
        for (i, layer) in layers.iter().enumerate() {
            for j in layer.connections.iter().filter_map(|to| index.get(to)) {
                graph.add_edge(i, *j, ());
            }
        }

        Self {
            layers,
            timeline,
            index,
            graph,
        }
    }

    /// Decode and validate a JSON catalog document
    ///
    /// # Errors
    /// [`CatalogError::Decode`] for malformed JSON, otherwise any validation error.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument =
            serde_json::from_str(json).map_err(|e| CatalogError::Decode(e.to_string()))?;
        Self::new(doc.layers, doc.timeline)
    }

    /// Serializable copy of the tables
    #[must_use]
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            layers: self.layers.clone(),
            timeline: self.timeline.clone(),
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn timeline(&self) -> &[TimelineStep] {
        &self.timeline
    }

    /// Number of timeline steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    /// Always false for a validated catalog
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&TimelineStep> {
        self.timeline.get(index)
    }

    pub fn layer(&self, id: &NodeId) -> Option<&Layer> {
        self.index.get(id).map(|&i| &self.layers[i])
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Total scripted time, excluding the entry beam
    #[must_use]
    pub fn total_duration(&self) -> std::time::Duration {
        self.timeline.iter().map(TimelineStep::duration).sum()
    }

    /// Whether the diagram draws an edge `from -> to`
    #[must_use]
    pub fn has_edge(&self, from: &NodeId, to: &NodeId) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Ids of the nodes `id` connects to
    #[must_use]
    pub fn outgoing(&self, id: &NodeId) -> Vec<&NodeId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Ids of the nodes connecting to `id`
    #[must_use]
    pub fn incoming(&self, id: &NodeId) -> Vec<&NodeId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &NodeId, dir: Direction) -> Vec<&NodeId> {
        let Some(&i) = self.index.get(id) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(i, dir)
            .map(|j| &self.layers[j].id)
            .collect()
    }

    /// All diagram edges as `(from, to)` pairs
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId)> + '_ {
        self.graph
            .all_edges()
            .map(|(a, b, _)| (&self.layers[a].id, &self.layers[b].id))
    }

    /// True when the step currently shown lists `id` among its active nodes
    #[must_use]
    pub fn is_node_lit(&self, state: &AnimationState, id: &NodeId) -> bool {
        state
            .current_step
            .and_then(|i| self.step(i))
            .is_some_and(|step| step.active_nodes.contains(id))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PacketSpawn, StepKind};

    #[test]
    fn builtin_tables_validate() {
        let catalog = Catalog::try_builtin().unwrap();
        assert_eq!(catalog.layers().len(), 8);
        assert_eq!(catalog.len(), 9);
        assert_eq!(catalog.total_duration().as_millis(), 18_000);
    }

    #[test]
    fn builtin_matches_validated_tables() {
        let checked = Catalog::try_builtin().unwrap();
        let builtin = Catalog::builtin();
        assert_eq!(builtin.layers(), checked.layers());
        assert_eq!(builtin.timeline(), checked.timeline());
        assert_eq!(builtin.edges().count(), checked.edges().count());
        for layer in checked.layers() {
            assert_eq!(builtin.outgoing(&layer.id), checked.outgoing(&layer.id));
        }
    }

    #[test]
    fn builtin_graph_edges() {
        let catalog = Catalog::builtin();
        assert!(catalog.has_edge(&"layer6".into(), &"layer5".into()));
        assert!(!catalog.has_edge(&"layer5".into(), &"layer6".into()));
        let mut out: Vec<_> = catalog
            .outgoing(&"sub_router".into())
            .into_iter()
            .map(|n| n.as_str().to_string())
            .collect();
        out.sort();
        assert_eq!(out, vec!["layer3", "sub_rag"]);
        assert_eq!(catalog.edges().count(), 9);
    }

    #[test]
    fn rejects_unknown_step_node() {
        let mut timeline = builtin::timeline();
        timeline[4].active_nodes.push(NodeId::new("layer4"));
        let err = Catalog::new(builtin::layers(), timeline).unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnknownStepNode {
                step: 4,
                node: NodeId::new("layer4")
            }
        );
    }

    #[test]
    fn rejects_unknown_packet_endpoint() {
        let mut timeline = builtin::timeline();
        timeline[1].packets.push(PacketSpawn {
            from: "layer6".into(),
            to: "nowhere".into(),
            label: "x".into(),
        });
        assert!(matches!(
            Catalog::new(builtin::layers(), timeline),
            Err(CatalogError::UnknownPacketEndpoint { step: 1, .. })
        ));
    }

    #[test]
    fn rejects_dangling_connection_and_duplicates() {
        let mut layers = builtin::layers();
        layers[0].connections.push("ghost".into());
        assert!(matches!(
            Catalog::new(layers, builtin::timeline()),
            Err(CatalogError::UnknownConnection { .. })
        ));

        let mut layers = builtin::layers();
        let copy = layers[0].clone();
        layers.push(copy);
        assert_eq!(
            Catalog::new(layers, builtin::timeline()).unwrap_err(),
            CatalogError::DuplicateNode("layer1".into())
        );
    }

    #[test]
    fn rejects_empty_timeline_and_empty_steps() {
        assert_eq!(
            Catalog::new(builtin::layers(), Vec::new()).unwrap_err(),
            CatalogError::EmptyTimeline
        );
        let mut timeline = builtin::timeline();
        timeline[2].active_nodes.clear();
        assert_eq!(
            Catalog::new(builtin::layers(), timeline).unwrap_err(),
            CatalogError::EmptyActiveNodes { step: 2 }
        );
    }

    #[test]
    fn json_document_round_trips_through_validation() {
        let json = serde_json::to_string(&Catalog::builtin().to_document()).unwrap();
        let catalog = Catalog::from_json(&json).unwrap();
        assert_eq!(catalog.step(2).unwrap().kind, StepKind::AgentSelection);
        assert!(matches!(
            Catalog::from_json("{\"layers\": 3}"),
            Err(CatalogError::Decode(_))
        ));
    }

    #[test]
    fn lit_nodes_follow_current_step() {
        let catalog = Catalog::builtin();
        let mut state = AnimationState::new("hi");
        assert!(!catalog.is_node_lit(&state, &"layer6".into()));
        state.current_step = Some(6);
        assert!(catalog.is_node_lit(&state, &"layer1".into()));
        assert!(!catalog.is_node_lit(&state, &"layer6".into()));
    }
}
