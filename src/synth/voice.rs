use std::sync::Arc;

use log::warn;

use crate::config::{EnvelopeShape, ToneConfig};
use crate::dsp::reverb::ImpulseResponse;
use crate::engine::scheduler::TaskId;
use crate::error::GraphError;
use crate::graph::{
    AudioGraph, ConvolverNode, FilterNode, GainNode, Node, NodeId, OscillatorNode,
};
use crate::notes::Note;

/// Monotonic voice identity. Distinguishes two voices that played the same
/// note at different times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Sounding,  // Started, envelope in attack/swell/sustain
    Releasing, // Stopped, release ramp running until cleanup
}

/// The graph nodes owned by one voice, in signal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceNodes {
    pub oscillator: NodeId,
    pub filter: NodeId,
    pub envelope: NodeId,
    pub reverb: NodeId,
}

impl VoiceNodes {
    pub fn all(&self) -> [NodeId; 4] {
        [self.oscillator, self.filter, self.envelope, self.reverb]
    }
}

/// The nodes of a voice before they join a graph.
///
/// Building them allocates render buffers, seeds the oscillator and runs the
/// reverb's partition FFTs. None of that needs the graph, so it happens
/// before the lock the audio thread renders under is taken.
pub struct VoiceParts {
    note: Note,
    envelope_shape: EnvelopeShape,
    cutoff_hz: f32,
    oscillator: OscillatorNode,
    filter: FilterNode,
    envelope: GainNode,
    reverb: ConvolverNode,
}

impl VoiceParts {
    pub fn new(config: &ToneConfig, note: Note, impulse: Arc<ImpulseResponse>) -> Self {
        Self {
            note,
            envelope_shape: config.envelope,
            cutoff_hz: config.filter_cutoff_hz,
            oscillator: OscillatorNode::new(config.waveform, note.frequency),
            filter: FilterNode::lowpass(config.filter_cutoff_hz),
            envelope: GainNode::new(0.0),
            reverb: ConvolverNode::new(impulse),
        }
    }

    /// Schedule the voice to begin at `now`, then add and wire its nodes:
    /// oscillator → filter → envelope → reverb → destination.
    ///
    /// Only cheap graph edits happen here. Nothing is left behind on error.
    pub fn install(mut self, graph: &mut AudioGraph, now: f64) -> Result<VoiceNodes, GraphError> {
        let env = self.envelope_shape;
        self.oscillator
            .frequency_mut()
            .set_value_at_time(self.note.frequency, now);
        self.filter
            .frequency_mut()
            .set_value_at_time(self.cutoff_hz, now);
        self.envelope
            .gain_mut()
            .set_value_at_time(0.0, now)
            .linear_ramp_to_value_at_time(env.peak, now + env.attack)
            .linear_ramp_to_value_at_time(env.sustain, now + env.attack + env.decay);

        let nodes = VoiceNodes {
            oscillator: graph.add(Node::Oscillator(self.oscillator)),
            filter: graph.add(Node::Filter(self.filter)),
            envelope: graph.add(Node::Gain(self.envelope)),
            reverb: graph.add(Node::Convolver(self.reverb)),
        };

        if let Err(err) = wire(graph, nodes, now) {
            release_partial(graph, &nodes.all());
            return Err(err);
        }
        Ok(nodes)
    }
}

fn wire(graph: &mut AudioGraph, nodes: VoiceNodes, now: f64) -> Result<(), GraphError> {
    let destination = graph.destination();
    graph.connect(nodes.oscillator, nodes.filter)?;
    graph.connect(nodes.filter, nodes.envelope)?;
    graph.connect(nodes.envelope, nodes.reverb)?;
    graph.connect(nodes.reverb, destination)?;
    graph.start_oscillator(nodes.oscillator, now)
}

/// One sounding note and everything it allocated in the graph.
///
/// A voice is consumed by [`Voice::teardown`], so its nodes can only ever be
/// released once.
#[derive(Debug)]
pub struct Voice {
    id: VoiceId,
    note: Note,
    nodes: VoiceNodes,
    stop_time: Option<f64>,
    cleanup: Option<TaskId>,
}

impl Voice {
    pub(crate) fn new(id: VoiceId, note: Note, nodes: VoiceNodes) -> Self {
        Self {
            id,
            note,
            nodes,
            stop_time: None,
            cleanup: None,
        }
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn note(&self) -> Note {
        self.note
    }

    pub fn nodes(&self) -> VoiceNodes {
        self.nodes
    }

    /// Absolute audio-clock time the oscillator halts, once stop was requested.
    pub fn stop_time(&self) -> Option<f64> {
        self.stop_time
    }

    pub fn cleanup_task(&self) -> Option<TaskId> {
        self.cleanup
    }

    pub fn state(&self) -> VoiceState {
        match self.stop_time {
            None => VoiceState::Sounding,
            Some(_) => VoiceState::Releasing,
        }
    }

    pub fn is_releasing(&self) -> bool {
        self.state() == VoiceState::Releasing
    }

    /// Record the stop. Returns false (and changes nothing) if one was
    /// already recorded.
    pub(crate) fn mark_stopped(&mut self, stop_time: f64, cleanup: TaskId) -> bool {
        if self.stop_time.is_some() {
            return false;
        }
        self.stop_time = Some(stop_time);
        self.cleanup = Some(cleanup);
        true
    }

    /// Disconnect and free every node this voice owns.
    pub fn teardown(self, graph: &mut AudioGraph) {
        for node in self.nodes.all() {
            if let Err(err) = graph.disconnect(node) {
                warn!("voice {} ({}): {err}", self.id.0, self.note.name);
            }
            if let Err(err) = graph.remove(node) {
                warn!("voice {} ({}): {err}", self.id.0, self.note.name);
            }
        }
    }
}

/// Release nodes allocated for a voice that never finished construction.
fn release_partial(graph: &mut AudioGraph, nodes: &[NodeId]) {
    for &node in nodes {
        // Nodes that were never added are simply absent
        let _ = graph.remove(node);
    }
}
