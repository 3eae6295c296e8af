use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use slotmap::SlotMap;

use crate::dsp::oscillator::OscillatorWaveform;
use crate::error::GraphError;
use crate::graph::convolver::ConvolverNode;
use crate::graph::filter::FilterNode;
use crate::graph::gain::GainNode;
use crate::graph::node::{GraphNode, RenderCtx, StereoBlock};
use crate::graph::oscillator::OscillatorNode;
use crate::graph::NodeId;
use crate::MAX_BLOCK_SIZE;

/*
Audio Graph
===========

Nodes live in a slot map and are wired by directed edges. Every graph owns a
single destination node; anything not upstream of it is never rendered.

  [osc] ──→ [filter] ──→ [gain] ──→ [convolver] ──→ (destination)
  [osc] ──→ [filter] ──→ [gain] ──→ [convolver] ──↗

Rendering walks the nodes upstream of the destination in topological order.
Each node receives the sum of its inputs' output blocks and writes its own.
The order is cached and rebuilt only after the topology changes.

The audio clock is the number of frames rendered so far divided by the sample
rate. All scheduling (oscillator start/stop, parameter automation, deferred
cleanup) is expressed in this clock, so offline rendering and a live device
behave identically.
*/

/// Every node type the graph can hold.
pub enum Node {
    Oscillator(OscillatorNode),
    Gain(GainNode),
    Filter(FilterNode),
    Convolver(ConvolverNode),
    Destination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Oscillator,
    Gain,
    Filter,
    Convolver,
    Destination,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Oscillator(_) => NodeKind::Oscillator,
            Node::Gain(_) => NodeKind::Gain,
            Node::Filter(_) => NodeKind::Filter,
            Node::Convolver(_) => NodeKind::Convolver,
            Node::Destination => NodeKind::Destination,
        }
    }
}

impl GraphNode for Node {
    fn process(&mut self, input: &StereoBlock, output: &mut StereoBlock, ctx: &RenderCtx) {
        match self {
            Node::Oscillator(node) => node.process(input, output, ctx),
            Node::Gain(node) => node.process(input, output, ctx),
            Node::Filter(node) => node.process(input, output, ctx),
            Node::Convolver(node) => node.process(input, output, ctx),
            Node::Destination => output.copy_from(input, ctx.frames),
        }
    }
}

struct NodeSlot {
    node: Node,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    buffer: StereoBlock,
}

impl NodeSlot {
    fn new(node: Node) -> Self {
        Self {
            node,
            inputs: Vec::new(),
            outputs: Vec::new(),
            buffer: StereoBlock::default(),
        }
    }
}

pub struct AudioGraph {
    sample_rate: f32,
    frames_rendered: u64,
    nodes: SlotMap<NodeId, NodeSlot>,
    destination: NodeId,
    order: Vec<NodeId>,
    order_dirty: bool,
    mix: StereoBlock,
}

impl AudioGraph {
    pub fn new(sample_rate: f32) -> Self {
        let mut nodes = SlotMap::with_key();
        let destination = nodes.insert(NodeSlot::new(Node::Destination));

        Self {
            sample_rate,
            frames_rendered: 0,
            nodes,
            destination,
            order: Vec::new(),
            order_dirty: true,
            mix: StereoBlock::default(),
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Audio clock time in seconds.
    pub fn current_time(&self) -> f64 {
        self.frame_time(self.frames_rendered)
    }

    /// Clock time of `frame`, in seconds.
    pub fn frame_time(&self, frame: u64) -> f64 {
        frame as f64 / self.sample_rate as f64
    }

    /// Whole frames spanned by `seconds`, rounded to the nearest frame.
    pub fn frames_for(&self, seconds: f64) -> u64 {
        (seconds * self.sample_rate as f64).round().max(0.0) as u64
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// Number of nodes, including the destination.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id).map(|slot| slot.node.kind())
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        self.nodes.insert(NodeSlot::new(node))
    }

    pub fn add_oscillator(&mut self, waveform: OscillatorWaveform, frequency: f32) -> NodeId {
        self.add(Node::Oscillator(OscillatorNode::new(waveform, frequency)))
    }

    pub fn add_gain(&mut self, gain: f32) -> NodeId {
        self.add(Node::Gain(GainNode::new(gain)))
    }

    fn slot(&self, id: NodeId) -> Result<&NodeSlot, GraphError> {
        self.nodes.get(id).ok_or(GraphError::UnknownNode(id))
    }

    fn slot_mut(&mut self, id: NodeId) -> Result<&mut NodeSlot, GraphError> {
        self.nodes.get_mut(id).ok_or(GraphError::UnknownNode(id))
    }

    pub fn oscillator(&self, id: NodeId) -> Result<&OscillatorNode, GraphError> {
        match &self.slot(id)?.node {
            Node::Oscillator(node) => Ok(node),
            _ => Err(GraphError::WrongKind(id)),
        }
    }

    pub fn oscillator_mut(&mut self, id: NodeId) -> Result<&mut OscillatorNode, GraphError> {
        match &mut self.slot_mut(id)?.node {
            Node::Oscillator(node) => Ok(node),
            _ => Err(GraphError::WrongKind(id)),
        }
    }

    pub fn gain(&self, id: NodeId) -> Result<&GainNode, GraphError> {
        match &self.slot(id)?.node {
            Node::Gain(node) => Ok(node),
            _ => Err(GraphError::WrongKind(id)),
        }
    }

    pub fn gain_mut(&mut self, id: NodeId) -> Result<&mut GainNode, GraphError> {
        match &mut self.slot_mut(id)?.node {
            Node::Gain(node) => Ok(node),
            _ => Err(GraphError::WrongKind(id)),
        }
    }

    pub fn filter(&self, id: NodeId) -> Result<&FilterNode, GraphError> {
        match &self.slot(id)?.node {
            Node::Filter(node) => Ok(node),
            _ => Err(GraphError::WrongKind(id)),
        }
    }

    pub fn filter_mut(&mut self, id: NodeId) -> Result<&mut FilterNode, GraphError> {
        match &mut self.slot_mut(id)?.node {
            Node::Filter(node) => Ok(node),
            _ => Err(GraphError::WrongKind(id)),
        }
    }

    pub fn convolver(&self, id: NodeId) -> Result<&ConvolverNode, GraphError> {
        match &self.slot(id)?.node {
            Node::Convolver(node) => Ok(node),
            _ => Err(GraphError::WrongKind(id)),
        }
    }

    /// Schedule an oscillator to begin at `when` on the audio clock.
    pub fn start_oscillator(&mut self, id: NodeId, when: f64) -> Result<(), GraphError> {
        if self.oscillator_mut(id)?.start(when) {
            Ok(())
        } else {
            Err(GraphError::AlreadyStarted(id))
        }
    }

    /// Schedule an oscillator to end at `when` on the audio clock.
    pub fn stop_oscillator(&mut self, id: NodeId, when: f64) -> Result<(), GraphError> {
        if self.oscillator_mut(id)?.stop(when) {
            Ok(())
        } else {
            Err(GraphError::NotStarted(id))
        }
    }

    /// Route the output of `from` into `to`. Connecting twice is a no-op.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.slot(to)?;
        if self.slot(from)?.node.kind() == NodeKind::Destination {
            return Err(GraphError::DestinationHasNoOutput);
        }
        if self.nodes[from].outputs.contains(&to) {
            return Ok(());
        }
        if from == to || self.reaches(to, from) {
            return Err(GraphError::Cycle { from, to });
        }

        self.nodes[from].outputs.push(to);
        self.nodes[to].inputs.push(from);
        self.order_dirty = true;
        Ok(())
    }

    /// Remove every outgoing connection from `id`.
    pub fn disconnect(&mut self, id: NodeId) -> Result<(), GraphError> {
        let outputs = std::mem::take(&mut self.slot_mut(id)?.outputs);
        for out in outputs {
            if let Some(slot) = self.nodes.get_mut(out) {
                slot.inputs.retain(|&input| input != id);
            }
        }
        self.order_dirty = true;
        Ok(())
    }

    /// True while `id` exists and feeds at least one other node.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|slot| !slot.outputs.is_empty())
    }

    pub fn inputs(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |slot| slot.inputs.as_slice())
    }

    pub fn outputs(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |slot| slot.outputs.as_slice())
    }

    /// Detach `id` from both sides and drop it from the graph.
    pub fn remove(&mut self, id: NodeId) -> Result<Node, GraphError> {
        if id == self.destination {
            return Err(GraphError::CannotRemoveDestination);
        }
        let slot = self.nodes.remove(id).ok_or(GraphError::UnknownNode(id))?;

        for out in &slot.outputs {
            if let Some(target) = self.nodes.get_mut(*out) {
                target.inputs.retain(|&input| input != id);
            }
        }
        for input in &slot.inputs {
            if let Some(source) = self.nodes.get_mut(*input) {
                source.outputs.retain(|&output| output != id);
            }
        }
        self.order_dirty = true;
        Ok(slot.node)
    }

    /// Whether `target` is downstream of (or equal to) `from`.
    fn reaches(&self, from: NodeId, target: NodeId) -> bool {
        let mut stack = vec![from];
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if seen.insert(id) {
                stack.extend(self.outputs(id).iter().copied());
            }
        }
        false
    }

    fn rebuild_order(&mut self) {
        self.order.clear();
        let mut visited = HashSet::new();
        // (node, inputs already pushed)
        let mut stack = vec![(self.destination, false)];

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                self.order.push(id);
                continue;
            }
            if !visited.insert(id) {
                continue;
            }
            stack.push((id, true));
            for &input in &self.nodes[id].inputs {
                if !visited.contains(&input) {
                    stack.push((input, false));
                }
            }
        }
        self.order_dirty = false;
    }

    /// Nodes rendered each block, sources first and the destination last.
    pub fn render_order(&mut self) -> &[NodeId] {
        if self.order_dirty {
            self.rebuild_order();
        }
        &self.order
    }

    /// Render one block of up to `MAX_BLOCK_SIZE` frames and advance the clock.
    pub fn render_block(&mut self, frames: usize) -> &StereoBlock {
        let frames = frames.min(MAX_BLOCK_SIZE);
        if self.order_dirty {
            self.rebuild_order();
        }

        let ctx = RenderCtx::new(self.sample_rate, self.current_time(), frames);
        let Self {
            nodes, order, mix, ..
        } = self;

        for &id in order.iter() {
            mix.clear(frames);
            for &input in &nodes[id].inputs {
                mix.accumulate(&nodes[input].buffer, frames);
            }
            let slot = &mut nodes[id];
            slot.node.process(mix, &mut slot.buffer, &ctx);
        }

        self.frames_rendered += frames as u64;
        &self.nodes[self.destination].buffer
    }

    /// Fill an interleaved device buffer. Mono devices get the average of
    /// both channels; channels past the second are silent.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }

        for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
            let frames = chunk.len() / channels;
            let block = self.render_block(frames);

            for (i, frame) in chunk.chunks_exact_mut(channels).enumerate() {
                let (l, r) = (block.left[i], block.right[i]);
                match frame {
                    [mono] => *mono = 0.5 * (l + r),
                    [left, right, rest @ ..] => {
                        *left = l;
                        *right = r;
                        rest.fill(0.0);
                    }
                    [] => {}
                }
            }
        }
    }

    /// Render `seconds` of audio into a new stereo buffer.
    pub fn render_offline(&mut self, seconds: f64) -> StereoBuffer {
        let frames = self.frames_for(seconds);
        self.render_frames(frames as usize)
    }

    /// Render exactly `total` frames into a new stereo buffer.
    pub fn render_frames(&mut self, total: usize) -> StereoBuffer {
        let mut buffer = StereoBuffer::with_capacity(total);

        let mut remaining = total;
        while remaining > 0 {
            let frames = remaining.min(MAX_BLOCK_SIZE);
            let block = self.render_block(frames);
            buffer.left.extend_from_slice(&block.left[..frames]);
            buffer.right.extend_from_slice(&block.right[..frames]);
            remaining -= frames;
        }
        buffer
    }
}

/// Rendered stereo audio of arbitrary length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoBuffer {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl StereoBuffer {
    pub fn with_capacity(frames: usize) -> Self {
        Self {
            left: Vec::with_capacity(frames),
            right: Vec::with_capacity(frames),
        }
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn peak(&self) -> f32 {
        self.left
            .iter()
            .chain(&self.right)
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    /// RMS over both channels for frames in `range`.
    pub fn rms(&self, range: std::ops::Range<usize>) -> f32 {
        let range = range.start.min(self.len())..range.end.min(self.len());
        if range.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.left[range.clone()]
            .iter()
            .chain(&self.right[range.clone()])
            .map(|x| x * x)
            .sum();
        (sum / (2 * range.len()) as f32).sqrt()
    }
}

/// Shared handle to an audio graph.
///
/// The control thread and the audio callback each hold a clone. Every
/// operation takes the lock for its whole duration, so a batch of graph edits
/// made inside one [`AudioContext::with_graph`] call is never observed half
/// done by the renderer.
#[derive(Clone)]
pub struct AudioContext {
    graph: Arc<Mutex<AudioGraph>>,
    sample_rate: f32,
}

impl AudioContext {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            graph: Arc::new(Mutex::new(AudioGraph::new(sample_rate))),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Lock the graph. A panic on another thread does not leave the graph in
    /// a state worth refusing, so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, AudioGraph> {
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_graph<R>(&self, f: impl FnOnce(&mut AudioGraph) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn current_time(&self) -> f64 {
        self.lock().current_time()
    }

    pub fn render_interleaved(&self, data: &mut [f32], channels: usize) {
        self.lock().render_interleaved(data, channels);
    }

    pub fn render_offline(&self, seconds: f64) -> StereoBuffer {
        self.lock().render_offline(seconds)
    }

    pub fn render_frames(&self, frames: usize) -> StereoBuffer {
        self.lock().render_frames(frames)
    }
}
