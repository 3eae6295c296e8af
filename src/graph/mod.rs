//! A small Web-Audio-style node graph.
//!
//! Nodes are owned by an [`AudioGraph`] and addressed by [`NodeId`]. Sources
//! and effects are scheduled against the graph's audio clock, which advances
//! only as frames are rendered. [`AudioContext`] shares one graph between the
//! control thread and the audio callback.

slotmap::new_key_type! {
    /// Handle to a node in an [`AudioGraph`]. Stale handles never alias new nodes.
    pub struct NodeId;
}

/// The graph, its shared handle and the node enum.
pub mod context;
/// Convolution reverb node.
pub mod convolver;
/// Low-pass / high-pass filter node with an automatable cutoff.
pub mod filter;
/// Gain node; hosts the voice envelope.
pub mod gain;
/// Core traits shared by all graph nodes.
pub mod node;
/// Scheduled oscillator source.
pub mod oscillator;
/// Sample-accurate parameter automation.
pub mod param;

pub use context::{AudioContext, AudioGraph, Node, NodeKind, StereoBuffer};
pub use convolver::ConvolverNode;
pub use filter::FilterNode;
pub use gain::GainNode;
pub use node::{GraphNode, RenderCtx, StereoBlock};
pub use oscillator::OscillatorNode;
pub use param::{AudioParam, ParamEvent};
