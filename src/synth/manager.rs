use std::sync::Arc;

use log::{debug, trace, warn};

use crate::config::ToneConfig;
use crate::dsp::reverb::{generate_reverb_impulse, ImpulseResponse};
use crate::engine::scheduler::Scheduler;
use crate::error::{Result, ToneError};
use crate::graph::AudioContext;
use crate::notes;
use crate::synth::voice::{Voice, VoiceId, VoiceNodes, VoiceParts, VoiceState};

/*
Tone Lifecycle
==============

Each note gets at most one voice. A voice is four graph nodes wired in series
and an envelope written as automation on the gain node:

  [triangle osc] → [low-pass 2 kHz] → [gain envelope] → [convolver] → out

  gain
  0.7 ┤            ╭━━━━━━━━━━━━━━━╮
  0.5 ┤      ╭━━━━━╯               │╲
      │     ╱                      │  ╲   release
  0.0 ┼━━━━╯                       │    ╲━━━━━━━━━
      start  +0.1        +0.6     stop   +1.0   +1.1
             attack      swell           osc    cleanup
                                         halts  (nodes freed)

Lifecycle of a voice:

  Idle ──start──→ Sounding ──stop──→ Releasing ──cleanup──→ Idle

Stopping ramps the gain to zero from wherever it currently is, schedules the
oscillator to halt when the ramp ends, and queues a cleanup task a little
later. Stop and cleanup times are counted in whole frames on the audio clock.
Cleanup runs from `poll()` once that many frames have been rendered, so it
can never free nodes that are still audible and never lags a frame behind.

Voice nodes are built before the graph is locked; the lock only covers adding
and wiring them, so a key press never stalls the audio callback. A voice that is releasing
still counts as active: starting its note again is ignored until cleanup.
*/

pub struct ToneManager {
    context: AudioContext,
    config: ToneConfig,
    voices: Vec<Voice>,
    scheduler: Scheduler<VoiceId>,
    impulse: Arc<ImpulseResponse>,
    next_voice: u64,
}

impl ToneManager {
    pub fn new(context: AudioContext) -> Self {
        Self::with_config(context, ToneConfig::default())
    }

    pub fn with_config(context: AudioContext, config: ToneConfig) -> Self {
        let impulse =
            generate_reverb_impulse(context.sample_rate(), config.reverb.seconds).into_shared();

        Self {
            context,
            config,
            voices: Vec::new(),
            scheduler: Scheduler::new(),
            impulse,
            next_voice: 0,
        }
    }

    pub fn context(&self) -> &AudioContext {
        &self.context
    }

    pub fn config(&self) -> &ToneConfig {
        &self.config
    }

    /// The session's shared reverb impulse.
    pub fn impulse(&self) -> &Arc<ImpulseResponse> {
        &self.impulse
    }

    fn voice(&self, name: &str) -> Option<&Voice> {
        self.voices.iter().find(|v| v.note().name == name)
    }

    /// Start a voice for `note`. Does nothing if the note already has one,
    /// including a voice that is still releasing.
    pub fn start_note(&mut self, note: &str) -> Result<()> {
        let note = notes::lookup(note)?;
        if let Some(existing) = self.voice(note.name) {
            debug!(
                "{}: already {:?}, start ignored",
                note.name,
                existing.state()
            );
            return Ok(());
        }

        let impulse = if self.config.reverb.fresh_per_voice {
            generate_reverb_impulse(self.context.sample_rate(), self.config.reverb.seconds)
                .into_shared()
        } else {
            Arc::clone(&self.impulse)
        };

        let parts = VoiceParts::new(&self.config, note, impulse);
        let (nodes, now) = self.context.with_graph(|graph| {
            let now = graph.current_time();
            parts.install(graph, now).map(|nodes| (nodes, now))
        })?;

        let id = VoiceId(self.next_voice);
        self.next_voice += 1;
        self.voices.push(Voice::new(id, note, nodes));

        debug!(
            "{}: voice {} started at {now:.3}s ({:.2} Hz)",
            note.name, id.0, note.frequency
        );
        Ok(())
    }

    /// Release the voice for `note`.
    ///
    /// The envelope ramps to zero from its current value. The first stop fixes
    /// the oscillator's stop time and queues the cleanup; later stops only
    /// re-apply the ramp.
    pub fn stop_note(&mut self, note: &str) -> Result<()> {
        let note = notes::lookup(note)?;
        let Some(voice) = self.voices.iter_mut().find(|v| v.note().name == note.name) else {
            warn!("{}: stop requested with no active voice", note.name);
            return Err(ToneError::NoActiveVoice {
                note: note.name.to_string(),
            });
        };

        let release = self.config.envelope.release;
        let teardown_delay = self.config.teardown_delay();
        let scheduler = &mut self.scheduler;
        let nodes = voice.nodes();

        self.context.with_graph(|graph| -> Result<()> {
            let now_frame = graph.frames_rendered();
            let now = graph.frame_time(now_frame);
            let ramp_end = graph.frame_time(now_frame + graph.frames_for(release));

            let gain = graph.gain_mut(nodes.envelope)?.gain_mut();
            let current = gain.value_at(now);
            gain.cancel_scheduled_values(now)
                .set_value_at_time(current, now)
                .linear_ramp_to_value_at_time(0.0, ramp_end);

            if let Some(stop_time) = voice.stop_time() {
                debug!("{}: already releasing, stop time kept at {stop_time:.3}s", note.name);
                return Ok(());
            }

            graph.stop_oscillator(nodes.oscillator, ramp_end)?;
            let due = now_frame + graph.frames_for(teardown_delay);
            let task = scheduler.schedule(due, voice.id());
            voice.mark_stopped(ramp_end, task);

            debug!(
                "{}: releasing from {current:.3} at {now:.3}s, stop {ramp_end:.3}s, {task} due at frame {due}",
                note.name
            );
            Ok(())
        })
    }

    /// Run every cleanup that has come due on the audio clock. Returns the
    /// notes whose voices were torn down.
    pub fn poll(&mut self) -> Vec<&'static str> {
        let mut graph = self.context.lock();
        let due = self.scheduler.pop_due(graph.frames_rendered());
        if due.is_empty() {
            return Vec::new();
        }

        let now = graph.current_time();
        let mut removed = Vec::with_capacity(due.len());
        for (task, voice_id) in due {
            let Some(index) = self.voices.iter().position(|v| v.id() == voice_id) else {
                trace!("{task}: voice {} already gone", voice_id.0);
                continue;
            };
            let voice = self.voices.remove(index);
            debug!(
                "{}: voice {} cleaned up at {now:.3}s",
                voice.note().name,
                voice_id.0
            );
            removed.push(voice.note().name);
            voice.teardown(&mut graph);
        }
        removed
    }

    /// Notes with a live voice, in the order they were started.
    pub fn active_notes(&self) -> Vec<&'static str> {
        self.voices.iter().map(|v| v.note().name).collect()
    }

    /// Stop every active note. The returned set is unchanged until the
    /// cleanups run.
    pub fn reset_all(&mut self) -> Vec<&'static str> {
        for name in self.active_notes() {
            if let Err(err) = self.stop_note(name) {
                warn!("{name}: reset failed: {err}");
            }
        }
        self.active_notes()
    }

    pub fn is_active(&self, note: &str) -> bool {
        self.voice(note).is_some()
    }

    pub fn voice_state(&self, note: &str) -> Option<VoiceState> {
        self.voice(note).map(Voice::state)
    }

    pub fn stop_time(&self, note: &str) -> Option<f64> {
        self.voice(note).and_then(Voice::stop_time)
    }

    pub fn voice_nodes(&self, note: &str) -> Option<VoiceNodes> {
        self.voice(note).map(Voice::nodes)
    }

    /// Cleanups queued and not yet run.
    pub fn pending_cleanups(&self) -> usize {
        self.scheduler.len()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Tear down every voice immediately, cancelling its pending cleanup.
    pub fn close(&mut self) {
        if self.voices.is_empty() {
            return;
        }

        let mut graph = self.context.lock();
        for voice in self.voices.drain(..) {
            if let Some(task) = voice.cleanup_task() {
                self.scheduler.cancel(task);
            }
            voice.teardown(&mut graph);
        }
    }
}

impl Drop for ToneManager {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SAMPLE_RATE: f32 = 8_000.0;

    fn manager() -> ToneManager {
        let config = ToneConfig::default().with_reverb_seconds(0.25);
        ToneManager::with_config(AudioContext::new(SAMPLE_RATE), config)
    }

    fn envelope_at(manager: &ToneManager, note: &str, time: f64) -> f32 {
        let nodes = manager.voice_nodes(note).unwrap();
        manager
            .context()
            .with_graph(|g| g.gain(nodes.envelope).unwrap().gain().value_at(time))
    }

    #[test]
    fn envelope_attacks_then_swells() {
        let mut manager = manager();
        manager.start_note("A").unwrap();

        assert_abs_diff_eq!(envelope_at(&manager, "A", 0.0), 0.0);
        assert_abs_diff_eq!(envelope_at(&manager, "A", 0.05), 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(envelope_at(&manager, "A", 0.1), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(envelope_at(&manager, "A", 0.6), 0.7, epsilon = 1e-6);
        assert_abs_diff_eq!(envelope_at(&manager, "A", 30.0), 0.7, epsilon = 1e-6);
    }

    #[test]
    fn voice_is_wired_in_series() {
        let mut manager = manager();
        manager.start_note("C#2").unwrap();
        let nodes = manager.voice_nodes("C#2").unwrap();

        manager.context().with_graph(|g| {
            assert_eq!(g.outputs(nodes.oscillator), &[nodes.filter]);
            assert_eq!(g.outputs(nodes.filter), &[nodes.envelope]);
            assert_eq!(g.outputs(nodes.envelope), &[nodes.reverb]);
            assert_eq!(g.outputs(nodes.reverb), &[g.destination()]);

            let osc = g.oscillator(nodes.oscillator).unwrap();
            assert_eq!(osc.start_time(), Some(0.0));
            assert_abs_diff_eq!(osc.frequency().value_at(0.0), 138.59);
            assert_abs_diff_eq!(g.filter(nodes.filter).unwrap().frequency().value_at(0.0), 2000.0);
        });
    }

    #[test]
    fn release_starts_from_the_current_level() {
        let mut manager = manager();
        manager.start_note("A").unwrap();

        // Mid-swell: 0.5 + 0.2 * (0.25 / 0.5)
        manager.context().render_offline(0.35);
        manager.stop_note("A").unwrap();
        let now = manager.context().current_time();

        assert_abs_diff_eq!(envelope_at(&manager, "A", now), 0.6, epsilon = 1e-3);
        assert_abs_diff_eq!(envelope_at(&manager, "A", now + 0.5), 0.3, epsilon = 1e-3);
        assert_abs_diff_eq!(envelope_at(&manager, "A", now + 1.0), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(manager.stop_time("A").unwrap(), now + 1.0, epsilon = 1e-9);
        assert_eq!(manager.voice_state("A"), Some(VoiceState::Releasing));
    }

    #[test]
    fn unknown_note_allocates_nothing() {
        let mut manager = manager();
        let before = manager.context().lock().node_count();

        let err = manager.start_note("H").unwrap_err();
        assert_eq!(err, ToneError::UnknownNote { note: "H".into() });
        assert!(manager.is_empty());
        assert_eq!(manager.context().lock().node_count(), before);
    }

    #[test]
    fn stop_without_voice_is_reported() {
        let mut manager = manager();
        assert_eq!(
            manager.stop_note("A"),
            Err(ToneError::NoActiveVoice { note: "A".into() })
        );
        assert!(matches!(
            manager.stop_note("nope"),
            Err(ToneError::UnknownNote { .. })
        ));
    }

    #[test]
    fn cleanup_waits_for_the_audio_clock() {
        let mut manager = manager();
        manager.start_note("A").unwrap();
        manager.stop_note("A").unwrap();
        assert_eq!(manager.pending_cleanups(), 1);

        // Just short of release + margin
        manager.context().render_offline(1.05);
        assert!(manager.poll().is_empty());
        assert!(manager.is_active("A"));

        manager.context().render_offline(0.1);
        assert_eq!(manager.poll(), vec!["A"]);
        assert!(manager.is_empty());
        assert_eq!(manager.pending_cleanups(), 0);
    }

    #[test]
    fn fresh_impulses_are_not_shared() {
        let config = ToneConfig::default()
            .with_reverb_seconds(0.1)
            .with_fresh_impulse_per_voice(true);
        let mut manager = ToneManager::with_config(AudioContext::new(SAMPLE_RATE), config);
        manager.start_note("A").unwrap();
        manager.start_note("C").unwrap();

        let a = manager.voice_nodes("A").unwrap().reverb;
        let c = manager.voice_nodes("C").unwrap().reverb;
        manager.context().with_graph(|g| {
            let (a, c) = (g.convolver(a).unwrap(), g.convolver(c).unwrap());
            assert!(!Arc::ptr_eq(a.impulse(), c.impulse()));
        });
    }

    #[test]
    fn shared_impulse_by_default() {
        let mut manager = manager();
        manager.start_note("A").unwrap();
        let reverb = manager.voice_nodes("A").unwrap().reverb;
        let shared = Arc::clone(manager.impulse());

        manager.context().with_graph(|g| {
            assert!(Arc::ptr_eq(g.convolver(reverb).unwrap().impulse(), &shared));
        });
    }

    #[test]
    fn close_frees_everything() {
        let ctx = AudioContext::new(SAMPLE_RATE);
        {
            let mut manager =
                ToneManager::with_config(ctx.clone(), ToneConfig::default().with_reverb_seconds(0.1));
            manager.start_note("A").unwrap();
            manager.start_note("B").unwrap();
            manager.stop_note("B").unwrap();
            assert_eq!(ctx.lock().node_count(), 9);
        }
        // Dropped: only the destination remains
        assert_eq!(ctx.lock().node_count(), 1);
    }

    #[test]
    fn close_cancels_each_pending_cleanup() {
        let mut manager = manager();
        manager.start_note("A").unwrap();
        manager.start_note("B").unwrap();
        manager.stop_note("A").unwrap();
        manager.stop_note("B").unwrap();
        assert_eq!(manager.pending_cleanups(), 2);

        manager.close();
        assert_eq!(manager.pending_cleanups(), 0);
        assert!(manager.is_empty());

        // Nothing left to fire once the release would have ended
        manager.context().render_offline(1.2);
        assert!(manager.poll().is_empty());
    }
}
