/*
Parameter Automation
====================

An AudioParam is a value that can change over time on a schedule. The control
thread writes events against the audio clock; the render thread samples the
resulting curve at every sample time. Nothing is stateful on the render side,
so reading the value at any time t is a pure function of the event list.

Events
------

  SetValue   { time, value }   jump to `value` at `time`, then hold
  LinearRamp { time, value }   arrive at `value` at `time`, moving in a
                               straight line from the previous event

Evaluation at time t:

  - find the last event at or before t (the anchor) and the first event after
  - if the next event is a ramp, interpolate anchor → ramp target
  - otherwise hold the anchor's value (or the default when there is none)

  value
  0.7 ┤                 ●━━━━━━━━  ramp(0.7, 0.6)
  0.5 ┤        ●━━━━━━━╯           ramp(0.5, 0.1)
      │      ╱
  0.0 ┼─────●                      set(0.0, 0.0)
      0    0.1            0.6  → time

Release Pattern
---------------

To release cleanly from wherever a ramp currently is:

  let v = param.value_at(now);          // read BEFORE cancelling
  param.cancel_scheduled_values(now);   // drop the unfinished ramps
  param.set_value_at_time(v, now);      // pin the current level
  param.linear_ramp_to_value_at_time(0.0, now + release);

Reading the value first matters: once the in-flight ramp is cancelled the
curve would otherwise snap back to the last surviving anchor, and the release
would start from the wrong level (an audible click).
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamEvent {
    SetValue { time: f64, value: f32 },
    LinearRamp { time: f64, value: f32 },
}

impl ParamEvent {
    #[inline]
    pub fn time(&self) -> f64 {
        match *self {
            ParamEvent::SetValue { time, .. } | ParamEvent::LinearRamp { time, .. } => time,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        match *self {
            ParamEvent::SetValue { value, .. } | ParamEvent::LinearRamp { value, .. } => value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AudioParam {
    default_value: f32,
    events: Vec<ParamEvent>,
}

impl AudioParam {
    pub fn new(default_value: f32) -> Self {
        Self {
            default_value,
            events: Vec::new(),
        }
    }

    pub fn default_value(&self) -> f32 {
        self.default_value
    }

    /// Scheduled events, ordered by time.
    pub fn events(&self) -> &[ParamEvent] {
        &self.events
    }

    fn insert(&mut self, event: ParamEvent) {
        // Events at the same time keep insertion order
        let pos = self.events.partition_point(|e| e.time() <= event.time());
        self.events.insert(pos, event);
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) -> &mut Self {
        self.insert(ParamEvent::SetValue { time, value });
        self
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) -> &mut Self {
        self.insert(ParamEvent::LinearRamp { time, value });
        self
    }

    /// Remove every event scheduled at or after `time`.
    pub fn cancel_scheduled_values(&mut self, time: f64) -> &mut Self {
        self.events.retain(|e| e.time() < time);
        self
    }

    /// The automation curve evaluated at `time`.
    pub fn value_at(&self, time: f64) -> f32 {
        let idx = self.events.partition_point(|e| e.time() <= time);
        let anchor = idx.checked_sub(1).map(|i| self.events[i]);

        match self.events.get(idx) {
            Some(&ParamEvent::LinearRamp {
                time: end_time,
                value: end_value,
            }) => {
                let (start_time, start_value) = anchor
                    .map(|e| (e.time(), e.value()))
                    .unwrap_or((0.0, self.default_value));

                if end_time <= start_time {
                    return end_value;
                }
                let progress = ((time - start_time) / (end_time - start_time)) as f32;
                start_value + (end_value - start_value) * progress.clamp(0.0, 1.0)
            }
            _ => anchor.map_or(self.default_value, |e| e.value()),
        }
    }

    /// Drop events that can no longer influence values at or after `time`.
    ///
    /// The last event at or before `time` survives as the anchor for whatever
    /// follows it.
    pub fn prune_before(&mut self, time: f64) {
        let idx = self.events.partition_point(|e| e.time() <= time);
        if idx > 1 {
            self.events.drain(..idx - 1);
        }
    }

    /// Fill `out` with per-sample values starting at `start_time`.
    pub fn render(&mut self, out: &mut [f32], start_time: f64, sample_rate: f32) {
        self.prune_before(start_time);

        let end_time = start_time + out.len() as f64 / sample_rate as f64;
        let constant = match self.events.as_slice() {
            [] => Some(self.default_value),
            // Everything already happened
            [.., last] if last.time() <= start_time => Some(last.value()),
            // Nothing happens until after this block
            events if events[0].time() > end_time => match events[0] {
                ParamEvent::SetValue { .. } => Some(self.default_value),
                ParamEvent::LinearRamp { .. } => None,
            },
            _ => None,
        };

        match constant {
            Some(value) => out.fill(value),
            None => {
                let dt = 1.0 / sample_rate as f64;
                for (i, sample) in out.iter_mut().enumerate() {
                    *sample = self.value_at(start_time + i as f64 * dt);
                }
            }
        }
    }
}
