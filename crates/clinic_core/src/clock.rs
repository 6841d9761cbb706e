//! Event calendar: a min-heap of timestamped events with FIFO tie-breaking.
//!
//! Simulation time is milliseconds since clinic open. Events scheduled for the
//! same millisecond pop in the order they were scheduled.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

use crate::error::SimError;
use crate::station::StationKind;

pub const ONE_SEC_MS: u64 = 1000;
pub const ONE_MIN_MS: u64 = 60 * ONE_SEC_MS;
pub const ONE_HOUR_MS: u64 = 60 * ONE_MIN_MS;

/// Converts a non-negative duration in minutes to whole milliseconds.
pub fn minutes_to_ms(minutes: f64) -> u64 {
    (minutes.max(0.0) * ONE_MIN_MS as f64).round() as u64
}

pub fn ms_to_minutes(ms: u64) -> f64 {
    ms as f64 / ONE_MIN_MS as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// A new patient walks in.
    Arrival,
    /// A patient reaches a station and either seizes a server or joins the queue.
    StationArrival,
    /// A server finishes with a patient.
    ServiceComplete,
    /// Arrivals cutoff reached; no new patients after this.
    EndOfArrivals,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Arrival,
        EventKind::StationArrival,
        EventKind::ServiceComplete,
        EventKind::EndOfArrivals,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSubject {
    Visit { patient: Entity, station: StationKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    /// Insertion counter; breaks ties between equal timestamps.
    pub seq: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
}

impl Event {
    pub fn visit(&self) -> Option<(Entity, StationKind)> {
        match self.subject {
            Some(EventSubject::Visit { patient, station }) => Some((patient, station)),
            None => None,
        }
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the earliest (timestamp, seq) first.
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event being processed by the current schedule run.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    next_seq: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedules an event at an absolute time. Times in the past are rejected.
    pub fn schedule_at(
        &mut self,
        timestamp: u64,
        kind: EventKind,
        subject: Option<EventSubject>,
    ) -> Result<(), SimError> {
        if timestamp < self.now {
            return Err(SimError::invariant(format!(
                "{kind:?} scheduled at {timestamp} ms, before current time {} ms",
                self.now
            )));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            timestamp,
            seq,
            kind,
            subject,
        });
        Ok(())
    }

    /// Schedules an event `delay_ms` after the current time.
    pub fn schedule_in(&mut self, delay_ms: u64, kind: EventKind, subject: Option<EventSubject>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            timestamp: self.now.saturating_add(delay_ms),
            seq,
            kind,
            subject,
        });
    }

    /// Pops the earliest event and advances the clock to its timestamp.
    ///
    /// An event earlier than the current time is an invariant violation; the
    /// clock is left where it was.
    pub fn pop_next(&mut self) -> Result<Option<Event>, SimError> {
        let Some(event) = self.events.pop() else {
            return Ok(None);
        };
        if event.timestamp < self.now {
            return Err(SimError::invariant(format!(
                "calendar went backwards: {:?} at {} ms, clock at {} ms",
                event.kind, event.timestamp, self.now
            )));
        }
        self.now = event.timestamp;
        Ok(Some(event))
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|event| event.timestamp)
    }

    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pops_events_in_time_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(10, EventKind::Arrival, None).unwrap();
        clock.schedule_at(5, EventKind::Arrival, None).unwrap();
        clock.schedule_at(20, EventKind::EndOfArrivals, None).unwrap();

        let first = clock.pop_next().unwrap().expect("first event");
        assert_eq!(first.timestamp, 5);
        assert_eq!(clock.now(), 5);

        let second = clock.pop_next().unwrap().expect("second event");
        assert_eq!(second.timestamp, 10);
        assert_eq!(clock.now(), 10);

        let third = clock.pop_next().unwrap().expect("third event");
        assert_eq!(third.timestamp, 20);
        assert_eq!(clock.now(), 20);

        assert!(clock.pop_next().unwrap().is_none());
        assert!(clock.is_empty());
    }

    #[test]
    fn equal_timestamps_pop_in_insertion_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(7, EventKind::EndOfArrivals, None).unwrap();
        clock.schedule_at(7, EventKind::Arrival, None).unwrap();
        clock.schedule_at(7, EventKind::ServiceComplete, None).unwrap();

        let kinds: Vec<_> = std::iter::from_fn(|| clock.pop_next().unwrap())
            .map(|event| event.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::EndOfArrivals,
                EventKind::Arrival,
                EventKind::ServiceComplete
            ]
        );
    }

    #[test]
    fn scheduling_in_the_past_is_rejected() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(100, EventKind::Arrival, None).unwrap();
        clock.pop_next().unwrap();

        let err = clock
            .schedule_at(99, EventKind::Arrival, None)
            .expect_err("past event");
        assert!(err.is_invariant_violation());

        clock.schedule_in(0, EventKind::Arrival, None);
        assert_eq!(clock.next_event_time(), Some(100));
        assert_eq!(clock.pending_event_count(), 1);
    }

    #[test]
    fn event_behind_the_clock_is_an_invariant_violation() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(50, EventKind::Arrival, None).unwrap();
        clock.pop_next().unwrap();
        clock.events.push(Event {
            timestamp: 10,
            seq: clock.next_seq,
            kind: EventKind::ServiceComplete,
            subject: None,
        });

        let err = clock.pop_next().expect_err("non-monotonic calendar");
        assert!(err.is_invariant_violation());
        assert_eq!(clock.now(), 50);
    }

    #[test]
    fn minute_conversions_round_to_milliseconds() {
        assert_eq!(minutes_to_ms(1.0), ONE_MIN_MS);
        assert_eq!(minutes_to_ms(0.5), 30 * ONE_SEC_MS);
        assert_eq!(minutes_to_ms(-3.0), 0);
        assert_eq!(ms_to_minutes(90 * ONE_SEC_MS), 1.5);
    }
}
