//! Session driver - applies adapter commands to a session and produces replies.
//!
//! The driver is synchronous. Whoever owns the real clock (the host binary, or a test
//! loop) feeds it elapsed time and inbound commands and forwards what comes back.

use tracing::{debug, info};

use crate::core::{Session, SessionSnapshot};
use crate::protocol::{build_observation, create_ack};
use crate::runtime::{InboundCommand, InboundPayload, OutboundMessage};
use crate::types::SessionEvent;

pub struct SessionDriver {
    session: Session,
    snapshot: SessionSnapshot,
    obs_seq: u64,
}

impl SessionDriver {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            snapshot: SessionSnapshot::default(),
            obs_seq: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Apply one inbound command. Replies go to the sender; a broadcast follows if
    /// the session changed.
    pub fn handle(&mut self, inbound: InboundCommand) -> Vec<OutboundMessage> {
        let mut out = Vec::with_capacity(2);
        match inbound.payload {
            InboundPayload::SnapshotRequest => {
                out.push(OutboundMessage::ToClientObservation {
                    client_id: inbound.client_id,
                    obs: self.observe(&[]),
                });
            }
            InboundPayload::Actions(actions) => {
                let applied = actions
                    .iter()
                    .filter(|a| self.session.apply_action(**a))
                    .count();
                debug!(
                    client_id = inbound.client_id,
                    seq = inbound.seq,
                    requested = actions.len(),
                    applied,
                    "command applied"
                );
                out.push(OutboundMessage::ToClientAck {
                    client_id: inbound.client_id,
                    ack: create_ack(inbound.seq),
                });
                out.extend(self.flush());
            }
        }
        out
    }

    /// Advance the session clock, then broadcast whatever happened.
    pub fn advance(&mut self, elapsed_ms: u32) -> Option<OutboundMessage> {
        self.session.advance(elapsed_ms);
        self.flush()
    }

    /// Drain session events into a broadcast observation (None if nothing happened).
    pub fn flush(&mut self) -> Option<OutboundMessage> {
        let events = self.session.take_events();
        if events.is_empty() {
            return None;
        }

        if let Some(score) = events.iter().find_map(SessionEvent::final_score) {
            info!(
                score,
                outcome = self.session.phase().as_str(),
                difficulty = %self.session.difficulty(),
                "final score"
            );
        }

        Some(OutboundMessage::BroadcastObservation {
            obs: self.observe(&events),
        })
    }

    fn observe(&mut self, events: &[SessionEvent]) -> crate::protocol::ObservationMessage {
        self.obs_seq += 1;
        self.session.snapshot_into(&mut self.snapshot);
        build_observation(self.obs_seq, &self.snapshot, events)
    }
}
