use std::ops::Deref;

use super::Envelope;
use crate::metrics::TimingToken;

/// A wrapped driver's envelope plus the timing token assigned when the
/// decorator saw it dequeued.
///
/// Envelopes returned from `enqueue` and `retry` carry no token; finishing
/// them reports counts but no `MessageTime`.
#[derive(Debug, Clone)]
pub struct TrackedEnvelope<E> {
    envelope: E,
    token: Option<TimingToken>,
}

impl<E> TrackedEnvelope<E> {
    pub(crate) fn tracked(envelope: E, token: TimingToken) -> Self {
        Self {
            envelope,
            token: Some(token),
        }
    }

    /// Wrap an envelope obtained outside the decorator
    pub fn untracked(envelope: E) -> Self {
        Self {
            envelope,
            token: None,
        }
    }

    /// Timing token, present only for envelopes produced by `dequeue`
    pub fn token(&self) -> Option<TimingToken> {
        self.token
    }

    /// The wrapped driver's envelope
    pub fn inner(&self) -> &E {
        &self.envelope
    }

    /// Unwrap, discarding the timing token
    pub fn into_inner(self) -> E {
        self.envelope
    }
}

impl<E> Deref for TrackedEnvelope<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.envelope
    }
}

impl<E> From<E> for TrackedEnvelope<E> {
    fn from(envelope: E) -> Self {
        Self::untracked(envelope)
    }
}

impl<E: Envelope> Envelope for TrackedEnvelope<E> {
    type Message = E::Message;

    fn message(&self) -> &E::Message {
        self.envelope.message()
    }
}
