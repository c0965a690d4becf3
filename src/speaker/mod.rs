//! Active speaker selection
//!
//! Decides which participant to highlight from the stream of per-utterance
//! speaker ids, smoothing over the rapid alternation that happens when two
//! people talk at once.

mod arbiter;

pub use arbiter::{SpeakerArbiter, SpeakerError, SpeakerScores, CAPACITY, DEFAULT_THRESHOLD, WEIGHTS};
