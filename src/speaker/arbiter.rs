use thiserror::Error;
use tracing::debug;

/// Recency weights, newest slot first.
///
/// Transcripts arrive up to every ~300 ms per active speaker, so eight slots
/// cover roughly 1.3 seconds with two people talking over each other.
pub const WEIGHTS: [u32; 8] = [5, 3, 2, 1, 1, 1, 1, 1];

/// Number of events the arbiter remembers.
pub const CAPACITY: usize = WEIGHTS.len();

/// A participant must score strictly above this to be reported.
pub const DEFAULT_THRESHOLD: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpeakerError {
    #[error("speaker buffer supports exactly {expected} slots, got {requested}")]
    Configuration { requested: usize, expected: usize },
}

/// Aggregated scores for the current window, in discovery order.
///
/// Discovery order is oldest slot to newest, which is what ties resolve on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeakerScores {
    entries: Vec<(String, u32)>,
}

impl SpeakerScores {
    fn add(&mut self, participant_id: &str, weight: u32) {
        match self.entries.iter_mut().find(|(id, _)| id == participant_id) {
            Some((_, score)) => *score += weight,
            None => self.entries.push((participant_id.to_string(), weight)),
        }
    }

    pub fn get(&self, participant_id: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(id, _)| id == participant_id)
            .map(|(_, score)| *score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(id, score)| (id.as_str(), *score))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Highest scorer; the first participant to reach the max keeps it.
    pub fn leader(&self) -> Option<(&str, u32)> {
        let mut best: Option<(&str, u32)> = None;
        for (id, score) in self.iter() {
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((id, score));
            }
        }
        best
    }
}

/// Ring buffer of the most recent speakers.
///
/// Every transcript event pushes its speaker id. The participant that should be
/// highlighted is the one with the highest recency-weighted score, and only
/// once that score clears the threshold, so a single stray utterance from a
/// second talker does not steal the highlight.
#[derive(Debug, Clone)]
pub struct SpeakerArbiter {
    slots: Vec<Option<String>>,
    cursor: usize,
    threshold: u32,
}

impl SpeakerArbiter {
    pub fn new(capacity: usize) -> Result<Self, SpeakerError> {
        Self::with_threshold(capacity, DEFAULT_THRESHOLD)
    }

    pub fn with_threshold(capacity: usize, threshold: u32) -> Result<Self, SpeakerError> {
        if capacity != WEIGHTS.len() {
            return Err(SpeakerError::Configuration {
                requested: capacity,
                expected: WEIGHTS.len(),
            });
        }

        Ok(Self {
            slots: vec![None; capacity],
            cursor: 0,
            threshold,
        })
    }

    /// Record that `participant_id` just produced speech.
    pub fn push(&mut self, participant_id: impl Into<String>) {
        self.slots[self.cursor] = Some(participant_id.into());
        self.cursor = (self.cursor + 1) % self.slots.len();
    }

    /// Scores over the current window.
    pub fn scores(&self) -> SpeakerScores {
        let len = self.slots.len();
        let mut scores = SpeakerScores::default();

        // i = 0 is the oldest slot, i = len - 1 the one written last.
        for i in 0..len {
            if let Some(id) = &self.slots[(self.cursor + i) % len] {
                scores.add(id, WEIGHTS[len - i - 1]);
            }
        }

        scores
    }

    /// Participant to highlight, or `None` meaning "don't switch".
    pub fn active_speaker(&self) -> Option<String> {
        let scores = self.scores();
        let (id, score) = scores.leader()?;

        if score > self.threshold {
            Some(id.to_string())
        } else {
            debug!(participant = id, score, "No speaker above threshold");
            None
        }
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.cursor = 0;
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl Default for SpeakerArbiter {
    fn default() -> Self {
        Self {
            slots: vec![None; CAPACITY],
            cursor: 0,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}
