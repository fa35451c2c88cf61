use serde::{Deserialize, Serialize};

/// A timed subtitle unit. Times are in seconds from the start of the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Cue {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Whether the cue is showing at `time`. Both bounds are inclusive.
    pub fn is_active_at(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Returns the first cue, in input order, that is active at `time`.
///
/// The cues are scanned linearly and are not assumed to be sorted. When cues
/// overlap, the one that comes first wins.
pub fn active_cue(cues: &[Cue], time: f64) -> Option<&Cue> {
    active_cue_index(cues, time).map(|idx| &cues[idx])
}

/// Like [`active_cue`], but returns the position of the cue in `cues`.
pub fn active_cue_index(cues: &[Cue], time: f64) -> Option<usize> {
    cues.iter().position(|cue| cue.is_active_at(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let cues = vec![Cue::new(2.0, 4.0, "two to four")];

        assert_eq!(active_cue(&cues, 2.0), Some(&cues[0]));
        assert_eq!(active_cue(&cues, 4.0), Some(&cues[0]));
        assert_eq!(active_cue(&cues, 1.999), None);
        assert_eq!(active_cue(&cues, 4.001), None);
    }

    #[test]
    fn empty_cues_never_match() {
        assert_eq!(active_cue(&[], 0.0), None);
        assert_eq!(active_cue(&[], 1234.5), None);
    }

    #[test]
    fn first_overlapping_cue_wins() {
        let a = Cue::new(0.0, 5.0, "A");
        let b = Cue::new(3.0, 8.0, "B");
        let cues = vec![a.clone(), b.clone()];

        assert_eq!(active_cue(&cues, 4.0), Some(&a));
        assert_eq!(active_cue(&cues, 6.0), Some(&b));
    }

    #[test]
    fn unsorted_cues_are_scanned_fully() {
        let cues = vec![
            Cue::new(10.0, 12.0, "late"),
            Cue::new(1.0, 2.0, "early"),
        ];

        assert_eq!(active_cue(&cues, 1.5).map(|c| c.text.as_str()), Some("early"));
        assert_eq!(active_cue_index(&cues, 11.0), Some(0));
        assert_eq!(active_cue_index(&cues, 5.0), None);
    }
}
