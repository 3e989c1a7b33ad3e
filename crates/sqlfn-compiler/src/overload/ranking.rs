//! Candidate selection across overloads.
//!
//! Candidates are offered in declaration order. The tracker keeps the best
//! level seen and, within a level below exact, the lowest score. Ties go to
//! the earlier candidate, and a variadic candidate never displaces a
//! non-variadic one of the same level.
//!
//! Only the non-exact path records the winner's score. An exact candidate
//! replaces the current one without touching the tracked score, so a later
//! exact candidate also replaces it unless it is variadic.

use super::matching::{CandidateScore, MatchLevel};

/// Whether the scan should go on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Continue,
    Stop,
}

/// Running state of the candidate scan.
#[derive(Debug, Clone)]
pub struct CandidateTracker {
    best: MatchLevel,
    candidate: Option<usize>,
    candidate_variadic: bool,
    score: i64,
}

impl CandidateTracker {
    pub fn new() -> Self {
        Self {
            best: MatchLevel::NoMatch,
            candidate: None,
            candidate_variadic: true,
            score: -1,
        }
    }

    /// Consider candidate `index`.
    ///
    /// `window_match` is true when the candidate's window-ness equals the
    /// context's; an exact candidate that also matches the context ends the
    /// scan.
    pub fn offer(
        &mut self,
        index: usize,
        result: CandidateScore,
        variadic: bool,
        window_match: bool,
    ) -> Offer {
        let level = result.level;
        if level == MatchLevel::NoMatch || level < self.best {
            return Offer::Continue;
        }
        if level == self.best && variadic && !self.candidate_variadic {
            return Offer::Continue;
        }

        if level != MatchLevel::Exact {
            if self.score > result.score || self.best < level {
                self.candidate = Some(index);
                self.candidate_variadic = variadic;
                self.score = result.score;
            }
            self.best = level;
            Offer::Continue
        } else {
            self.candidate = Some(index);
            self.candidate_variadic = variadic;
            self.best = level;
            if window_match {
                Offer::Stop
            } else {
                Offer::Continue
            }
        }
    }

    /// Index of the selected candidate, if any qualified.
    pub fn winner(&self) -> Option<usize> {
        self.candidate
    }

    pub fn best_level(&self) -> MatchLevel {
        self.best
    }
}

impl Default for CandidateTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(level: MatchLevel, score: i64) -> CandidateScore {
        CandidateScore { level, score }
    }

    #[test]
    fn better_level_wins() {
        let mut tracker = CandidateTracker::new();
        tracker.offer(0, at(MatchLevel::Fuzzy, 1), false, true);
        tracker.offer(1, at(MatchLevel::Partial, 9), false, true);
        tracker.offer(2, at(MatchLevel::Fuzzy, 0), false, true);
        assert_eq!(tracker.winner(), Some(1));
        assert_eq!(tracker.best_level(), MatchLevel::Partial);
    }

    #[test]
    fn lower_score_wins_within_level() {
        let mut tracker = CandidateTracker::new();
        tracker.offer(0, at(MatchLevel::Fuzzy, 3), false, true);
        tracker.offer(1, at(MatchLevel::Fuzzy, 1), false, true);
        assert_eq!(tracker.winner(), Some(1));
    }

    #[test]
    fn equal_score_keeps_earlier() {
        let mut tracker = CandidateTracker::new();
        tracker.offer(0, at(MatchLevel::Fuzzy, 2), false, true);
        tracker.offer(1, at(MatchLevel::Fuzzy, 2), false, true);
        assert_eq!(tracker.winner(), Some(0));
    }

    #[test]
    fn variadic_never_displaces_fixed_at_same_level() {
        let mut tracker = CandidateTracker::new();
        tracker.offer(0, at(MatchLevel::Fuzzy, 5), false, true);
        tracker.offer(1, at(MatchLevel::Fuzzy, 0), true, true);
        assert_eq!(tracker.winner(), Some(0));
    }

    #[test]
    fn exact_in_matching_context_stops() {
        let mut tracker = CandidateTracker::new();
        assert_eq!(tracker.offer(0, at(MatchLevel::Exact, 0), false, true), Offer::Stop);
        assert_eq!(tracker.winner(), Some(0));
    }

    #[test]
    fn exact_in_other_context_keeps_scanning() {
        let mut tracker = CandidateTracker::new();
        assert_eq!(
            tracker.offer(0, at(MatchLevel::Exact, 0), true, false),
            Offer::Continue
        );
        assert_eq!(tracker.offer(1, at(MatchLevel::Exact, 0), false, true), Offer::Stop);
        assert_eq!(tracker.winner(), Some(1));
    }

    #[test]
    fn exact_does_not_record_score() {
        let mut tracker = CandidateTracker::new();
        tracker.offer(0, at(MatchLevel::Exact, 7), false, false);
        assert_eq!(tracker.score, -1);
    }

    #[test]
    fn no_match_is_ignored() {
        let mut tracker = CandidateTracker::new();
        tracker.offer(0, at(MatchLevel::NoMatch, 0), false, true);
        assert_eq!(tracker.winner(), None);
    }
}
