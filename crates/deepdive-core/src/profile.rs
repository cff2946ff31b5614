//! Thread profile: how the user's attention split across the four threads.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::persona;
use crate::session::DeepDiveSession;
use crate::thread::ThreadId;

/// Share of the second thread, in percent, above which it is called out.
const SECONDARY_THRESHOLD: u8 = 10;

/// Percentage split over the four threads.
///
/// Always computed from thread depths; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadProfile {
    /// Percent per thread; the four values sum to exactly 100.
    pub percentages: BTreeMap<ThreadId, u8>,
    /// Deepest thread, ties broken by priority. `None` when nothing was activated.
    pub dominant: Option<ThreadId>,
    /// Runner-up thread when it holds more than 10%.
    pub secondary: Option<ThreadId>,
    pub interpretation: String,
}

impl ThreadProfile {
    pub fn percent(&self, thread: ThreadId) -> u8 {
        self.percentages.get(&thread).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.percentages.values().map(|p| u32::from(*p)).sum()
    }
}

/// Turns thread depths into a [`ThreadProfile`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadProfileCalculator;

impl ThreadProfileCalculator {
    pub fn compute(&self, session: &DeepDiveSession) -> ThreadProfile {
        let depths: Vec<(ThreadId, u32)> = ThreadId::ALL
            .into_iter()
            .map(|id| (id, session.depth(id)))
            .collect();
        let total: u64 = depths.iter().map(|(_, d)| u64::from(*d)).sum();

        if total == 0 {
            return ThreadProfile {
                percentages: ThreadId::ALL.into_iter().map(|id| (id, 25)).collect(),
                dominant: None,
                secondary: None,
                interpretation: "Not enough signal yet to say which lens dominates. None of the \
                    threads were explored, so the split is even by default."
                    .to_string(),
            };
        }

        // Stable sort keeps priority order among equal depths.
        let mut ranked = depths.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        let dominant = ranked[0].0;

        let mut percentages: BTreeMap<ThreadId, u8> = depths
            .iter()
            .map(|(id, depth)| (*id, (u64::from(*depth) * 100 / total) as u8))
            .collect();
        let assigned: u32 = percentages.values().map(|p| u32::from(*p)).sum();
        if let Some(share) = percentages.get_mut(&dominant) {
            *share += (100 - assigned) as u8;
        }

        let secondary = ranked
            .get(1)
            .map(|(id, _)| *id)
            .filter(|id| percentages.get(id).copied().unwrap_or(0) > SECONDARY_THRESHOLD);

        let interpretation = interpret(&percentages, dominant, secondary);

        ThreadProfile {
            percentages,
            dominant: Some(dominant),
            secondary,
            interpretation,
        }
    }
}

fn interpret(
    percentages: &BTreeMap<ThreadId, u8>,
    dominant: ThreadId,
    secondary: Option<ThreadId>,
) -> String {
    let name = |id: ThreadId| persona::profile(id.persona()).name;
    let pct = |id: ThreadId| percentages.get(&id).copied().unwrap_or(0);

    match secondary {
        Some(second) => format!(
            "You're {}% {}-profile, {}% {}-profile. That tension is useful: \
             you're weighing both {} and {}.",
            pct(dominant),
            name(dominant),
            pct(second),
            name(second),
            dominant.concern(),
            second.concern()
        ),
        None => format!(
            "You're strongly {}-focused ({}%). That's not bad, but consider what the other \
             council members might be seeing that you're not.",
            name(dominant),
            pct(dominant)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_depths(depths: [u32; 4]) -> DeepDiveSession {
        let mut session = DeepDiveSession::new("p");
        for (id, depth) in ThreadId::ALL.into_iter().zip(depths) {
            for _ in 0..depth {
                session.thread_mut(id).deepen(1);
            }
        }
        session
    }

    #[test]
    fn test_zero_signal_is_uniform_without_dominant() {
        let profile = ThreadProfileCalculator.compute(&DeepDiveSession::new("p"));
        assert!(ThreadId::ALL.iter().all(|id| profile.percent(*id) == 25));
        assert_eq!(profile.dominant, None);
        assert!(profile.interpretation.contains("Not enough signal"));
    }

    #[test]
    fn test_remainder_goes_to_dominant() {
        // 1/3 each across three threads: 33 + 33 + 33 = 99.
        let profile = ThreadProfileCalculator.compute(&session_with_depths([0, 1, 1, 1]));
        assert_eq!(profile.total(), 100);
        assert_eq!(profile.dominant, Some(ThreadId::Psychological));
        assert_eq!(profile.percent(ThreadId::Psychological), 34);
        assert_eq!(profile.percent(ThreadId::Social), 33);
    }

    #[test]
    fn test_ties_break_by_priority() {
        let profile = ThreadProfileCalculator.compute(&session_with_depths([2, 0, 0, 2]));
        assert_eq!(profile.dominant, Some(ThreadId::Pragmatic));
        assert_eq!(profile.secondary, Some(ThreadId::Social));
        assert!(profile.interpretation.contains("Rocky"));
    }

    #[test]
    fn test_sums_to_hundred_for_awkward_depths() {
        for depths in [[1, 1, 1, 4], [7, 3, 2, 1], [0, 0, 0, 9], [5, 5, 5, 6], [1, 2, 3, 5]] {
            let profile = ThreadProfileCalculator.compute(&session_with_depths(depths));
            assert_eq!(profile.total(), 100, "depths {:?}", depths);
        }
    }

    #[test]
    fn test_single_thread_has_no_secondary() {
        let profile = ThreadProfileCalculator.compute(&session_with_depths([0, 0, 3, 0]));
        assert_eq!(profile.percent(ThreadId::Analytical), 100);
        assert_eq!(profile.secondary, None);
        assert!(profile.interpretation.contains("strongly Cogni-focused"));
    }
}
