//! Gamification rules applied after every apparel submission.
//!
//! Each submission earns a fixed number of points. Crossing the milestone
//! threshold grants the milestone badge exactly once. Repositories apply
//! [`RewardPolicy`] atomically; the pure [`RewardPolicy::apply`] is the
//! reference they must agree with.

use super::user::{Badge, User};

/// Points granted per accepted submission.
pub const POINTS_PER_SUBMISSION: u32 = 10;
/// Points total at which the milestone badge is granted.
pub const MILESTONE_THRESHOLD: u32 = 100;
/// Label of the milestone badge.
pub const MILESTONE_BADGE: &str = "Recycling Enthusiast";

/// Reward rules for submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardPolicy {
    points_per_submission: u32,
    milestone_threshold: u32,
    milestone_badge: Badge,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            points_per_submission: POINTS_PER_SUBMISSION,
            milestone_threshold: MILESTONE_THRESHOLD,
            milestone_badge: Badge(MILESTONE_BADGE.to_owned()),
        }
    }
}

/// Reward state after one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardTally {
    pub points: u32,
    pub badges: Vec<Badge>,
    /// Badge granted by this submission, if any.
    pub awarded: Option<Badge>,
}

impl RewardPolicy {
    pub fn points_per_submission(&self) -> u32 {
        self.points_per_submission
    }

    pub fn milestone_threshold(&self) -> u32 {
        self.milestone_threshold
    }

    pub fn milestone_badge(&self) -> &Badge {
        &self.milestone_badge
    }

    /// Apply one submission to the given reward state.
    ///
    /// # Examples
    /// ```
    /// use loopwear::domain::RewardPolicy;
    ///
    /// let policy = RewardPolicy::default();
    /// let tally = policy.apply(95, &[]);
    /// assert_eq!(tally.points, 105);
    /// assert!(tally.awarded.is_some());
    ///
    /// let again = policy.apply(tally.points, &tally.badges);
    /// assert_eq!(again.points, 115);
    /// assert_eq!(again.badges.len(), 1);
    /// assert!(again.awarded.is_none());
    /// ```
    pub fn apply(&self, points: u32, badges: &[Badge]) -> RewardTally {
        let points = points.saturating_add(self.points_per_submission);
        let mut badges = badges.to_vec();
        let reached = points >= self.milestone_threshold;
        let awarded = if reached && !badges.contains(&self.milestone_badge) {
            badges.push(self.milestone_badge.clone());
            Some(self.milestone_badge.clone())
        } else {
            None
        };
        RewardTally {
            points,
            badges,
            awarded,
        }
    }
}

/// Outcome reported by a repository after applying a reward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardOutcome {
    /// The user with updated points and badges.
    pub user: User,
    /// Badge newly granted by this update, if any.
    pub awarded: Option<Badge>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, false)]
    #[case(80, 90, false)]
    #[case(89, 99, false)]
    #[case(90, 100, true)]
    #[case(95, 105, true)]
    fn applies_points_and_threshold(
        #[case] before: u32,
        #[case] after: u32,
        #[case] awarded: bool,
    ) {
        let tally = RewardPolicy::default().apply(before, &[]);
        assert_eq!(tally.points, after);
        assert_eq!(tally.awarded.is_some(), awarded);
        assert_eq!(tally.badges.len(), usize::from(awarded));
    }

    #[rstest]
    fn milestone_badge_is_granted_once() {
        let policy = RewardPolicy::default();
        let first = policy.apply(95, &[]);
        let second = policy.apply(first.points, &first.badges);
        assert_eq!(second.points, 115);
        assert_eq!(second.badges, vec![policy.milestone_badge().clone()]);
        assert!(second.awarded.is_none());
    }

    #[rstest]
    fn other_badges_are_preserved_in_order() {
        let policy = RewardPolicy::default();
        let existing = Badge::new("Early Adopter").expect("badge");
        let tally = policy.apply(100, std::slice::from_ref(&existing));
        assert_eq!(tally.badges, vec![existing, policy.milestone_badge().clone()]);
    }

    #[rstest]
    fn points_saturate_instead_of_wrapping() {
        let tally = RewardPolicy::default().apply(u32::MAX - 1, &[]);
        assert_eq!(tally.points, u32::MAX);
    }
}
