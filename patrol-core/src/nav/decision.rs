//! Obstacle-avoidance decision rule and motion plans

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Steps issued to the faster wheel of every motion plan.
pub const STEPS_FULL: u16 = 512;

/// Steps issued to the slower wheel of a turn.
pub const STEPS_TURN_INNER: u16 = 256;

/// Motion command produced by the decision rule.
///
/// Turning is achieved purely by differential step counts; both wheels
/// always run forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RouteCommand {
    #[default]
    Straight,
    TurnLeft,
    TurnRight,
}

impl RouteCommand {
    /// Diagnostic line announced for this command.
    pub fn label(self) -> &'static str {
        match self {
            RouteCommand::Straight => "Continue straight",
            RouteCommand::TurnLeft => "Go left!",
            RouteCommand::TurnRight => "Go right!",
        }
    }

    /// Step counts for the (left, right) wheels.
    pub fn wheel_steps(self) -> (u16, u16) {
        match self {
            RouteCommand::Straight => (STEPS_FULL, STEPS_FULL),
            RouteCommand::TurnLeft => (STEPS_TURN_INNER, STEPS_FULL),
            RouteCommand::TurnRight => (STEPS_FULL, STEPS_TURN_INNER),
        }
    }
}

/// Evaluate the obstacle-avoidance rule for one pair of measurements.
///
/// Clear on both sides means straight ahead; otherwise steer away from
/// the nearer obstacle. An exact tie below the threshold resolves to
/// [`RouteCommand::TurnRight`].
pub fn decide(distance_right_cm: f32, distance_left_cm: f32, threshold_cm: f32) -> RouteCommand {
    if distance_right_cm >= threshold_cm && distance_left_cm >= threshold_cm {
        RouteCommand::Straight
    } else if distance_right_cm >= distance_left_cm {
        RouteCommand::TurnRight
    } else {
        RouteCommand::TurnLeft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clear_on_both_sides() {
        assert_eq!(decide(25.0, 25.0, 20.0), RouteCommand::Straight);
        assert_eq!(decide(20.0, 20.0, 20.0), RouteCommand::Straight);
    }

    #[test]
    fn test_steers_away_from_nearer_obstacle() {
        // Obstacle closer on the right: turn toward the clearer left side.
        assert_eq!(decide(10.0, 25.0, 20.0), RouteCommand::TurnLeft);
        assert_eq!(decide(25.0, 10.0, 20.0), RouteCommand::TurnRight);
    }

    #[test]
    fn test_tie_break_turns_right() {
        assert_eq!(decide(10.0, 10.0, 20.0), RouteCommand::TurnRight);
    }

    #[test]
    fn test_wheel_steps() {
        assert_eq!(RouteCommand::Straight.wheel_steps(), (512, 512));
        assert_eq!(RouteCommand::TurnLeft.wheel_steps(), (256, 512));
        assert_eq!(RouteCommand::TurnRight.wheel_steps(), (512, 256));
    }

    #[test]
    fn test_labels() {
        assert_eq!(RouteCommand::Straight.label(), "Continue straight");
        assert_eq!(RouteCommand::TurnLeft.label(), "Go left!");
        assert_eq!(RouteCommand::TurnRight.label(), "Go right!");
    }

    proptest! {
        #[test]
        fn straight_only_when_both_clear(right in 0.0f32..400.0, left in 0.0f32..400.0) {
            let cmd = decide(right, left, 20.0);
            if cmd == RouteCommand::Straight {
                prop_assert!(right >= 20.0 && left >= 20.0);
            }
        }

        #[test]
        fn turn_matches_nearer_side(right in 0.0f32..19.9, left in 0.0f32..19.9) {
            let cmd = decide(right, left, 20.0);
            if right >= left {
                prop_assert_eq!(cmd, RouteCommand::TurnRight);
            } else {
                prop_assert_eq!(cmd, RouteCommand::TurnLeft);
            }
        }
    }
}
