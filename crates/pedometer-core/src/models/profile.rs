// ABOUTME: User profile settings that feed goal progress and distance/calorie estimates
// ABOUTME: Setters validate inclusive ranges and leave the profile untouched on rejection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

use crate::constants::profile::{
    DEFAULT_HEIGHT_CM, DEFAULT_STEP_GOAL, DEFAULT_WEIGHT_KG, HEIGHT_CM_MAX, HEIGHT_CM_MIN,
    STEP_GOAL_MAX, STEP_GOAL_MIN, WEIGHT_KG_MAX, WEIGHT_KG_MIN,
};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// User-configured goal and body measurements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Daily step goal, 1000..=50000
    pub step_goal: u32,
    /// Body weight in kg, 30..=150
    pub weight_kg: f64,
    /// Height in cm, 100..=250
    pub height_cm: f64,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            step_goal: DEFAULT_STEP_GOAL,
            weight_kg: DEFAULT_WEIGHT_KG,
            height_cm: DEFAULT_HEIGHT_CM,
        }
    }
}

impl UserProfile {
    /// Set the daily step goal
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` if `goal` is outside 1000..=50000
    pub fn set_step_goal(&mut self, goal: u32) -> AppResult<()> {
        if !(STEP_GOAL_MIN..=STEP_GOAL_MAX).contains(&goal) {
            return Err(AppError::out_of_range(
                "step goal",
                goal,
                STEP_GOAL_MIN,
                STEP_GOAL_MAX,
            ));
        }
        self.step_goal = goal;
        Ok(())
    }

    /// Set the body weight in kg
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` if `weight_kg` is outside 30..=150 (NaN included)
    pub fn set_weight(&mut self, weight_kg: f64) -> AppResult<()> {
        if !(WEIGHT_KG_MIN..=WEIGHT_KG_MAX).contains(&weight_kg) {
            return Err(AppError::out_of_range(
                "weight (kg)",
                weight_kg,
                WEIGHT_KG_MIN,
                WEIGHT_KG_MAX,
            ));
        }
        self.weight_kg = weight_kg;
        Ok(())
    }

    /// Set the height in cm
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` if `height_cm` is outside 100..=250 (NaN included)
    pub fn set_height(&mut self, height_cm: f64) -> AppResult<()> {
        if !(HEIGHT_CM_MIN..=HEIGHT_CM_MAX).contains(&height_cm) {
            return Err(AppError::out_of_range(
                "height (cm)",
                height_cm,
                HEIGHT_CM_MIN,
                HEIGHT_CM_MAX,
            ));
        }
        self.height_cm = height_cm;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_step_goal_bounds_are_inclusive() {
        let mut profile = UserProfile::default();
        assert!(profile.set_step_goal(1_000).is_ok());
        assert!(profile.set_step_goal(50_000).is_ok());
        assert_eq!(profile.step_goal, 50_000);
    }

    #[test]
    fn test_rejected_values_leave_profile_unchanged() {
        let mut profile = UserProfile::default();
        let err = profile.set_step_goal(999).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert!(profile.set_weight(150.5).is_err());
        assert!(profile.set_height(f64::NAN).is_err());
        assert_eq!(profile, UserProfile::default());
    }

    #[test]
    fn test_weight_and_height_accept_edges() {
        let mut profile = UserProfile::default();
        profile.set_weight(30.0).unwrap();
        profile.set_height(250.0).unwrap();
        assert!((profile.weight_kg - 30.0).abs() < f64::EPSILON);
        assert!((profile.height_cm - 250.0).abs() < f64::EPSILON);
    }
}
