//! Unit test modules.

mod goal_tracker_test;
mod level_curve_test;
mod progression_engine_test;
