mod chromosome;
mod collision;
mod geometry;
mod kinematics;
mod lander_runner;
mod physics;
mod solver;

pub use chromosome::*;
pub use collision::*;
pub use geometry::*;
pub use kinematics::*;
pub use lander_runner::*;
pub use physics::*;
pub use solver::*;
