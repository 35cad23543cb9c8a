use super::{Ground, LanderState, TerrainSide};
use crate::Error;

mod defaults {
    pub const MIN_X: f64 = 0.;
    pub const MAX_X: f64 = 6999.;
    pub const MAX_VERTICAL_SPEED: f64 = 40.;
    pub const MAX_HORIZONTAL_SPEED: f64 = 20.;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashReason {
    OutOfMap,
    WrongTerrain,
    NotVertical,
    TooFastHorizontal,
    TooFastVertical,
    OutOfFuel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightOutcome {
    Landed,
    Crashed(CrashReason),
    /// Commands ran out before any terminal condition.
    Incomplete,
}

impl FlightOutcome {
    pub fn is_landed(&self) -> bool {
        matches!(self, FlightOutcome::Landed)
    }
}

pub struct CollisionChecker {
    min_x: f64,
    max_x: f64,
    max_vertical_speed: f64,
    max_horizontal_speed: f64,
}

impl Default for CollisionChecker {
    fn default() -> Self {
        Self {
            min_x: defaults::MIN_X,
            max_x: defaults::MAX_X,
            max_vertical_speed: defaults::MAX_VERTICAL_SPEED,
            max_horizontal_speed: defaults::MAX_HORIZONTAL_SPEED,
        }
    }
}

impl CollisionChecker {
    /// Terminal outcome reached in `state`, if any. Bounds are checked before
    /// the terrain so the terrain is only queried inside its span.
    pub fn check(&self, ground: &Ground, state: &LanderState) -> Result<Option<FlightOutcome>, Error> {
        let position = state.position();
        if position.x < self.min_x || position.x > self.max_x || !ground.spans(position.x) {
            return Ok(Some(FlightOutcome::Crashed(CrashReason::OutOfMap)));
        }

        if ground.compare_to_terrain(position)? != TerrainSide::Above {
            let outcome = if !ground.is_horizontal_at(position.x)? {
                FlightOutcome::Crashed(CrashReason::WrongTerrain)
            } else if state.angle != 0 {
                FlightOutcome::Crashed(CrashReason::NotVertical)
            } else if state.h_speed().abs() > self.max_horizontal_speed {
                FlightOutcome::Crashed(CrashReason::TooFastHorizontal)
            } else if state.v_speed().abs() > self.max_vertical_speed {
                FlightOutcome::Crashed(CrashReason::TooFastVertical)
            } else {
                FlightOutcome::Landed
            };
            return Ok(Some(outcome));
        }

        if state.fuel <= 0 {
            return Ok(Some(FlightOutcome::Crashed(CrashReason::OutOfFuel)));
        }
        Ok(None)
    }

    pub fn max_vertical_speed(&self) -> f64 {
        self.max_vertical_speed
    }

    pub fn max_horizontal_speed(&self) -> f64 {
        self.max_horizontal_speed
    }

    pub fn with_max_x(self, max_x: f64) -> Self {
        Self { max_x, ..self }
    }

    pub fn with_max_vertical_speed(self, max_vertical_speed: f64) -> Self {
        assert!(max_vertical_speed > 0.);
        Self {
            max_vertical_speed,
            ..self
        }
    }

    pub fn with_max_horizontal_speed(self, max_horizontal_speed: f64) -> Self {
        assert!(max_horizontal_speed > 0.);
        Self {
            max_horizontal_speed,
            ..self
        }
    }
}

#[cfg(test)]
mod collision_checker_tests {
    use super::*;
    use crate::simulation::Point;

    fn ground() -> Ground {
        Ground::parse(["0 100", "3500 100", "6999 150"]).unwrap()
    }

    fn checker() -> CollisionChecker {
        CollisionChecker::default()
            .with_max_x(6999.)
            .with_max_vertical_speed(40.)
            .with_max_horizontal_speed(20.)
    }

    fn state(x: f64, y: f64) -> LanderState {
        LanderState::at_rest(Point::new(x, y), 500)
    }

    fn check(state: LanderState) -> Option<FlightOutcome> {
        checker().check(&ground(), &state).unwrap()
    }

    #[test]
    fn still_in_flight() {
        assert_eq!(check(state(1500., 700.)), None);
    }

    #[test]
    fn out_of_map() {
        for x in [-1., 7000., 7100.] {
            assert_eq!(
                check(state(x, 700.)),
                Some(FlightOutcome::Crashed(CrashReason::OutOfMap))
            );
        }
    }

    #[test]
    fn out_of_map_wins_over_fuel() {
        assert_eq!(
            check(state(-5., 700.).with_fuel(0)),
            Some(FlightOutcome::Crashed(CrashReason::OutOfMap))
        );
    }

    #[test]
    fn ground_short_of_map_edge() {
        let ground = Ground::parse(["0 100", "3500 100"]).unwrap();
        assert_eq!(
            checker().check(&ground, &state(4000., 700.)).unwrap(),
            Some(FlightOutcome::Crashed(CrashReason::OutOfMap))
        );
    }

    #[test]
    fn wrong_terrain() {
        assert_eq!(
            check(state(5000., 110.)),
            Some(FlightOutcome::Crashed(CrashReason::WrongTerrain))
        );
    }

    #[test]
    fn not_vertical() {
        for angle in [15, -15] {
            assert_eq!(
                check(state(1500., 100.).with_angle(angle)),
                Some(FlightOutcome::Crashed(CrashReason::NotVertical))
            );
        }
    }

    #[test]
    fn too_fast_vertical() {
        assert_eq!(
            check(state(1500., 90.).with_speed(0., -41.)),
            Some(FlightOutcome::Crashed(CrashReason::TooFastVertical))
        );
    }

    #[test]
    fn too_fast_horizontal() {
        for h_speed in [21., -21.] {
            assert_eq!(
                check(state(1500., 90.).with_speed(h_speed, -10.)),
                Some(FlightOutcome::Crashed(CrashReason::TooFastHorizontal))
            );
        }
    }

    #[test]
    fn ground_checked_before_fuel() {
        assert_eq!(
            check(state(1500., 100.).with_speed(-20., -40.).with_fuel(0)),
            Some(FlightOutcome::Landed)
        );
    }

    #[test]
    fn out_of_fuel() {
        assert_eq!(
            check(state(1500., 500.).with_fuel(0)),
            Some(FlightOutcome::Crashed(CrashReason::OutOfFuel))
        );
        assert_eq!(
            check(state(1500., 500.).with_fuel(-3)),
            Some(FlightOutcome::Crashed(CrashReason::OutOfFuel))
        );
    }

    #[test]
    fn correct() {
        assert_eq!(
            check(state(1500., 80.).with_speed(5., -10.)),
            Some(FlightOutcome::Landed)
        );
    }
}
