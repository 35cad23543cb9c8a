use super::{CollisionChecker, Command, FlightOutcome, Ground, LanderState, Physics, Segment};
use crate::Error;

/// States of one flight, the initial one first.
#[derive(Clone, Debug)]
pub struct Trajectory {
    states: Vec<LanderState>,
}

impl Trajectory {
    pub fn with_initial_state(state: LanderState) -> Self {
        Self {
            states: vec![state],
        }
    }

    fn append_lander_state(&mut self, state: LanderState) {
        self.states.push(state);
    }

    pub fn states(&self) -> &[LanderState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn last(&self) -> &LanderState {
        &self.states[self.states.len() - 1]
    }

    /// State preceding the terminal one, the initial state for single-state flights.
    pub fn before_last(&self) -> &LanderState {
        &self.states[self.states.len().saturating_sub(2)]
    }

    pub fn pretty_to_string(&self) -> String {
        self.states.iter().fold(
            format!(
                "{:8}{:8}{:8}{:8}{:8}{:8}{:8}",
                "X", "Y", "VX", "VY", "FUEL", "ANGLE", "POWER"
            ),
            |out, state| {
                let (x, y) = (state.position().x, state.position().y);
                let (vx, vy) = (state.h_speed(), state.v_speed());
                let LanderState {
                    fuel, angle, power, ..
                } = state;
                out + &format!("\n{x:7} {y:7} {vx:7} {vy:7} {fuel:7} {angle:7} {power:7}")
            },
        )
    }
}

#[derive(Clone, Debug)]
pub struct Flight {
    pub trajectory: Trajectory,
    pub outcome: FlightOutcome,
    pub fitness: f64,
}

pub struct FitnessCalculator {
    landing_zone: Segment,
    max_vertical_speed: f64,
    max_horizontal_speed: f64,
}

impl FitnessCalculator {
    pub fn new(landing_zone: Segment, collision_checker: &CollisionChecker) -> Self {
        Self {
            landing_zone,
            max_vertical_speed: collision_checker.max_vertical_speed(),
            max_horizontal_speed: collision_checker.max_horizontal_speed(),
        }
    }

    /// Off the pad: inverse distance from the pad start, so closer misses
    /// score higher. On the pad: `1 - 1 / penalty` for excess speed, 1 when
    /// there is none.
    pub fn calculate_fitness(
        &self,
        ground: &Ground,
        trajectory: &Trajectory,
        outcome: FlightOutcome,
    ) -> f64 {
        if outcome == FlightOutcome::Incomplete {
            return self.distance_fitness(trajectory.last());
        }

        let last_state = trajectory.before_last();
        let on_pad = ground
            .segment_at(last_state.position().x)
            .is_some_and(|s| self.landing_zone.covers(&s));
        if !on_pad {
            return self.distance_fitness(last_state);
        }

        let x_penalty = (last_state.h_speed().abs() - self.max_horizontal_speed).max(0.);
        let y_penalty = (-self.max_vertical_speed - last_state.v_speed()).max(0.);
        let penalty = x_penalty + y_penalty;
        if penalty == 0. {
            1.
        } else {
            1. - 1. / penalty
        }
    }

    // Positions sit on the integer grid, so any miss is at least one unit away.
    fn distance_fitness(&self, state: &LanderState) -> f64 {
        1. / self.landing_zone.start.distance_to(state.position()).max(1.)
    }
}

/// Replays command sequences against one ground.
pub struct LanderRunner<'a> {
    ground: &'a Ground,
    physics: Physics,
    collision_checker: CollisionChecker,
    fitness_calculator: FitnessCalculator,
}

impl<'a> LanderRunner<'a> {
    pub fn try_new(ground: &'a Ground) -> Result<Self, Error> {
        Self::try_with(ground, Physics::default(), CollisionChecker::default())
    }

    pub fn try_with(
        ground: &'a Ground,
        physics: Physics,
        collision_checker: CollisionChecker,
    ) -> Result<Self, Error> {
        let fitness_calculator = FitnessCalculator::new(ground.landing_zone()?, &collision_checker);
        Ok(Self {
            ground,
            physics,
            collision_checker,
            fitness_calculator,
        })
    }

    pub fn fly(
        &self,
        initial_state: LanderState,
        commands: impl IntoIterator<Item = Command>,
    ) -> Result<Flight, Error> {
        let mut trajectory = Trajectory::with_initial_state(initial_state);
        let mut outcome = FlightOutcome::Incomplete;

        for cmd in commands {
            let next_state = self.physics.iterate(trajectory.last(), cmd)?;
            trajectory.append_lander_state(next_state);
            if let Some(terminal) = self.collision_checker.check(self.ground, &next_state)? {
                outcome = terminal;
                break;
            }
        }

        let fitness = self
            .fitness_calculator
            .calculate_fitness(self.ground, &trajectory, outcome);
        Ok(Flight {
            trajectory,
            outcome,
            fitness,
        })
    }
}

#[cfg(test)]
mod lander_runner_tests {
    use super::*;
    use crate::simulation::{CrashReason, Point};

    fn ground() -> Ground {
        Ground::parse([
            "0 100", "1000 500", "1500 1500", "3000 1000", "4000 150", "5500 150", "6999 800",
        ])
        .unwrap()
    }

    fn assert_feq(left: f64, right: f64) {
        if (left - right).abs() > 1e-9 {
            panic!("Float equal assertion failed, {left} != {right}");
        }
    }

    fn calculator() -> FitnessCalculator {
        FitnessCalculator::new(
            ground().landing_zone().unwrap(),
            &CollisionChecker::default(),
        )
    }

    fn trajectory(states: &[LanderState]) -> Trajectory {
        let mut trajectory = Trajectory::with_initial_state(states[0]);
        states[1..]
            .iter()
            .for_each(|s| trajectory.append_lander_state(*s));
        trajectory
    }

    fn at(x: f64, y: f64) -> LanderState {
        LanderState::at_rest(Point::new(x, y), 100)
    }

    #[test]
    fn no_landing_zone() {
        let ground = Ground::parse(["0 100", "7000 500"]).unwrap();
        assert!(matches!(
            LanderRunner::try_new(&ground),
            Err(Error::NoLandingZone)
        ));
    }

    #[test]
    fn free_fall_crash() {
        let ground = ground();
        let flight = LanderRunner::try_new(&ground)
            .unwrap()
            .fly(
                LanderState::at_rest(Point::new(2500., 2700.), 5000),
                std::iter::repeat(Command::default()).take(100),
            )
            .unwrap();
        assert_eq!(
            flight.outcome,
            FlightOutcome::Crashed(CrashReason::WrongTerrain)
        );
        assert!(flight.trajectory.len() < 101);
        let before = flight.trajectory.before_last().position();
        assert_feq(
            flight.fitness,
            1. / Point::new(4000., 150.).distance_to(before),
        );
    }

    #[test]
    fn invalid_command_is_rejected() {
        let ground = ground();
        let result = LanderRunner::try_new(&ground)
            .unwrap()
            .fly(at(2500., 2700.), [Command::new(0, 9)]);
        assert!(matches!(result, Err(Error::InvalidCommand(_))));
    }

    #[test]
    fn incomplete_flight() {
        let ground = ground();
        let flight = LanderRunner::try_new(&ground)
            .unwrap()
            .fly(at(4500., 2700.), [Command::new(0, 4); 3])
            .unwrap();
        assert_eq!(flight.outcome, FlightOutcome::Incomplete);
        assert_eq!(flight.trajectory.len(), 4);
        let last = flight.trajectory.last().position();
        assert_feq(
            flight.fitness,
            1. / Point::new(4000., 150.).distance_to(last),
        );
    }

    #[test]
    fn empty_command_sequence() {
        let ground = ground();
        let flight = LanderRunner::try_new(&ground)
            .unwrap()
            .fly(at(2500., 2700.), std::iter::empty())
            .unwrap();
        assert_eq!(flight.outcome, FlightOutcome::Incomplete);
        assert_eq!(flight.trajectory.len(), 1);
    }

    #[test]
    fn off_pad_fitness() {
        let ground = ground();
        let trajectory = trajectory(&[at(2500., 2700.), at(3500., 800.), at(3600., 500.)]);
        let fitness = calculator().calculate_fitness(
            &ground,
            &trajectory,
            FlightOutcome::Crashed(CrashReason::WrongTerrain),
        );
        assert_feq(fitness, 1. / Point::new(4000., 150.).distance_to(Point::new(3500., 800.)));
    }

    #[test]
    fn closer_miss_scores_higher() {
        let ground = ground();
        let crashed = FlightOutcome::Crashed(CrashReason::WrongTerrain);
        let far = trajectory(&[at(1200., 2000.), at(1200., 1500.)]);
        let near = trajectory(&[at(3500., 900.), at(3500., 500.)]);
        assert!(
            calculator().calculate_fitness(&ground, &near, crashed)
                > calculator().calculate_fitness(&ground, &far, crashed)
        );
    }

    #[test]
    fn perfect_landing_fitness() {
        let ground = ground();
        let trajectory = trajectory(&[
            at(4500., 200.).with_speed(-20., -40.),
            at(4480., 150.).with_speed(-20., -40.),
        ]);
        assert_eq!(
            calculator().calculate_fitness(&ground, &trajectory, FlightOutcome::Landed),
            1.
        );
    }

    #[test]
    fn too_fast_on_pad_fitness() {
        let ground = ground();
        let crashed = FlightOutcome::Crashed(CrashReason::TooFastVertical);
        let flown = |h: f64, v: f64| {
            trajectory(&[at(4500., 200.).with_speed(h, v), at(4500., 140.)])
        };
        assert_feq(
            calculator().calculate_fitness(&ground, &flown(25., -50.), crashed),
            1. - 1. / 15.,
        );
        assert_feq(
            calculator().calculate_fitness(&ground, &flown(-22., -10.), crashed),
            0.5,
        );
        // climbing fast is not penalised
        assert_eq!(
            calculator().calculate_fitness(&ground, &flown(0., 60.), crashed),
            1.
        );
    }

    #[test]
    fn landing_on_split_pad() {
        let ground = Ground::parse(["0 500", "1000 100", "2000 100", "2500 100", "6999 900"]).unwrap();
        let calculator =
            FitnessCalculator::new(ground.landing_zone().unwrap(), &CollisionChecker::default());
        let crashed = FlightOutcome::Crashed(CrashReason::TooFastVertical);
        for x in [1500., 2200.] {
            let trajectory = trajectory(&[at(x, 150.).with_speed(0., -45.), at(x, 90.)]);
            assert_feq(
                calculator.calculate_fitness(&ground, &trajectory, crashed),
                1. - 1. / 5.,
            );
        }
    }

    #[test]
    fn pretty_print() {
        let printed = trajectory(&[at(1., 2.), at(3., 4.)]).pretty_to_string();
        assert_eq!(printed.lines().count(), 3);
        assert!(printed.starts_with("X"));
    }
}
