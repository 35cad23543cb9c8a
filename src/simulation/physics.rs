use super::{Acceleration, Particle, Point, Speed, Vector};
use crate::Error;

pub(crate) mod defaults {
    pub const G: f64 = 3.711;
    pub const ANGLE_STEP: i32 = 15;
    pub const POWER_STEP: i32 = 1;
    pub const POWER_MAX: i32 = 4;
    pub const ANGLE_LIMIT: i32 = 90;
    pub const DT: f64 = 1.;
}

/// Requested control input for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Command {
    pub angle: i32,
    pub power: i32,
}

impl Command {
    pub fn new(angle: i32, power: i32) -> Self {
        Self { angle, power }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LanderState {
    pub fuel: i32,
    pub power: i32,
    pub angle: i32,
    pub particle: Particle,
}

impl LanderState {
    /// Idle lander at rest.
    pub fn at_rest(position: Point, fuel: i32) -> Self {
        Self::default()
            .with_position(position)
            .with_fuel(fuel)
    }

    pub fn with_position(self, position: Point) -> Self {
        Self {
            particle: Particle {
                position,
                ..self.particle
            },
            ..self
        }
    }

    pub fn with_speed(self, h_speed: f64, v_speed: f64) -> Self {
        Self {
            particle: Particle {
                speed: Speed::new(h_speed, v_speed),
                ..self.particle
            },
            ..self
        }
    }

    pub fn with_fuel(self, fuel: i32) -> Self {
        Self { fuel, ..self }
    }

    pub fn with_angle(self, angle: i32) -> Self {
        Self { angle, ..self }
    }

    pub fn with_power(self, power: i32) -> Self {
        Self { power, ..self }
    }

    pub fn position(&self) -> Point {
        self.particle.position
    }

    pub fn h_speed(&self) -> f64 {
        self.particle.speed.h_speed()
    }

    pub fn v_speed(&self) -> f64 {
        self.particle.speed.v_speed()
    }
}

/// Moves `current` towards `requested` by at most `max_step`.
pub fn slew(current: i32, requested: i32, max_step: i32) -> i32 {
    current + (requested - current).clamp(-max_step, max_step)
}

pub struct Physics {
    gravity: Acceleration,
    dt: f64,
    power_step: i32,
    angle_step: i32,
    power_max: i32,
    angle_limit: i32,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            gravity: Acceleration::new(0., -defaults::G),
            dt: defaults::DT,
            power_step: defaults::POWER_STEP,
            angle_step: defaults::ANGLE_STEP,
            power_max: defaults::POWER_MAX,
            angle_limit: defaults::ANGLE_LIMIT,
        }
    }
}

impl Physics {
    pub fn with_g(self, g: f64) -> Self {
        Self {
            gravity: Acceleration::new(0., -g),
            ..self
        }
    }

    pub fn with_dt(self, dt: f64) -> Self {
        assert!(dt > 0.);
        Self { dt, ..self }
    }

    /// Achieved angle and power after the actuator slew limits.
    pub fn clamp_command(&self, lander: &LanderState, cmd: Command) -> Command {
        Command {
            angle: slew(lander.angle, cmd.angle, self.angle_step),
            power: slew(lander.power, cmd.power, self.power_step),
        }
    }

    pub fn iterate(&self, lander: &LanderState, cmd: Command) -> Result<LanderState, Error> {
        if !self.validate_command(&cmd) {
            return Err(Error::InvalidCommand(cmd));
        }

        let Command { angle, power } = self.clamp_command(lander, cmd);
        let thrust = Acceleration(Vector::new(0., 1.).scale(power as f64).rotate(angle as f64));

        Ok(LanderState {
            fuel: lander.fuel - power,
            power,
            angle,
            particle: lander
                .particle
                .accelerate(self.gravity.add(thrust), self.dt),
        })
    }

    fn validate_command(&self, cmd: &Command) -> bool {
        cmd.angle.abs() <= self.angle_limit && (0..=self.power_max).contains(&cmd.power)
    }
}

#[cfg(test)]
mod physics_tests {
    use super::*;

    fn lander() -> LanderState {
        LanderState::at_rest(Point::new(500., 500.), 200)
    }

    #[test]
    fn clamping() {
        let state = Physics::default()
            .iterate(&lander(), Command::new(90, 4))
            .unwrap();
        assert_eq!(state.angle, 15);
        assert_eq!(state.power, 1);

        let state = Physics::default()
            .iterate(&state, Command::new(-90, 0))
            .unwrap();
        assert_eq!(state.angle, 0);
        assert_eq!(state.power, 0);
    }

    #[test]
    fn rate_limit_holds_for_any_request() {
        let physics = Physics::default();
        let mut state = lander().with_fuel(10_000);
        let requests = [(90, 4), (-90, 0), (-90, 4), (45, 2), (0, 0), (90, 4), (-15, 3)];
        for _ in 0..5 {
            for (angle, power) in requests {
                let next = physics.iterate(&state, Command::new(angle, power)).unwrap();
                assert!((next.angle - state.angle).abs() <= 15);
                assert!((next.power - state.power).abs() <= 1);
                state = next;
            }
        }
    }

    #[test]
    fn invalid_command() {
        for cmd in [Command::new(91, 0), Command::new(0, 5), Command::new(0, -1)] {
            assert!(matches!(
                Physics::default().iterate(&lander(), cmd),
                Err(Error::InvalidCommand(c)) if c == cmd
            ));
        }
    }

    #[test]
    fn free_fall() {
        let state = Physics::default()
            .iterate(&lander(), Command::default())
            .unwrap();
        assert_eq!(state.position(), Point::new(500., 498.));
        assert_eq!(state.v_speed(), -4.);
        assert_eq!(state.fuel, 200);
    }

    #[test]
    fn custom_gravity_and_step() {
        let physics = Physics::default().with_g(2.).with_dt(2.);
        let state = physics.iterate(&lander(), Command::default()).unwrap();
        assert_eq!(state.position(), Point::new(500., 496.));
        assert_eq!(state.v_speed(), -4.);
    }

    #[test]
    fn thrust_tilts_sideways() {
        let physics = Physics::default();
        let mut state = lander().with_power(4);
        for _ in 0..6 {
            state = physics.iterate(&state, Command::new(-90, 4)).unwrap();
        }
        assert_eq!(state.angle, -90);
        assert!(state.h_speed() > 0.);

        let mut state = lander().with_power(4);
        for _ in 0..6 {
            state = physics.iterate(&state, Command::new(90, 4)).unwrap();
        }
        assert!(state.h_speed() < 0.);
    }

    #[test]
    fn fuel_consumption() {
        let physics = Physics::default();
        let state = physics.iterate(&lander(), Command::new(0, 4)).unwrap();
        assert_eq!(state.fuel, 199);
        let state = physics.iterate(&state, Command::new(0, 4)).unwrap();
        assert_eq!(state.fuel, 197);
    }

    #[test]
    fn slew_steps() {
        assert_eq!(slew(0, 90, 15), 15);
        assert_eq!(slew(0, -7, 15), -7);
        assert_eq!(slew(3, 0, 1), 2);
        assert_eq!(slew(2, 2, 1), 2);
    }
}
