use super::{Point, Vector};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Speed(pub Vector);

impl Speed {
    pub fn new(h_speed: f64, v_speed: f64) -> Self {
        Self(Vector::new(h_speed, v_speed))
    }

    pub fn h_speed(&self) -> f64 {
        self.0.dx
    }

    pub fn v_speed(&self) -> f64 {
        self.0.dy
    }

    pub fn add(self, other: Speed) -> Speed {
        Speed(self.0.add(other.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Acceleration(pub Vector);

impl Acceleration {
    pub fn new(ax: f64, ay: f64) -> Self {
        Self(Vector::new(ax, ay))
    }

    pub fn add(self, other: Acceleration) -> Acceleration {
        Acceleration(self.0.add(other.0))
    }

    /// Speed gained when applied for `dt`.
    pub fn over(self, dt: f64) -> Speed {
        Speed(self.0.scale(dt))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Particle {
    pub position: Point,
    pub speed: Speed,
}

impl Particle {
    pub fn new(position: Point, speed: Speed) -> Self {
        Self { position, speed }
    }

    /// Constant acceleration step. Position and speed are snapped to whole
    /// units afterwards (ties to even), so every tick lands on the integer grid.
    pub fn accelerate(&self, acceleration: Acceleration, dt: f64) -> Particle {
        let position = self
            .position
            .add(self.speed.0.scale(dt))
            .add(acceleration.0.scale(dt * dt * 0.5));
        let speed = self.speed.add(acceleration.over(dt));
        Particle {
            position: Point::new(position.x.round_ties_even(), position.y.round_ties_even()),
            speed: Speed::new(
                speed.h_speed().round_ties_even(),
                speed.v_speed().round_ties_even(),
            ),
        }
    }
}
