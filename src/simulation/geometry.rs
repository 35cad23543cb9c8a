use std::str::FromStr;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
}

impl Vector {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn add(self, w: Vector) -> Vector {
        Vector {
            dx: self.dx + w.dx,
            dy: self.dy + w.dy,
        }
    }

    pub fn scale(self, k: f64) -> Vector {
        Vector {
            dx: self.dx * k,
            dy: self.dy * k,
        }
    }

    /// Counter-clockwise rotation, `degrees` converted to radians internally.
    pub fn rotate(self, degrees: f64) -> Vector {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Vector {
            dx: self.dx * cos - self.dy * sin,
            dy: self.dx * sin + self.dy * cos,
        }
    }

    pub fn magnitude(self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, v: Vector) -> Point {
        Point {
            x: self.x + v.dx,
            y: self.y + v.dy,
        }
    }

    pub fn subtract(self, p: Point) -> Vector {
        Vector {
            dx: self.x - p.x,
            dy: self.y - p.y,
        }
    }

    pub fn distance_to(self, p: Point) -> f64 {
        p.subtract(self).magnitude()
    }
}

/// Parses the "x y" form used for terrain descriptions.
impl FromStr for Point {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || Error::ParsePoint(s.to_owned());
        let mut coords = s.split_whitespace().map(|v| v.parse::<f64>());
        match (coords.next(), coords.next(), coords.next()) {
            (Some(Ok(x)), Some(Ok(y)), None) => Ok(Point::new(x, y)),
            _ => Err(err()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn is_horizontal(&self) -> bool {
        self.start.y == self.end.y
    }

    /// Whether `other` lies on this segment's line inside its x span.
    pub fn covers(&self, other: &Segment) -> bool {
        self.start.x <= other.start.x
            && other.end.x <= self.end.x
            && other.is_horizontal()
            && self.is_horizontal()
            && other.start.y == self.start.y
    }

    fn y_at(&self, x: f64) -> f64 {
        self.start.y + (x - self.start.x) * (self.end.y - self.start.y) / (self.end.x - self.start.x)
    }
}

/// Where a point lies relative to the terrain directly below or above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainSide {
    Above,
    On,
    Below,
}

/// Piecewise linear terrain with strictly increasing x coordinates.
#[derive(Debug, Clone)]
pub struct Ground {
    points: Vec<Point>,
}

/// Plateau terrain with a single pad between x = 4000 and x = 5500.
impl Default for Ground {
    fn default() -> Self {
        let points = [
            (0., 100.),
            (1000., 500.),
            (1500., 1500.),
            (3000., 1000.),
            (4000., 150.),
            (5500., 150.),
            (6999., 800.),
        ];
        Self {
            points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        }
    }
}

impl Ground {
    pub fn try_new(points: Vec<Point>) -> Result<Self, Error> {
        if points.len() < 2 {
            return Err(Error::InvalidGround(format!(
                "at least 2 points required, got {}",
                points.len()
            )));
        }
        if let Some(w) = points.windows(2).find(|w| w[0].x >= w[1].x) {
            return Err(Error::InvalidGround(format!(
                "x coordinates must strictly increase ({} >= {})",
                w[0].x, w[1].x
            )));
        }
        Ok(Self { points })
    }

    pub fn parse<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Self, Error> {
        Self::try_new(
            lines
                .into_iter()
                .map(str::parse)
                .collect::<Result<Vec<Point>, Error>>()?,
        )
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn spans(&self, x: f64) -> bool {
        let (first, last) = (self.points[0], self.points[self.points.len() - 1]);
        first.x <= x && x <= last.x
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.points.windows(2).map(|w| Segment {
            start: w[0],
            end: w[1],
        })
    }

    /// First segment whose x span contains `x`, shared vertices belong to the left segment.
    pub fn segment_at(&self, x: f64) -> Option<Segment> {
        self.segments().find(|s| s.start.x <= x && x <= s.end.x)
    }

    pub fn y_at(&self, x: f64) -> Result<f64, Error> {
        self.segment_at(x)
            .map(|s| s.y_at(x))
            .ok_or(Error::OutOfTerrain { x })
    }

    pub fn is_horizontal_at(&self, x: f64) -> Result<bool, Error> {
        self.segment_at(x)
            .map(|s| s.is_horizontal())
            .ok_or(Error::OutOfTerrain { x })
    }

    pub fn compare_to_terrain(&self, point: Point) -> Result<TerrainSide, Error> {
        let terrain_y = self.y_at(point.x)?;
        Ok(if point.y > terrain_y {
            TerrainSide::Above
        } else if point.y == terrain_y {
            TerrainSide::On
        } else {
            TerrainSide::Below
        })
    }

    /// First maximal horizontal run, collinear segments merged into one.
    pub fn landing_zone(&self) -> Result<Segment, Error> {
        let mut segments = self.segments().skip_while(|s| !s.is_horizontal());
        let first = segments.next().ok_or(Error::NoLandingZone)?;
        let end = segments
            .take_while(|s| s.is_horizontal())
            .last()
            .map_or(first.end, |s| s.end);
        Ok(Segment {
            start: first.start,
            end,
        })
    }
}
