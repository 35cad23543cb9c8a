use std::fmt::Display;

use crate::simulation::Command;

#[derive(Debug)]
pub enum Error {
    InvalidGround(String),
    NoLandingZone,
    OutOfTerrain { x: f64 },
    ParsePoint(String),
    InvalidCommand(Command),
    ChromosomeSizeMismatch { left: usize, right: usize },
    EmptyParentPool,
    InvalidSettings(String),
    Init(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidGround(reason) => write!(f, "Invalid ground: {reason}"),
            Error::NoLandingZone => write!(f, "Ground has no horizontal landing zone"),
            Error::OutOfTerrain { x } => write!(f, "x = {x} lies outside of the terrain"),
            Error::ParsePoint(input) => write!(f, "Can't parse point from {input:?}"),
            Error::InvalidCommand(cmd) => write!(f, "Invalid command {cmd:?}"),
            Error::ChromosomeSizeMismatch { left, right } => {
                write!(f, "Chromosome sizes differ ({left} != {right})")
            }
            Error::EmptyParentPool => write!(f, "No member with positive fitness to breed from"),
            Error::InvalidSettings(reason) => write!(f, "Invalid settings: {reason}"),
            Error::Init(reason) => write!(f, "Initialization failed: {reason}"),
        }
    }
}

impl std::error::Error for Error {}
