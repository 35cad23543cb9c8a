use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::simulation::*;
use crate::Error;

/// Terrain and starting conditions of one landing problem.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub ground: Ground,
    pub initial_position: Point,
    pub fuel: i32,
}

impl Scenario {
    pub fn try_new(ground: Ground, initial_position: Point, fuel: i32) -> Result<Self, Error> {
        ground.landing_zone()?;
        Ok(Self {
            ground,
            initial_position,
            fuel,
        })
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            ground: Ground::default(),
            initial_position: Point::new(2500., 2700.),
            fuel: 5000,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub population_size: usize,
    pub chromosome_size: usize,
    pub mutation_prob: f64,
    pub elitism: f64,
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            population_size: 200,
            chromosome_size: 100,
            mutation_prob: 0.08,
            elitism: 0.1,
            seed: 0,
        }
    }
}

pub struct App {
    scenario: Scenario,
    population: Population,
    rng: ChaCha8Rng,
}

impl App {
    /// Builds the first generation and scores it.
    pub fn try_new(scenario: Scenario, settings: Settings) -> Result<Self, Error> {
        let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);
        let population = Population::try_new(
            settings.chromosome_size,
            settings.mutation_prob,
            settings.population_size,
            &mut rng,
        )?
        .with_elitism_ratio(settings.elitism)?;

        let mut app = Self {
            scenario,
            population,
            rng,
        };
        app.evaluate()?;
        Ok(app)
    }

    fn evaluate(&mut self) -> Result<(), Error> {
        let Scenario {
            ground,
            initial_position,
            fuel,
        } = &self.scenario;
        self.population.simulate(*initial_position, *fuel, ground)?;
        self.population.calculate_fitness();
        self.population.landing_zone_reached();
        Ok(())
    }

    /// Breeds and scores the next generation.
    pub fn next_population(&mut self) -> Result<(), Error> {
        self.population.selection()?;
        self.population.next_generation(&mut self.rng)?;
        self.evaluate()?;
        debug!("{}", self.population);
        Ok(())
    }

    /// Evolves until a lander lands or `max_generations` more generations
    /// were bred. Returns the generation holding the landing.
    pub fn solve(&mut self, max_generations: usize) -> Result<Option<usize>, Error> {
        for _ in 0..max_generations {
            if self.is_solved() {
                break;
            }
            self.next_population()?;
        }
        if self.is_solved() {
            info!(generation = self.population.generation(), "Solved");
            Ok(Some(self.population.generation()))
        } else {
            Ok(None)
        }
    }

    pub fn is_solved(&self) -> bool {
        self.population.is_solved()
    }

    pub fn get_population(&self) -> &Population {
        &self.population
    }

    pub fn get_population_id(&self) -> usize {
        self.population.generation()
    }

    pub fn get_routes(&self) -> impl Iterator<Item = &Trajectory> + '_ {
        self.population.flights().iter().map(|f| &f.trajectory)
    }

    pub fn get_scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn get_terrain(&self) -> &Ground {
        &self.scenario.ground
    }
}
