use std::fmt::Display;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::{debug, info, warn};

use super::{Chromosome, Flight, Ground, LanderRunner, LanderState, Point};
use crate::Error;

mod defaults {
    pub const ELITISM_RATIO: f64 = 0.1;
}

/// Genetic search over command sequences.
///
/// One generation is driven by calling, in order: [`Population::simulate`],
/// [`Population::calculate_fitness`], [`Population::selection`],
/// [`Population::next_generation`], then [`Population::landing_zone_reached`].
/// Flights and fitness of the last simulated generation stay available
/// until the next call to [`Population::simulate`].
pub struct Population {
    population_size: usize,
    gene_size: usize,
    mutation_rate: f64,
    elitism_ratio: f64,
    members: Vec<Chromosome>,
    population_fitness: Vec<f64>,
    parents: Vec<usize>,
    probabilities: Vec<f64>,
    flights: Vec<Flight>,
    // members that flew `flights`, set once they are replaced by their children
    flown: Vec<Chromosome>,
    generation: usize,
    solved: bool,
}

impl Population {
    pub fn try_new(
        gene_size: usize,
        mutation_rate: f64,
        population_size: usize,
        rng: &mut impl Rng,
    ) -> Result<Self, Error> {
        if gene_size == 0 {
            return Err(Error::InvalidSettings(
                "Chromosome size has to be positive".to_owned(),
            ));
        }
        if population_size < 2 {
            return Err(Error::InvalidSettings(format!(
                "Population size ({population_size}) has to be at least 2"
            )));
        }
        if !(0f64..=1f64).contains(&mutation_rate) {
            return Err(Error::InvalidSettings(format!(
                "MutationProb ({mutation_rate}) out of range [0,1]"
            )));
        }
        Ok(Self {
            population_size,
            gene_size,
            mutation_rate,
            elitism_ratio: defaults::ELITISM_RATIO,
            members: (0..population_size)
                .map(|_| Chromosome::new_random(gene_size, rng))
                .collect(),
            population_fitness: Vec::new(),
            parents: Vec::new(),
            probabilities: Vec::new(),
            flights: Vec::new(),
            flown: Vec::new(),
            generation: 0,
            solved: false,
        })
    }

    pub fn with_elitism_ratio(self, elitism_ratio: f64) -> Result<Self, Error> {
        if !(0f64..=1f64).contains(&elitism_ratio) {
            return Err(Error::InvalidSettings(format!(
                "Elitism ({elitism_ratio}) out of range [0,1]"
            )));
        }
        Ok(Self {
            elitism_ratio,
            ..self
        })
    }

    /// Flies every member from an idle lander at rest.
    pub fn simulate(&mut self, initial_position: Point, fuel: i32, ground: &Ground) -> Result<(), Error> {
        let runner = LanderRunner::try_new(ground)?;
        let initial_state = LanderState::at_rest(initial_position, fuel);
        self.flights = self
            .members
            .iter()
            .map(|member| runner.fly(initial_state, member.commands()))
            .collect::<Result<Vec<_>, Error>>()?;
        self.flown.clear();
        Ok(())
    }

    pub fn calculate_fitness(&mut self) {
        self.population_fitness = self
            .members
            .iter_mut()
            .zip(&self.flights)
            .map(|(member, flight)| {
                member.set_fitness(flight.fitness);
                flight.fitness
            })
            .collect();
        debug!(
            generation = self.generation,
            max_fitness = self.max_fitness(),
            "Fitness calculated"
        );
    }

    /// Fitness proportionate parent pool: members with positive fitness,
    /// weighted by their fitness normalised to the best one.
    pub fn selection(&mut self) -> Result<(), Error> {
        self.parents.clear();
        self.probabilities.clear();

        let max_fitness = self.max_fitness();
        if max_fitness <= 0. {
            warn!(generation = self.generation, "No member with positive fitness");
            return Err(Error::EmptyParentPool);
        }

        for (id, member) in self.members.iter().enumerate() {
            if member.fitness() > 0. {
                self.parents.push(id);
                self.probabilities.push(member.fitness() / max_fitness);
            }
        }
        let total: f64 = self.probabilities.iter().sum();
        self.probabilities.iter_mut().for_each(|p| *p /= total);

        debug!(
            generation = self.generation,
            parents = self.parents.len(),
            "Selected parents"
        );
        Ok(())
    }

    /// Breeds pairs of parents until the population is refilled, then puts
    /// the best members of the current population in front unchanged.
    pub fn next_generation(&mut self, rng: &mut impl Rng) -> Result<(), Error> {
        let distribution =
            WeightedIndex::new(&self.probabilities).map_err(|_| Error::EmptyParentPool)?;

        let mut new_population = Vec::with_capacity(self.population_size);
        for _ in 0..self.population_size / 2 {
            let parent_a = &self.members[self.parents[distribution.sample(rng)]];
            let parent_b = &self.members[self.parents[distribution.sample(rng)]];
            let (mut child1, mut child2) = parent_a.crossover(parent_b, rng)?;
            child1.mutate(self.mutation_rate, rng);
            child2.mutate(self.mutation_rate, rng);
            new_population.push(child1);
            new_population.push(child2);
        }

        let ranking = self.ranking();
        let n_best = (self.population_size as f64 * self.elitism_ratio) as usize;
        for (slot, &id) in new_population.iter_mut().zip(&ranking[..n_best]) {
            *slot = self.members[id].clone();
        }
        // odd sizes leave one slot, filled by the next best member
        if new_population.len() < self.population_size {
            let id = ranking[n_best.min(ranking.len() - 1)];
            new_population.push(self.members[id].clone());
        }

        let replaced = std::mem::replace(&mut self.members, new_population);
        // breeding twice without a simulation keeps the members that flew
        if self.flown.is_empty() {
            self.flown = replaced;
        }
        self.parents.clear();
        self.probabilities.clear();
        self.generation += 1;
        Ok(())
    }

    /// Marks the population solved once any simulated flight landed.
    pub fn landing_zone_reached(&mut self) -> bool {
        if !self.solved && self.flights.iter().any(|f| f.outcome.is_landed()) {
            info!(generation = self.generation, "Lander reached the landing zone");
            self.solved = true;
        }
        self.solved
    }

    // Member ids by descending fitness, ties keep population order.
    fn ranking(&self) -> Vec<usize> {
        let mut ranking: Vec<usize> = (0..self.members.len()).collect();
        ranking.sort_by(|&a, &b| {
            self.members[b]
                .fitness()
                .total_cmp(&self.members[a].fitness())
        });
        ranking
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn max_fitness(&self) -> f64 {
        self.members
            .iter()
            .map(Chromosome::fitness)
            .fold(0., f64::max)
    }

    pub fn population_size(&self) -> usize {
        self.population_size
    }

    pub fn gene_size(&self) -> usize {
        self.gene_size
    }

    pub fn members(&self) -> &[Chromosome] {
        &self.members
    }

    pub fn population_fitness(&self) -> &[f64] {
        &self.population_fitness
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Flights of the last simulated generation, empty until simulated.
    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    /// Members that flew [`Population::flights`]: the current ones, or their
    /// parents' generation once [`Population::next_generation`] replaced them.
    pub fn flown_members(&self) -> &[Chromosome] {
        if self.flown.is_empty() {
            &self.members
        } else {
            &self.flown
        }
    }

    pub fn landed(&self) -> Option<(&Chromosome, &Flight)> {
        self.flown_members()
            .iter()
            .zip(&self.flights)
            .find(|(_, flight)| flight.outcome.is_landed())
    }
}

impl Display for Population {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "\nTotal generations: {}\nPopulation size: {}\nMutation rate: {}%\nPopulation max fitness score: {:.2}",
            self.generation,
            self.population_size,
            (self.mutation_rate * 100.).floor(),
            self.max_fitness()
        )
    }
}
