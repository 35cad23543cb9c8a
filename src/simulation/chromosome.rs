use std::fmt::Display;
use std::ops::RangeInclusive;

use rand::Rng;

use super::physics::defaults;
use super::{slew, Command};
use crate::Error;

const ANGLE_RANGE: RangeInclusive<i32> = -defaults::ANGLE_LIMIT..=defaults::ANGLE_LIMIT;
const POWER_RANGE: RangeInclusive<i32> = 0..=defaults::POWER_MAX;
const ANGLE_STEP_RANGE: RangeInclusive<i32> = -defaults::ANGLE_STEP..=defaults::ANGLE_STEP;
const POWER_STEP_RANGE: RangeInclusive<i32> = -defaults::POWER_STEP..=defaults::POWER_STEP;

fn clamp(v: i32, range: RangeInclusive<i32>) -> i32 {
    v.clamp(*range.start(), *range.end())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Gene {
    pub angle: i32,
    pub power: i32,
}

impl Gene {
    pub fn new(angle: i32, power: i32) -> Self {
        Self { angle, power }
    }

    /// Random gene one actuator step away, kept inside the control ranges.
    pub fn neighbour(self, rng: &mut impl Rng) -> Gene {
        Gene {
            angle: clamp(self.angle + rng.gen_range(ANGLE_STEP_RANGE), ANGLE_RANGE),
            power: clamp(self.power + rng.gen_range(POWER_STEP_RANGE), POWER_RANGE),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Chromosome {
    genes: Vec<Gene>,
    fitness: f64,
}

impl Chromosome {
    /// Idle lander gene first, then a bounded random walk. A size of 0 is
    /// treated as 1.
    pub fn new_random(size: usize, rng: &mut impl Rng) -> Self {
        let mut genes = Vec::with_capacity(size.max(1));
        genes.push(Gene::default());
        for i in 1..size {
            genes.push(genes[i - 1].neighbour(rng));
        }
        Self::from_genes(genes)
    }

    pub fn from_genes(genes: Vec<Gene>) -> Self {
        Self { genes, fitness: 0. }
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Commands a lander can follow gene by gene: each request is limited to
    /// one actuator step from the previous gene.
    pub fn commands(&self) -> impl Iterator<Item = Command> + '_ {
        self.genes
            .iter()
            .scan(Gene::default(), |previous, gene| {
                let cmd = Command::new(
                    slew(previous.angle, gene.angle, defaults::ANGLE_STEP),
                    slew(previous.power, gene.power, defaults::POWER_STEP),
                );
                *previous = *gene;
                Some(cmd)
            })
    }

    /// Weighted blend of both parents with one random weight per call. The
    /// first gene of the children stays idle.
    pub fn crossover(&self, partner: &Self, rng: &mut impl Rng) -> Result<(Self, Self), Error> {
        if self.len() != partner.len() {
            return Err(Error::ChromosomeSizeMismatch {
                left: self.len(),
                right: partner.len(),
            });
        }

        let weight: f64 = rng.gen();
        let complement = 1. - weight;
        // `as` truncates towards zero
        let blend = |a: i32, b: i32, wa: f64, wb: f64| (a as f64 * wa + b as f64 * wb) as i32;

        let mut first = vec![Gene::default(); self.len()];
        let mut second = vec![Gene::default(); self.len()];
        for (i, (a, b)) in self.genes.iter().zip(&partner.genes).enumerate().skip(1) {
            first[i] = Gene::new(
                blend(a.angle, b.angle, weight, complement),
                blend(a.power, b.power, weight, complement),
            );
            second[i] = Gene::new(
                blend(a.angle, b.angle, complement, weight),
                blend(a.power, b.power, complement, weight),
            );
        }
        Ok((Self::from_genes(first), Self::from_genes(second)))
    }

    pub fn mutate(&mut self, mutation_rate: f64, rng: &mut impl Rng) {
        for gene in self.genes.iter_mut() {
            if rng.gen::<f64>() < mutation_rate {
                *gene = gene.neighbour(rng);
            }
        }
    }
}

impl Display for Chromosome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Gene sequence (angle, power):")?;
        for Gene { angle, power } in &self.genes {
            write!(f, " ({angle}, {power})")?;
        }
        write!(f, "\nFitness score: {}", self.fitness)
    }
}
