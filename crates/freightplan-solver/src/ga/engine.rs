// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::sim::{SimContext, SimOutcome};
use crate::support::rng::seeded;
use crate::support::stop::{Deadline, StopToken};
use rand::seq::index::sample;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Fixed search behavior; only the values on the published tuning
/// surface vary.
pub const TOURNAMENT_SIZE: usize = 3;
pub const ELITE_COUNT: usize = 1;
pub const STAGNATION_LIMIT: usize = 20;
pub const ON_TIME_BIAS: f64 = 0.7;

/// The best plan the search found, plus how the run ended.
#[derive(Debug, Clone)]
pub struct GaOutcome {
    pub best: SimOutcome,
    pub best_genes: Vec<usize>,
    pub generations_run: usize,
    pub timed_out: bool,
    pub cancelled: bool,
}

/// Genetic search over per-cargo route choices. An individual holds one
/// option index per cargo in canonical order; its fitness is the
/// simulated total margin of the resulting plan.
///
/// Fitness evaluation fans out over a worker pool and joins at a
/// per-generation barrier; selection, crossover and mutation then run
/// sequentially on the orchestrator, so a fixed seed reproduces the
/// whole trajectory bit for bit. The stop token and the wall-clock
/// deadline are only consulted at the barrier.
#[derive(Debug)]
pub struct GaEngine<'a> {
    ctx: &'a SimContext<'a>,
}

impl<'a> GaEngine<'a> {
    #[inline]
    pub fn new(ctx: &'a SimContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn run(&self, seed: u64, stop: &StopToken, deadline: Deadline) -> GaOutcome {
        let config = self.ctx.config();
        let catalog = self.ctx.catalog();
        let gene_count = catalog.cargo_count();

        if gene_count == 0 {
            let best = self.ctx.simulate(&[]);
            return GaOutcome {
                best,
                best_genes: Vec::new(),
                generations_run: 0,
                timed_out: false,
                cancelled: false,
            };
        }

        let mut rng = seeded(seed);
        let mut population: Vec<Vec<usize>> = (0..config.population_size.max(1))
            .map(|_| self.random_individual(&mut rng))
            .collect();

        let mut best: Option<(f64, Vec<usize>, SimOutcome)> = None;
        let mut stagnant_generations = 0usize;
        let mut generations_run = 0usize;
        let mut timed_out = false;
        let mut cancelled = false;

        for _ in 0..config.generations {
            if stop.is_set() {
                cancelled = true;
                break;
            }
            if deadline.expired() {
                timed_out = true;
                break;
            }

            let outcomes: Vec<SimOutcome> = population
                .par_iter()
                .map(|individual| self.ctx.simulate(individual))
                .collect();
            generations_run += 1;

            let mut improved = false;
            for (individual, outcome) in population.iter().zip(&outcomes) {
                let is_better = best
                    .as_ref()
                    .map(|(f, _, _)| outcome.fitness > *f)
                    .unwrap_or(true);
                if is_better {
                    best = Some((outcome.fitness, individual.clone(), outcome.clone()));
                    improved = true;
                }
            }
            if improved {
                stagnant_generations = 0;
            } else {
                stagnant_generations += 1;
                if stagnant_generations >= STAGNATION_LIMIT {
                    tracing::debug!(
                        generations_run,
                        "search stagnated, stopping early"
                    );
                    break;
                }
            }

            population = self.breed(&population, &outcomes, &mut rng);
        }

        let (_, best_genes, best_outcome) = best.unwrap_or_else(|| {
            // No generation completed (zero budget or immediate cancel):
            // fall back to the first individual so a plan always exists.
            let outcome = self.ctx.simulate(&population[0]);
            (outcome.fitness, population[0].clone(), outcome)
        });

        GaOutcome {
            best: best_outcome,
            best_genes,
            generations_run,
            timed_out,
            cancelled,
        }
    }

    /// Uniform route choice per gene, biased 70/30 toward on-time
    /// options whenever the cargo has any.
    fn random_individual(&self, rng: &mut ChaCha8Rng) -> Vec<usize> {
        let catalog = self.ctx.catalog();
        (0..catalog.cargo_count())
            .map(|i| {
                let on_time = catalog.on_time_indices(i);
                if !on_time.is_empty() && rng.random_bool(ON_TIME_BIAS) {
                    on_time[rng.random_range(0..on_time.len())]
                } else {
                    rng.random_range(0..catalog.options_for(i).len())
                }
            })
            .collect()
    }

    fn breed(
        &self,
        population: &[Vec<usize>],
        outcomes: &[SimOutcome],
        rng: &mut ChaCha8Rng,
    ) -> Vec<Vec<usize>> {
        let config = self.ctx.config();
        let mut next = Vec::with_capacity(population.len());

        // Elitism: the generation's best individual survives unchanged.
        let elite = (0..population.len())
            .max_by(|&a, &b| outcomes[a].fitness.total_cmp(&outcomes[b].fitness))
            .expect("non-empty population");
        for _ in 0..ELITE_COUNT.min(population.len()) {
            next.push(population[elite].clone());
        }

        while next.len() < population.len() {
            let p1 = self.tournament(population, outcomes, rng);
            let p2 = self.tournament(population, outcomes, rng);
            let (mut c1, mut c2) = crossover(&p1, &p2, config.crossover_rate, rng);
            self.mutate(&mut c1, rng);
            self.mutate(&mut c2, rng);
            next.push(c1);
            if next.len() < population.len() {
                next.push(c2);
            }
        }
        next
    }

    fn tournament(
        &self,
        population: &[Vec<usize>],
        outcomes: &[SimOutcome],
        rng: &mut ChaCha8Rng,
    ) -> Vec<usize> {
        let k = TOURNAMENT_SIZE.min(population.len());
        let contenders = sample(rng, population.len(), k);
        let mut winner = contenders.index(0);
        for i in contenders.iter().skip(1) {
            if outcomes[i].fitness > outcomes[winner].fitness {
                winner = i;
            }
        }
        population[winner].clone()
    }

    fn mutate(&self, individual: &mut [usize], rng: &mut ChaCha8Rng) {
        let catalog = self.ctx.catalog();
        let rate = self.ctx.config().mutation_rate;
        for (i, gene) in individual.iter_mut().enumerate() {
            if rng.random_bool(rate) {
                *gene = rng.random_range(0..catalog.options_for(i).len());
            }
        }
    }
}

/// Single-point crossover: with probability `rate` pick a locus and swap
/// suffixes.
fn crossover(
    p1: &[usize],
    p2: &[usize],
    rate: f64,
    rng: &mut ChaCha8Rng,
) -> (Vec<usize>, Vec<usize>) {
    if p1.len() <= 1 || !rng.random_bool(rate) {
        return (p1.to_vec(), p2.to_vec());
    }
    let point = rng.random_range(1..p1.len());
    let mut c1 = p1[..point].to_vec();
    c1.extend_from_slice(&p2[point..]);
    let mut c2 = p2[..point].to_vec();
    c2.extend_from_slice(&p1[point..]);
    (c1, c2)
}
