use crate::bucket_elimination::BucketEliminationDecomposer;
use crate::context::Context;
use crate::error::DecompositionError;
use crate::graph::HyperedgeGraph;
use crate::tree_decomposition::TreeDecomposition;
#[cfg(feature = "log")]
use log::info;
use rand::prelude::StdRng;
use rand::SeedableRng;
use std::fmt::Debug;

/// Quality of a decomposition. Compared lexicographically, greater is better.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub struct FitnessEvaluation(pub Vec<f64>);

impl FitnessEvaluation {
    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

pub trait FitnessFunction: Debug {
    fn fitness(&self, graph: &dyn HyperedgeGraph, td: &TreeDecomposition) -> FitnessEvaluation;
}

/// Prefers smaller maximum bags.
#[derive(Debug, Clone, Copy, Default)]
pub struct WidthFitness;

impl FitnessFunction for WidthFitness {
    fn fitness(&self, _graph: &dyn HyperedgeGraph, td: &TreeDecomposition) -> FitnessEvaluation {
        FitnessEvaluation(vec![-(td.max_bag_size() as f64)])
    }
}

/// Prefers smaller maximum bags, then fewer join nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct WidthAndJoinCountFitness;

impl FitnessFunction for WidthAndJoinCountFitness {
    fn fitness(&self, _graph: &dyn HyperedgeGraph, td: &TreeDecomposition) -> FitnessEvaluation {
        let joins = td.nodes().filter(|n| td.is_join(*n)).count();
        FitnessEvaluation(vec![-(td.max_bag_size() as f64), -(joins as f64)])
    }
}

/// Repeats a randomized decomposer and keeps the fittest result.
#[derive(Debug)]
pub struct IterativeImprovement {
    decomposer: BucketEliminationDecomposer,
    fitness: Box<dyn FitnessFunction>,
    iteration_count: usize,
    non_improvement_limit: Option<usize>,
    seed: Option<u64>,
}

impl Default for IterativeImprovement {
    fn default() -> Self {
        Self {
            decomposer: BucketEliminationDecomposer::default(),
            fitness: Box::new(WidthFitness),
            iteration_count: 10,
            non_improvement_limit: None,
            seed: None,
        }
    }
}

impl IterativeImprovement {
    pub fn new(decomposer: BucketEliminationDecomposer) -> Self {
        Self::default().decomposer(decomposer)
    }

    impl_setter!(self, decomposer, BucketEliminationDecomposer);
    impl_setter!(self, fitness, Box<dyn FitnessFunction>);
    // 0 keeps iterating until the context is terminated or the non improvement limit hits
    impl_setter!(self, iteration_count, usize);
    impl_setter!(self, non_improvement_limit, Option<usize>);
    impl_setter!(self, seed, Option<u64>);

    pub fn compute(
        &self,
        graph: &dyn HyperedgeGraph,
        ctx: &Context,
    ) -> Result<Option<TreeDecomposition>, DecompositionError> {
        Ok(self.compute_with_fitness(graph, ctx)?.map(|(td, _)| td))
    }

    /// Like [`IterativeImprovement::compute`], but also returns the fitness of the result.
    /// After cancellation the best decomposition found so far is returned.
    pub fn compute_with_fitness(
        &self,
        graph: &dyn HyperedgeGraph,
        ctx: &Context,
    ) -> Result<Option<(TreeDecomposition, FitnessEvaluation)>, DecompositionError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut best: Option<(TreeDecomposition, FitnessEvaluation)> = None;
        let mut iteration = 0;
        let mut non_improving = 0;

        while self.iteration_count == 0 || iteration < self.iteration_count {
            if ctx.is_terminated() {
                break;
            }
            let td = match self.decomposer.compute_with_rng(graph, &mut rng, ctx)? {
                Some(td) => td,
                None => break,
            };
            let evaluation = self.fitness.fitness(graph, &td);
            let improved = match &best {
                Some((_, current)) => evaluation > *current,
                None => true,
            };
            if improved {
                #[cfg(feature = "log")]
                info!(
                    "iteration {}: new best decomposition of width {} ({:?})",
                    iteration,
                    td.width(),
                    evaluation
                );
                best = Some((td, evaluation));
                non_improving = 0;
            } else {
                non_improving += 1;
                if self
                    .non_improvement_limit
                    .map_or(false, |limit| non_improving >= limit)
                {
                    #[cfg(feature = "log")]
                    info!("no improvement for {} iterations, stopping", non_improving);
                    break;
                }
            }
            iteration += 1;
        }
        Ok(best)
    }
}
