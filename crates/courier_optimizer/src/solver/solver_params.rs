use jiff::SignedDuration;

use crate::problem::cost_policy::CostPolicy;

#[derive(Clone, Debug)]
pub struct SolverParams {
    /// The search stops as soon as any of these is met. The problem's own time
    /// limit always applies on top of them.
    pub terminations: Vec<Termination>,

    pub cost_policy: CostPolicy,

    /// `λ = lambda_coefficient * cost / arcs` of the first local optimum.
    pub lambda_coefficient: f64,

    /// Restart from a perturbed best solution after this many penalization
    /// rounds without improvement. `0` disables perturbation.
    pub perturbation_interval: usize,

    /// Share of the assigned stops removed when perturbing.
    pub ruin_fraction: f64,

    pub seed: u64,

    pub search_threads: Threads,
}

#[derive(Clone, Debug)]
pub enum Termination {
    Duration(SignedDuration),
    Iterations(usize),
    IterationsWithoutImprovement(usize),
}

#[derive(Clone, Debug)]
pub enum Threads {
    Single,
    Auto,
    Multi(usize),
}

impl Threads {
    pub fn number_of_threads(&self) -> usize {
        match self {
            Threads::Single => 1,
            Threads::Multi(num) => (*num).max(1),
            Threads::Auto => std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            terminations: vec![Termination::IterationsWithoutImprovement(1000)],
            cost_policy: CostPolicy::default(),
            lambda_coefficient: 0.1,
            perturbation_interval: 50,
            ruin_fraction: 0.2,
            seed: 2427121,
            search_threads: Threads::Auto,
        }
    }
}
