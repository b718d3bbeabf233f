use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use courier_matrix_providers::{coordinate::Coordinate, distance_time_matrix::DistanceTimeMatrix};
use jiff::{SignedDuration, Timestamp};
use parking_lot::Mutex;
use rand::{SeedableRng, rngs::SmallRng};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::{
    problem::{travel_matrices::TravelMatrices, vehicle_routing_problem::VehicleRoutingProblem},
    solution::{Solution, SolveOutcome},
    solver::{
        construction::construct_solution::construct_solution,
        guided_local_search::{initial_lambda, penalize},
        insertion::insert_nodes,
        ls::local_search::LocalSearch,
        ruin::ruin_random::ruin_random,
        score::Score,
        search_context::SearchContext,
        solution::working_solution::WorkingSolution,
        solver_params::{SolverParams, Termination},
    },
    timer_debug,
};

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("The distance/time matrix has no entry from {from} to {to}")]
    MissingMatrixEntry { from: Coordinate, to: Coordinate },

    #[error("Failed to build the search thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Passed to the best solution callback.
#[derive(Debug, Clone)]
pub struct BestSolution {
    /// Cost under the configured policy, penalties excluded.
    pub cost: f64,
    pub unassigned: usize,
    pub round: usize,
    pub elapsed: SignedDuration,
}

type BestSolutionHandler = Arc<Mutex<dyn FnMut(&BestSolution) + Send + 'static>>;

/// Stops a running [`Solver`] from another thread.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// The search returns its best solution at its next deadline check.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

struct SearchState {
    start: Timestamp,
    round: usize,
    rounds_without_improvement: usize,
}

pub struct Solver {
    problem: VehicleRoutingProblem,
    matrices: TravelMatrices,
    params: SolverParams,
    thread_pool: rayon::ThreadPool,
    on_best_solution_handler: Option<BestSolutionHandler>,
    stop_handle: StopHandle,
}

impl Solver {
    pub fn new(
        problem: VehicleRoutingProblem,
        matrix: &DistanceTimeMatrix,
        params: SolverParams,
    ) -> Result<Self, SolveError> {
        let matrices = TravelMatrices::new(&problem, matrix)?;
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.search_threads.number_of_threads())
            .build()?;

        Ok(Solver {
            problem,
            matrices,
            params,
            thread_pool,
            on_best_solution_handler: None,
            stop_handle: StopHandle(Arc::new(AtomicBool::new(false))),
        })
    }

    pub fn problem(&self) -> &VehicleRoutingProblem {
        &self.problem
    }

    pub fn on_best_solution<F>(&mut self, callback: F)
    where
        F: FnMut(&BestSolution) + Send + 'static,
    {
        self.on_best_solution_handler = Some(Arc::new(Mutex::new(callback)));
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    pub fn stop(&self) {
        self.stop_handle.stop();
    }

    /// Runs the search until a termination is met or the problem's time limit
    /// expires, and returns the best solution found.
    pub fn solve(&self) -> SolveOutcome {
        self.thread_pool.install(|| self.run())
    }

    fn run(&self) -> SolveOutcome {
        let state = &mut SearchState {
            start: Timestamp::now(),
            round: 0,
            rounds_without_improvement: 0,
        };

        info!(
            nodes = self.problem.node_count(),
            vehicles = self.problem.max_vehicles(),
            policy = %self.params.cost_policy,
            "Solving with a time limit of {:#}",
            self.problem.time_limit()
        );

        let mut context =
            SearchContext::new(&self.problem, &self.matrices, self.params.cost_policy);
        let mut local_search = LocalSearch::new();
        let mut rng = SmallRng::seed_from_u64(self.params.seed);

        let start = state.start;
        let time_limit = self.problem.time_limit();
        let should_stop = || {
            self.stop_handle.is_stopped() || Timestamp::now().duration_since(start) >= time_limit
        };

        let mut current = timer_debug!("Construction", construct_solution(&context, should_stop));
        local_search.run(&context, &mut current, should_stop);

        let mut best = current.clone();
        let mut best_score = best.score(&context);
        self.notify_best(state, best_score);

        context.set_lambda(initial_lambda(
            self.params.lambda_coefficient,
            &context,
            &current,
        ));
        current.refresh(&context);
        debug!("Penalty weight: {}", context.lambda());

        while !self.should_terminate(state) {
            if self.should_perturb(state) {
                current = self.perturb(&context, &best, &mut rng, should_stop);
            } else {
                penalize(&mut context, &mut current);
            }

            local_search.run(&context, &mut current, should_stop);
            state.round += 1;

            let score = current.score(&context);
            if score.is_better_than(&best_score) {
                best = current.clone();
                best_score = score;
                state.rounds_without_improvement = 0;

                debug!(
                    "Round {}: new best {:?} with {} routes",
                    state.round,
                    best_score,
                    best.non_empty_routes_count()
                );
                self.notify_best(state, best_score);
            } else {
                state.rounds_without_improvement += 1;
            }
        }

        let elapsed = Timestamp::now().duration_since(state.start);
        info!(
            rounds = state.round,
            "Finished in {:#}, best score {:?}", elapsed, best_score
        );

        if best.has_unassigned() {
            SolveOutcome::NoSolution
        } else {
            SolveOutcome::Solved(Solution::from_working_solution(&context, &best))
        }
    }

    fn should_perturb(&self, state: &SearchState) -> bool {
        let interval = self.params.perturbation_interval;
        interval > 0
            && state.rounds_without_improvement > 0
            && state.rounds_without_improvement % interval == 0
    }

    /// Restarts from the best solution with part of its stops removed and
    /// reinserted.
    #[instrument(skip_all, level = "debug")]
    fn perturb<F>(
        &self,
        context: &SearchContext,
        best: &WorkingSolution,
        rng: &mut SmallRng,
        should_stop: F,
    ) -> WorkingSolution
    where
        F: Fn() -> bool,
    {
        let mut solution = best.clone();
        solution.refresh(context);

        let removed = ruin_random(context, &mut solution, self.params.ruin_fraction, rng);

        let mut nodes = removed.clone();
        nodes.extend(
            solution
                .unassigned()
                .iter()
                .copied()
                .filter(|node| !removed.contains(node)),
        );
        insert_nodes(context, &mut solution, &nodes, should_stop);

        solution
    }

    fn check_termination(&self, state: &SearchState, termination: &Termination) -> bool {
        match *termination {
            Termination::Duration(max_duration) => {
                Timestamp::now().duration_since(state.start) >= max_duration
            }
            Termination::Iterations(max_iterations) => state.round >= max_iterations,
            Termination::IterationsWithoutImprovement(max_iterations) => {
                state.rounds_without_improvement >= max_iterations
            }
        }
    }

    fn should_terminate(&self, state: &SearchState) -> bool {
        if self.stop_handle.is_stopped() {
            debug!("Stopped at round {}", state.round);
            return true;
        }

        let time_limit = Termination::Duration(self.problem.time_limit());
        self.params
            .terminations
            .iter()
            .chain(std::iter::once(&time_limit))
            .any(|termination| {
                let met = self.check_termination(state, termination);
                if met {
                    debug!(
                        "Termination condition met: {:?} at round {}",
                        termination, state.round
                    );
                }
                met
            })
    }

    fn notify_best(&self, state: &SearchState, score: Score) {
        if let Some(callback) = &self.on_best_solution_handler {
            callback.lock()(&BestSolution {
                cost: score.soft_score,
                unassigned: score.hard_score as usize,
                round: state.round,
                elapsed: Timestamp::now().duration_since(state.start),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::test_utils::{line_distance_time_matrix, line_problem};

    fn params() -> SolverParams {
        SolverParams {
            terminations: vec![Termination::Iterations(20)],
            ..SolverParams::default()
        }
    }

    #[test]
    fn test_missing_matrix_entry() {
        let problem = line_problem(&[(0, 86_400); 3], 1);
        let matrix = line_distance_time_matrix(3);

        let result = Solver::new(problem, &matrix, params());
        assert!(matches!(result, Err(SolveError::MissingMatrixEntry { .. })));
    }

    #[test]
    fn test_solves_line() {
        let problem = line_problem(&[(0, 86_400); 4], 4);
        let matrix = line_distance_time_matrix(5);

        let solver = Solver::new(problem, &matrix, params()).unwrap();
        let outcome = solver.solve();

        let solution = outcome.solution().unwrap();
        assert_eq!(solution.routes.len(), 1);
        assert_eq!(solution.stop_count(), 4);
    }

    #[test]
    fn test_callback_fires_on_best() {
        let problem = line_problem(&[(0, 86_400); 3], 3);
        let matrix = line_distance_time_matrix(4);
        let calls = Arc::new(AtomicUsize::new(0));

        let mut solver = Solver::new(problem, &matrix, params()).unwrap();
        let counter = calls.clone();
        solver.on_best_solution(move |best| {
            assert_eq!(best.unassigned, 0);
            counter.fetch_add(1, Ordering::Relaxed);
        });

        assert!(solver.solve().is_solved());
        assert!(calls.load(Ordering::Relaxed) >= 1);
    }

    #[test]
    fn test_stopped_solver_still_returns_a_solution() {
        let problem = line_problem(&[(0, 86_400); 3], 3);
        let matrix = line_distance_time_matrix(4);

        let solver = Solver::new(
            problem,
            &matrix,
            SolverParams {
                terminations: vec![],
                ..SolverParams::default()
            },
        )
        .unwrap();
        solver.stop_handle().stop();

        assert!(solver.solve().is_solved());
    }
}
