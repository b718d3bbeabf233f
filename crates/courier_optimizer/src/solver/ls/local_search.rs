use fxhash::FxHashSet;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{instrument, trace};

use crate::{
    problem::node::NodeIdx,
    solver::{
        ls::{
            insert_unassigned::InsertUnassignedOperator,
            inter_relocate::InterRelocateOperator,
            inter_swap::InterSwapOperator,
            inter_two_opt_star::InterTwoOptStarOperator,
            r#move::{LocalSearchMove, LocalSearchOperator, evaluate_updates},
            relocate::RelocateOperator,
            swap::SwapOperator,
            two_opt::TwoOptOperator,
        },
        score::Score,
        search_context::SearchContext,
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
};

type RoutePair = (RouteIdx, RouteIdx);

/// Best-improvement descent over every route pair.
///
/// Each pass finds the best improving move of every pair in parallel, then
/// applies the non-conflicting ones from best to worst. The descent stops at
/// a local optimum.
#[derive(Default)]
pub struct LocalSearch {
    pairs: Vec<RoutePair>,
}

macro_rules! best_move_of {
    ($operator:ty, $variant:ident, $context:expr, $solution:expr, $pair:expr, $should_stop:expr, $best:ident) => {
        <$operator>::generate_moves($solution, $pair, |op| {
            if $should_stop() {
                return;
            }

            let Some(evaluation) = evaluate_updates(
                $context,
                $solution,
                op.updated_routes($solution),
                op.inserted_node(),
            ) else {
                return;
            };

            if evaluation.delta.is_improvement()
                && $best
                    .as_ref()
                    .is_none_or(|(best_delta, _)| evaluation.delta < *best_delta)
            {
                $best = Some((evaluation.delta, LocalSearchMove::$variant(op)));
            }
        });
    };
}

impl LocalSearch {
    pub fn new() -> Self {
        LocalSearch::default()
    }

    /// Runs passes until a local optimum is reached or `should_stop` returns
    /// true. Returns the number of passes that applied at least one move.
    ///
    /// `should_stop` is also checked between move evaluations, so a pass can
    /// end early with the moves found so far.
    #[instrument(skip_all, level = "debug")]
    pub fn run<F>(
        &mut self,
        context: &SearchContext,
        solution: &mut WorkingSolution,
        should_stop: F,
    ) -> usize
    where
        F: Fn() -> bool + Sync,
    {
        let mut passes = 0;

        while !should_stop() {
            if !self.run_pass(context, solution, &should_stop) {
                break;
            }
            passes += 1;
        }

        passes
    }

    fn build_pairs(&mut self, solution: &WorkingSolution) {
        let candidates = solution.candidate_routes();

        self.pairs.clear();
        for &r1 in &candidates {
            for &r2 in &candidates {
                self.pairs.push((r1, r2));
            }
        }
    }

    fn run_pass<F>(
        &mut self,
        context: &SearchContext,
        solution: &mut WorkingSolution,
        should_stop: &F,
    ) -> bool
    where
        F: Fn() -> bool + Sync,
    {
        self.build_pairs(solution);

        let mut moves = self
            .pairs
            .par_iter()
            .filter_map(|&pair| {
                if should_stop() {
                    return None;
                }
                Self::best_move(context, solution, pair, should_stop)
            })
            .collect::<Vec<_>>();

        // Stable, so equal deltas keep the pair order
        moves.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut touched_routes = FxHashSet::<RouteIdx>::default();
        let mut inserted_nodes = FxHashSet::<NodeIdx>::default();
        let mut applied = 0;

        for (_, op) in moves {
            let route_ids = op.route_ids();
            if route_ids.iter().any(|route_id| touched_routes.contains(route_id)) {
                continue;
            }

            if let Some(node) = op.inserted_node()
                && !inserted_nodes.insert(node)
            {
                continue;
            }

            // The fleet size may have changed since the move was found
            let Some(evaluation) = op.evaluate(context, solution) else {
                continue;
            };
            if !evaluation.delta.is_improvement() {
                continue;
            }

            trace!(
                "{} {:?}: {:?}",
                op.operator_name(),
                route_ids,
                evaluation.delta
            );

            evaluation.apply(solution);
            touched_routes.extend(route_ids);
            applied += 1;
        }

        applied > 0
    }

    fn best_move<F>(
        context: &SearchContext,
        solution: &WorkingSolution,
        pair: RoutePair,
        should_stop: &F,
    ) -> Option<(Score, LocalSearchMove)>
    where
        F: Fn() -> bool,
    {
        let mut best: Option<(Score, LocalSearchMove)> = None;

        best_move_of!(RelocateOperator, Relocate, context, solution, pair, should_stop, best);
        best_move_of!(SwapOperator, Swap, context, solution, pair, should_stop, best);
        best_move_of!(TwoOptOperator, TwoOpt, context, solution, pair, should_stop, best);
        best_move_of!(InterRelocateOperator, InterRelocate, context, solution, pair, should_stop, best);
        best_move_of!(InterSwapOperator, InterSwap, context, solution, pair, should_stop, best);
        best_move_of!(InterTwoOptStarOperator, InterTwoOptStar, context, solution, pair, should_stop, best);
        best_move_of!(InsertUnassignedOperator, InsertUnassigned, context, solution, pair, should_stop, best);

        best
    }
}
