use courier_matrix_providers::{
    coordinate::Coordinate,
    distance_time_matrix::{DistanceTimeEntry, DistanceTimeMatrix},
};

use crate::{
    problem::{
        node::NodeIdx,
        time_window::TimeWindow,
        travel_matrices::TravelMatrices,
        vehicle_routing_problem::{VehicleRoutingProblem, VehicleRoutingProblemBuilder},
    },
    solver::{
        search_context::SearchContext,
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
};

//
//  Depot and stops on a straight line, one kilometre apart:
//
//  (depot) --1km-- (1) --1km-- (2) --1km-- (3) ...
//
//  Travel takes 60 seconds per kilometre.
//
fn line_coordinate(position: usize) -> Coordinate {
    Coordinate::new(50.0, 4.0 + position as f64 * 0.01)
}

pub fn line_problem(windows: &[(i64, i64)], max_vehicles: usize) -> VehicleRoutingProblem {
    let mut builder = VehicleRoutingProblemBuilder::default();
    builder
        .set_depot(line_coordinate(0))
        .set_stops((1..=windows.len()).map(line_coordinate).collect())
        .set_time_windows(
            windows
                .iter()
                .map(|&(start, end)| TimeWindow::new(start, end).unwrap())
                .collect(),
        )
        .set_max_vehicles(max_vehicles);

    builder.build().unwrap()
}

pub fn line_distance_time_matrix(node_count: usize) -> DistanceTimeMatrix {
    let mut matrix = DistanceTimeMatrix::new();

    for from in 0..node_count {
        for to in 0..node_count {
            let kilometres = from.abs_diff(to) as f64;
            matrix.insert(
                line_coordinate(from),
                line_coordinate(to),
                DistanceTimeEntry::new(kilometres * 1000.0, kilometres * 60.0),
            );
        }
    }

    matrix
}

pub fn line_problem_matrices(problem: &VehicleRoutingProblem) -> TravelMatrices {
    TravelMatrices::new(problem, &line_distance_time_matrix(problem.node_count())).unwrap()
}

/// Solution with one route per entry of `routes`, remaining vehicles empty.
pub fn solution_with_routes(context: &SearchContext, routes: &[&[usize]]) -> WorkingSolution {
    let problem = context.problem();
    let mut solution = WorkingSolution::new(problem.max_vehicles(), problem.stops());

    for (route, nodes) in routes.iter().enumerate() {
        let stops = nodes.iter().copied().map(NodeIdx::new).collect::<Vec<_>>();
        let cost = context.evaluate_route(&stops).unwrap();
        for &node in &stops {
            solution.mark_assigned(node);
        }
        solution.replace_route(RouteIdx::new(route), stops, cost);
    }

    solution
}
