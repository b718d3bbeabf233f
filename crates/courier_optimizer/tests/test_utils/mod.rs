use courier_matrix_providers::{
    coordinate::Coordinate,
    distance_time_matrix::{DistanceTimeEntry, DistanceTimeMatrix},
};
use courier_optimizer::{
    problem::{
        time_window::TimeWindow,
        vehicle_routing_problem::{VehicleRoutingProblem, VehicleRoutingProblemBuilder},
    },
    solution::Solution,
};
use jiff::{SignedDuration, civil};

//
//  Coordinates on a grid, 0.01 degree is one kilometre.
//  Travel takes 60 seconds per kilometre of Manhattan distance.
//
pub fn grid_coordinate(x: usize, y: usize) -> Coordinate {
    Coordinate::new(50.0 + y as f64 * 0.01, 4.0 + x as f64 * 0.01)
}

pub fn grid_matrix(coordinates: &[Coordinate]) -> DistanceTimeMatrix {
    let mut matrix = DistanceTimeMatrix::with_capacity(coordinates.len() * coordinates.len());

    for from in coordinates {
        for to in coordinates {
            let kilometres = ((from.latitude() - to.latitude()).abs()
                + (from.longitude() - to.longitude()).abs())
                * 100.0;
            matrix.insert(
                *from,
                *to,
                DistanceTimeEntry::new(kilometres * 1000.0, kilometres * 60.0),
            );
        }
    }

    matrix
}

pub fn window(start: (i8, i8), end: (i8, i8)) -> TimeWindow {
    TimeWindow::from_civil(
        civil::time(start.0, start.1, 0, 0),
        civil::time(end.0, end.1, 0, 0),
    )
    .unwrap()
}

pub fn create_problem(
    stops: &[((usize, usize), TimeWindow)],
    max_vehicles: usize,
    time_limit: SignedDuration,
) -> (VehicleRoutingProblem, DistanceTimeMatrix) {
    let depot = grid_coordinate(0, 0);
    let coordinates = stops
        .iter()
        .map(|&((x, y), _)| grid_coordinate(x, y))
        .collect::<Vec<_>>();

    let mut builder = VehicleRoutingProblemBuilder::default();
    builder
        .set_depot(depot)
        .set_stops(coordinates.clone())
        .set_time_windows(stops.iter().map(|&(_, time_window)| time_window).collect())
        .set_max_vehicles(max_vehicles)
        .set_time_limit(time_limit);

    let mut all = vec![depot];
    all.extend(coordinates);

    (builder.build().unwrap(), grid_matrix(&all))
}

/// Every stop is visited exactly once and inside its window.
pub fn assert_valid_solution(problem: &VehicleRoutingProblem, solution: &Solution) {
    let mut visited = vec![0; problem.node_count()];

    for route in &solution.routes {
        assert!(!route.stops().is_empty(), "degenerate route {}", route.vehicle);
        assert_eq!(route.visits.first().unwrap().node.get(), 0);
        assert_eq!(route.visits.first().unwrap().arrival, 0);
        assert_eq!(route.visits.last().unwrap().node.get(), 0);

        for visit in route.stops() {
            let time_window = problem.time_window(visit.node);
            assert!(
                time_window.contains(visit.arrival),
                "stop {} served at {} outside {:?}",
                visit.node,
                visit.arrival,
                time_window
            );
            visited[visit.node.get()] += 1;
        }
    }

    assert!(visited[1..].iter().all(|&count| count == 1), "{visited:?}");
}
