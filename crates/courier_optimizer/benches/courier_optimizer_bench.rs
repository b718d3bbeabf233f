use std::hint::black_box;

use courier_matrix_providers::{
    coordinate::Coordinate,
    distance_time_matrix::{DistanceTimeEntry, DistanceTimeMatrix},
};
use courier_optimizer::{
    problem::{
        cost_policy::CostPolicy,
        time_window::TimeWindow,
        travel_matrices::TravelMatrices,
        vehicle_routing_problem::{VehicleRoutingProblem, VehicleRoutingProblemBuilder},
    },
    solver::{
        construction::construct_solution::construct_solution, ls::local_search::LocalSearch,
        search_context::SearchContext,
    },
};
use criterion::{Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::SmallRng};

fn random_problem(stops: usize) -> (VehicleRoutingProblem, DistanceTimeMatrix) {
    let mut rng = SmallRng::seed_from_u64(2427121);

    let depot = Coordinate::new(50.85, 4.35);
    let coordinates = (0..stops)
        .map(|_| {
            Coordinate::new(
                50.85 + rng.random_range(-0.1..0.1),
                4.35 + rng.random_range(-0.1..0.1),
            )
        })
        .collect::<Vec<_>>();
    let time_windows = (0..stops)
        .map(|_| {
            let start = rng.random_range(8..16) * 3600;
            TimeWindow::new(start, start + 2 * 3600).unwrap()
        })
        .collect::<Vec<_>>();

    let mut all = vec![depot];
    all.extend(coordinates.iter().copied());

    let mut matrix = DistanceTimeMatrix::with_capacity(all.len() * all.len());
    for from in &all {
        for to in &all {
            let meters = ((from.latitude() - to.latitude()).abs()
                + (from.longitude() - to.longitude()).abs())
                * 100_000.0;
            // 50 km/h
            matrix.insert(*from, *to, DistanceTimeEntry::new(meters, meters / 13.9));
        }
    }

    let mut builder = VehicleRoutingProblemBuilder::default();
    builder
        .set_depot(depot)
        .set_stops(coordinates)
        .set_time_windows(time_windows)
        .set_max_vehicles(stops);

    (builder.build().unwrap(), matrix)
}

fn construction_benchmark(c: &mut Criterion) {
    let (problem, matrix) = random_problem(60);
    let matrices = TravelMatrices::new(&problem, &matrix).unwrap();
    let context = SearchContext::new(&problem, &matrices, CostPolicy::composite());

    c.bench_function("construction (60 stops)", |b| {
        b.iter(|| construct_solution(black_box(&context), || false))
    });
}

fn local_search_benchmark(c: &mut Criterion) {
    let (problem, matrix) = random_problem(60);
    let matrices = TravelMatrices::new(&problem, &matrix).unwrap();
    let context = SearchContext::new(&problem, &matrices, CostPolicy::composite());
    let initial = construct_solution(&context, || false);

    c.bench_function("local search descent (60 stops)", |b| {
        b.iter(|| {
            let mut solution = initial.clone();
            LocalSearch::new().run(&context, &mut solution, || false);
            black_box(solution)
        })
    });
}

fn evaluate_route_benchmark(c: &mut Criterion) {
    let (problem, matrix) = random_problem(60);
    let matrices = TravelMatrices::new(&problem, &matrix).unwrap();
    let context = SearchContext::new(&problem, &matrices, CostPolicy::composite());
    let stops = problem.stops().take(20).collect::<Vec<_>>();

    c.bench_function("evaluate route (20 stops)", |b| {
        b.iter(|| context.evaluate_route(black_box(&stops)))
    });
}

criterion_group!(
    benches,
    construction_benchmark,
    local_search_benchmark,
    evaluate_route_benchmark
);
criterion_main!(benches);
