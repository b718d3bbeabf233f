use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::Context;
use clap::{Args, ValueEnum};
use courier_matrix_providers::{
    distance_time_matrix::DistanceTimeMatrix,
    geocoder::{CachedGeocoder, Geocoder},
    travel_cost_client::TravelCostClient,
};
use courier_optimizer::{
    problem::{
        cost_policy::CostPolicy,
        time_window::TimeWindow,
        vehicle_routing_problem::{VehicleRoutingProblem, VehicleRoutingProblemBuilder},
    },
    solution::SolveOutcome,
    solver::{
        solver::Solver,
        solver_params::{SolverParams, Termination, Threads},
    },
};
use indicatif::{ProgressBar, ProgressStyle};
use jiff::SignedDuration;
use tracing::{info, warn};

use crate::{
    config::Config,
    input::ProblemInput,
    parsers,
    pipeline::{
        Caches, MatrixArgs, fetch_matrix, google_geocoder, read_input, resolve_coordinates,
        travel_cost_backend,
    },
    report::solution_table,
};

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum CostPolicyArg {
    #[default]
    Composite,
    Consolidation,
}

#[derive(Args)]
pub struct OptimizeArgs {
    #[command(flatten)]
    matrix: MatrixArgs,

    /// Writes the solution as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum number of vehicles (default: one per stop)
    #[arg(long)]
    vehicles: Option<usize>,

    /// Time spent at every stop (e.g., "10m", "PT90S", "600")
    #[arg(long, value_parser = parsers::parse_duration, default_value = "0s")]
    service_time: SignedDuration,

    /// Search budget (e.g., "30s", "2m", "PT1H30M")
    #[arg(short, long, value_parser = parsers::parse_duration, default_value = "2m")]
    duration: SignedDuration,

    #[arg(long, value_enum, default_value_t)]
    cost_policy: CostPolicyArg,

    /// Reward per squared route length with the consolidation policy
    #[arg(long)]
    route_length_reward: Option<f64>,

    /// Search threads (default: all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Stops after this many search rounds
    #[arg(long, short = 'n')]
    iterations: Option<usize>,
}

impl OptimizeArgs {
    fn cost_policy(&self) -> CostPolicy {
        match self.cost_policy {
            CostPolicyArg::Composite => CostPolicy::composite(),
            CostPolicyArg::Consolidation => match CostPolicy::consolidation() {
                CostPolicy::Consolidation {
                    max_route_hops,
                    route_length_reward,
                } => CostPolicy::Consolidation {
                    max_route_hops,
                    route_length_reward: self.route_length_reward.unwrap_or(route_length_reward),
                },
                policy => policy,
            },
        }
    }

    fn solver_params(&self) -> SolverParams {
        let mut terminations = SolverParams::default().terminations;
        if let Some(iterations) = self.iterations {
            terminations.push(Termination::Iterations(iterations));
        }

        SolverParams {
            terminations,
            cost_policy: self.cost_policy(),
            search_threads: self.threads.map_or(Threads::Auto, Threads::Multi),
            ..SolverParams::default()
        }
    }
}

pub async fn run(args: OptimizeArgs, config: &Config) -> anyhow::Result<()> {
    let input = read_input(&args.matrix.input)?;
    let caches = Caches::load(config);

    let google = google_geocoder(config);
    let geocoder = google
        .as_ref()
        .map(|client| CachedGeocoder::new(client, &caches.geocode));
    let backend = travel_cost_backend(config, &args.matrix);

    let prepared = prepare_problem(&input, &args, geocoder.as_ref(), &backend, &caches).await;
    caches.save(config);
    let (problem, matrix) = prepared?;

    let mut solver = Solver::new(problem, &matrix, args.solver_params())?;
    let stop_handle = solver.stop_handle();

    let budget_ms = args.duration.as_millis().max(0) as u64;
    let bar = ProgressBar::new(budget_ms);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {elapsed}/{duration} {msg}")
            .context("Invalid progress bar template")?,
    );
    bar.set_message("constructing...");

    let callback_bar = bar.clone();
    solver.on_best_solution(move |best| {
        callback_bar.set_message(format!(
            "round {}: cost {:.0}, {} unassigned",
            best.round, best.cost, best.unassigned
        ));
    });

    let ticker_bar = bar.clone();
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(200));
        let started = std::time::Instant::now();
        loop {
            interval.tick().await;
            ticker_bar.set_position((started.elapsed().as_millis() as u64).min(budget_ms));
        }
    });

    let mut task = tokio::task::spawn_blocking(move || solver.solve());
    let outcome = tokio::select! {
        outcome = &mut task => outcome?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, returning the best solution so far");
            stop_handle.stop();
            task.await?
        }
    };

    ticker.abort();
    bar.finish_and_clear();

    match &outcome {
        SolveOutcome::Solved(solution) => {
            println!("{}", solution_table(&input, solution));
            info!(
                "{} stops on {} routes, cost {:.0}",
                solution.stop_count(),
                solution.routes.len(),
                solution.cost
            );
        }
        SolveOutcome::NoSolution => {
            warn!("No solution visits every stop, adjust the time windows or add vehicles");
        }
    }

    if let Some(output) = &args.output {
        let file = File::create(output)
            .with_context(|| format!("Could not create {}", output.display()))?;
        let mut writer = BufWriter::with_capacity(64 * 1024, file);
        serde_json::to_writer_pretty(&mut writer, &outcome)?;
        writer.flush()?;
        info!("Solution written to {}", output.display());
    }

    Ok(())
}

/// Rejects invalid options before any external call, then geocodes the
/// places, builds the problem and fetches the matrix over its nodes.
async fn prepare_problem<G, C>(
    input: &ProblemInput,
    args: &OptimizeArgs,
    geocoder: Option<&CachedGeocoder<'_, G>>,
    client: C,
    caches: &Caches,
) -> anyhow::Result<(VehicleRoutingProblem, DistanceTimeMatrix)>
where
    G: Geocoder + Sync,
    C: TravelCostClient + Sync,
{
    let mut builder = VehicleRoutingProblemBuilder::default();
    builder
        .set_time_windows(time_windows(input)?)
        .set_service_duration(args.service_time)
        .set_time_limit(args.duration);
    if let Some(vehicles) = args.vehicles {
        builder.set_max_vehicles(vehicles);
    }
    builder.validate()?;

    let coordinates =
        resolve_coordinates(input, geocoder, args.matrix.default_country.as_deref()).await?;
    let (&depot, stops) = coordinates
        .split_first()
        .context("The depot has no coordinate")?;
    builder.set_depot(depot).set_stops(stops.to_vec());
    let problem = builder.build()?;

    let matrix = fetch_matrix(client, &problem.coordinates(), caches, &args.matrix).await?;

    Ok((problem, matrix))
}

fn time_windows(input: &ProblemInput) -> anyhow::Result<Vec<TimeWindow>> {
    input
        .stops
        .iter()
        .enumerate()
        .map(|(index, stop)| {
            TimeWindow::from_civil(stop.start_time, stop.end_time)
                .with_context(|| format!("Invalid time window for stop {index} ({})", stop.place))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use clap::Parser;
    use courier_matrix_providers::{
        as_the_crow_flies::AsTheCrowFliesClient,
        cache::{BatchCache, GeocodeCache},
        coordinate::Coordinate,
        geocoder::GeocodeError,
        travel_cost_client::{BatchEntry, MatrixError},
    };
    use courier_optimizer::problem::vehicle_routing_problem::ProblemError;

    use super::*;

    #[derive(Default)]
    struct CountingGeocoder {
        calls: AtomicUsize,
    }

    impl Geocoder for CountingGeocoder {
        async fn resolve(&self, _address: &str) -> Result<Coordinate, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Coordinate::new(51.2, 4.4))
        }
    }

    #[derive(Default)]
    struct CountingClient {
        calls: AtomicUsize,
        inner: AsTheCrowFliesClient,
    }

    impl TravelCostClient for CountingClient {
        async fn batch_matrix(
            &self,
            origins: &[Coordinate],
            destinations: &[Coordinate],
        ) -> Result<Vec<BatchEntry>, MatrixError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.batch_matrix(origins, destinations).await
        }
    }

    fn stops_input() -> ProblemInput {
        serde_json::from_str(
            r#"{
                "depot": { "address": "Meir 1, Antwerp" },
                "stops": [
                    { "latitude": 51.0, "longitude": 4.0, "start_time": "08:00:00", "end_time": "10:00:00" },
                    { "latitude": 51.1, "longitude": 4.1, "start_time": "09:00:00", "end_time": "12:00:00" }
                ]
            }"#,
        )
        .unwrap()
    }

    fn empty_caches() -> Caches {
        Caches {
            geocode: GeocodeCache::new(),
            matrix: BatchCache::new(),
        }
    }

    #[tokio::test]
    async fn test_invalid_options_make_no_external_call() {
        let caches = empty_caches();
        let counting_geocoder = CountingGeocoder::default();
        let geocoder = CachedGeocoder::new(&counting_geocoder, &caches.geocode);
        let client = CountingClient::default();

        for options in [
            &["--vehicles", "0"][..],
            &["--duration=-30"][..],
            &["--service-time=-5m"][..],
        ] {
            let args = parse(&[&["-i", "stops.json"][..], options].concat());
            let error = prepare_problem(&stops_input(), &args, Some(&geocoder), &client, &caches)
                .await
                .unwrap_err();

            assert!(error.downcast_ref::<ProblemError>().is_some(), "{error:#}");
        }

        assert_eq!(counting_geocoder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_matrix_covers_the_problem_nodes() {
        let caches = empty_caches();
        let counting_geocoder = CountingGeocoder::default();
        let geocoder = CachedGeocoder::new(&counting_geocoder, &caches.geocode);
        let client = CountingClient::default();
        let args = parse(&["-i", "stops.json", "--vehicles", "2"]);

        let (problem, matrix) =
            prepare_problem(&stops_input(), &args, Some(&geocoder), &client, &caches)
                .await
                .unwrap();

        assert_eq!(problem.node_count(), 3);
        assert_eq!(problem.max_vehicles(), 2);
        assert_eq!(problem.depot().coordinate(), Coordinate::new(51.2, 4.4));
        assert_eq!(matrix.first_missing_pair(&problem.coordinates()), None);
        assert_eq!(counting_geocoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: OptimizeArgs,
    }

    fn parse(args: &[&str]) -> OptimizeArgs {
        TestCli::parse_from(std::iter::once("courier").chain(args.iter().copied())).args
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["-i", "stops.json"]);

        assert_eq!(args.duration, SignedDuration::from_mins(2));
        assert_eq!(args.service_time, SignedDuration::ZERO);
        assert!(args.vehicles.is_none());
        assert_eq!(args.cost_policy(), CostPolicy::composite());
    }

    #[test]
    fn test_consolidation_reward() {
        let args = parse(&[
            "-i",
            "stops.json",
            "--cost-policy",
            "consolidation",
            "--route-length-reward",
            "5",
            "--service-time",
            "10m",
            "-n",
            "30",
        ]);

        assert_eq!(args.service_time, SignedDuration::from_mins(10));
        assert!(matches!(
            args.cost_policy(),
            CostPolicy::Consolidation {
                route_length_reward: 5.0,
                ..
            }
        ));
        assert!(
            args.solver_params()
                .terminations
                .iter()
                .any(|termination| matches!(termination, Termination::Iterations(30)))
        );
    }
}
