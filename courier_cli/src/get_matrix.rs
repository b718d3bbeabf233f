use clap::Args;
use courier_matrix_providers::geocoder::CachedGeocoder;
use tracing::info;

use crate::{
    config::Config,
    pipeline::{
        Caches, MatrixArgs, fetch_matrix, google_geocoder, read_input, resolve_coordinates,
        travel_cost_backend,
    },
};

#[derive(Args)]
pub struct GetMatrixArgs {
    #[command(flatten)]
    matrix: MatrixArgs,
}

/// Geocodes the input and fetches its matrix, filling the persisted caches.
pub async fn run(args: GetMatrixArgs, config: &Config) -> anyhow::Result<()> {
    let input = read_input(&args.matrix.input)?;
    let caches = Caches::load(config);

    let google = google_geocoder(config);
    let geocoder = google
        .as_ref()
        .map(|client| CachedGeocoder::new(client, &caches.geocode));
    let backend = travel_cost_backend(config, &args.matrix);

    let result = async {
        let coordinates = resolve_coordinates(
            &input,
            geocoder.as_ref(),
            args.matrix.default_country.as_deref(),
        )
        .await?;
        fetch_matrix(&backend, &coordinates, &caches, &args.matrix).await
    }
    .await;

    // Whatever was fetched before a failure is kept
    caches.save(config);

    let matrix = result?;
    info!(
        "{} entries, {} geocoded addresses and {} batches cached",
        matrix.len(),
        caches.geocode.len(),
        caches.matrix.len()
    );

    Ok(())
}
