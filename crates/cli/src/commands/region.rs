//! Map region commands.

use virtual_tourist_core::{Coordinate, MapRegion};

use super::{CommandError, open_store};

/// Print the saved map region.
pub async fn show() -> Result<(), CommandError> {
    let store = open_store().await?;
    let region = store.map_region().await?;
    store.close().await;

    #[allow(clippy::print_stdout)]
    {
        match region {
            Some(region) => println!(
                "center {}  span {} x {}",
                region.center(),
                region.latitude_delta(),
                region.longitude_delta()
            ),
            None => println!("No map region saved"),
        }
    }
    Ok(())
}

/// Save the map region.
pub async fn save(
    latitude: f64,
    longitude: f64,
    latitude_delta: f64,
    longitude_delta: f64,
) -> Result<(), CommandError> {
    let center = Coordinate::new(latitude, longitude)?;
    let region = MapRegion::new(center, latitude_delta, longitude_delta)?;

    let store = open_store().await?;
    store.save_map_region(&region).await?;
    store.close().await;

    tracing::info!(center = %center, "Map region saved");
    Ok(())
}
