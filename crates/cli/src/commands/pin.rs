//! Pin commands.

use virtual_tourist_core::Coordinate;

use super::{CommandError, open_store, require_pin};

/// Drop a pin at a coordinate.
pub async fn add(latitude: f64, longitude: f64) -> Result<(), CommandError> {
    let coordinate = Coordinate::new(latitude, longitude)?;
    let store = open_store().await?;

    let pin = store.create_pin(coordinate).await?;
    store.close().await;

    #[allow(clippy::print_stdout)]
    {
        println!("Created pin {} at {}", pin.id, pin.coordinate);
    }
    Ok(())
}

/// List every pin with its album size.
pub async fn list() -> Result<(), CommandError> {
    let store = open_store().await?;
    let pins = store.list_pins().await?;

    let mut rows = Vec::with_capacity(pins.len());
    for pin in pins {
        let photos = store.count_photos(pin.id).await?;
        rows.push((pin, photos));
    }
    store.close().await;

    #[allow(clippy::print_stdout)]
    {
        if rows.is_empty() {
            println!("No pins");
        }
        for (pin, photos) in rows {
            println!(
                "{:>5}  {:<28}  {:>2} photos  {}",
                pin.id.as_i64(),
                pin.coordinate.to_string(),
                photos,
                pin.created_at.format("%Y-%m-%d %H:%M")
            );
        }
    }
    Ok(())
}

/// Remove the pin at a coordinate together with its album.
pub async fn remove(latitude: f64, longitude: f64) -> Result<(), CommandError> {
    let store = open_store().await?;
    let pin = require_pin(&store, latitude, longitude).await?;

    store.delete_pin(pin.id).await?;
    store.close().await;

    #[allow(clippy::print_stdout)]
    {
        println!("Removed pin {} at {}", pin.id, pin.coordinate);
    }
    Ok(())
}
