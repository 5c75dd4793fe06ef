//! Album commands.
//!
//! # Environment Variables
//!
//! - `FLICKR_API_KEY` - required, see `virtual_tourist::config`
//! - `VT_DATABASE_URL` - SQLite connection string

use virtual_tourist::{Photo, PhotoPipeline};

use super::{CommandError, init_state, require_pin};

/// Show a pin's album, fetching one on first visit.
pub async fn show(latitude: f64, longitude: f64) -> Result<(), CommandError> {
    let state = init_state().await?;
    let pin = require_pin(state.store(), latitude, longitude).await?;

    let photos = state.pipeline().ensure_album(&pin).await?;
    print_album(state.pipeline(), &photos);

    state.shutdown().await;
    Ok(())
}

/// Replace a pin's album with a fresh sample.
pub async fn reload(latitude: f64, longitude: f64) -> Result<(), CommandError> {
    let state = init_state().await?;
    let pin = require_pin(state.store(), latitude, longitude).await?;

    let photos = state.pipeline().reload_album(&pin).await?;
    print_album(state.pipeline(), &photos);

    state.shutdown().await;
    Ok(())
}

/// Download every stub of a pin's album.
pub async fn download(latitude: f64, longitude: f64) -> Result<(), CommandError> {
    let state = init_state().await?;
    let pin = require_pin(state.store(), latitude, longitude).await?;

    let results = state.pipeline().load_images(pin.id).await?;
    state.shutdown().await;

    let total = results.len();
    let mut failed = 0;

    #[allow(clippy::print_stdout)]
    {
        for (photo_id, result) in results {
            let photo_id = photo_id.as_i64();
            match result {
                Ok(Some(data)) => println!("{photo_id:>5}  {} bytes", data.len()),
                Ok(None) => println!("{photo_id:>5}  removed"),
                Err(e) => {
                    failed += 1;
                    println!("{photo_id:>5}  failed: {e}");
                }
            }
        }
    }

    if failed > 0 {
        return Err(CommandError::DownloadsFailed { failed, total });
    }
    Ok(())
}

fn print_album(pipeline: &PhotoPipeline, photos: &[Photo]) {
    #[allow(clippy::print_stdout)]
    {
        if photos.is_empty() {
            println!("Album is empty");
        }
        for photo in photos {
            println!(
                "{:>5}  {:<12}  {}",
                photo.id.as_i64(),
                pipeline.photo_state(photo).as_str(),
                photo.image_url
            );
        }
    }
}
