//! Photo commands.

use virtual_tourist_core::PhotoId;

use super::{CommandError, open_store};

/// Remove a single photo from its album.
pub async fn remove(id: i64) -> Result<(), CommandError> {
    let photo_id = PhotoId::new(id);
    let store = open_store().await?;

    let removed = store.delete_photo(photo_id).await?;
    store.close().await;

    if !removed {
        return Err(CommandError::PhotoNotFound(photo_id));
    }

    #[allow(clippy::print_stdout)]
    {
        println!("Removed photo {photo_id}");
    }
    Ok(())
}
