//! Uniform sampling of search results into an album.

use rand::Rng;
use rand::seq::SliceRandom;

use virtual_tourist_core::ALBUM_SIZE;

/// Pick `min(amount, items.len())` distinct elements uniformly at random.
///
/// Uses a partial Fisher-Yates shuffle, so no element is picked twice.
#[must_use]
pub fn sample_without_replacement<T, R>(mut items: Vec<T>, amount: usize, rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let (chosen, _) = items.partial_shuffle(rng, amount);
    chosen.to_vec()
}

/// Pick the URLs that make up a fresh album.
#[must_use]
pub fn sample_album(urls: Vec<String>) -> Vec<String> {
    sample_without_replacement(urls, ALBUM_SIZE, &mut rand::rng())
}
