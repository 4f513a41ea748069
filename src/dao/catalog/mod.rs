pub mod error;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod pool;
#[cfg(feature = "spotify-catalog")]
pub mod spotify;

use std::collections::HashSet;

use futures::future::BoxFuture;
use rand::seq::IndexedRandom;

use crate::{
    dao::catalog::{
        error::CatalogResult,
        models::{CatalogArtist, CatalogItem},
    },
    state::game::Difficulty,
};

/// Read-only music catalog the rounds are drawn from.
///
/// Authentication, token refresh and HTTP retries are the implementation's concern; callers only
/// see artists and releases.
pub trait CatalogGateway: Send + Sync {
    /// Artists matching `query`. An empty list is not an error.
    fn search_artists(&self, query: String) -> BoxFuture<'static, CatalogResult<Vec<CatalogArtist>>>;
    /// Name of some artist worth playing, best effort.
    fn random_artist_name(&self) -> BoxFuture<'static, CatalogResult<Option<String>>>;
    /// One release of `artist_id` from the difficulty's pool that is not in `exclude`.
    ///
    /// `None` means every candidate is excluded (or the artist has no release at all).
    fn random_item_for_artist(
        &self,
        artist_id: String,
        difficulty: Difficulty,
        exclude: HashSet<String>,
    ) -> BoxFuture<'static, CatalogResult<Option<CatalogItem>>>;
}

/// Pick a random candidate whose id is not excluded.
pub fn pick_unplayed(candidates: Vec<CatalogItem>, exclude: &HashSet<String>) -> Option<CatalogItem> {
    let unplayed: Vec<CatalogItem> = candidates
        .into_iter()
        .filter(|item| !exclude.contains(&item.id))
        .collect();
    unplayed.choose(&mut rand::rng()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::ItemKind;

    fn item(id: &str) -> CatalogItem {
        CatalogItem {
            id: id.into(),
            name: id.to_uppercase(),
            artist_name: "Someone".into(),
            images: Vec::new(),
            release_date: "2000".into(),
            external_url: None,
            kind: ItemKind::Single,
        }
    }

    #[test]
    fn excluded_items_are_never_picked() {
        let exclude: HashSet<String> = ["a".to_string(), "b".to_string()].into();
        for _ in 0..20 {
            let picked = pick_unplayed(vec![item("a"), item("b"), item("c")], &exclude).unwrap();
            assert_eq!(picked.id, "c");
        }
    }

    #[test]
    fn exhausted_pool_yields_none() {
        let exclude: HashSet<String> = ["a".to_string()].into();
        assert!(pick_unplayed(vec![item("a")], &exclude).is_none());
        assert!(pick_unplayed(Vec::new(), &HashSet::new()).is_none());
    }
}
