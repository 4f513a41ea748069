//! In-process catalog used by tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use futures::future::BoxFuture;

use crate::{
    dao::catalog::{
        CatalogGateway,
        error::{CatalogError, CatalogResult},
        models::{CatalogArtist, CatalogImage, CatalogItem},
        pick_unplayed,
    },
    state::game::{Difficulty, ItemKind},
};

#[derive(Debug, Default)]
struct Inner {
    artists: Vec<CatalogArtist>,
    items: HashMap<String, Vec<CatalogItem>>,
    random_name: Option<String>,
    failing: AtomicBool,
    item_requests: AtomicUsize,
}

/// Catalog serving a fixed set of artists and releases.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    inner: Arc<Inner>,
}

impl MemoryCatalog {
    /// Build a catalog from artists and their releases.
    pub fn new(
        artists: Vec<CatalogArtist>,
        items: HashMap<String, Vec<CatalogItem>>,
        random_name: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                artists,
                items,
                random_name,
                ..Inner::default()
            }),
        }
    }

    /// Make every following call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `random_item_for_artist` calls served so far.
    pub fn item_requests(&self) -> usize {
        self.inner.item_requests.load(Ordering::SeqCst)
    }

    fn check(&self) -> CatalogResult<()> {
        if self.inner.failing.load(Ordering::SeqCst) {
            Err(CatalogError::unavailable(
                "catalog offline".into(),
                std::io::Error::other("offline"),
            ))
        } else {
            Ok(())
        }
    }
}

impl CatalogGateway for MemoryCatalog {
    fn search_artists(&self, query: String) -> BoxFuture<'static, CatalogResult<Vec<CatalogArtist>>> {
        let result = self.check().map(|()| {
            let query = query.to_lowercase();
            self.inner
                .artists
                .iter()
                .filter(|artist| artist.name.to_lowercase().contains(&query))
                .cloned()
                .collect()
        });
        Box::pin(async move { result })
    }

    fn random_artist_name(&self) -> BoxFuture<'static, CatalogResult<Option<String>>> {
        let result = self.check().map(|()| self.inner.random_name.clone());
        Box::pin(async move { result })
    }

    fn random_item_for_artist(
        &self,
        artist_id: String,
        difficulty: Difficulty,
        exclude: HashSet<String>,
    ) -> BoxFuture<'static, CatalogResult<Option<CatalogItem>>> {
        self.inner.item_requests.fetch_add(1, Ordering::SeqCst);
        let result = self.check().map(|()| {
            let candidates = self
                .inner
                .items
                .get(&artist_id)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .filter(|item| difficulty != Difficulty::Easy || item.kind == ItemKind::Single)
                .collect();
            pick_unplayed(candidates, &exclude)
        });
        Box::pin(async move { result })
    }
}

/// Artist fixture.
pub fn artist(id: &str, name: &str) -> CatalogArtist {
    CatalogArtist {
        id: id.into(),
        name: name.into(),
        images: Vec::new(),
        genres: Vec::new(),
    }
}

/// Release fixture with a cover image.
pub fn release(id: &str, name: &str, kind: ItemKind) -> CatalogItem {
    CatalogItem {
        id: id.into(),
        name: name.into(),
        artist_name: "Fixture Artist".into(),
        images: vec![CatalogImage {
            url: format!("https://img.example/{id}.jpg"),
            width: Some(640),
            height: Some(640),
        }],
        release_date: "1999-01-01".into(),
        external_url: Some(format!("https://open.example/{id}")),
        kind,
    }
}
