use serde::{Deserialize, Serialize};

use crate::{
    dao::catalog::error::CatalogError,
    state::game::{Artist, ItemKind, TargetItem},
};

/// Image variant attached to an artist or a release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogImage {
    /// Public URL of the image.
    pub url: String,
    /// Width in pixels, when known.
    #[serde(default)]
    pub width: Option<u32>,
    /// Height in pixels, when known.
    #[serde(default)]
    pub height: Option<u32>,
}

/// Artist record as provided by a catalog gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogArtist {
    /// Catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Portraits, largest first.
    #[serde(default)]
    pub images: Vec<CatalogImage>,
    /// Genre tags.
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Guessable release (album, single or track) as provided by a catalog gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogItem {
    /// Catalog identifier.
    pub id: String,
    /// Title.
    pub name: String,
    /// Display artist name.
    pub artist_name: String,
    /// Cover art variants, largest first.
    #[serde(default)]
    pub images: Vec<CatalogImage>,
    /// Release date string (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`).
    #[serde(default)]
    pub release_date: String,
    /// Link to the release on the catalog's site.
    #[serde(default)]
    pub external_url: Option<String>,
    /// Release type.
    pub kind: ItemKind,
}

impl From<CatalogArtist> for Artist {
    fn from(value: CatalogArtist) -> Self {
        Self {
            id: value.id,
            name: value.name,
            image_url: value.images.into_iter().next().map(|image| image.url),
            genres: value.genres,
        }
    }
}

impl TryFrom<CatalogItem> for TargetItem {
    type Error = CatalogError;

    /// Releases without cover art cannot be played.
    fn try_from(value: CatalogItem) -> Result<Self, Self::Error> {
        let cover_url = value
            .images
            .into_iter()
            .map(|image| image.url)
            .find(|url| !url.trim().is_empty())
            .ok_or_else(|| CatalogError::Unusable(format!("`{}` has no cover image", value.name)))?;

        Ok(Self {
            id: value.id,
            name: value.name,
            artist_name: value.artist_name,
            cover_url,
            release_date: value.release_date,
            external_url: value.external_url.unwrap_or_default(),
            kind: value.kind,
        })
    }
}
