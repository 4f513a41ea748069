//! Subset of the Spotify Web API payloads consumed by the gateway.

use serde::Deserialize;

use crate::{
    dao::catalog::models::{CatalogArtist, CatalogImage, CatalogItem},
    state::game::ItemKind,
};

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub artists: Page<ArtistObject>,
}

#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<CatalogImage>,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SimpleArtist {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AlbumObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub album_type: String,
    #[serde(default)]
    pub images: Vec<CatalogImage>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
}

#[derive(Debug, Deserialize)]
pub struct TrackObject {
    pub id: String,
    pub name: String,
    pub album: AlbumObject,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
}

#[derive(Debug, Deserialize)]
pub struct TopTracksResponse {
    #[serde(default)]
    pub tracks: Vec<TrackObject>,
}

fn first_artist(artists: &[SimpleArtist]) -> String {
    artists
        .first()
        .map(|artist| artist.name.clone())
        .unwrap_or_default()
}

impl From<ArtistObject> for CatalogArtist {
    fn from(value: ArtistObject) -> Self {
        Self {
            id: value.id,
            name: value.name,
            images: value.images,
            genres: value.genres,
        }
    }
}

impl From<AlbumObject> for CatalogItem {
    fn from(value: AlbumObject) -> Self {
        let kind = match value.album_type.as_str() {
            "single" => ItemKind::Single,
            "compilation" => ItemKind::Compilation,
            _ => ItemKind::Album,
        };

        Self {
            artist_name: first_artist(&value.artists),
            id: value.id,
            name: value.name,
            images: value.images,
            release_date: value.release_date,
            external_url: value.external_urls.spotify,
            kind,
        }
    }
}

impl From<TrackObject> for CatalogItem {
    /// Tracks borrow the cover and release date of their album and always count as singles.
    fn from(value: TrackObject) -> Self {
        Self {
            artist_name: first_artist(&value.artists),
            id: value.id,
            name: value.name,
            images: value.album.images,
            release_date: value.album.release_date,
            external_url: value.external_urls.spotify,
            kind: ItemKind::Single,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn album_payload_maps_to_item() {
        let album: AlbumObject = serde_json::from_str(
            r#"{
                "id": "2noRn2Aes5aoNVsU6iWThc",
                "name": "Discovery",
                "album_type": "album",
                "images": [{"url": "https://i.scdn.co/image/a", "width": 640, "height": 640}],
                "release_date": "2001-03-12",
                "external_urls": {"spotify": "https://open.spotify.com/album/2noRn2Aes5aoNVsU6iWThc"},
                "artists": [{"name": "Daft Punk"}]
            }"#,
        )
        .unwrap();
        let item = CatalogItem::from(album);
        assert_eq!(item.kind, ItemKind::Album);
        assert_eq!(item.artist_name, "Daft Punk");
        assert_eq!(item.images.len(), 1);
        assert_eq!(
            item.external_url.as_deref(),
            Some("https://open.spotify.com/album/2noRn2Aes5aoNVsU6iWThc")
        );
    }

    #[test]
    fn track_payload_is_a_single_with_album_cover() {
        let response: TopTracksResponse = serde_json::from_str(
            r#"{"tracks": [{
                "id": "t1",
                "name": "One More Time",
                "album": {
                    "id": "a1",
                    "name": "Discovery",
                    "album_type": "album",
                    "images": [{"url": "https://i.scdn.co/image/a"}],
                    "release_date": "2001"
                },
                "artists": [{"name": "Daft Punk"}]
            }]}"#,
        )
        .unwrap();
        let item = CatalogItem::from(response.tracks.into_iter().next().unwrap());
        assert_eq!(item.kind, ItemKind::Single);
        assert_eq!(item.name, "One More Time");
        assert_eq!(item.release_date, "2001");
        assert_eq!(item.images[0].url, "https://i.scdn.co/image/a");
        assert_eq!(item.external_url, None);
    }

    #[test]
    fn search_payload_tolerates_missing_fields() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"artists": {"items": [{"id": "x", "name": "Air"}]}}"#,
        )
        .unwrap();
        assert_eq!(response.artists.items.len(), 1);
        assert!(response.artists.items[0].genres.is_empty());
    }
}
