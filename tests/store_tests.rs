use std::time::Duration;

use libgen_fiction::store::{Drm, STORE_NAME};
use libgen_fiction::{LibgenClient, LibgenStore};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_RESULTS: &str = include_str!("fixtures/search_results.html");
const DOWNLOAD_PAGE: &str = include_str!("fixtures/download_page.html");

async fn store_with_listing() -> (MockServer, LibgenStore) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fiction/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_RESULTS))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fiction/9f5c5b2ba7a4a1f2e7c1b0b6a3a8d9e1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DOWNLOAD_PAGE))
        .mount(&server)
        .await;

    let client = LibgenClient::new(&server.uri(), &server.uri(), Duration::from_secs(5)).unwrap();
    (server, LibgenStore::new(client))
}

#[tokio::test]
async fn test_search_flattens_to_first_mirror() {
    let (_server, store) = store_with_listing().await;

    let listings = store
        .search("tolkien", 10, Duration::from_secs(5))
        .await
        .unwrap();

    // The third row has no mirrors and is dropped.
    assert_eq!(listings.len(), 2);

    let hobbit = &listings[0];
    assert_eq!(hobbit.store_name, STORE_NAME);
    assert_eq!(
        hobbit.title,
        "The Hobbit, or There and Back Again (English, 348KB)"
    );
    assert_eq!(hobbit.author, "J. R. R. Tolkien, Alan Lee");
    assert_eq!(hobbit.detail_item, "9F5C5B2BA7A4A1F2E7C1B0B6A3A8D9E1");
    assert_eq!(hobbit.formats, "epub");
    assert_eq!(hobbit.price, "0.00");
    assert_eq!(hobbit.drm, Drm::Unlocked);
    assert!(hobbit.cover_url.ends_with("/fictioncovers/1/9f5c5b2ba7a4a1f2e7c1b0b6a3a8d9e1.jpg"));

    assert_eq!(listings[1].title, "A Wizard of Earthsea (English, 1.2MB)");
}

#[tokio::test]
async fn test_search_respects_max_results() {
    let (_server, store) = store_with_listing().await;

    let listings = store
        .search("tolkien", 1, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(listings.len(), 1);
}

#[tokio::test]
async fn test_get_details_records_download() {
    let (_server, store) = store_with_listing().await;

    let mut listings = store
        .search("tolkien", 1, Duration::from_secs(5))
        .await
        .unwrap();
    let hobbit = &mut listings[0];
    store.get_details(hobbit).await.unwrap();

    assert_eq!(
        hobbit.downloads.get("epub").map(String::as_str),
        Some(
            "https://download.library.lol/fiction/1234000/9f5c5b2ba7a4a1f2e7c1b0b6a3a8d9e1.epub/Tolkien%20-%20The%20Hobbit.epub"
        )
    );
}

#[tokio::test]
async fn test_open_url() {
    let (server, store) = store_with_listing().await;

    assert_eq!(
        store.open_url(Some("9F5C5B2BA7A4A1F2E7C1B0B6A3A8D9E1")).unwrap(),
        format!("{}/fiction/9f5c5b2ba7a4a1f2e7c1b0b6a3a8d9e1", server.uri())
    );
    assert_eq!(store.open_url(None).unwrap(), format!("{}/", server.uri()));
    assert_eq!(store.open_url(Some("")).unwrap(), format!("{}/", server.uri()));
}
