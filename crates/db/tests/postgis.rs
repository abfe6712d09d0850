//! Live round trip against a PostGIS instance.
//!
//! Run with `GEO_STORE_URL` pointing at a database where the `postgis`
//! extension can be created, then `cargo test -p geovid-db -- --ignored`.

use geovid_core::memory::video_from_samples;
use geovid_core::store::{GeoField, GeoStoreConnector};
use geovid_core::types::Sample;
use geovid_db::{PgGeoStoreConnector, StoreConfig};

fn live_config() -> StoreConfig {
    StoreConfig {
        source_url: String::new(),
        geo_store_url: std::env::var("GEO_STORE_URL").expect("GEO_STORE_URL must be set"),
        source_table: "VIDEO_METADATA".into(),
        collection: "videos_live_test".into(),
        ingest_concurrency: 1,
    }
}

fn sample(lat: f64, lng: f64, time_code: f64) -> Sample {
    Sample {
        lat,
        lng,
        time_code,
        theta_x: 1.0,
        theta_y: 2.0,
        theta_z: 3.0,
        r: 50.0,
        alpha: 30.0,
    }
}

#[tokio::test]
#[ignore = "requires a PostGIS database at GEO_STORE_URL"]
async fn crossing_paths_round_trip_through_postgis() {
    let connector = PgGeoStoreConnector::new(&live_config()).unwrap();
    connector.ensure_collection().await.unwrap();

    let videos = vec![
        video_from_samples("V1", Some("north"), &[sample(10.0, 20.0, 0.0), sample(11.0, 21.0, 9.0)])
            .unwrap(),
        video_from_samples("V3", None, &[sample(11.0, 20.0, 0.0), sample(10.0, 21.0, 9.0)]).unwrap(),
        video_from_samples("V4", None, &[sample(50.0, 50.0, 0.0), sample(51.0, 51.0, 1.0)]).unwrap(),
    ];

    let mut store = connector.connect().await.unwrap();
    store.clear().await.unwrap();
    assert_eq!(store.insert_many(&videos).await.unwrap(), 3);
    store.create_spatial_index(GeoField::Trajectory).await.unwrap();
    store.create_spatial_index(GeoField::Location).await.unwrap();
    // Index creation is idempotent.
    store.create_spatial_index(GeoField::Trajectory).await.unwrap();

    let trajectory = store.find_trajectory("V1").await.unwrap().unwrap();
    assert_eq!(trajectory, videos[0].trajectory);
    assert!(store.find_trajectory("missing").await.unwrap().is_none());

    let found = store.find_intersecting("V1", &trajectory).await.unwrap();
    assert_eq!(found, vec![videos[1].clone()]);

    assert_eq!(store.clear().await.unwrap(), 3);
    store.ping().await.unwrap();
    store.close().await.unwrap();
}
