//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use waypost::config::ResolverConfig;
use waypost::geocoder::{GeocodeCandidate, GeocodeError, Geocoder};
use waypost::models::{Coordinate, Neighbourhood, NeighbourhoodType, SubzoneSummary};
use waypost::neighbourhood::NeighbourhoodDirectory;
use waypost::pip::{parse_subzones, PipService, SubzoneSpatialIndex};
use waypost::store::{CsvTransactionStore, SubzoneStore, TransactionRow};
use waypost::{AddressResolver, StoreError};

/// Subzones:
/// - ang-mo-kio-town-centre: square 103.84..103.86 x 1.36..1.38
/// - aljunied: square 103.87..103.90 x 1.30..1.33
/// - adam: L-shape in 103.80..103.83 x 1.32..1.35 with the north-east notch cut out
/// - marymount: square filling that notch, 103.815..103.83 x 1.335..1.35
/// - orphan: square 103.95..103.97 x 1.40..1.42, no neighbourhood
pub const SUBZONES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": { "SUBZONE_N": "ANG MO KIO TOWN CENTRE", "PLN_AREA_C": "AM", "REGION_N": "NORTH-EAST REGION" },
            "geometry": { "type": "Polygon", "coordinates": [[[103.84, 1.36], [103.86, 1.36], [103.86, 1.38], [103.84, 1.38], [103.84, 1.36]]] }
        },
        {
            "type": "Feature",
            "properties": { "id": "aljunied", "name": "ALJUNIED", "planning_area_id": "GL", "region": "CENTRAL REGION" },
            "geometry": { "type": "Polygon", "coordinates": [[[103.87, 1.30], [103.90, 1.30], [103.90, 1.33], [103.87, 1.33], [103.87, 1.30]]] }
        },
        {
            "type": "Feature",
            "properties": { "id": "adam", "name": "ADAM", "planning_area_id": "BT", "region": "CENTRAL REGION" },
            "geometry": { "type": "Polygon", "coordinates": [[[103.80, 1.32], [103.83, 1.32], [103.83, 1.33], [103.81, 1.33], [103.81, 1.35], [103.80, 1.35], [103.80, 1.32]]] }
        },
        {
            "type": "Feature",
            "properties": { "id": "marymount", "name": "MARYMOUNT", "planning_area_id": "BS", "region": "CENTRAL REGION" },
            "geometry": { "type": "Polygon", "coordinates": [[[103.815, 1.335], [103.83, 1.335], [103.83, 1.35], [103.815, 1.35], [103.815, 1.335]]] }
        },
        {
            "type": "Feature",
            "properties": { "id": "orphan", "name": "ORPHAN", "planning_area_id": "XX", "region": "EAST REGION" },
            "geometry": { "type": "Polygon", "coordinates": [[[103.95, 1.40], [103.97, 1.40], [103.97, 1.42], [103.95, 1.42], [103.95, 1.40]]] }
        }
    ]
}"#;

pub const AMK_POINT: (f64, f64) = (1.37, 103.85);
pub const GEYLANG_POINT: (f64, f64) = (1.3125, 103.8862);
/// Inside marymount's polygon and both adam/marymount bounding boxes
pub const NOTCH_POINT: (f64, f64) = (1.34, 103.82);
pub const ORPHAN_POINT: (f64, f64) = (1.41, 103.96);

pub fn coord((lat, lng): (f64, f64)) -> Coordinate {
    Coordinate::new(lat, lng).unwrap()
}

fn hood(id: &str, name: &str, subzone: &str, kind: NeighbourhoodType) -> Neighbourhood {
    Neighbourhood {
        id: id.to_string(),
        name: name.to_string(),
        one_liner: format!("{} one-liner", name),
        parent_subzone_id: subzone.to_string(),
        kind,
        subzone_ids: Vec::new(),
        aliases: Vec::new(),
    }
}

pub fn neighbourhoods() -> NeighbourhoodDirectory {
    NeighbourhoodDirectory::new(
        vec![
            hood("amk", "Ang Mo Kio", "ang-mo-kio-town-centre", NeighbourhoodType::Sealed),
            hood(
                "amk-central",
                "Ang Mo Kio Central",
                "ang-mo-kio-town-centre",
                NeighbourhoodType::Unsealed,
            ),
            hood("geylang", "Geylang", "aljunied", NeighbourhoodType::Sealed),
            hood("adam-road", "Adam Road", "adam", NeighbourhoodType::Sealed),
            hood("marymount", "Marymount", "marymount", NeighbourhoodType::Sealed),
        ],
        5,
    )
}

pub fn transactions() -> CsvTransactionStore {
    CsvTransactionStore::from_rows(vec![
        TransactionRow {
            block: "38".to_string(),
            street_name: "LORONG 30 GEYLANG".to_string(),
            latitude: GEYLANG_POINT.0.to_string(),
            longitude: GEYLANG_POINT.1.to_string(),
        },
        TransactionRow {
            block: "40".to_string(),
            street_name: "LORONG 30 GEYLANG".to_string(),
            latitude: "1.3130".to_string(),
            longitude: "103.8870".to_string(),
        },
    ])
}

pub fn pip_store() -> PipService {
    PipService::new(SubzoneSpatialIndex::build(parse_subzones(SUBZONES).unwrap()))
}

/// Delegates to an inner store but has no authoritative capability at all.
pub struct BboxOnlyStore<S>(pub S);

#[async_trait]
impl<S: SubzoneStore> SubzoneStore for BboxOnlyStore<S> {
    async fn subzones_containing(&self, _: Coordinate) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unavailable("point-in-polygon disabled".into()))
    }

    async fn subzone_contains(&self, id: &str, coord: Coordinate) -> Result<bool, StoreError> {
        self.0.subzone_contains(id, coord).await
    }

    async fn subzones(&self) -> Result<Vec<SubzoneSummary>, StoreError> {
        self.0.subzones().await
    }

    async fn subzone(&self, id: &str) -> Result<Option<SubzoneSummary>, StoreError> {
        self.0.subzone(id).await
    }
}

pub enum Answer {
    Hits(Vec<(f64, f64, &'static str)>),
    Down,
}

/// Scripted geocoder; unknown queries report zero results.
#[derive(Default)]
pub struct FakeGeocoder {
    answers: HashMap<String, Answer>,
    calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn with(mut self, query: &str, answer: Answer) -> Self {
        self.answers.insert(query.to_string(), answer);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answers.get(query) {
            Some(Answer::Hits(hits)) if !hits.is_empty() => Ok(hits
                .iter()
                .map(|(lat, lng, address)| GeocodeCandidate {
                    coordinate: Coordinate::new(*lat, *lng).unwrap(),
                    formatted_address: address.to_string(),
                    postal: None,
                })
                .collect()),
            Some(Answer::Down) => Err(GeocodeError::Status(503)),
            _ => Err(GeocodeError::NotFound(query.to_string())),
        }
    }
}

pub fn default_geocoder() -> FakeGeocoder {
    FakeGeocoder::default()
        .with(
            "560123",
            Answer::Hits(vec![(AMK_POINT.0, AMK_POINT.1, "123 ANG MO KIO AVE 3 SINGAPORE 560123")]),
        )
        .with(
            "amk hub",
            Answer::Hits(vec![
                (AMK_POINT.0, AMK_POINT.1, "53 ANG MO KIO AVE 3 AMK HUB"),
                (GEYLANG_POINT.0, GEYLANG_POINT.1, "38 LORONG 30 GEYLANG"),
            ]),
        )
        .with("470001", Answer::Down)
        .with("Marymount", Answer::Down)
        .with("520999", Answer::Hits(vec![(ORPHAN_POINT.0, ORPHAN_POINT.1, "1 ORPHAN ROAD SINGAPORE 520999")]))
        .with("marymount view", Answer::Hits(vec![(NOTCH_POINT.0, NOTCH_POINT.1, "MARYMOUNT VIEW")]))
}

pub fn resolver_with(
    geocoder: Arc<FakeGeocoder>,
    store: Arc<dyn SubzoneStore>,
    config: &ResolverConfig,
) -> AddressResolver {
    AddressResolver::new(
        geocoder,
        store,
        Arc::new(transactions()),
        neighbourhoods(),
        config,
    )
}

pub fn resolver(geocoder: Arc<FakeGeocoder>) -> AddressResolver {
    resolver_with(geocoder, Arc::new(pip_store()), &ResolverConfig::default())
}
