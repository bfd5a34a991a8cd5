//! Reference catalog fixture

use holdgraph::{Catalog, ClimbRecord, HoldId, LinkEntry, LinkResolver, NodeFeatures};
use serde_json::json;
use std::collections::HashMap;

/// Alpha (0), Bravo (1) and Charlie (2). Charlie has two links.
pub fn three_climb_catalog() -> Catalog {
    let climbs = vec![
        ClimbRecord::new("Alpha")
            .with_uuid("a0")
            .with_hold(1, (4.0, 8.0), "Start")
            .with_hold(2, (16.0, 40.0), "Middle")
            .with_hold(3, (20.0, 150.0), "Finish"),
        ClimbRecord::new("Bravo")
            .with_uuid("b1")
            .with_hold(2, (16.0, 40.0), "Start")
            .with_hold(4, (64.0, 96.0), "Foot Only"),
        ClimbRecord::new("Charlie")
            .with_uuid("c2")
            .with_hold(5, (32.0, 12.0), "Start")
            .with_hold(9, (100.0, 140.0), "Finish"),
    ];

    let features: HashMap<HoldId, NodeFeatures> = [1, 2, 3, 4, 5, 9]
        .into_iter()
        .map(|id| {
            let mut attrs = NodeFeatures::new();
            attrs.insert("wall_row".into(), json!(id * 2));
            (id, attrs)
        })
        .collect();

    let links = LinkResolver::default().with_entry(
        "Charlie",
        LinkEntry::Serialized("['https://video.example/charlie', 'https://beta.example/charlie']".into()),
    );

    Catalog::new(climbs, features, links).expect("fixture catalog is well formed")
}

/// The same catalog as an on-disk JSON document
pub fn catalog_json() -> String {
    json!({
        "climbs": [
            {"uuid": "a0", "name": "Alpha", "hold_ids": [1, 2, 3],
             "coordinates": [[4, 8], [16, 40], [20, 150]],
             "hold_types": ["Start", "Middle", "Finish"]},
            {"uuid": "b1", "name": "Bravo", "hold_ids": "[2, 4]",
             "coordinates": "[(16, 40), (64, 96)]",
             "hold_types": "['Start', 'Foot Only']"},
            {"uuid": "c2", "name": "Charlie", "hold_ids": [5, 9],
             "coordinates": [[32, 12], [100, 140]],
             "hold_types": ["Start", "Finish"]}
        ],
        "features": {
            "1": {"wall_row": 2}, "2": {"wall_row": 4}, "3": {"wall_row": 6},
            "4": {"wall_row": 8}, "5": {"wall_row": 10}, "9": {"wall_row": 18}
        },
        "links": {
            "Charlie": "['https://video.example/charlie', 'https://beta.example/charlie']"
        }
    })
    .to_string()
}
