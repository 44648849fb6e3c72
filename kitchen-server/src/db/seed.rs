//! Default menu for a fresh store
//!
//! Applied only when the catalog is empty. All items are inserted in one
//! transaction together with a single menu version bump.

use std::collections::BTreeMap;

use shared::daypart::Daypart;
use shared::models::{MenuItemCreate, Station};
use sqlx::SqlitePool;

use super::repository::{RepoResult, menu_item, menu_version};

const BATCHES: [&str; 3] = ["1", "2", "3"];

/// (code, title, station, cook seconds per batch 1/2/3, recommended batch per [`Daypart::ALL`])
type SeedRow = (&'static str, &'static str, Station, [i64; 3], [&'static str; 5]);

const DEFAULT_MENU: &[SeedRow] = &[
    // Appetizers
    ("E2", "Chicken Egg Roll", Station::Fryer, [420, 420, 420], ["1", "3", "2", "3", "2"]),
    ("E3", "Cream Cheese Rangoon", Station::Fryer, [150, 150, 150], ["1", "3", "2", "3", "2"]),
    ("E1", "Veggie Spring Roll", Station::Fryer, [300, 300, 300], ["1", "3", "2", "3", "2"]),
    // Beef
    ("B5", "Beijing Beef", Station::Fryer, [300, 300, 300], ["1", "2", "1", "2", "1"]),
    ("B3", "Black Pepper Sirloin Steak", Station::Stirfry, [90, 105, 120], ["1", "2", "1", "2", "1"]),
    ("B1", "Broccoli Beef", Station::Stirfry, [45, 60, 75], ["1", "2", "1", "2", "1"]),
    // Chicken
    ("C4", "Grilled Teriyaki Chicken", Station::Grill, [420, 420, 420], ["1", "2", "1", "2", "1"]),
    ("CB3", "Honey Sesame Chicken Breast", Station::Fryer, [150, 150, 150], ["1", "2", "1", "2", "1"]),
    ("C3", "Kung Pao Chicken", Station::Stirfry, [75, 90, 105], ["1", "2", "1", "2", "1"]),
    ("C2", "Mushroom Chicken", Station::Stirfry, [75, 90, 105], ["1", "2", "1", "2", "1"]),
    ("C1", "Orange Chicken", Station::Fryer, [480, 480, 480], ["1", "2", "1", "2", "1"]),
    ("CB1", "String Bean Chicken Breast", Station::Stirfry, [45, 60, 75], ["1", "1", "1", "1", "1"]),
    // Seafood
    ("F4", "Honey Walnut Shrimp", Station::Fryer, [180, 180, 180], ["1", "2", "1", "2", "1"]),
    // Sides
    ("M1", "Chow Mein", Station::Sides, [420, 420, 420], ["1", "2", "1", "2", "1"]),
    ("R1", "Fried Rice", Station::Sides, [420, 420, 420], ["1", "2", "1", "2", "1"]),
    ("R2", "White Rice", Station::Sides, [420, 420, 420], ["1", "2", "1", "2", "1"]),
    // Vegetable
    ("V1", "Super Greens", Station::Stirfry, [180, 180, 180], ["1", "1", "1", "2", "1"]),
];

fn to_create(row: &SeedRow) -> MenuItemCreate {
    let (code, title, station, cook, recommended) = *row;
    MenuItemCreate {
        code: code.to_string(),
        title: title.to_string(),
        station,
        batch_sizes: BATCHES.iter().map(|b| b.to_string()).collect(),
        cook_times: BATCHES
            .iter()
            .zip(cook)
            .map(|(b, secs)| (b.to_string(), secs))
            .collect(),
        enabled: Some(true),
        recommended_batch: Some(
            Daypart::ALL
                .iter()
                .zip(recommended)
                .map(|(d, b)| (d.as_str().to_string(), b.to_string()))
                .collect::<BTreeMap<_, _>>(),
        ),
        color: None,
        image_url: Some(format!("/uploads/{}.png", code.to_lowercase())),
        hold_time: None,
        ingredients: None,
        allergens: None,
        nutrition: None,
    }
}

/// Seed the default menu if the catalog is empty; returns the number of items inserted
pub async fn seed_default_menu(pool: &SqlitePool, now: i64) -> RepoResult<usize> {
    if menu_item::count(pool).await? > 0 {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    for row in DEFAULT_MENU {
        menu_item::create(&mut tx, to_create(row), now).await?;
    }
    let version = menu_version::bump(&mut tx).await?;
    tx.commit().await?;

    tracing::info!(items = DEFAULT_MENU.len(), menu_version = version, "Seeded default menu");
    Ok(DEFAULT_MENU.len())
}
