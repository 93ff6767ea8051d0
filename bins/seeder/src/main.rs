//! Database seeder for Cuzdan development and testing.
//!
//! Seeds default expense categories, a vendor listing, and a demo linked
//! couple with assets for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use cuzdan_db::entities::{assets, categories, users, vendors};

/// Demo partnership id shared by the seeded couple.
const DEMO_PARTNERSHIP_ID: &str = "demo-partnership";

const CATEGORIES: &[(&str, &str)] = &[
    ("Nakit", "banknote"),
    ("Döviz", "currency-exchange"),
    ("Altın", "gold-bar"),
    ("Mekan", "building"),
    ("Yemek", "utensils"),
    ("Gelinlik", "dress"),
    ("Fotoğraf", "camera"),
    ("Müzik", "music"),
    ("Davetiye", "mail"),
    ("Diğer", "dots"),
];

const VENDORS: &[(&str, &str, &str)] = &[
    ("Deniz Düğün Salonu", "İstanbul", "Mekan"),
    ("Lezzet Catering", "İstanbul", "Yemek"),
    ("Beyaz Gelinlik Atölyesi", "Ankara", "Gelinlik"),
    ("Kare Fotoğraf Stüdyosu", "İzmir", "Fotoğraf"),
    ("Armoni Orkestra", "İstanbul", "Müzik"),
    ("Zarif Davetiye", "Bursa", "Davetiye"),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = cuzdan_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding categories...");
    seed_categories(&db).await;

    println!("Seeding vendors...");
    seed_vendors(&db).await;

    println!("Seeding demo couple...");
    seed_demo_couple(&db).await;

    println!("Seeding complete!");
}

async fn seed_categories(db: &DatabaseConnection) {
    for (sort_order, (name, icon)) in CATEGORIES.iter().enumerate() {
        let existing = categories::Entity::find()
            .filter(categories::Column::Name.eq(*name))
            .one(db)
            .await
            .expect("Failed to query categories");

        if existing.is_some() {
            continue;
        }

        let row = categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set((*name).to_string()),
            icon: Set(Some((*icon).to_string())),
            sort_order: Set(i32::try_from(sort_order).unwrap_or(0)),
        };
        row.insert(db).await.expect("Failed to insert category");
    }
}

async fn seed_vendors(db: &DatabaseConnection) {
    for (name, city, category) in VENDORS {
        let existing = vendors::Entity::find()
            .filter(vendors::Column::Name.eq(*name))
            .one(db)
            .await
            .expect("Failed to query vendors");

        if existing.is_some() {
            continue;
        }

        let row = vendors::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set((*name).to_string()),
            city: Set(Some((*city).to_string())),
            category: Set(Some((*category).to_string())),
            phone: Set(None),
        };
        row.insert(db).await.expect("Failed to insert vendor");
    }
}

/// Seeds the canonical linked pair: one stamped cash asset, one personal
/// cash asset recorded before the partnership, and a non-cash asset.
async fn seed_demo_couple(db: &DatabaseConnection) {
    if seed_user(db, "alice", "Alice Demo", Some("bob")).await
        && seed_user(db, "bob", "Bob Demo", Some("alice")).await
    {
        seed_asset(db, "alice", "Nakit", dec!(5000), Some(DEMO_PARTNERSHIP_ID)).await;
        seed_asset(db, "bob", "Nakit", dec!(2000), None).await;
        seed_asset(db, "alice", "Döviz", dec!(3500), Some(DEMO_PARTNERSHIP_ID)).await;
    }
}

/// Inserts a demo user unless the username is taken. Returns true on insert.
async fn seed_user(
    db: &DatabaseConnection,
    username: &str,
    full_name: &str,
    partner: Option<&str>,
) -> bool {
    let existing = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await
        .expect("Failed to query users");

    if existing.is_some() {
        return false;
    }

    let now = Utc::now().into();
    let row = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        full_name: Set(full_name.to_string()),
        partner_username: Set(partner.map(ToString::to_string)),
        partnership_id: Set(Some(DEMO_PARTNERSHIP_ID.to_string())),
        portfolio_budget_included: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    };
    row.insert(db).await.expect("Failed to insert user");
    true
}

async fn seed_asset(
    db: &DatabaseConnection,
    username: &str,
    category: &str,
    value: rust_decimal::Decimal,
    partnership_id: Option<&str>,
) {
    let now = Utc::now().into();
    let row = assets::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        category: Set(category.to_string()),
        amount: Set(value),
        value: Set(value),
        partnership_id: Set(partnership_id.map(ToString::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    row.insert(db).await.expect("Failed to insert asset");
}
