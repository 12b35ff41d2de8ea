//! Populates the database with demo spas and bookings.
//!
//! ```bash
//! cargo run --bin seed
//! cargo run --bin seed -- --db ./data/spabook.db
//! ```
//!
//! Bookings are placed relative to today so the upcoming ones always fall
//! inside the reschedule window.

use std::env;
use std::path::Path;

use chrono::{Duration, Local, NaiveTime, Utc};
use spabook::config::AppConfig;
use spabook::db::{self, queries};
use spabook::models::{
    Booking, BookingDetails, BookingStatus, LineItem, PaymentBreakdown, Spa, Therapist,
};

struct SeedBooking {
    id: &'static str,
    spa: usize,
    service: &'static str,
    price: f64,
    day_offset: i64,
    start: (u32, u32),
    minutes: i64,
    status: BookingStatus,
    therapist: (&'static str, &'static str),
    add_on: Option<(&'static str, f64)>,
    discount: f64,
}

fn spas() -> Vec<Spa> {
    vec![
        Spa {
            id: "spa-lotus".to_string(),
            name: "Lotus Wellness Spa".to_string(),
            address: "2nd Floor, Greenbelt 5, Makati City".to_string(),
            phone: Some("+63 2 8555 0101".to_string()),
            latitude: 14.5526,
            longitude: 121.0213,
            vat_registered: true,
            tin: Some("009-876-543-000".to_string()),
        },
        Spa {
            id: "spa-bamboo".to_string(),
            name: "Bamboo Retreat".to_string(),
            address: "32nd St, Bonifacio Global City, Taguig".to_string(),
            phone: Some("+63 2 8555 0202".to_string()),
            latitude: 14.5509,
            longitude: 121.0503,
            vat_registered: false,
            tin: None,
        },
    ]
}

const BOOKINGS: &[SeedBooking] = &[
    SeedBooking {
        id: "BK-1001",
        spa: 0,
        service: "Swedish Massage",
        price: 1200.0,
        day_offset: 2,
        start: (10, 0),
        minutes: 60,
        status: BookingStatus::Confirmed,
        therapist: ("Mika Santos", "Swedish"),
        add_on: Some(("Aromatherapy oil", 250.0)),
        discount: 0.0,
    },
    SeedBooking {
        id: "BK-1002",
        spa: 1,
        service: "Hot Stone Therapy",
        price: 1800.0,
        day_offset: 4,
        start: (15, 30),
        minutes: 90,
        status: BookingStatus::Pending,
        therapist: ("Ana Reyes", "Hot stone"),
        add_on: None,
        discount: 0.0,
    },
    SeedBooking {
        id: "BK-0998",
        spa: 0,
        service: "Foot Reflexology",
        price: 650.0,
        day_offset: -6,
        start: (18, 0),
        minutes: 45,
        status: BookingStatus::Completed,
        therapist: ("Jun dela Cruz", "Reflexology"),
        add_on: None,
        discount: 65.0,
    },
    SeedBooking {
        id: "BK-0995",
        spa: 1,
        service: "Facial Treatment",
        price: 1500.0,
        day_offset: -12,
        start: (11, 15),
        minutes: 75,
        status: BookingStatus::Cancelled,
        therapist: ("Lea Tan", "Skin care"),
        add_on: None,
        discount: 0.0,
    },
];

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = AppConfig::from_env();
    let args: Vec<String> = env::args().collect();
    let db_path = args
        .iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or(config.database_url);

    let conn = db::init_db(&db_path, Path::new(&config.migrations_dir))?;

    let spas = spas();
    for spa in &spas {
        queries::upsert_spa(&conn, spa)?;
    }

    let today = Local::now().date_naive();
    let now = Utc::now().naive_utc();
    let mut created = 0;

    for seed in BOOKINGS {
        if queries::get_booking_by_id(&conn, seed.id)?.is_some() {
            tracing::info!(booking_id = seed.id, "already seeded, skipping");
            continue;
        }

        let spa = &spas[seed.spa];
        let start = NaiveTime::from_hms_opt(seed.start.0, seed.start.1, 0)
            .ok_or_else(|| anyhow::anyhow!("bad start time for {}", seed.id))?;
        let end = start + Duration::minutes(seed.minutes);

        let mut items = vec![LineItem {
            description: seed.service.to_string(),
            quantity: 1,
            unit_price: seed.price,
        }];
        if let Some((description, unit_price)) = seed.add_on {
            items.push(LineItem {
                description: description.to_string(),
                quantity: 1,
                unit_price,
            });
        }

        let details = BookingDetails {
            booking: Booking {
                id: seed.id.to_string(),
                service_name: seed.service.to_string(),
                spa_id: spa.id.clone(),
                spa_name: spa.name.clone(),
                status: seed.status,
                date: today + Duration::days(seed.day_offset),
                start_time: start,
                end_time: end,
                price: seed.price,
                created_at: now,
                updated_at: now,
            },
            spa: spa.clone(),
            therapist: Therapist {
                name: seed.therapist.0.to_string(),
                specialty: Some(seed.therapist.1.to_string()),
                rating: Some(4.8),
            },
            payment: PaymentBreakdown {
                items,
                discount: seed.discount,
                method: "cash".to_string(),
            },
            notes: None,
        };

        queries::create_booking(&conn, &details)?;
        created += 1;
    }

    tracing::info!(spas = spas.len(), bookings = created, db = %db_path, "seed complete");
    Ok(())
}
