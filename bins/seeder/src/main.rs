//! Database seeder for Strata development and testing.
//!
//! Seeds a demo management company with two associations, memberships, and
//! documents, for local development.
//!
//! Usage: cargo run --bin seeder
//!
//! Runs against DATABASE_URL with a privileged role (the seeds are written
//! without a tenant context).

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use strata_db::entities::{
    association_members, associations, documents, organization_users, organizations,
    sea_orm_active_enums::{AssociationRole, OrgRole},
    users,
};

/// Demo organization ID (consistent for all seeds)
const DEMO_ORG_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Demo staff user ID
const DEMO_STAFF_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Demo board member user ID
const DEMO_BOARD_ID: &str = "00000000-0000-0000-0000-000000000003";
/// Demo association "Maple Grove"
const DEMO_ASSOC_1_ID: &str = "00000000-0000-0000-0000-000000000011";
/// Demo association "Cedar Court"
const DEMO_ASSOC_2_ID: &str = "00000000-0000-0000-0000-000000000012";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = strata_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo users...");
    seed_users(&db).await;

    println!("Seeding demo organization...");
    seed_organization(&db).await;

    println!("Seeding demo associations...");
    seed_associations(&db).await;

    println!("Seeding demo memberships...");
    seed_memberships(&db).await;

    println!("Seeding demo documents...");
    seed_documents(&db).await;

    println!("Seeding complete!");
}

fn parse(id: &str) -> Uuid {
    Uuid::parse_str(id).unwrap()
}

async fn seed_users(db: &DatabaseConnection) {
    let now = chrono::Utc::now().into();

    for (id, email, name) in [
        (DEMO_STAFF_ID, "manager@acme-hoa.test", "Dana Manager"),
        (DEMO_BOARD_ID, "board@maple-grove.test", "Bo Boardmember"),
    ] {
        if users::Entity::find_by_id(parse(id))
            .one(db)
            .await
            .expect("query users")
            .is_some()
        {
            continue;
        }
        users::ActiveModel {
            id: Set(parse(id)),
            email: Set(email.to_string()),
            // Password: "password123!" - dev only
            password_hash: Set(
                "$argon2id$v=19$m=19456,t=2,p=1$ZGV2LXNlZWQtc2FsdA$3L9tSkTkhrNDhBIqLyCBIg"
                    .to_string(),
            ),
            full_name: Set(name.to_string()),
            is_platform_staff: Set(false),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("insert user");
    }
}

async fn seed_organization(db: &DatabaseConnection) {
    if organizations::Entity::find_by_id(parse(DEMO_ORG_ID))
        .one(db)
        .await
        .expect("query organizations")
        .is_some()
    {
        return;
    }

    let now = chrono::Utc::now().into();
    organizations::ActiveModel {
        id: Set(parse(DEMO_ORG_ID)),
        name: Set("Acme HOA Co".to_string()),
        slug: Set("acme-hoa".to_string()),
        timezone: Set("America/Denver".to_string()),
        settings: Set(serde_json::json!({})),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert organization");
}

async fn seed_associations(db: &DatabaseConnection) {
    let now = chrono::Utc::now().into();

    for (id, name, slug) in [
        (DEMO_ASSOC_1_ID, "Maple Grove", "maple-grove"),
        (DEMO_ASSOC_2_ID, "Cedar Court", "cedar-court"),
    ] {
        if associations::Entity::find_by_id(parse(id))
            .one(db)
            .await
            .expect("query associations")
            .is_some()
        {
            continue;
        }
        associations::ActiveModel {
            id: Set(parse(id)),
            organization_id: Set(parse(DEMO_ORG_ID)),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            is_pseudo: Set(false),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("insert association");
    }
}

async fn seed_memberships(db: &DatabaseConnection) {
    let now = chrono::Utc::now().into();

    if organization_users::Entity::find_by_id((parse(DEMO_STAFF_ID), parse(DEMO_ORG_ID)))
        .one(db)
        .await
        .expect("query organization_users")
        .is_none()
    {
        organization_users::ActiveModel {
            user_id: Set(parse(DEMO_STAFF_ID)),
            organization_id: Set(parse(DEMO_ORG_ID)),
            role: Set(OrgRole::Manager),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("insert staff membership");
    }

    if association_members::Entity::find_by_id((parse(DEMO_BOARD_ID), parse(DEMO_ASSOC_1_ID)))
        .one(db)
        .await
        .expect("query association_members")
        .is_none()
    {
        association_members::ActiveModel {
            user_id: Set(parse(DEMO_BOARD_ID)),
            association_id: Set(parse(DEMO_ASSOC_1_ID)),
            organization_id: Set(parse(DEMO_ORG_ID)),
            role: Set(AssociationRole::Board),
            unit_label: Set(Some("4A".to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("insert board membership");
    }
}

async fn seed_documents(db: &DatabaseConnection) {
    use sea_orm::{ColumnTrait, PaginatorTrait, QueryFilter};

    let existing = documents::Entity::find()
        .filter(documents::Column::OrganizationId.eq(parse(DEMO_ORG_ID)))
        .count(db)
        .await
        .expect("count documents");
    if existing > 0 {
        return;
    }

    let now = chrono::Utc::now().into();

    let seeds = [
        (Some(DEMO_ASSOC_1_ID), "Maple Grove CC&Rs", "governing-docs"),
        (Some(DEMO_ASSOC_2_ID), "Cedar Court bylaws", "governing-docs"),
        (None, "Acme master insurance policy", "insurance"),
    ];

    for (assoc, title, category) in seeds {
        documents::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(parse(DEMO_ORG_ID)),
            association_id: Set(assoc.map(parse)),
            title: Set(title.to_string()),
            category: Set(category.to_string()),
            body: Set(None),
            created_by: Set(parse(DEMO_STAFF_ID)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("insert document");
    }
}
