use migration::{Migrator, MigratorTrait};
use venue_office_service::sea_orm::{Database, DatabaseConnection};

pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}
