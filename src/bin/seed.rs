use std::sync::Arc;

use clap::Parser;
use fake::{
    faker::lorem::en::{Paragraph, Words},
    Fake,
};
use sqlx::sqlite::SqlitePoolOptions;

use lyceum::{
    auth::AuthService,
    config::Settings,
    domain::{CourseStatus, CreateCourseRequest, User, UserRole, MAX_LEVEL, MIN_LEVEL},
    error::AppError,
    repository::{
        CourseRepository, SqliteCourseRepository, SqliteUserRepository, UserRepository,
    },
    service::user_service::{RegisterUser, UserService},
};

#[derive(Parser)]
#[command(author, version, about = "Seed a Lyceum database with demo users and courses")]
struct Cli {
    /// Database to seed; defaults to the configured one
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Number of fake courses to create
    #[arg(long, default_value_t = 8)]
    courses: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let settings = Settings::new().unwrap_or_default();

    println!("🌱 Starting database seeding...");

    let database_url = cli.database_url.unwrap_or_else(|| settings.database.url.clone());

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(db_pool.clone()));
    let course_repo = SqliteCourseRepository::new(db_pool.clone());
    let user_service = UserService::new(
        user_repo.clone(),
        Arc::new(AuthService::new(&settings.auth)),
    );

    println!("👥 Creating users...");
    ensure_user(&user_service, user_repo.as_ref(), "admin", "admin123", UserRole::Admin).await?;
    let teacher =
        ensure_user(&user_service, user_repo.as_ref(), "teacher", "password123", UserRole::Teacher).await?;
    ensure_user(&user_service, user_repo.as_ref(), "student", "password123", UserRole::Student).await?;
    println!("  ✅ admin / teacher / student ready");

    println!("📚 Creating courses...");
    for _ in 0..cli.courses {
        let words: Vec<String> = Words(2..5).fake();
        let price_cents = (10i64..200).fake::<i64>() * 100 - 1;

        course_repo.create(teacher.id, CreateCourseRequest {
            title: title_case(&words),
            description: Paragraph(2..4).fake(),
            price_cents,
            level: (MIN_LEVEL..MAX_LEVEL + 1).fake(),
            status: CourseStatus::Listed,
        }).await?;
    }
    println!("  ✅ Created {} courses", cli.courses);

    println!("\n✨ Database seeding complete!");
    println!("\n📝 Test credentials:");
    println!("  Admin: admin / admin123");
    println!("  Teacher: teacher / password123");
    println!("  Student: student / password123");

    Ok(())
}

async fn ensure_user(
    service: &UserService,
    repo: &dyn UserRepository,
    username: &str,
    password: &str,
    role: UserRole,
) -> anyhow::Result<User> {
    let request = RegisterUser {
        username: username.to_string(),
        email: format!("{}@lyceum.local", username),
        password: password.to_string(),
    };

    match service.create_with_role(request, role).await {
        Ok(user) => Ok(user),
        Err(AppError::Conflict(_)) => repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user {} vanished during seeding", username)),
        Err(e) => Err(e.into()),
    }
}

fn title_case(words: &[String]) -> String {
    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
