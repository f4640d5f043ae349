use std::env;

use dotenvy::dotenv;

use student_records::dto::students::StudentsPageData;
use student_records::models::config::ClientConfig;

fn print_page(data: &StudentsPageData) {
    if let Some(empty) = &data.empty_state {
        println!("{}: {} [{}]", empty.title, empty.description, empty.action.label());
        return;
    }

    for student in &data.students.items {
        println!(
            "{:>5}  {:<24} {:<28} {:>3}  {:<20} {}",
            student.id, student.name, student.email, student.age, student.course, student.city
        );
    }

    println!(
        "Page {} of {} ({} students)",
        data.students.page, data.students.total_pages, data.total
    );

    if data.show_pagination {
        let window: Vec<String> = data
            .students
            .pages
            .iter()
            .map(|page| match page {
                Some(page) if *page == data.students.page => format!("[{page}]"),
                Some(page) => page.to_string(),
                None => "...".to_string(),
            })
            .collect();
        println!("{}", window.join(" "));
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let config = match ClientConfig::load(&app_env) {
        Ok(config) => config,
        Err(err) => {
            log::error!("Error loading client config: {err}");
            std::process::exit(1);
        }
    };

    match student_records::run(config).await {
        Ok(data) => print_page(&data),
        Err(err) => {
            log::error!("Failed to load the student list: {err}");
            std::process::exit(1);
        }
    }
}
