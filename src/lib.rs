#[cfg(feature = "client")]
use std::sync::Arc;

#[cfg(feature = "client")]
use crate::controller::ListController;
#[cfg(feature = "client")]
use crate::dto::students::StudentsPageData;
#[cfg(feature = "client")]
use crate::forms::auth::LoginForm;
#[cfg(feature = "client")]
use crate::models::config::ClientConfig;
#[cfg(feature = "client")]
use crate::repository::HttpRepository;
#[cfg(feature = "client")]
use crate::services::{ServiceResult, auth, students};

pub mod controller;
pub mod domain;
pub mod dto;
pub mod error_conversions;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod services;

/// Signs in against the configured backend, opens the student list with the
/// configured filters and returns the first settled page.
#[cfg(feature = "client")]
pub async fn run(config: ClientConfig) -> ServiceResult<StudentsPageData> {
    let repo = Arc::new(HttpRepository::new(
        config.api_url.clone(),
        config.request_timeout(),
    )?);

    let session = auth::login(
        &*repo,
        LoginForm {
            email: config.email.clone(),
            password: config.password.clone(),
        },
    )
    .await?;
    log::info!("Signed in as {} <{}>", session.user.name, session.user.email);

    let options = students::load_filter_options(&*repo).await;
    log::info!(
        "{} courses and {} cities available for filtering",
        options.courses.len(),
        options.cities.len()
    );

    let controller = ListController::new(
        Arc::clone(&repo),
        config.page_size,
        config.search_debounce(),
    );
    controller.activate();

    let initial = config.initial_query();
    if let Some(course) = &initial.course {
        controller.set_course_filter(course);
    }
    if let Some(city) = &initial.city {
        controller.set_city_filter(city);
    }
    if let Some(search) = &initial.search {
        controller.set_search(search.as_str());
    }

    let snapshot = controller.settled().await;
    if let Some(error) = &snapshot.error {
        log::error!("Failed to load students: {error}");
    }

    Ok(StudentsPageData::from_snapshot(&snapshot))
}
