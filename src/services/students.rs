//! Student record workflows around the list view.

use crate::domain::student::{NewStudent, SortField, SortOrder, Student, UpdateStudent};
use crate::domain::types::StudentId;
use crate::dto::dashboard::DashboardData;
use crate::forms::students::StudentForm;
use crate::repository::{ListQuery, StudentReader, StudentWriter};
use crate::services::{ServiceError, ServiceResult};

/// Number of students listed under "recent" on the dashboard.
pub const RECENT_STUDENTS: usize = 5;

/// Distinct values offered by the course and city filter selects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub courses: Vec<String>,
    pub cities: Vec<String>,
}

/// Validates the form and creates the record. Callers refresh the list
/// afterwards.
pub async fn create_student<R>(repo: &R, form: StudentForm) -> ServiceResult<Student>
where
    R: StudentWriter + ?Sized,
{
    let new_student = NewStudent::try_from(form)?;

    let student = repo.create_student(&new_student).await.map_err(|err| {
        log::error!("Failed to create student: {err}");
        err
    })?;

    Ok(student)
}

pub async fn update_student<R>(repo: &R, student_id: i64, form: StudentForm) -> ServiceResult<Student>
where
    R: StudentWriter + ?Sized,
{
    let id = StudentId::new(student_id)?;
    let updates = UpdateStudent::try_from(form)?;

    let student = repo.update_student(id, &updates).await.map_err(|err| {
        log::error!("Failed to update student {id}: {err}");
        err
    })?;

    Ok(student)
}

pub async fn delete_student<R>(repo: &R, student_id: i64) -> ServiceResult<()>
where
    R: StudentWriter + ?Sized,
{
    let id = StudentId::new(student_id)?;

    repo.delete_student(id).await.map_err(|err| {
        log::error!("Failed to delete student {id}: {err}");
        err
    })?;

    Ok(())
}

pub async fn get_student<R>(repo: &R, student_id: i64) -> ServiceResult<Student>
where
    R: StudentReader + ?Sized,
{
    let id = StudentId::new(student_id)?;

    repo.get_student_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound)
}

/// Loads courses and cities concurrently. A failing lookup leaves its list
/// empty instead of failing the page.
pub async fn load_filter_options<R>(repo: &R) -> FilterOptions
where
    R: StudentReader + ?Sized,
{
    let (courses, cities) = tokio::join!(repo.list_courses(), repo.list_cities());

    FilterOptions {
        courses: courses.unwrap_or_else(|err| {
            log::error!("Failed to load courses: {err}");
            Vec::new()
        }),
        cities: cities.unwrap_or_else(|err| {
            log::error!("Failed to load cities: {err}");
            Vec::new()
        }),
    }
}

/// Totals and the most recently added students for the dashboard.
pub async fn load_dashboard<R>(repo: &R) -> ServiceResult<DashboardData>
where
    R: StudentReader + ?Sized,
{
    let recent_query = ListQuery::new(RECENT_STUDENTS).sort(SortField::CreatedAt, SortOrder::Desc);

    let (recent, courses, cities) = tokio::join!(
        repo.list_students(&recent_query),
        repo.list_courses(),
        repo.list_cities()
    );

    let recent = recent.map_err(|err| {
        log::error!("Failed to fetch dashboard data: {err}");
        err
    })?;

    Ok(DashboardData {
        total_students: recent.total,
        total_courses: courses?.len(),
        total_cities: cities?.len(),
        recent_students: recent.items,
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::student::Student;
    use crate::domain::types::StudentId;
    use crate::repository::errors::{RepositoryError, RepositoryResult};
    use crate::repository::{InMemoryRepository, ListResult};

    fn form(name: &str, email: &str, course: &str, city: &str) -> StudentForm {
        StudentForm {
            name: name.to_string(),
            email: email.to_string(),
            age: 20,
            course: course.to_string(),
            city: city.to_string(),
        }
    }

    /// Reader whose course lookup always fails.
    struct FlakyCourses(InMemoryRepository);

    #[async_trait]
    impl StudentReader for FlakyCourses {
        async fn list_students(&self, query: &ListQuery) -> RepositoryResult<ListResult<Student>> {
            self.0.list_students(query).await
        }

        async fn list_all_students(&self) -> RepositoryResult<Vec<Student>> {
            self.0.list_all_students().await
        }

        async fn get_student_by_id(&self, id: StudentId) -> RepositoryResult<Option<Student>> {
            self.0.get_student_by_id(id).await
        }

        async fn list_courses(&self) -> RepositoryResult<Vec<String>> {
            Err(RepositoryError::ConnectionError("backend offline".to_string()))
        }

        async fn list_cities(&self) -> RepositoryResult<Vec<String>> {
            self.0.list_cities().await
        }
    }

    #[tokio::test]
    async fn create_update_delete_cycle() {
        let repo = InMemoryRepository::signed_in();

        let created = create_student(&repo, form("Alan", "alan@example.com", "Logic", "Wilmslow"))
            .await
            .unwrap();

        let updated = update_student(
            &repo,
            created.id,
            form("Alan Turing", "alan@example.com", "Logic", "Manchester"),
        )
        .await
        .unwrap();
        assert_eq!(updated.city, "Manchester");
        assert_eq!(get_student(&repo, created.id).await.unwrap().name, "Alan Turing");

        delete_student(&repo, created.id).await.unwrap();
        assert!(matches!(
            get_student(&repo, created.id).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_email_message_is_surfaced() {
        let repo = InMemoryRepository::signed_in();
        create_student(&repo, form("Alan", "alan@example.com", "Logic", "Wilmslow"))
            .await
            .unwrap();

        let err = create_student(&repo, form("Other", "ALAN@example.com", "Maths", "Leeds"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "A student with this email already exists");
    }

    #[tokio::test]
    async fn invalid_ids_are_rejected_before_the_backend() {
        let repo = InMemoryRepository::signed_in();
        assert!(matches!(
            delete_student(&repo, 0).await,
            Err(ServiceError::TypeConstraint(_))
        ));
    }

    #[tokio::test]
    async fn deleting_a_missing_student_reports_not_found() {
        let repo = InMemoryRepository::signed_in();
        let err = delete_student(&repo, 42).await.unwrap_err();
        assert_eq!(err.to_string(), "Student not found");
    }

    #[tokio::test]
    async fn filter_options_tolerate_partial_failure() {
        let inner = InMemoryRepository::signed_in();
        create_student(&inner, form("Alan", "alan@example.com", "Logic", "Wilmslow"))
            .await
            .unwrap();
        let repo = FlakyCourses(inner);

        let options = load_filter_options(&repo).await;

        assert!(options.courses.is_empty());
        assert_eq!(options.cities, vec!["Wilmslow"]);
    }

    #[tokio::test]
    async fn dashboard_counts_and_recent_students() {
        let repo = InMemoryRepository::signed_in();
        for i in 0..7 {
            create_student(
                &repo,
                form(
                    &format!("Student {i}"),
                    &format!("s{i}@example.com"),
                    if i % 2 == 0 { "Physics" } else { "Maths" },
                    "Oslo",
                ),
            )
            .await
            .unwrap();
        }

        let dashboard = load_dashboard(&repo).await.unwrap();

        assert_eq!(dashboard.total_students, 7);
        assert_eq!(dashboard.total_courses, 2);
        assert_eq!(dashboard.total_cities, 1);
        assert_eq!(dashboard.recent_students.len(), RECENT_STUDENTS);
    }
}
