//! In-memory repository with the same listing semantics as the backend.
//!
//! Useful for running the list view offline and for isolating services in
//! tests. Every student call requires a session and only sees the records
//! created by the signed-in user. Passwords are kept in plain text; never
//! point this at real data.

use std::collections::{BTreeSet, HashMap};
use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::domain::student::{NewStudent, SortField, SortOrder, Student, UpdateStudent};
use crate::domain::types::{StudentId, UserId};
use crate::domain::user::{AccessToken, Credentials, NewUser, User};
use crate::dto::api::TokenVerification;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{AuthProvider, ListQuery, ListResult, StudentReader, StudentWriter};

/// Account created by [`InMemoryRepository::signed_in`].
pub const LOCAL_OWNER_EMAIL: &str = "owner@example.com";
pub const LOCAL_OWNER_PASSWORD: &str = "password";

struct StoredUser {
    user: User,
    password: String,
}

#[derive(Default)]
struct Store {
    students: Vec<Student>,
    users: Vec<StoredUser>,
    tokens: HashMap<String, UserId>,
    next_student_id: i64,
    next_user_id: i64,
}

impl Store {
    fn add_user(&mut self, email: &str, name: &str, password: &str) -> RepositoryResult<User> {
        self.next_user_id += 1;
        let id = UserId::new(self.next_user_id)?;
        let user = User {
            id,
            email: email.to_string(),
            name: name.to_string(),
            created_at: Utc::now().naive_utc(),
        };
        self.users.push(StoredUser {
            user: user.clone(),
            password: password.to_string(),
        });
        Ok(user)
    }

    fn issue_token(&mut self, user_id: UserId) -> AccessToken {
        let access_token = format!("memory-token-{user_id}-{}", self.tokens.len() + 1);
        self.tokens.insert(access_token.clone(), user_id);
        AccessToken {
            access_token,
            token_type: "bearer".to_string(),
        }
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.students
            .iter()
            .any(|s| s.email == email && Some(s.id) != except)
    }

    fn owned_by(&self, owner: UserId) -> impl Iterator<Item = &Student> {
        self.students
            .iter()
            .filter(move |s| s.created_by == owner.get())
    }
}

#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
    session: RwLock<Option<AccessToken>>,
}

impl InMemoryRepository {
    /// Empty repository without any account or session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty repository signed in as the local owner account.
    pub fn signed_in() -> Self {
        let repo = Self::new();
        let token = {
            let mut store = repo.store.write();
            store
                .add_user(LOCAL_OWNER_EMAIL, "Local Owner", LOCAL_OWNER_PASSWORD)
                .map(|owner| store.issue_token(owner.id))
        };
        *repo.session.write() = token.ok();
        repo
    }

    /// Signed-in repository whose owner already has the given records.
    pub fn with_students(students: impl IntoIterator<Item = NewStudent>) -> Self {
        let repo = Self::signed_in();
        if let Some(owner) = repo.session_user_id() {
            let mut store = repo.store.write();
            for new_student in students {
                insert_student(&mut store, &new_student, owner);
            }
        }
        repo
    }

    /// Records of every user.
    pub fn student_count(&self) -> usize {
        self.store.read().students.len()
    }

    fn session_user_id(&self) -> Option<UserId> {
        let session = self.session.read();
        let token = session.as_ref()?;
        self.store.read().tokens.get(&token.access_token).copied()
    }

    fn require_user(&self) -> RepositoryResult<User> {
        let user_id = self.require_owner()?;
        self.store
            .read()
            .users
            .iter()
            .find(|u| u.user.id == user_id)
            .map(|u| u.user.clone())
            .ok_or_else(|| RepositoryError::Unauthorized("User not found".into()))
    }

    fn require_owner(&self) -> RepositoryResult<UserId> {
        self.session_user_id()
            .ok_or_else(|| RepositoryError::Unauthorized("Could not validate credentials".into()))
    }
}

fn insert_student(store: &mut Store, new_student: &NewStudent, owner: UserId) -> Student {
    store.next_student_id += 1;
    let now = Utc::now().naive_utc();
    let student = Student {
        id: store.next_student_id,
        name: new_student.name.to_string(),
        email: new_student.email.to_string(),
        age: i64::from(new_student.age),
        course: new_student.course.to_string(),
        city: new_student.city.to_string(),
        created_by: owner.get(),
        created_at: now,
        updated_at: now,
    };
    store.students.push(student.clone());
    student
}

fn matches_query(student: &Student, query: &ListQuery) -> bool {
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        let hit = [&student.name, &student.email, &student.course, &student.city]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle));
        if !hit {
            return false;
        }
    }
    if query.course.as_ref().is_some_and(|c| *c != student.course) {
        return false;
    }
    if query.city.as_ref().is_some_and(|c| *c != student.city) {
        return false;
    }
    true
}

fn compare(a: &Student, b: &Student, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::Email => a.email.cmp(&b.email),
        SortField::Age => a.age.cmp(&b.age),
        SortField::Course => a.course.cmp(&b.course),
        SortField::City => a.city.cmp(&b.city),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

fn not_found() -> RepositoryError {
    RepositoryError::NotFound("Student not found".to_string())
}

fn duplicate_email() -> RepositoryError {
    RepositoryError::ConstraintViolation("A student with this email already exists".to_string())
}

#[async_trait]
impl StudentReader for InMemoryRepository {
    async fn list_students(&self, query: &ListQuery) -> RepositoryResult<ListResult<Student>> {
        let owner = self.require_owner()?;
        let store = self.store.read();
        let mut matching: Vec<&Student> = store
            .owned_by(owner)
            .filter(|s| matches_query(s, query))
            .collect();

        // Ties fall back to insertion order so pages stay stable.
        matching.sort_by(|a, b| {
            let ordering = compare(a, b, query.sort_by).then(a.id.cmp(&b.id));
            match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(query.offset())
            .take(query.page_size)
            .cloned()
            .collect();

        Ok(ListResult::new(items, total, query.page, query.page_size))
    }

    async fn list_all_students(&self) -> RepositoryResult<Vec<Student>> {
        let owner = self.require_owner()?;
        let mut students: Vec<Student> = self.store.read().owned_by(owner).cloned().collect();
        students.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(students)
    }

    async fn get_student_by_id(&self, id: StudentId) -> RepositoryResult<Option<Student>> {
        let owner = self.require_owner()?;
        Ok(self
            .store
            .read()
            .owned_by(owner)
            .find(|s| s.id == id.get())
            .cloned())
    }

    async fn list_courses(&self) -> RepositoryResult<Vec<String>> {
        let owner = self.require_owner()?;
        let store = self.store.read();
        let courses: BTreeSet<_> = store.owned_by(owner).map(|s| s.course.clone()).collect();
        Ok(courses.into_iter().collect())
    }

    async fn list_cities(&self) -> RepositoryResult<Vec<String>> {
        let owner = self.require_owner()?;
        let store = self.store.read();
        let cities: BTreeSet<_> = store.owned_by(owner).map(|s| s.city.clone()).collect();
        Ok(cities.into_iter().collect())
    }
}

#[async_trait]
impl StudentWriter for InMemoryRepository {
    async fn create_student(&self, new_student: &NewStudent) -> RepositoryResult<Student> {
        let owner = self.require_owner()?;
        let mut store = self.store.write();
        // Emails are unique across all users.
        if store.email_taken(new_student.email.as_str(), None) {
            return Err(duplicate_email());
        }
        Ok(insert_student(&mut store, new_student, owner))
    }

    async fn update_student(
        &self,
        id: StudentId,
        updates: &UpdateStudent,
    ) -> RepositoryResult<Student> {
        let owner = self.require_owner()?;
        let mut store = self.store.write();
        if store.owned_by(owner).all(|s| s.id != id.get()) {
            return Err(not_found());
        }
        if let Some(email) = &updates.email {
            if store.email_taken(email.as_str(), Some(id.get())) {
                return Err(duplicate_email());
            }
        }

        let student = store
            .students
            .iter_mut()
            .find(|s| s.id == id.get())
            .ok_or_else(not_found)?;
        updates.apply(student);
        student.updated_at = Utc::now().naive_utc();
        Ok(student.clone())
    }

    async fn delete_student(&self, id: StudentId) -> RepositoryResult<()> {
        let owner = self.require_owner()?;
        let mut store = self.store.write();
        let position = store
            .students
            .iter()
            .position(|s| s.id == id.get() && s.created_by == owner.get())
            .ok_or_else(not_found)?;
        store.students.remove(position);
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for InMemoryRepository {
    async fn login(&self, credentials: &Credentials) -> RepositoryResult<AccessToken> {
        let mut store = self.store.write();
        let user_id = store
            .users
            .iter()
            .find(|u| u.user.email == credentials.email.as_str() && u.password == credentials.password)
            .map(|u| u.user.id)
            .ok_or_else(|| RepositoryError::Unauthorized("Invalid email or password".into()))?;

        Ok(store.issue_token(user_id))
    }

    async fn register(&self, new_user: &NewUser) -> RepositoryResult<User> {
        let mut store = self.store.write();
        if store
            .users
            .iter()
            .any(|u| u.user.email == new_user.email.as_str())
        {
            return Err(RepositoryError::Api {
                status: 400,
                detail: "Email already registered".to_string(),
            });
        }

        store.add_user(
            new_user.email.as_str(),
            new_user.name.as_str(),
            &new_user.password,
        )
    }

    async fn current_user(&self) -> RepositoryResult<User> {
        self.require_user()
    }

    async fn verify_token(&self) -> RepositoryResult<TokenVerification> {
        let user = self.require_user()?;
        Ok(TokenVerification {
            valid: true,
            user_id: user.id,
            email: user.email,
            name: user.name,
        })
    }

    fn set_token(&self, token: Option<AccessToken>) {
        *self.session.write() = token;
    }

    fn token(&self) -> Option<AccessToken> {
        self.session.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Age, CityName, CourseName, Email, PersonName};

    fn student(name: &str, age: i64, course: &str, city: &str) -> NewStudent {
        NewStudent {
            name: PersonName::new(name).unwrap(),
            email: Email::new(format!("{}@example.com", name.to_lowercase())).unwrap(),
            age: Age::new(age).unwrap(),
            course: CourseName::new(course).unwrap(),
            city: CityName::new(city).unwrap(),
        }
    }

    fn seeded() -> InMemoryRepository {
        InMemoryRepository::with_students([
            student("Alice", 22, "Physics", "Oslo"),
            student("Bob", 19, "Maths", "Rome"),
            student("Carol", 25, "Physics", "Rome"),
            student("Dave", 31, "History", "Lima"),
        ])
    }

    #[tokio::test]
    async fn search_matches_any_text_column_case_insensitively() {
        let repo = seeded();

        let result = repo
            .list_students(&ListQuery::new(9).search("ROME"))
            .await
            .unwrap();

        let names: Vec<_> = result.items.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(result.total, 2);
        assert!(names.contains(&"Bob") && names.contains(&"Carol"));
    }

    #[tokio::test]
    async fn course_and_city_are_exact_filters() {
        let repo = seeded();

        let result = repo
            .list_students(&ListQuery::new(9).course("Physics").city("Rome"))
            .await
            .unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].name, "Carol");

        let partial = repo
            .list_students(&ListQuery::new(9).course("Phys"))
            .await
            .unwrap();
        assert_eq!(partial.total, 0);
        assert_eq!(partial.total_pages, 1);
    }

    #[tokio::test]
    async fn sorts_and_paginates() {
        let repo = seeded();
        let query = ListQuery::new(3).sort(SortField::Age, SortOrder::Asc);

        let first = repo.list_students(&query).await.unwrap();
        let ages: Vec<_> = first.items.iter().map(|s| s.age).collect();
        assert_eq!(ages, vec![19, 22, 25]);
        assert_eq!(first.total_pages, 2);

        let second = repo.list_students(&query.clone().paginate(2)).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].name, "Dave");
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty_with_accurate_totals() {
        let repo = seeded();

        let result = repo
            .list_students(&ListQuery::new(3).paginate(5))
            .await
            .unwrap();

        assert!(result.items.is_empty());
        assert_eq!(result.total, 4);
        assert_eq!(result.total_pages, 2);
        assert_eq!(result.page, 5);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = seeded();

        let err = repo
            .create_student(&student("Alice", 40, "Art", "Kyiv"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "A student with this email already exists");
    }

    #[tokio::test]
    async fn distinct_courses_are_sorted() {
        let repo = seeded();
        assert_eq!(
            repo.list_courses().await.unwrap(),
            vec!["History", "Maths", "Physics"]
        );
    }

    #[tokio::test]
    async fn huge_page_number_is_an_empty_page() {
        let repo = seeded();

        let result = repo
            .list_students(&ListQuery::new(9).paginate(usize::MAX))
            .await
            .unwrap();

        assert!(result.items.is_empty());
        assert_eq!(result.total, 4);
        assert_eq!(result.page, usize::MAX);
    }

    #[tokio::test]
    async fn student_calls_require_a_session() {
        let repo = seeded();
        repo.set_token(None);

        let err = repo.list_students(&ListQuery::new(9)).await.unwrap_err();

        assert!(err.requires_reauth());
        assert!(repo.list_courses().await.is_err());
        assert!(
            repo.create_student(&student("Erin", 30, "Art", "Kyiv"))
                .await
                .is_err()
        );
        assert_eq!(repo.student_count(), 4);
    }

    #[tokio::test]
    async fn records_are_scoped_to_the_signed_in_user() {
        let repo = seeded();
        let owner_session = repo.token();
        let alice = repo
            .list_students(&ListQuery::new(9).search("alice"))
            .await
            .unwrap()
            .items
            .remove(0);
        let alice_id = StudentId::new(alice.id).unwrap();

        repo.register(&NewUser {
            email: Email::new("eve@example.com").unwrap(),
            name: PersonName::new("Eve").unwrap(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap();
        let eve = repo
            .login(&Credentials {
                email: Email::new("eve@example.com").unwrap(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap();
        repo.set_token(Some(eve));

        assert_eq!(repo.list_students(&ListQuery::new(9)).await.unwrap().total, 0);
        assert!(repo.list_courses().await.unwrap().is_empty());
        assert!(repo.list_cities().await.unwrap().is_empty());
        assert_eq!(repo.get_student_by_id(alice_id).await.unwrap(), None);
        assert_eq!(repo.delete_student(alice_id).await.unwrap_err(), not_found());
        assert_eq!(
            repo.update_student(alice_id, &UpdateStudent::default())
                .await
                .unwrap_err(),
            not_found()
        );

        let own = repo
            .create_student(&student("Erin", 30, "Art", "Kyiv"))
            .await
            .unwrap();
        assert_eq!(repo.list_all_students().await.unwrap(), vec![own]);

        repo.set_token(owner_session);
        let owner_view = repo.list_students(&ListQuery::new(9)).await.unwrap();
        assert_eq!(owner_view.total, 4);
        assert!(owner_view.items.iter().all(|s| s.name != "Erin"));
        assert_eq!(repo.student_count(), 5);
    }
}
