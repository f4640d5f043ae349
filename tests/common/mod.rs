#![allow(dead_code)]

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use student_records::domain::student::{NewStudent, Student};
use student_records::domain::types::{Age, CityName, CourseName, Email, PersonName, StudentId};
use student_records::repository::errors::{RepositoryError, RepositoryResult};
use student_records::repository::{InMemoryRepository, ListQuery, ListResult, StudentReader};

pub const COURSES: [&str; 3] = ["Physics", "Maths", "History"];
pub const CITIES: [&str; 2] = ["Oslo", "Rome"];

/// Deterministic student number `i`: course cycles through [`COURSES`] and
/// city through [`CITIES`].
pub fn new_student(i: usize) -> NewStudent {
    NewStudent {
        name: PersonName::new(format!("Student {i:02}")).unwrap(),
        email: Email::new(format!("student{i:02}@example.com")).unwrap(),
        age: Age::new(18 + (i % 40) as i64).unwrap(),
        course: CourseName::new(COURSES[i % COURSES.len()]).unwrap(),
        city: CityName::new(CITIES[i % CITIES.len()]).unwrap(),
    }
}

pub fn seeded_repository(count: usize) -> InMemoryRepository {
    InMemoryRepository::with_students((1..=count).map(new_student))
}

type DelayFn = Box<dyn Fn(&ListQuery) -> Duration + Send + Sync>;

/// Reader over an in-memory data set that records every list call, can be
/// told to fail, and answers after a per-query delay.
pub struct ScriptedReader {
    inner: InMemoryRepository,
    calls: Mutex<Vec<ListQuery>>,
    failure: Mutex<Option<RepositoryError>>,
    panic_next: Mutex<bool>,
    delay: DelayFn,
}

impl ScriptedReader {
    pub fn new(inner: InMemoryRepository) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            panic_next: Mutex::new(false),
            delay: Box::new(|_| Duration::from_millis(10)),
        }
    }

    pub fn with_delay(
        mut self,
        delay: impl Fn(&ListQuery) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Box::new(delay);
        self
    }

    pub fn fail_with(&self, err: RepositoryError) {
        *self.failure.lock() = Some(err);
    }

    /// The next list call panics instead of answering.
    pub fn panic_on_next_call(&self) {
        *self.panic_next.lock() = true;
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    pub fn calls(&self) -> Vec<ListQuery> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl StudentReader for ScriptedReader {
    async fn list_students(&self, query: &ListQuery) -> RepositoryResult<ListResult<Student>> {
        self.calls.lock().push(query.clone());
        let failure = self.failure.lock().clone();
        let panics = std::mem::take(&mut *self.panic_next.lock());
        tokio::time::sleep((self.delay)(query)).await;

        if panics {
            panic!("reader crashed while listing page {}", query.page);
        }

        match failure {
            Some(err) => Err(err),
            None => self.inner.list_students(query).await,
        }
    }

    async fn list_all_students(&self) -> RepositoryResult<Vec<Student>> {
        self.inner.list_all_students().await
    }

    async fn get_student_by_id(&self, id: StudentId) -> RepositoryResult<Option<Student>> {
        self.inner.get_student_by_id(id).await
    }

    async fn list_courses(&self) -> RepositoryResult<Vec<String>> {
        self.inner.list_courses().await
    }

    async fn list_cities(&self) -> RepositoryResult<Vec<String>> {
        self.inner.list_cities().await
    }
}
