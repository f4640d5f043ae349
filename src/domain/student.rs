use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{Age, CityName, CourseName, Email, PersonName, TypeConstraintError};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i64,
    pub course: String,
    pub city: String,
    /// Identifier of the user who owns the record.
    pub created_by: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Validated payload for creating a student record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewStudent {
    pub name: PersonName,
    pub email: Email,
    pub age: Age,
    pub course: CourseName,
    pub city: CityName,
}

/// Partial update; only the provided fields are changed.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateStudent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<PersonName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<Age>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<CourseName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<CityName>,
}

impl UpdateStudent {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.age.is_none()
            && self.course.is_none()
            && self.city.is_none()
    }

    /// Applies the provided fields onto an existing record.
    pub fn apply(&self, student: &mut Student) {
        if let Some(name) = &self.name {
            student.name = name.to_string();
        }
        if let Some(email) = &self.email {
            student.email = email.to_string();
        }
        if let Some(age) = self.age {
            student.age = i64::from(age);
        }
        if let Some(course) = &self.course {
            student.course = course.to_string();
        }
        if let Some(city) = &self.city {
            student.city = city.to_string();
        }
    }
}

impl From<NewStudent> for UpdateStudent {
    fn from(value: NewStudent) -> Self {
        Self {
            name: Some(value.name),
            email: Some(value.email),
            age: Some(value.age),
            course: Some(value.course),
            city: Some(value.city),
        }
    }
}

/// Columns the student list can be ordered by.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Email,
    Age,
    Course,
    City,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Columns offered as clickable table headers.
    pub const SORTABLE_COLUMNS: [SortField; 5] = [
        SortField::Name,
        SortField::Email,
        SortField::Age,
        SortField::Course,
        SortField::City,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Email => "email",
            SortField::Age => "age",
            SortField::Course => "course",
            SortField::City => "city",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }

    /// Column header label.
    pub const fn label(self) -> &'static str {
        match self {
            SortField::Name => "Name",
            SortField::Email => "Email",
            SortField::Age => "Age",
            SortField::Course => "Course",
            SortField::City => "City",
            SortField::CreatedAt => "Created",
            SortField::UpdatedAt => "Updated",
        }
    }
}

impl Display for SortField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "name" => Ok(SortField::Name),
            "email" => Ok(SortField::Email),
            "age" => Ok(SortField::Age),
            "course" => Ok(SortField::Course),
            "city" => Ok(SortField::City),
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown sort field `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
