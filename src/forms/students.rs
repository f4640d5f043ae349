use serde::Deserialize;
use validator::Validate;

use crate::domain::student::{NewStudent, UpdateStudent};
use crate::domain::types::{Age, CityName, CourseName, Email, PersonName};
use crate::forms::FormError;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
/// Form data for creating or editing a student.
pub struct StudentForm {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(range(min = 1, max = 150))]
    pub age: i64,
    #[validate(length(min = 2, max = 100))]
    pub course: String,
    #[validate(length(min = 2, max = 100))]
    pub city: String,
}

impl TryFrom<StudentForm> for NewStudent {
    type Error = FormError;

    fn try_from(form: StudentForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(Self {
            name: PersonName::new(form.name).map_err(|_| FormError::InvalidName)?,
            email: Email::new(form.email).map_err(|_| FormError::InvalidEmail)?,
            age: Age::new(form.age).map_err(|_| FormError::InvalidAge)?,
            course: CourseName::new(form.course).map_err(|_| FormError::InvalidCourse)?,
            city: CityName::new(form.city).map_err(|_| FormError::InvalidCity)?,
        })
    }
}

impl TryFrom<StudentForm> for UpdateStudent {
    type Error = FormError;

    /// The edit screen submits every field, so the update carries them all.
    fn try_from(form: StudentForm) -> Result<Self, Self::Error> {
        NewStudent::try_from(form).map(UpdateStudent::from)
    }
}
