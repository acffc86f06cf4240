use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during record validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("name must not be empty or whitespace")]
    EmptyName,

    #[error("age must be between 0 and 120, got {0}")]
    AgeOutOfRange(i64),

    #[error("height must be greater than 0, got {0}")]
    HeightNotPositive(f64),
}

impl ValidationError {
    /// Name of the request field that failed validation
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyName => "name",
            ValidationError::AgeOutOfRange(_) => "age",
            ValidationError::HeightNotPositive(_) => "height",
        }
    }
}

/// A validated person record, one row of the CSV document
///
/// Records carry no identifier and no uniqueness constraint; duplicates
/// are permitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub age: i64,
    pub height: f64,
}

/// Unvalidated create-record payload as received on the wire
#[derive(Debug, Clone, Deserialize)]
pub struct NewPerson {
    pub name: String,
    pub age: i64,
    pub height: f64,
}

impl NewPerson {
    /// Validate the payload into a `Person`
    ///
    /// The stored name is trimmed of surrounding whitespace. Callers must
    /// reject the request before any store round trip when this fails.
    pub fn validate(self) -> Result<Person, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        if !(0..=120).contains(&self.age) {
            return Err(ValidationError::AgeOutOfRange(self.age));
        }

        // Written so that NaN fails the check too
        if !(self.height > 0.0) {
            return Err(ValidationError::HeightNotPositive(self.height));
        }

        Ok(Person {
            name: name.to_string(),
            age: self.age,
            height: self.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, age: i64, height: f64) -> NewPerson {
        NewPerson {
            name: name.to_string(),
            age,
            height,
        }
    }

    #[test]
    fn test_valid_record_passes() {
        let person = payload("Ana", 30, 1.65).validate().unwrap();
        assert_eq!(person.name, "Ana");
        assert_eq!(person.age, 30);
        assert_eq!(person.height, 1.65);
    }

    #[test]
    fn test_name_is_trimmed() {
        let person = payload(" Ana ", 30, 1.65).validate().unwrap();
        assert_eq!(person.name, "Ana");
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = payload("", 30, 1.65).validate().unwrap_err();
        assert_eq!(err, ValidationError::EmptyName);
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn test_whitespace_name_rejected() {
        let err = payload("   ", 30, 1.65).validate().unwrap_err();
        assert_eq!(err, ValidationError::EmptyName);
    }

    #[test]
    fn test_age_boundaries() {
        assert_eq!(
            payload("Ana", -1, 1.65).validate().unwrap_err(),
            ValidationError::AgeOutOfRange(-1)
        );
        assert!(payload("Ana", 0, 1.65).validate().is_ok());
        assert!(payload("Ana", 120, 1.65).validate().is_ok());
        assert_eq!(
            payload("Ana", 121, 1.65).validate().unwrap_err(),
            ValidationError::AgeOutOfRange(121)
        );
    }

    #[test]
    fn test_height_boundaries() {
        let err = payload("Ana", 30, 0.0).validate().unwrap_err();
        assert_eq!(err, ValidationError::HeightNotPositive(0.0));
        assert_eq!(err.field(), "height");

        assert!(payload("Ana", 30, 0.0001).validate().is_ok());
        assert!(payload("Ana", 30, -1.0).validate().is_err());
    }
}
