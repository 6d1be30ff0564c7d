pub const VALID_CLASS: &str = "is-valid";
pub const INVALID_CLASS: &str = "is-invalid";
pub const WAS_VALIDATED_CLASS: &str = "was-validated";
pub const GENERIC_MESSAGE: &str = "Please check this field.";

/// The subset of a control's `ValidityState` that gets its own message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Validity {
    pub value_missing: bool,
    pub type_mismatch: bool,
    pub too_short: bool,
    pub too_long: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Required,
    TypeMismatch,
    TooShort,
    TooLong,
    Other,
}

impl Validity {
    /// First matching category wins, in the order the checks are listed.
    pub fn failure(&self) -> FailureKind {
        if self.value_missing {
            FailureKind::Required
        } else if self.type_mismatch {
            FailureKind::TypeMismatch
        } else if self.too_short {
            FailureKind::TooShort
        } else if self.too_long {
            FailureKind::TooLong
        } else {
            FailureKind::Other
        }
    }
}

/// What the message needs to know about the failing control.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: Option<String>,
    pub input_type: String,
    pub min_length: i32,
    pub max_length: i32,
}

impl FieldInfo {
    fn label(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "Field",
        }
    }
}

pub fn field_error_message(field: &FieldInfo, validity: &Validity) -> String {
    let name = field.label();
    match validity.failure() {
        FailureKind::Required => format!("{name} is required."),
        FailureKind::TypeMismatch => format!("Please enter a valid {}.", field.input_type),
        FailureKind::TooShort => {
            format!("{name} must be at least {} characters.", field.min_length)
        }
        FailureKind::TooLong => {
            format!("{name} must be no more than {} characters.", field.max_length)
        }
        FailureKind::Other => GENERIC_MESSAGE.to_string(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldStatus {
    Valid,
    Invalid,
}

impl FieldStatus {
    pub fn from_check(is_valid: bool) -> Self {
        if is_valid {
            Self::Valid
        } else {
            Self::Invalid
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Self::Valid => VALID_CLASS,
            Self::Invalid => INVALID_CLASS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: Option<&str>) -> FieldInfo {
        FieldInfo {
            name: name.map(str::to_string),
            input_type: "email".to_string(),
            min_length: 3,
            max_length: 10,
        }
    }

    #[test]
    fn messages_per_category() {
        let f = field(Some("email"));
        let missing = Validity { value_missing: true, type_mismatch: true, ..Default::default() };
        assert_eq!(field_error_message(&f, &missing), "email is required.");
        let mismatch = Validity { type_mismatch: true, ..Default::default() };
        assert_eq!(field_error_message(&f, &mismatch), "Please enter a valid email.");
        let short = Validity { too_short: true, ..Default::default() };
        assert_eq!(field_error_message(&f, &short), "email must be at least 3 characters.");
        let long = Validity { too_long: true, ..Default::default() };
        assert_eq!(field_error_message(&f, &long), "email must be no more than 10 characters.");
    }

    #[test]
    fn unclassified_failure_gets_generic_message() {
        assert_eq!(
            field_error_message(&field(Some("age")), &Validity::default()),
            GENERIC_MESSAGE
        );
    }

    #[test]
    fn unnamed_field_reads_as_field() {
        let missing = Validity { value_missing: true, ..Default::default() };
        assert_eq!(field_error_message(&field(None), &missing), "Field is required.");
        assert_eq!(field_error_message(&field(Some("")), &missing), "Field is required.");
    }

    #[test]
    fn status_classes() {
        assert_eq!(FieldStatus::from_check(true).class(), "is-valid");
        assert_eq!(FieldStatus::from_check(false).class(), "is-invalid");
    }
}
