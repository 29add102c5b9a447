//! End-to-end tests for validation on an observable host.

use std::sync::Arc;

use mvvm_rs::{
    Declarations, ObjectValidator, Observable, ObservableObject, PropertyCell, RuleValidator, Validatable,
    ValidationErrors,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

// ============================================================================
// Helper: a sign-up form that re-validates each field as it changes.
// ============================================================================

struct SignUp {
    core: ObservableObject<SignUp>,
    errors: ValidationErrors,
    user: PropertyCell<String>,
    age: PropertyCell<i64>,
    validator: Arc<RuleValidator<SignUp>>,
}

impl Observable for SignUp {
    fn core(&self) -> &ObservableObject<Self> {
        &self.core
    }

    fn declare(d: &mut Declarations<Self>) {
        d.property("CanSubmit").depends_on("User").depends_on("Age");
    }
}

impl Validatable for SignUp {
    fn validation_errors(&self) -> &ValidationErrors {
        &self.errors
    }
}

impl SignUp {
    fn new() -> Self {
        let validator = RuleValidator::new()
            .required("User", |f: &SignUp| f.user.get())
            .rule("User", |f: &SignUp| f.user.with(|u| !u.contains(' ')), "User must not contain spaces")
            .range("Age", |f: &SignUp| f.age.get(), 13, 120);
        Self {
            core: ObservableObject::new(),
            errors: ValidationErrors::new(),
            user: PropertyCell::default(),
            age: PropertyCell::new(18),
            validator: Arc::new(validator),
        }
    }

    fn set_user(&self, user: &str) {
        if self.set_slot(&self.user, user.to_string(), "User") {
            self.validator.validate_property(self, "User");
        }
    }

    fn set_age(&self, age: i64) {
        if self.set_slot(&self.age, age, "Age") {
            self.validator.validate_property(self, "Age");
        }
    }
}

// ============================================================================
// 1. Full validation
// ============================================================================

#[test]
fn test_validate_reports_every_failure() {
    let form = SignUp::new();
    form.validator.validate(&form);

    assert!(!form.is_valid());
    assert_eq!(
        form.errors.all_errors(),
        vec![("User".to_string(), vec!["User is required".to_string()])]
    );
}

// ============================================================================
// 2. Per-property validation tracks edits
// ============================================================================

#[test]
fn test_property_validation_follows_edits() {
    let form = SignUp::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    form.errors.subscribe_errors_changed(move |name| sink.lock().push(name.to_string()));

    form.set_user("ada lovelace");
    assert_eq!(form.errors.errors("User"), vec!["User must not contain spaces"]);

    form.set_user("ada");
    assert!(form.errors.errors("User").is_empty());

    form.set_age(7);
    assert_eq!(form.errors.errors("Age"), vec!["Age must be between 13 and 120"]);
    assert!(!form.is_valid());

    form.set_age(30);
    assert!(form.is_valid());

    // Every per-property run reports, plus one more for each clear of old errors.
    assert_eq!(*events.lock(), vec!["User", "User", "User", "Age", "Age", "Age"]);
}

// ============================================================================
// 3. Errors changed and property changed are separate channels
// ============================================================================

#[test]
fn test_validation_does_not_raise_property_changed() {
    let form = SignUp::new();
    let names = Arc::new(Mutex::new(Vec::new()));
    let sink = names.clone();
    form.subscribe_property_changed(move |name| sink.lock().push(name.to_string()));

    form.validator.validate(&form);
    assert!(names.lock().is_empty());

    form.set_user("grace");
    assert_eq!(*names.lock(), vec!["User", "CanSubmit"]);
}

#[cfg(feature = "async")]
#[tokio::test(flavor = "multi_thread")]
async fn test_validate_async_matches_sync() {
    let form = Arc::new(SignUp::new());
    let validator = form.validator.clone();

    validator.validate_async(form.clone()).await.unwrap();
    assert_eq!(form.errors.errors("User"), vec!["User is required"]);

    validator.validate_property_async(form.clone(), "Age").await.unwrap();
    assert!(form.errors.errors("Age").is_empty());
}
