//! Predicate-table validator.

use std::fmt;
#[cfg(feature = "async")]
use std::sync::Arc;

use super::{ObjectValidator, Validatable};

type Check<H> = Box<dyn Fn(&H) -> bool + Send + Sync>;

struct Rule<H> {
    property: String,
    check: Check<H>,
    message: String,
}

/// Validator built from `(property, predicate, message)` rules.
///
/// ```rust,ignore
/// let validator = RuleValidator::<Account>::new()
///     .required("Name", |a| a.name.get())
///     .range("Age", |a| a.age.get(), 0, 150);
/// ```
pub struct RuleValidator<H> {
    rules: Vec<Rule<H>>,
}

impl<H> RuleValidator<H> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// `message` is recorded against `property` whenever `check` returns false.
    pub fn rule(
        mut self,
        property: &str,
        check: impl Fn(&H) -> bool + Send + Sync + 'static,
        message: impl Into<String>,
    ) -> Self {
        self.rules.push(Rule {
            property: property.to_owned(),
            check: Box::new(check),
            message: message.into(),
        });
        self
    }

    /// Fails on empty or whitespace-only text.
    pub fn required<S>(
        self,
        property: &str,
        value: impl Fn(&H) -> S + Send + Sync + 'static,
    ) -> Self
    where
        S: AsRef<str>,
    {
        let message = format!("{property} is required");
        self.rule(property, move |host| !value(host).as_ref().trim().is_empty(), message)
    }

    /// Fails when the value is outside `min..=max`.
    pub fn range<T>(
        self,
        property: &str,
        value: impl Fn(&H) -> T + Send + Sync + 'static,
        min: T,
        max: T,
    ) -> Self
    where
        T: PartialOrd + fmt::Display + Send + Sync + 'static,
    {
        let message = format!("{property} must be between {min} and {max}");
        self.rule(
            property,
            move |host| {
                let v = value(host);
                v >= min && v <= max
            },
            message,
        )
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn failures<'a>(&'a self, host: &'a H, only: Option<&'a str>) -> Vec<(&'a str, Vec<&'a str>)> {
        let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
        for rule in &self.rules {
            if only.is_some_and(|p| p != rule.property) || (rule.check)(host) {
                continue;
            }
            match grouped.iter_mut().find(|(p, _)| *p == rule.property) {
                Some((_, messages)) => messages.push(rule.message.as_str()),
                None => grouped.push((rule.property.as_str(), vec![rule.message.as_str()])),
            }
        }
        grouped
    }
}

impl<H> Default for RuleValidator<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Validatable> ObjectValidator<H> for RuleValidator<H> {
    fn validate(&self, host: &H) {
        let errors = host.validation_errors();
        errors.clear_all_errors();
        let failures = self.failures(host, None);
        tracing::debug!(rules = self.rules.len(), failed = failures.len(), "validated object");
        for (property, messages) in failures {
            errors.add_errors(property, messages);
        }
    }

    fn validate_property(&self, host: &H, property: &str) {
        let errors = host.validation_errors();
        errors.clear_errors(property);
        let messages: Vec<&str> = self
            .failures(host, Some(property))
            .into_iter()
            .flat_map(|(_, messages)| messages)
            .collect();
        tracing::debug!(property, failed = messages.len(), "validated property");
        // Raises errors_changed even when the property is valid.
        errors.add_errors(property, messages);
    }
}

#[cfg(feature = "async")]
impl<H: Validatable + 'static> RuleValidator<H> {
    /// Run [`validate`](ObjectValidator::validate) on the blocking pool.
    pub fn validate_async(self: &Arc<Self>, host: Arc<H>) -> tokio::task::JoinHandle<()> {
        let validator = Arc::clone(self);
        tokio::task::spawn_blocking(move || validator.validate(&host))
    }

    pub fn validate_property_async(
        self: &Arc<Self>,
        host: Arc<H>,
        property: &str,
    ) -> tokio::task::JoinHandle<()> {
        let validator = Arc::clone(self);
        let property = property.to_owned();
        tokio::task::spawn_blocking(move || validator.validate_property(&host, &property))
    }
}

impl<H> fmt::Debug for RuleValidator<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| (&r.property, &r.message)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyCell;
    use crate::validation::ValidationErrors;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Account {
        name: PropertyCell<String>,
        age: PropertyCell<i32>,
        errors: ValidationErrors,
    }

    impl Validatable for Account {
        fn validation_errors(&self) -> &ValidationErrors {
            &self.errors
        }
    }

    fn account(name: &str, age: i32) -> Account {
        Account {
            name: PropertyCell::new(name.to_string()),
            age: PropertyCell::new(age),
            errors: ValidationErrors::new(),
        }
    }

    fn validator() -> RuleValidator<Account> {
        RuleValidator::new()
            .required("Name", |a: &Account| a.name.get())
            .range("Age", |a: &Account| a.age.get(), 0, 150)
            .rule("Age", |a: &Account| a.age.get() % 2 == 0, "Age must be even")
    }

    #[test]
    fn test_validate_groups_by_property() {
        let account = account("  ", 151);

        validator().validate(&account);
        assert!(!account.is_valid());
        assert_eq!(account.errors.errors("Name"), vec!["Name is required"]);
        assert_eq!(
            account.errors.errors("Age"),
            vec!["Age must be between 0 and 150", "Age must be even"]
        );
    }

    #[test]
    fn test_validate_property_touches_only_that_property() {
        let account = account("", -1);
        account.errors.add_error("Name", "stale");

        validator().validate_property(&account, "Age");
        assert_eq!(account.errors.errors("Name"), vec!["stale"]);
        assert_eq!(account.errors.errors("Age").len(), 2);
    }

    #[test]
    fn test_validate_property_always_raises() {
        let account = account("Ada", 30);
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        account
            .errors
            .subscribe_errors_changed(move |name| sink.lock().push(name.to_string()));

        validator().validate_property(&account, "Age");
        assert!(account.errors.errors("Age").is_empty());
        assert!(account.is_valid());
        assert_eq!(*events.lock(), vec!["Age"]);
    }

    #[test]
    fn test_valid_object_clears_previous_errors() {
        let account = account("Ada", 30);
        account.errors.add_error("Name", "stale");

        validator().validate(&account);
        assert!(account.is_valid());
    }
}
