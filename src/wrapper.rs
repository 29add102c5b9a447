//! Text view over a typed value.
//!
//! A [`StringWrapper`] lets a text field edit a non-string value: the text is
//! kept as typed, parsed on every change, and written through to the value
//! only when parsing succeeds.

use std::fmt;

use parking_lot::Mutex;

use crate::property::Accessor;
use crate::{Error, Result};

type ParseFn<T> = Box<dyn Fn(&str) -> Result<T> + Send + Sync>;
type FormatFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

#[derive(Debug, Default)]
struct TextState {
    text: Option<String>,
    is_valid: bool,
}

pub struct StringWrapper<T> {
    value: Accessor<T>,
    parse: ParseFn<T>,
    format: FormatFn<T>,
    state: Mutex<TextState>,
}

impl<T: PartialEq> StringWrapper<T> {
    pub fn new(
        value: Accessor<T>,
        parse: impl Fn(&str) -> Result<T> + Send + Sync + 'static,
        format: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            value,
            parse: Box::new(parse),
            format: Box::new(format),
            state: Mutex::new(TextState {
                text: None,
                is_valid: true,
            }),
        }
    }

    /// Fails with `InvalidArgument("parse")` or `InvalidArgument("to_string")`
    /// when a conversion is missing.
    pub fn from_parts<P, F>(value: Accessor<T>, parse: Option<P>, format: Option<F>) -> Result<Self>
    where
        P: Fn(&str) -> Result<T> + Send + Sync + 'static,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        let parse = parse.ok_or(Error::InvalidArgument("parse"))?;
        let format = format.ok_or(Error::InvalidArgument("to_string"))?;
        Ok(Self::new(value, parse, format))
    }

    pub fn value(&self) -> T {
        self.value.get()
    }

    /// Write `value` and discard the edited text, but only if it differs from
    /// the current value.
    pub fn set_value(&self, value: T) {
        if self.value.get() == value {
            return;
        }
        self.value.set(value);
        self.reset_string();
    }

    /// The current text; formatted from the value on first access after
    /// construction or a reset.
    pub fn string_value(&self) -> String {
        let mut state = self.state.lock();
        match &state.text {
            Some(text) => text.clone(),
            None => {
                let text = (self.format)(&self.value.get());
                state.text = Some(text.clone());
                text
            }
        }
    }

    /// Store `text`; when it parses, write the parsed value through.
    ///
    /// A parsed value that differs from the current one replaces the typed
    /// text with its formatted form. Unparseable text leaves the value
    /// untouched and marks the wrapper invalid.
    pub fn set_string_value(&self, text: &str) {
        {
            let mut state = self.state.lock();
            if state.text.as_deref() == Some(text) {
                return;
            }
            state.text = Some(text.to_owned());
        }

        let parsed = (self.parse)(text);
        let mut state = self.state.lock();
        match parsed {
            Ok(value) => {
                state.is_valid = true;
                drop(state);
                self.set_value(value);
            }
            Err(err) => {
                tracing::debug!(error = %err, "string value rejected");
                state.is_valid = false;
            }
        }
    }

    /// Forget the edited text; the next read formats the value again.
    pub fn reset_string(&self) {
        let mut state = self.state.lock();
        state.text = None;
        state.is_valid = true;
    }

    pub fn is_valid(&self) -> bool {
        self.state.lock().is_valid
    }
}

impl<T> fmt::Debug for StringWrapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("StringWrapper")
            .field("text", &state.text)
            .field("is_valid", &state.is_valid)
            .finish_non_exhaustive()
    }
}
