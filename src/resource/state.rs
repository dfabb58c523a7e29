//! Resource state - pure data structure with no I/O logic

/// Fetch state of one remote dependency.
///
/// `loading` and `error` are never both set: starting a fetch clears the
/// error, success clears it too, and failure drops the data.
#[derive(Clone, Debug, PartialEq)]
pub struct Resource<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Resource {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> Resource<T> {
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn succeed(&mut self, data: T) {
        self.data = Some(data);
        self.error = None;
        self.loading = false;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.data = None;
        self.error = Some(message.into());
        self.loading = false;
    }
}
