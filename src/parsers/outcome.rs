/// What a polling reader found on disk.
///
/// Result and log files are written by a transport process that may still be
/// running, so absence or garbage is reported instead of raised. Callers that
/// only care about rows use [`ReadOutcome::into_table`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<T> {
    Ready(T),
    /// File missing or still empty
    NotYetAvailable,
    /// File present but unreadable or not in the expected layout
    Malformed(String),
}

impl<T> ReadOutcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, ReadOutcome::Ready(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ReadOutcome<U> {
        match self {
            ReadOutcome::Ready(table) => ReadOutcome::Ready(f(table)),
            ReadOutcome::NotYetAvailable => ReadOutcome::NotYetAvailable,
            ReadOutcome::Malformed(reason) => ReadOutcome::Malformed(reason),
        }
    }

    /// Short label for status lines.
    pub fn describe(&self) -> String {
        match self {
            ReadOutcome::Ready(_) => "ready".to_string(),
            ReadOutcome::NotYetAvailable => "waiting for data".to_string(),
            ReadOutcome::Malformed(reason) => format!("malformed ({reason})"),
        }
    }
}

impl<T: Default> ReadOutcome<T> {
    /// Rows when ready, an empty table otherwise.
    pub fn into_table(self) -> T {
        match self {
            ReadOutcome::Ready(table) => table,
            _ => T::default(),
        }
    }
}
