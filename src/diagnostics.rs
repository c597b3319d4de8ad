use log::Level;

/// A single operator-facing diagnostic message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub level: Level,
    pub message: String,
}

/// Developer-facing diagnostic channel.
///
/// Every entry goes to the `log` facade (and from there to the log file)
/// and is also kept here so the session can be inspected afterwards.
/// Nothing written here is ever shown in the map UI.
#[derive(Default)]
pub struct Diagnostics {
    entries: Vec<Entry>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Level::Warn, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::Error, message.into());
    }

    fn push(&mut self, level: Level, message: String) {
        log::log!(level, "{}", message);
        self.entries.push(Entry { level, message });
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entries at exactly the given level
    pub fn at_level(&self, level: Level) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(move |e| e.level == level)
    }
}
