/// How long an error notification stays up, in milliseconds.
const ERROR_DURATION_MS: u64 = 6000;

/// A transient error rendered over the note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub duration_ms: u64,
}

/// In-memory notification queue with monotonic ID assignment.
///
/// Dismissal timers belong to the view; this only holds the queue.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    items: Vec<Notification>,
    next_id: u64,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error with the failure text from a reply. Returns the assigned ID.
    pub fn error_with(&mut self, title: impl Into<String>, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Notification {
            id,
            title: title.into(),
            message: message.into(),
            duration_ms: ERROR_DURATION_MS,
        });
        id
    }

    /// Dismiss by ID. Returns `true` if found.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let len_before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != len_before
    }

    pub fn get(&self, id: u64) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
