use serde::{Deserialize, Serialize};

/// Entity kinds that draw ids from the shared counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Component,
    Style,
    Breakpoint,
    Behavior,
}

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::Component => "c",
            IdKind::Style => "s",
            IdKind::Breakpoint => "bp",
            IdKind::Behavior => "b",
        }
    }
}

/// Sequential ID allocator shared by every entity kind within a namespace.
///
/// Allocation is append-only; commands that allocate during `apply` hand the
/// exact number of consumed ids back through [`IdAllocator::release`] when
/// they are undone, so an apply/undo pair leaves the counter untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdAllocator {
    namespace: String,
    next_id: u64,
}

impl IdAllocator {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            next_id: 0,
        }
    }

    /// Mint the next id for `kind`
    pub fn new_id(&mut self, kind: IdKind) -> String {
        self.next_id += 1;
        self.format(kind, self.next_id)
    }

    /// The id the next call to [`IdAllocator::new_id`] would return
    pub fn peek(&self, kind: IdKind) -> String {
        self.format(kind, self.next_id + 1)
    }

    /// Hand back the `count` most recently minted ids
    pub fn release(&mut self, count: u64) {
        self.next_id = self.next_id.saturating_sub(count);
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn format(&self, kind: IdKind, n: u64) -> String {
        format!("{}-{}-{}", kind.prefix(), self.namespace, n)
    }
}
