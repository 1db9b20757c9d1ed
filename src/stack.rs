/// A single pushed word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    /// Never reused, even after the entry is popped or the stack is cleared
    pub id: u64,
    pub value: String,
}

/// Tail-only growable stack that hands out strictly increasing ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    entries: Vec<StackEntry>,
    next_id: u64,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Appends `value` as the new top and returns the id it was given
    pub fn push(&mut self, value: String) -> u64 {
        let id = self.next_id;
        self.entries.push(StackEntry { id, value });
        self.next_id += 1;

        id
    }

    pub fn pop(&mut self) -> Option<StackEntry> {
        self.entries.pop()
    }

    /// Drops every entry. The id counter keeps going.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub fn top(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Entries from the bottom (index 0) to the top
    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}
