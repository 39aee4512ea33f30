//! Pending items waiting for the next batch run.

use photoflow_shared::models::SubmittedItem;

/// Items in submission order
#[derive(Debug, Clone, Default)]
pub struct SubmissionQueue {
    items: Vec<SubmittedItem>,
}

impl SubmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, item: SubmittedItem) {
        self.items.push(item);
    }

    pub fn submit_all(&mut self, items: impl IntoIterator<Item = SubmittedItem>) {
        self.items.extend(items);
    }

    /// Remove the item at `index`, if present
    pub fn remove(&mut self, index: usize) -> Option<SubmittedItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[SubmittedItem] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(all(test, feature = "test-utils"))]
mod tests {
    use super::*;
    use crate::testing::image_item;

    fn names(queue: &SubmissionQueue) -> Vec<&str> {
        queue.items().iter().map(|i| i.file_name.as_str()).collect()
    }

    #[test]
    fn test_submit_preserves_order() {
        let mut queue = SubmissionQueue::new();
        queue.submit(image_item("a.jpg"));
        queue.submit_all([image_item("b.png"), image_item("c.webp")]);

        assert_eq!(queue.len(), 3);
        assert_eq!(names(&queue), vec!["a.jpg", "b.png", "c.webp"]);
    }

    #[test]
    fn test_remove_by_index() {
        let mut queue = SubmissionQueue::new();
        queue.submit_all([image_item("a.jpg"), image_item("b.jpg"), image_item("c.jpg")]);

        let removed = queue.remove(1).unwrap();
        assert_eq!(removed.file_name, "b.jpg");
        assert_eq!(names(&queue), vec!["a.jpg", "c.jpg"]);
        assert!(queue.remove(9).is_none());
    }

    #[test]
    fn test_clear() {
        let mut queue = SubmissionQueue::new();
        queue.submit(image_item("a.jpg"));
        queue.clear();
        assert!(queue.is_empty());
    }
}
