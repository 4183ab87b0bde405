use crate::models::{HistoryPage, UploadId, UploadRecord};

pub const HISTORY_PAGE_SIZE: u32 = 10;
pub const RECENT_SCANS: u32 = 5;

/// The page of history currently held by the view.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryList {
    items: Vec<UploadRecord>,
    page: u32,
    total_pages: u32,
}

impl Default for HistoryList {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            total_pages: 1,
        }
    }
}

impl HistoryList {
    pub fn from_page(page: HistoryPage) -> Self {
        Self {
            items: page.items,
            page: page.page.max(1),
            total_pages: page.total_pages.max(1),
        }
    }

    pub fn items(&self) -> &[UploadRecord] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Removes the entry for `upload_id` after the backend confirmed the delete.
    pub fn remove(&mut self, upload_id: &UploadId) -> Option<UploadRecord> {
        let index = self.items.iter().position(|item| &item.upload_id == upload_id)?;
        Some(self.items.remove(index))
    }
}

/// Clamps a requested page number into `1..=total_pages`.
pub fn clamp_page(requested: u32, total_pages: u32) -> u32 {
    requested.clamp(1, total_pages.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UploadStatus;

    fn record(id: &str) -> UploadRecord {
        UploadRecord {
            upload_id: id.into(),
            file_name: format!("{id}.png"),
            uploaded_at: "2026-01-15T09:30:00".into(),
            status: UploadStatus::Done,
            overall_classification: Some("Normal".into()),
            confidence_score: Some(0.93),
            heatmap_url: None,
            report_url: None,
        }
    }

    fn list(ids: &[&str]) -> HistoryList {
        HistoryList::from_page(HistoryPage {
            items: ids.iter().map(|id| record(id)).collect(),
            total: ids.len() as u32,
            page: 2,
            page_size: 10,
            total_pages: 3,
        })
    }

    #[test]
    fn test_remove_only_matching_item() {
        let mut history = list(&["a", "b", "c"]);
        let removed = history.remove(&"b".into()).unwrap();
        assert_eq!(removed.upload_id.as_str(), "b");
        let remaining: Vec<&str> = history.items().iter().map(|i| i.upload_id.as_str()).collect();
        assert_eq!(remaining, vec!["a", "c"]);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut history = list(&["a", "b"]);
        assert_eq!(history.remove(&"zzz".into()), None);
        assert_eq!(history.items().len(), 2);
    }

    #[test]
    fn test_pagination_flags() {
        let history = list(&["a"]);
        assert!(history.has_previous());
        assert!(history.has_next());
        assert!(!HistoryList::default().has_next());
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(9, 3), 3);
        assert_eq!(clamp_page(2, 0), 1);
    }
}
