use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{canonical_choice, lower, opt_json, text_or, TableModule, NOT_AVAILABLE, UNKNOWN};
use crate::table::{ColumnDescriptor, FilterDescriptor, Record, SortOption};

pub const AUDIENCES: [&str; 3] = ["All", "Students", "Instructors"];
pub const PRIORITIES: [&str; 3] = ["High", "Normal", "Low"];

type Column = ColumnDescriptor<Notice>;
type Sort = SortOption<Notice>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Notice {
    pub id: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub audience: Option<String>,
    pub priority: Option<String>,
    pub author: Option<String>,
    pub published_on: Option<String>,
    pub pinned: Option<bool>,
    pub notified_at: Option<String>,
}

impl Notice {
    pub fn priority_rank(&self) -> u8 {
        match canonical_choice(&self.priority, &PRIORITIES) {
            "High" => 0,
            "Normal" => 1,
            "Low" => 2,
            _ => 3,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned.unwrap_or(false)
    }
}

impl Record for Notice {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(json!(self.id)),
            "title" => opt_json(&self.title),
            "body" => opt_json(&self.body),
            "audience" => opt_json(&self.audience),
            "priority" => opt_json(&self.priority),
            "author" => opt_json(&self.author),
            "publishedOn" => opt_json(&self.published_on),
            "pinned" => opt_json(&self.pinned),
            "notifiedAt" => opt_json(&self.notified_at),
            _ => None,
        }
    }
}

fn newest_first(a: &Notice, b: &Notice) -> Ordering {
    b.is_pinned()
        .cmp(&a.is_pinned())
        .then_with(|| lower(&b.published_on).cmp(&lower(&a.published_on)))
}

impl TableModule for Notice {
    const KIND: &'static str = "notices";
    const NOTIFIABLE: bool = true;

    fn columns() -> Vec<ColumnDescriptor<Self>> {
        vec![
            Column::new("title", "Title")
                .render_with(|n, _| {
                    let title = text_or(&n.title, "Untitled");
                    if n.is_pinned() {
                        format!("[pinned] {title}")
                    } else {
                        title
                    }
                })
                .sortable(),
            Column::new("audience", "Audience")
                .render_with(|n, _| canonical_choice(&n.audience, &AUDIENCES).to_string()),
            Column::new("priority", "Priority")
                .render_with(|n, _| canonical_choice(&n.priority, &PRIORITIES).to_string())
                .sortable(),
            Column::new("author", "Author").render_with(|n, _| text_or(&n.author, UNKNOWN)),
            Column::new("publishedOn", "Published")
                .render_with(|n, _| text_or(&n.published_on, NOT_AVAILABLE))
                .sortable(),
        ]
    }

    fn filters() -> Vec<FilterDescriptor> {
        vec![
            FilterDescriptor::with_all("audience", "Audience", &AUDIENCES),
            FilterDescriptor::with_all("priority", "Priority", &PRIORITIES),
        ]
    }

    fn sort_options() -> Vec<SortOption<Self>> {
        vec![
            Sort::new("newest", "Newest first", newest_first),
            Sort::new("oldest", "Oldest first", |a, b| {
                lower(&a.published_on).cmp(&lower(&b.published_on))
            }),
            Sort::new("priority", "Priority", |a, b| {
                a.priority_rank()
                    .cmp(&b.priority_rank())
                    .then_with(|| newest_first(a, b))
            }),
        ]
    }

    fn search_fields() -> &'static [&'static str] {
        &["title", "body", "author"]
    }

    fn display(&self) -> Value {
        json!({
            "id": self.id,
            "title": text_or(&self.title, "Untitled"),
            "body": text_or(&self.body, ""),
            "audience": canonical_choice(&self.audience, &AUDIENCES),
            "priority": canonical_choice(&self.priority, &PRIORITIES),
            "author": text_or(&self.author, UNKNOWN),
            "publishedOn": text_or(&self.published_on, NOT_AVAILABLE),
            "pinned": self.is_pinned(),
            "notifiedAt": self.notified_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::FilterState;

    fn notice(id: &str, priority: &str, date: &str, pinned: bool) -> Notice {
        Notice {
            id: id.into(),
            title: Some(format!("Notice {id}")),
            priority: Some(priority.into()),
            published_on: Some(date.into()),
            pinned: Some(pinned),
            ..Notice::default()
        }
    }

    #[test]
    fn newest_keeps_pinned_on_top() {
        let all = vec![
            notice("a", "Low", "2026-09-01", false),
            notice("b", "High", "2026-09-10", false),
            notice("c", "Normal", "2026-08-01", true),
        ];
        let out = Notice::pipeline().process(&all, "", &FilterState::new(), Some("newest"));
        let ids: Vec<_> = out.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn priority_sort_ranks_unknown_last() {
        let all = vec![
            notice("a", "urgent", "2026-09-01", false),
            notice("b", "low", "2026-09-10", false),
            notice("c", "HIGH", "2026-08-01", false),
        ];
        let out = Notice::pipeline().process(&all, "", &FilterState::new(), Some("priority"));
        let ids: Vec<_> = out.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn untitled_notice_display() {
        let row = Notice::default().display();
        assert_eq!(row["title"], "Untitled");
        assert_eq!(row["priority"], "Unknown");
        assert_eq!(row["pinned"], false);
    }
}
