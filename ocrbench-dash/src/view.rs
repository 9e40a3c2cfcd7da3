//! View router
//!
//! Two views: the dashboard (default) and the detail view of one
//! subcategory. The state round-trips through URL query parameters
//! (`view`, `category`, `subcategory`) so a view can be bookmarked, and
//! [`Navigator`] keeps a back/forward history of explicit navigations.

use reqwest::Url;
use serde::Serialize;

const PARAM_VIEW: &str = "view";
const PARAM_CATEGORY: &str = "category";
const PARAM_SUBCATEGORY: &str = "subcategory";
const DETAILS: &str = "details";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum View {
    #[default]
    Dashboard,
    Details {
        category: String,
        subcategory: String,
    },
}

impl View {
    pub fn details(category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        View::Details {
            category: category.into(),
            subcategory: subcategory.into(),
        }
    }

    /// Read the view from a URL's query parameters
    ///
    /// Anything other than `view=details` with both a non-empty category and
    /// subcategory is the dashboard.
    pub fn from_url(url: &Url) -> Self {
        let mut view = None;
        let mut category = None;
        let mut subcategory = None;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                PARAM_VIEW => view = Some(value.into_owned()),
                PARAM_CATEGORY => category = Some(value.into_owned()),
                PARAM_SUBCATEGORY => subcategory = Some(value.into_owned()),
                _ => {}
            }
        }

        match (view.as_deref(), category, subcategory) {
            (Some(DETAILS), Some(category), Some(subcategory))
                if !category.is_empty() && !subcategory.is_empty() =>
            {
                View::Details {
                    category,
                    subcategory,
                }
            }
            _ => View::Dashboard,
        }
    }

    /// Read the view from a bare query string (leading `?` optional)
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        match Url::parse(&format!("http://localhost/?{query}")) {
            Ok(url) => Self::from_url(&url),
            Err(_) => View::Dashboard,
        }
    }

    /// Write the view parameters into `url`, keeping unrelated parameters
    pub fn apply_to_url(&self, url: &mut Url) {
        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| {
                !matches!(key.as_ref(), PARAM_VIEW | PARAM_CATEGORY | PARAM_SUBCATEGORY)
            })
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let mut pairs = url.query_pairs_mut();
        pairs.clear().extend_pairs(retained);
        match self {
            View::Dashboard => {
                pairs.append_pair(PARAM_VIEW, "dashboard");
            }
            View::Details {
                category,
                subcategory,
            } => {
                pairs
                    .append_pair(PARAM_VIEW, DETAILS)
                    .append_pair(PARAM_CATEGORY, category)
                    .append_pair(PARAM_SUBCATEGORY, subcategory);
            }
        }
    }

    /// Query string for this view, without the leading `?`
    pub fn to_query(&self) -> String {
        match Url::parse("http://localhost/") {
            Ok(mut url) => {
                self.apply_to_url(&mut url);
                url.query().unwrap_or_default().to_string()
            }
            Err(_) => String::new(),
        }
    }
}

/// Back/forward history of views
#[derive(Debug, Clone)]
pub struct Navigator {
    history: Vec<View>,
    position: usize,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(View::Dashboard)
    }
}

impl Navigator {
    pub fn new(initial: View) -> Self {
        Self {
            history: vec![initial],
            position: 0,
        }
    }

    pub fn current(&self) -> &View {
        &self.history[self.position]
    }

    /// Push a view; any forward history is discarded
    pub fn navigate_to(&mut self, view: View) -> &View {
        self.history.truncate(self.position + 1);
        self.history.push(view);
        self.position += 1;
        self.current()
    }

    pub fn open_details(&mut self, category: &str, subcategory: &str) -> &View {
        self.navigate_to(View::details(category, subcategory))
    }

    pub fn open_dashboard(&mut self) -> &View {
        self.navigate_to(View::Dashboard)
    }

    pub fn can_go_back(&self) -> bool {
        self.position > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.position + 1 < self.history.len()
    }

    pub fn back(&mut self) -> Option<&View> {
        if !self.can_go_back() {
            return None;
        }
        self.position -= 1;
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<&View> {
        if !self.can_go_forward() {
            return None;
        }
        self.position += 1;
        Some(self.current())
    }
}
