use std::collections::HashMap;

/// Per-view-type default members.
///
/// A OneWay or TwoWay binding that does not name a view member (`.Text=...`)
/// binds to the default member of its view's type.
#[derive(Debug, Clone, Default)]
pub struct DefaultMembers {
    by_type: HashMap<String, String>,
}

impl DefaultMembers {
    /// An empty map: every value binding must name its view member.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults for the stock view types of [`ViewNode`](crate::views::ViewNode).
    pub fn standard() -> Self {
        Self::new()
            .with("Label", "Text")
            .with("TextBox", "Text")
            .with("Button", "Title")
            .with("Toggle", "IsOn")
            .with("Slider", "Value")
            .with("ProgressBar", "Progress")
            .with("Image", "Source")
            .with("List", "SelectedItem")
    }

    pub fn with(mut self, view_type: impl Into<String>, member: impl Into<String>) -> Self {
        self.insert(view_type, member);
        self
    }

    pub fn insert(&mut self, view_type: impl Into<String>, member: impl Into<String>) {
        self.by_type.insert(view_type.into(), member.into());
    }

    pub fn get(&self, view_type: &str) -> Option<&str> {
        self.by_type.get(view_type).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_covers_stock_views() {
        let d = DefaultMembers::standard();
        assert_eq!(d.get("Label"), Some("Text"));
        assert_eq!(d.get("List"), Some("SelectedItem"));
        assert_eq!(d.get("Canvas"), None);
    }

    #[test]
    fn with_overrides() {
        let d = DefaultMembers::standard().with("Label", "Caption");
        assert_eq!(d.get("Label"), Some("Caption"));
    }
}
