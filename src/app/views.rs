//! Built-in page definitions.
//!
//! Pages ship as [`ViewDefinition`] values. They can also be loaded from a
//! JSON file with the same shape, which is how page content is edited
//! without a rebuild.

use std::path::Path;

use crate::grid::{ContentItem, ViewDefinition};

fn text(x: u32, y: u32, value: &str) -> ContentItem {
    ContentItem::Text {
        x,
        y,
        value: value.to_string(),
        padding_left: 0.0,
        link: None,
        text_color: None,
    }
}

fn link(x: u32, y: u32, value: &str, target: &str) -> ContentItem {
    ContentItem::Text {
        x,
        y,
        value: value.to_string(),
        padding_left: 0.0,
        link: Some(target.to_string()),
        text_color: None,
    }
}

/// The navigation block shared by every page.
fn nav(y: u32) -> Vec<ContentItem> {
    vec![
        link(2, y, "HOME", "home"),
        link(8, y, "WORK", "work"),
        link(14, y, "ABOUT", "about"),
        link(21, y, "CONTACT", "contact"),
    ]
}

/// All built-in pages, first entry is the landing page.
pub fn builtin_views() -> Vec<ViewDefinition> {
    let mut home = vec![
        ContentItem::SplitText {
            x: 2,
            y: 3,
            value: "PAGEGRID".to_string(),
            link: None,
            text_color: None,
        },
        text(2, 5, "A GRID OF CUBES"),
        text(2, 6, "THAT RENDERS PAGES"),
    ];
    home.extend(nav(9));

    let mut work = vec![
        text(2, 2, "SELECTED WORK"),
        ContentItem::Image {
            x: 2,
            y: 4,
            width: 10,
            height: 6,
            value: "assets/work.png".to_string(),
        },
        link(14, 5, "SOURCE", "https://github.com"),
    ];
    work.extend(nav(12));

    let mut about = vec![
        text(2, 2, "ABOUT"),
        text(2, 4, "EVERY CELL IS A CUBE."),
        text(2, 5, "EVERY PAGE IS A WAVE."),
    ];
    about.extend(nav(8));

    let mut contact = vec![
        text(2, 2, "CONTACT"),
        link(2, 4, "MAIL", "mailto:hello@example.com"),
    ];
    contact.extend(nav(7));

    vec![
        ViewDefinition::new("home", home),
        ViewDefinition::new("work", work),
        ViewDefinition::new("about", about),
        ViewDefinition::new("contact", contact),
    ]
}

/// Load page definitions from a JSON file.
pub fn load_views(
    path: impl AsRef<Path>,
) -> Result<Vec<ViewDefinition>, Box<dyn std::error::Error>> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Find a page by name.
pub fn find_view<'a>(views: &'a [ViewDefinition], name: &str) -> Option<&'a ViewDefinition> {
    views.iter().find(|v| v.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_nav_target_exists() {
        let views = builtin_views();
        for view in &views {
            for item in &view.items {
                if let Some(target) = item.link() {
                    if !target.contains(':') {
                        assert!(
                            find_view(&views, target).is_some(),
                            "dangling link {target} in {}",
                            view.name
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_landing_page_is_first() {
        let views = builtin_views();
        assert_eq!(views[0].name, "home");
    }

    #[test]
    fn test_views_round_trip_through_json() {
        let views = builtin_views();
        let json = serde_json::to_string(&views).unwrap();
        let back: Vec<ViewDefinition> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, views);
    }
}
