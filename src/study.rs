//! Static study material: reference links per topic and the about page.

use crate::quiz::Topic;

pub const PLACEHOLDER_URL: &str = "#";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Tutorial,
    Documentation,
    Examples,
}

impl ResourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Tutorial => "Tutorial",
            ResourceKind::Documentation => "Documentation",
            ResourceKind::Examples => "Examples",
        }
    }

    fn title_suffix(&self) -> &'static str {
        match self {
            ResourceKind::Tutorial => "Tutorial",
            ResourceKind::Documentation => "Reference",
            ResourceKind::Examples => "Examples",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub title: String,
    pub url: &'static str,
}

// tutorial, documentation, examples
const LINKS: [(&str, [&str; 3]); 6] = [
    (
        "html",
        [
            "https://www.w3schools.com/html/",
            "https://developer.mozilla.org/en-US/docs/Web/HTML",
            "https://www.w3schools.com/html/html_examples.asp",
        ],
    ),
    (
        "css",
        [
            "https://www.w3schools.com/css/",
            "https://developer.mozilla.org/en-US/docs/Web/CSS",
            "https://www.w3schools.com/css/css_examples.asp",
        ],
    ),
    (
        "javascript",
        [
            "https://javascript.info/",
            "https://developer.mozilla.org/en-US/docs/Web/JavaScript",
            "https://www.w3schools.com/js/js_examples.asp",
        ],
    ),
    (
        "react",
        [
            "https://react.dev/learn",
            "https://react.dev/reference/react",
            "https://react.dev/learn/describing-the-ui",
        ],
    ),
    (
        "python",
        [
            "https://docs.python.org/3/tutorial/",
            "https://docs.python.org/3/library/",
            "https://www.w3schools.com/python/python_examples.asp",
        ],
    ),
    (
        "java",
        [
            "https://dev.java/learn/",
            "https://docs.oracle.com/en/java/javase/21/docs/api/",
            "https://www.w3schools.com/java/java_examples.asp",
        ],
    ),
];

fn display_name(key: &str) -> String {
    if let Some(topic) = Topic::ALL
        .iter()
        .find(|t| t.as_str().to_lowercase() == key)
    {
        return topic.as_str().to_string();
    }
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Links for a lowercase topic key. Unknown topics get placeholder links.
pub fn resources(topic_key: &str) -> [Resource; 3] {
    let key = topic_key.trim().to_lowercase();
    let urls = LINKS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, urls)| *urls)
        .unwrap_or([PLACEHOLDER_URL; 3]);
    let name = display_name(&key);

    let resource = |kind: ResourceKind, url: &'static str| Resource {
        kind,
        title: format!("{} {}", name, kind.title_suffix()),
        url,
    };
    [
        resource(ResourceKind::Tutorial, urls[0]),
        resource(ResourceKind::Documentation, urls[1]),
        resource(ResourceKind::Examples, urls[2]),
    ]
}

pub fn render_index() -> String {
    let mut text = "Study Resources\nSelect a topic to explore study materials and resources:\n".to_string();
    for topic in Topic::ALL {
        text.push_str(&format!("\n📚 /study {}", topic.as_str().to_lowercase()));
    }
    text
}

pub fn render_topic(topic_key: &str) -> String {
    let resources = resources(topic_key);
    let mut text = format!("{} Resources\n", display_name(&topic_key.trim().to_lowercase()));
    for resource in &resources {
        text.push_str(&format!(
            "\n[{}] {}\n{}\n",
            resource.kind.label(),
            resource.title,
            resource.url
        ));
    }
    text
}

pub const ABOUT_TEXT: &str = "About Web Dev Quiz

Our Mission
Web Dev Quiz is designed to help developers test and improve their knowledge of web development technologies through interactive, challenging quizzes.

Key Features
💻 Multiple Technologies: covering HTML, CSS, JavaScript, React, Python, and more.
⏱️ Timed Challenges: 60 seconds per question to test your quick thinking.
📊 Detailed Report: see every answer, the correct one, and why.";
