//! Built-in question bank used whenever AI generation is unavailable or fails.
//! Pools are keyed by the exact topic label and do not depend on difficulty.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::quiz::{Question, QUESTIONS_PER_ROUND};

type Entry = (&'static str, [&'static str; 4], &'static str, &'static str);

const HTML: &[Entry] = &[
    (
        "What does HTML stand for?",
        [
            "Hyper Text Markup Language",
            "Home Tool Markup Language",
            "Hyperlinks and Text Markup Language",
            "Hyperlink Transfer Markup Language",
        ],
        "Hyper Text Markup Language",
        "HTML stands for Hyper Text Markup Language.",
    ),
    (
        "Which HTML tag is used for a hyperlink?",
        ["<link>", "<a>", "<href>", "<hyper>"],
        "<a>",
        "The <a> tag defines a hyperlink.",
    ),
    (
        "Which element holds the visible content of a page?",
        ["<head>", "<meta>", "<body>", "<title>"],
        "<body>",
        "Everything rendered on the page lives inside <body>.",
    ),
    (
        "Which attribute provides alternative text for an image?",
        ["title", "alt", "src", "longdesc"],
        "alt",
        "The alt attribute describes the image for screen readers and broken loads.",
    ),
    (
        "Which tag creates the largest heading?",
        ["<h6>", "<heading>", "<h1>", "<head>"],
        "<h1>",
        "Headings go from <h1> (largest) to <h6> (smallest).",
    ),
    (
        "Which input type hides the characters a user types?",
        ["text", "hidden", "secret", "password"],
        "password",
        "type=\"password\" masks the entered characters.",
    ),
];

const CSS: &[Entry] = &[
    (
        "Which CSS property controls text size?",
        ["font-style", "text-size", "font-size", "text-style"],
        "font-size",
        "The font-size property sets the size of the text.",
    ),
    (
        "What does CSS stand for?",
        [
            "Computer Style Sheets",
            "Creative Style System",
            "Cascading Style Sheets",
            "Colorful Style Sheets",
        ],
        "Cascading Style Sheets",
        "CSS stands for Cascading Style Sheets.",
    ),
    (
        "Which selector targets an element with id=\"main\"?",
        [".main", "#main", "main", "*main"],
        "#main",
        "The # prefix selects by id, the . prefix by class.",
    ),
    (
        "Which property adds space inside an element's border?",
        ["margin", "spacing", "padding", "gap"],
        "padding",
        "Padding is inside the border, margin is outside it.",
    ),
    (
        "Which display value turns an element into a flex container?",
        ["block", "flex", "inline", "grid-flex"],
        "flex",
        "display: flex enables the flexbox layout for the children.",
    ),
    (
        "Which property changes the text color?",
        ["color", "font-color", "text-color", "foreground"],
        "color",
        "The color property sets the foreground color of text.",
    ),
];

const JAVASCRIPT: &[Entry] = &[
    (
        "How do you create a function in JavaScript?",
        [
            "function = myFunction()",
            "function myFunction()",
            "def myFunction()",
            "create myFunction()",
        ],
        "function myFunction()",
        "Use the 'function' keyword followed by the function name.",
    ),
    (
        "Which keyword declares a block-scoped variable that cannot be reassigned?",
        ["var", "let", "const", "static"],
        "const",
        "const bindings are block-scoped and cannot be reassigned.",
    ),
    (
        "What does typeof null return?",
        ["\"null\"", "\"object\"", "\"undefined\"", "\"number\""],
        "\"object\"",
        "typeof null is \"object\", a long-standing quirk of the language.",
    ),
    (
        "Which operator compares both value and type?",
        ["==", "=", "===", "!="],
        "===",
        "Strict equality (===) does not coerce types.",
    ),
    (
        "Which array method adds an element to the end?",
        ["push()", "pop()", "shift()", "unshift()"],
        "push()",
        "push() appends, unshift() prepends.",
    ),
    (
        "How do you write a single-line comment?",
        ["<!-- comment -->", "# comment", "// comment", "/* comment"],
        "// comment",
        "Single-line comments start with //.",
    ),
];

const REACT: &[Entry] = &[
    (
        "Which company developed React?",
        ["Google", "Facebook", "Microsoft", "Apple"],
        "Facebook",
        "React was originally developed by Facebook.",
    ),
    (
        "Which hook adds local state to a function component?",
        ["useEffect", "useState", "useRef", "useMemo"],
        "useState",
        "useState returns the current value and a setter.",
    ),
    (
        "What syntax extension lets you write markup inside JavaScript?",
        ["JSX", "TSX", "XML", "HTMX"],
        "JSX",
        "JSX compiles to React.createElement calls.",
    ),
    (
        "Which prop helps React identify list items between renders?",
        ["id", "ref", "key", "index"],
        "key",
        "Stable keys let React match list items across renders.",
    ),
    (
        "Which hook runs side effects after rendering?",
        ["useEffect", "useState", "useContext", "useReducer"],
        "useEffect",
        "useEffect runs after the render is committed.",
    ),
    (
        "How is data passed from a parent to a child component?",
        ["state", "props", "context only", "refs"],
        "props",
        "Parents pass data down through props.",
    ),
];

const PYTHON: &[Entry] = &[
    (
        "In Python, how do you start a for loop?",
        [
            "for i = 1 to 10:",
            "for i in range(10):",
            "for (i=0; i<10; i++)",
            "loop i from 0 to 9",
        ],
        "for i in range(10):",
        "Python uses 'for ... in range()' syntax for loops.",
    ),
    (
        "Which keyword defines a function?",
        ["func", "function", "def", "lambda"],
        "def",
        "Named functions are defined with def.",
    ),
    (
        "Which type is immutable?",
        ["list", "dict", "set", "tuple"],
        "tuple",
        "Tuples cannot be changed after creation.",
    ),
    (
        "What does len([1, 2, 3]) return?",
        ["2", "3", "4", "6"],
        "3",
        "len returns the number of items.",
    ),
    (
        "How do you start a comment?",
        ["//", "#", "--", "/*"],
        "#",
        "Python comments start with #.",
    ),
    (
        "Which statement handles exceptions?",
        ["try/except", "try/catch", "do/rescue", "catch/finally"],
        "try/except",
        "Python uses try/except blocks.",
    ),
];

const JAVA: &[Entry] = &[
    (
        "What keyword starts a class definition in Java?",
        ["class", "def", "function", "module"],
        "class",
        "Java uses the 'class' keyword to define a class.",
    ),
    (
        "Which method is the entry point of a Java application?",
        ["start()", "main()", "run()", "init()"],
        "main()",
        "The JVM starts execution at public static void main(String[] args).",
    ),
    (
        "Which keyword creates a subclass?",
        ["implements", "inherits", "extends", "super"],
        "extends",
        "A class extends another class and implements interfaces.",
    ),
    (
        "Which type stores a single 16-bit Unicode character?",
        ["char", "byte", "String", "short"],
        "char",
        "char is a 16-bit UTF-16 code unit.",
    ),
    (
        "Which keyword prevents a variable from being reassigned?",
        ["static", "const", "final", "immutable"],
        "final",
        "final variables can be assigned only once.",
    ),
    (
        "Which collection does not allow duplicate elements?",
        ["List", "Set", "ArrayList", "Queue"],
        "Set",
        "A Set holds each element at most once.",
    ),
];

const POOLS: [(&str, &[Entry]); 6] = [
    ("HTML", HTML),
    ("CSS", CSS),
    ("JavaScript", JAVASCRIPT),
    ("React", REACT),
    ("Python", PYTHON),
    ("Java", JAVA),
];

fn to_question(entry: &Entry) -> Question {
    let (prompt, options, correct, explanation) = entry;
    Question::new(prompt, *options, correct, explanation)
}

/// The full pool for a topic label, if one exists.
pub fn pool(topic_key: &str) -> Option<Vec<Question>> {
    POOLS
        .iter()
        .find(|(key, _)| *key == topic_key)
        .map(|(_, entries)| entries.iter().map(to_question).collect())
}

/// Shuffles the topic's pool and returns at most one round of questions.
/// An unknown topic mixes every pool together.
pub fn pick<R: Rng + ?Sized>(topic_key: &str, rng: &mut R) -> Vec<Question> {
    let mut questions = match pool(topic_key) {
        Some(questions) if !questions.is_empty() => questions,
        _ => {
            log::warn!("No fallback pool for topic {:?}, mixing all topics", topic_key);
            POOLS
                .iter()
                .flat_map(|(_, entries)| entries.iter().map(to_question))
                .collect()
        }
    };
    questions.shuffle(rng);
    questions.truncate(QUESTIONS_PER_ROUND);
    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::Topic;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn every_topic_has_a_full_round_of_well_formed_questions() {
        for topic in Topic::ALL {
            let questions = pool(topic.as_str()).expect("missing pool");
            assert!(questions.len() >= QUESTIONS_PER_ROUND, "{:?}", topic);
            for question in &questions {
                assert!(question.is_well_formed(), "{:?}", question.prompt);
            }
        }
    }

    #[test]
    fn pick_draws_five_distinct_questions_from_the_topic() {
        let mut rng = StdRng::seed_from_u64(7);
        let html: HashSet<String> = pool("HTML").unwrap().into_iter().map(|q| q.prompt).collect();

        let picked = pick("HTML", &mut rng);
        let prompts: HashSet<String> = picked.iter().map(|q| q.prompt.clone()).collect();

        assert_eq!(picked.len(), QUESTIONS_PER_ROUND);
        assert_eq!(prompts.len(), QUESTIONS_PER_ROUND);
        assert!(prompts.is_subset(&html));
    }

    #[test]
    fn lookup_is_case_sensitive_and_misses_mix_all_topics() {
        let mut rng = StdRng::seed_from_u64(11);
        let everything: HashSet<String> = POOLS
            .iter()
            .flat_map(|(_, entries)| entries.iter().map(|e| e.0.to_string()))
            .collect();

        let picked = pick("html", &mut rng);

        assert_eq!(picked.len(), QUESTIONS_PER_ROUND);
        assert!(picked.iter().all(|q| everything.contains(&q.prompt)));
    }

    #[test]
    fn shuffle_depends_on_the_random_source() {
        let orders: HashSet<Vec<String>> = (0..20)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                pick("Java", &mut rng).into_iter().map(|q| q.prompt).collect()
            })
            .collect();
        assert!(orders.len() > 1);
    }
}
