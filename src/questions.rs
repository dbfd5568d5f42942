//! Trivia question bank and draw order
//!
//! The bank is a fixed, ordered list validated once at startup. Questions are
//! handed out through a `DrawOrder`: a shuffled permutation consumed front to
//! back and reshuffled when exhausted, so every question surfaces once per
//! cycle before any repeats.

use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::error::BankError;

/// Minimum bank size for the built-in bank
pub const MIN_QUESTIONS: usize = 40;

/// Question categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Python,
    JavaScript,
    #[serde(rename = "HTML/CSS")]
    HtmlCss,
    #[serde(rename = "SQL")]
    Sql,
    General,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Python,
        Category::JavaScript,
        Category::HtmlCss,
        Category::Sql,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Python => "Python",
            Category::JavaScript => "JavaScript",
            Category::HtmlCss => "HTML/CSS",
            Category::Sql => "SQL",
            Category::General => "General",
        }
    }

    /// Fewest questions the built-in bank must carry for this category
    pub fn minimum(&self) -> usize {
        match self {
            Category::Python => 10,
            Category::JavaScript => 8,
            _ => 1,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A multiple-choice question with exactly four choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub category: Category,
    pub question: &'static str,
    pub choices: [&'static str; 4],
    pub answer_index: usize,
}

impl Question {
    const fn new(
        category: Category,
        question: &'static str,
        choices: [&'static str; 4],
        answer_index: usize,
    ) -> Self {
        Self {
            category,
            question,
            choices,
            answer_index,
        }
    }

    /// Text of the correct choice (callers go through a validated bank)
    pub fn answer_text(&self) -> &'static str {
        self.choices[self.answer_index.min(3)]
    }

    fn validate(&self, index: usize) -> Result<(), BankError> {
        if self.question.trim().is_empty() {
            return Err(BankError::EmptyQuestion { index });
        }
        if self.answer_index > 3 {
            return Err(BankError::AnswerOutOfRange {
                index,
                answer: self.answer_index,
            });
        }
        for (choice, text) in self.choices.iter().enumerate() {
            if text.trim().is_empty() {
                return Err(BankError::EmptyChoice { index, choice });
            }
        }
        for i in 0..self.choices.len() {
            for j in (i + 1)..self.choices.len() {
                if self.choices[i].trim() == self.choices[j].trim() {
                    return Err(BankError::DuplicateChoice {
                        index,
                        text: self.choices[i].to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Validated, immutable question collection
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank, rejecting malformed or duplicated questions
    pub fn new(questions: Vec<Question>) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::TooFewQuestions {
                found: 0,
                required: 1,
            });
        }

        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(questions.len());
        for (index, q) in questions.iter().enumerate() {
            q.validate(index)?;
            if let Some(&first) = seen.get(q.question.trim()) {
                return Err(BankError::DuplicateQuestion { index, first });
            }
            seen.insert(q.question.trim(), index);
        }

        Ok(Self { questions })
    }

    /// The bank shipped with the game, including coverage requirements
    pub fn builtin() -> Result<Self, BankError> {
        let bank = Self::new(BUILTIN_QUESTIONS.to_vec())?;
        bank.check_coverage()?;
        log::info!("Loaded {} trivia questions", bank.len());
        Ok(bank)
    }

    /// Enforce total size and per-category minimums
    pub fn check_coverage(&self) -> Result<(), BankError> {
        if self.len() < MIN_QUESTIONS {
            return Err(BankError::TooFewQuestions {
                found: self.len(),
                required: MIN_QUESTIONS,
            });
        }
        for category in Category::ALL {
            let found = self.count(category);
            if found < category.minimum() {
                return Err(BankError::CategoryShortfall {
                    category,
                    found,
                    required: category.minimum(),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// Number of questions in a category
    pub fn count(&self, category: Category) -> usize {
        self.iter()
            .filter(|q| q.category == category)
            .count()
    }
}

/// Shuffle a slice of bank indices in place
pub fn shuffle_questions<R: Rng + ?Sized>(order: &mut [usize], rng: &mut R) {
    order.shuffle(rng);
}

/// Shuffled permutation of bank indices, consumed front to back
#[derive(Debug, Clone)]
pub struct DrawOrder {
    order: Vec<usize>,
    cursor: usize,
    /// Completed passes through the bank
    cycles: u32,
}

impl DrawOrder {
    pub fn new<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        shuffle_questions(&mut order, rng);
        Self {
            order,
            cursor: 0,
            cycles: 0,
        }
    }

    /// Pop the next bank index, reshuffling once the permutation is spent.
    /// Returns `None` only for an empty bank.
    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }
        if self.cursor >= self.order.len() {
            shuffle_questions(&mut self.order, rng);
            self.cursor = 0;
            self.cycles += 1;
            log::debug!("Question draw order reshuffled (cycle {})", self.cycles);
        }
        let index = self.order[self.cursor];
        self.cursor += 1;
        Some(index)
    }

    /// Questions left before the next reshuffle
    pub fn remaining(&self) -> usize {
        self.order.len() - self.cursor
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }
}

use Category::*;

/// Built-in question bank
pub static BUILTIN_QUESTIONS: &[Question] = &[
    // Python
    Question::new(Python, "Which keyword defines a function in Python?", ["func", "def", "function", "lambda"], 1),
    Question::new(Python, "What does len([1, 2, 3]) return?", ["2", "3", "4", "6"], 1),
    Question::new(Python, "Which type is immutable in Python?", ["list", "dict", "set", "tuple"], 3),
    Question::new(Python, "What does 7 // 2 evaluate to?", ["3.5", "3", "4", "1"], 1),
    Question::new(Python, "Which statement handles exceptions in Python?", ["try/except", "try/catch", "do/rescue", "begin/end"], 0),
    Question::new(Python, "What is the value of bool('') in Python?", ["True", "False", "None", "Error"], 1),
    Question::new(Python, "Which method adds an item to the end of a list?", ["add()", "push()", "append()", "insert_end()"], 2),
    Question::new(Python, "Which symbol starts a comment in Python?", ["//", "#", "--", "/*"], 1),
    Question::new(Python, "What does range(5) produce first?", ["1", "0", "5", "-1"], 1),
    Question::new(Python, "Which built-in returns the type of an object?", ["typeof()", "kind()", "type()", "class()"], 2),
    Question::new(Python, "What does the 'yield' keyword create?", ["A generator", "A thread", "A class", "A decorator"], 0),
    // JavaScript
    Question::new(JavaScript, "Which keyword declares a block-scoped constant in JavaScript?", ["var", "let", "const", "static"], 2),
    Question::new(JavaScript, "What does typeof null return?", ["null", "undefined", "object", "number"], 2),
    Question::new(JavaScript, "Which operator checks equality without type coercion?", ["==", "===", "=", "!="], 1),
    Question::new(JavaScript, "Which method converts JSON text into an object?", ["JSON.parse", "JSON.stringify", "JSON.load", "JSON.decode"], 0),
    Question::new(JavaScript, "What is the result of [1, 2, 3].map(x => x * 2)?", ["[1, 2, 3]", "[2, 4, 6]", "[3, 6, 9]", "6"], 1),
    Question::new(JavaScript, "Which function schedules code to run once after a delay?", ["setInterval", "setTimeout", "requestIdle", "delay"], 1),
    Question::new(JavaScript, "What value does an uninitialized let variable hold?", ["null", "0", "undefined", "NaN"], 2),
    Question::new(JavaScript, "Which array method keeps only items passing a test?", ["map", "reduce", "filter", "forEach"], 2),
    Question::new(JavaScript, "What does NaN === NaN evaluate to?", ["true", "false", "undefined", "TypeError"], 1),
    // HTML/CSS
    Question::new(HtmlCss, "Which HTML tag creates a hyperlink?", ["<link>", "<a>", "<href>", "<url>"], 1),
    Question::new(HtmlCss, "Which CSS property sets the text color?", ["font-color", "text-color", "color", "foreground"], 2),
    Question::new(HtmlCss, "Which HTML element is used for the largest heading?", ["<h6>", "<heading>", "<h1>", "<head>"], 2),
    Question::new(HtmlCss, "Which CSS display value enables flexbox layout?", ["block", "flex", "grid", "inline"], 1),
    Question::new(HtmlCss, "Which attribute gives an image alternative text?", ["title", "src", "alt", "desc"], 2),
    Question::new(HtmlCss, "Which CSS selector targets an element with id main?", [".main", "#main", "main", "*main"], 1),
    Question::new(HtmlCss, "Which HTML element draws 2D graphics from script?", ["<svg>", "<canvas>", "<img>", "<draw>"], 1),
    Question::new(HtmlCss, "In the CSS box model, which area lies between border and content?", ["margin", "padding", "outline", "gap"], 1),
    Question::new(HtmlCss, "Which CSS position value removes an element from normal flow relative to its positioned ancestor?", ["static", "relative", "absolute", "sticky"], 2),
    // SQL
    Question::new(Sql, "Which SQL statement retrieves rows from a table?", ["GET", "SELECT", "FETCH", "READ"], 1),
    Question::new(Sql, "Which clause filters rows before grouping?", ["HAVING", "WHERE", "ORDER BY", "LIMIT"], 1),
    Question::new(Sql, "Which clause filters groups after aggregation?", ["WHERE", "GROUP BY", "HAVING", "FILTER"], 2),
    Question::new(Sql, "Which JOIN returns only rows matching in both tables?", ["LEFT JOIN", "INNER JOIN", "FULL JOIN", "CROSS JOIN"], 1),
    Question::new(Sql, "Which statement removes a table and its data entirely?", ["DELETE TABLE", "TRUNCATE ROWS", "DROP TABLE", "REMOVE TABLE"], 2),
    Question::new(Sql, "Which aggregate function counts rows?", ["SUM()", "COUNT()", "TOTAL()", "NUM()"], 1),
    Question::new(Sql, "Which keyword sorts a result set?", ["SORT BY", "ORDER BY", "GROUP BY", "ARRANGE"], 1),
    Question::new(Sql, "Which constraint uniquely identifies each row?", ["FOREIGN KEY", "CHECK", "PRIMARY KEY", "DEFAULT"], 2),
    // General
    Question::new(General, "What does CPU stand for?", ["Central Processing Unit", "Computer Power Unit", "Core Program Utility", "Central Peripheral Unit"], 0),
    Question::new(General, "How many bits are in a byte?", ["4", "8", "16", "32"], 1),
    Question::new(General, "Which data structure is last in, first out?", ["Queue", "Stack", "Heap", "Tree"], 1),
    Question::new(General, "What is the binary representation of decimal 5?", ["100", "101", "110", "111"], 1),
    Question::new(General, "Which HTTP status code means Not Found?", ["200", "301", "404", "500"], 2),
    Question::new(General, "What is the time complexity of binary search?", ["O(n)", "O(log n)", "O(n log n)", "O(1)"], 1),
    Question::new(General, "Which version control command records staged changes?", ["git push", "git add", "git commit", "git clone"], 2),
    Question::new(General, "What does RAM stand for?", ["Random Access Memory", "Read Any Memory", "Rapid Action Module", "Runtime Allocation Map"], 0),
    Question::new(General, "Which number base does hexadecimal use?", ["2", "8", "10", "16"], 3),
];
