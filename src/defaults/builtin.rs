//! Built-in class defaults used when no defaults document can be read
//!
//! Only the three lists are covered; there are no built-in template
//! chapters, so a profile seeded from this table starts with no chapters.

use crate::models::ClassDefaults;

const SUBJECTS: [&str; 6] = [
    "Mathematics",
    "Science",
    "English",
    "Social Studies",
    "Hindi",
    "Sanskrit",
];

const METHODS: [&str; 4] = ["School", "Tuition", "Online App", "Self Study"];

const COMMON_EXAMS: [&str; 4] = ["Half Yearly", "Annual", "Unit Test 1", "Unit Test 2"];

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Defaults for classes 6 to 9. Class 9 sits a board exam instead of weekly tests.
pub fn builtin_class_defaults() -> Vec<ClassDefaults> {
    ["6", "7", "8", "9"]
        .into_iter()
        .map(|class_name| {
            let mut exam_types = owned(&COMMON_EXAMS);
            exam_types.push(if class_name == "9" { "Board Exam" } else { "Weekly Test" }.to_string());

            ClassDefaults {
                class_name: class_name.to_string(),
                subjects: owned(&SUBJECTS),
                learning_methods: owned(&METHODS),
                exam_types,
            }
        })
        .collect()
}
