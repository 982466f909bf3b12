pub mod review;
pub mod selector;
pub mod testgen;

pub use review::{
  collect_review_items, review_summary, select_review_session, ReviewItem, ReviewSession,
  ReviewSummary,
};
pub use selector::{select_practice_question, PracticeQuestion};
pub use testgen::{apply_test_result, generate_test_questions, TestQuestion, TestSession};
