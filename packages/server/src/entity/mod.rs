pub mod comment;
pub mod fill_blank_answer;
pub mod mcq_option;
pub mod problem_set;
pub mod problem_set_question;
pub mod problem_set_tag;
pub mod question;
pub mod question_tag;
pub mod reputation_entry;
pub mod tag;
pub mod user;
pub mod user_answer;
pub mod vote;
