pub mod context;
pub mod digest;
pub mod docs;
pub mod issue;
pub mod json;
pub mod merger;
pub mod paths;
pub mod priority;
pub mod sorter;
pub mod terminal;
