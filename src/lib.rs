pub mod cli;
pub mod comment;
pub mod diff;
pub mod discover;
pub mod error;
pub mod github;
pub mod html;
pub mod ingest;
pub mod model;
pub mod parsers;
pub mod percentage;
pub mod tabulate;
