pub mod keywords;
pub mod mapper;
pub mod output;
pub mod ranker;
pub mod scorer;
