pub mod contact;
pub mod export;
pub mod lead;
pub mod search_result;
pub mod webpage;
