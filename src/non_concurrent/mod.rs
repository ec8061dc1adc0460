// single-threaded structures: callers that share one across threads wrap it in their own lock
pub mod bst;
